//! Botaniq - A local-first plant care tracker
//!
//! Botaniq keeps a collection of plants with watering and fertilizing
//! schedules, an append-only care history and a health status that is
//! recomputed from how overdue each plant's watering is.

pub mod domain;
pub mod storage;
pub mod store;
pub mod cli;

pub use domain::{HealthStatus, NewPlant, Plant, PlantId, PlantPatch};
pub use store::{PlantStore, SharedStore, StoreError};
