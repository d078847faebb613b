//! Domain models for Botaniq
//!
//! Contains the plant model and the pure care rules (scheduling, health,
//! statistics) without any I/O concerns.

mod id;
mod plant;
pub mod schedule;
pub mod health;
mod stats;

pub use id::{IdError, PlantId};
pub use plant::{
    CareAction, CareEntry, CareLevel, HealthStatus, NewPlant, ParseEnumError, Plant,
    PlantDetails, PlantPatch, PlantType, ValidationError,
};
pub use health::HealthChange;
pub use schedule::WateringUrgency;
pub use stats::CollectionStats;
