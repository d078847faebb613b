//! # Storage Layer
//!
//! Persistence for Botaniq in plain, human-readable files.
//!
//! ## Storage Formats
//!
//! | Data | Format | Location |
//! |------|--------|----------|
//! | Plants | JSON array, camelCase fields | `<data-dir>/plants.json` |
//! | Config | TOML | `<data-dir>/config.toml` |
//!
//! ## Concurrency Safety
//!
//! - [`SnapshotFile`] locks the stable `plants.json.lock` sibling (`fs2`),
//!   shared for reads and exclusive from the temp write through the rename
//! - All writes are atomic (temp file + rename)
//! - A snapshot with two plants sharing an ID is rejected at load
//!
//! ## Key Types
//!
//! - [`Garden`] - Entry point for accessing a data directory
//! - [`SnapshotGateway`] - Load/save boundary used by the store
//! - [`SnapshotFile`] / [`MemorySnapshot`] - File-backed and in-memory gateways
//! - [`Config`] - Garden configuration

mod config;
mod garden;
mod seed;
mod snapshot;

pub use config::{Config, ConfigError, GardenConfig, CONFIG_FILE};
pub use garden::{Garden, GardenError};
pub use seed::sample_collection;
pub use snapshot::{
    ensure_unique_ids, InitialCollection, MemorySnapshot, SnapshotError, SnapshotFile, SnapshotGateway,
};
