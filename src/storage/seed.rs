//! Built-in sample collection
//!
//! Loaded when no snapshot exists yet so a fresh install has something to
//! show. Dates are from spring 2023; every schedule satisfies the same
//! derivation rules as plants added through the store.

use crate::domain::Plant;

const SAMPLE_COLLECTION: &str = include_str!("seed.json");

/// Returns the six sample plants, ids `1` through `6`
pub fn sample_collection() -> Result<Vec<Plant>, serde_json::Error> {
    serde_json::from_str(SAMPLE_COLLECTION)
}
