//! Collection statistics

use chrono::NaiveDate;
use serde::Serialize;

use super::plant::Plant;

/// Counts derived from a snapshot of the collection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CollectionStats {
    pub total: usize,
    /// Plants whose next watering is today or earlier
    pub needs_watering: usize,
    /// Plants whose status is Needs Attention or Critical
    pub needs_attention: usize,
}

impl CollectionStats {
    pub fn compute(plants: &[Plant], today: NaiveDate) -> Self {
        Self {
            total: plants.len(),
            needs_watering: plants.iter().filter(|p| p.needs_watering(today)).count(),
            needs_attention: plants
                .iter()
                .filter(|p| p.health().needs_attention())
                .count(),
        }
    }
}
