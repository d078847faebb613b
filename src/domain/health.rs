//! Health derivation from watering adherence
//!
//! Status transitions, evaluated against the status stored at scan start:
//!
//! ```text
//!   overdue > 7 days   any except Critical    -> Critical
//!   overdue > 3 days   Good                   -> Needs Attention
//!   not yet due        Needs Attention/Crit.  -> Good
//! ```
//!
//! Only the first matching rule applies. Nothing degrades into or out of
//! `Excellent` except through the Critical rule; an `Excellent` plant that
//! is 4 to 7 days overdue keeps its status.

use chrono::NaiveDate;
use serde::Serialize;

use super::id::PlantId;
use super::plant::{HealthStatus, Plant};

/// Days overdue beyond which a `Good` plant needs attention
pub const ATTENTION_THRESHOLD_DAYS: i64 = 3;

/// Days overdue beyond which any plant becomes critical
pub const CRITICAL_THRESHOLD_DAYS: i64 = 7;

/// A status transition produced by a health scan
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HealthChange {
    pub id: PlantId,
    pub name: String,
    pub from: HealthStatus,
    pub to: HealthStatus,
    pub days_overdue: i64,
}

/// Returns the new status for a plant, or `None` if it stays as is
pub fn evaluate(current: HealthStatus, days_overdue: i64) -> Option<HealthStatus> {
    if days_overdue > CRITICAL_THRESHOLD_DAYS && current != HealthStatus::Critical {
        return Some(HealthStatus::Critical);
    }
    if days_overdue > ATTENTION_THRESHOLD_DAYS && current == HealthStatus::Good {
        return Some(HealthStatus::NeedsAttention);
    }
    if days_overdue < 0 && current.needs_attention() {
        return Some(HealthStatus::Good);
    }
    None
}

/// Computes the status changes for a collection without applying them
pub fn assess(plants: &[Plant], today: NaiveDate) -> Vec<HealthChange> {
    plants
        .iter()
        .filter_map(|plant| {
            let days_overdue = plant.days_overdue(today);
            evaluate(plant.health(), days_overdue).map(|to| HealthChange {
                id: plant.id().clone(),
                name: plant.name.clone(),
                from: plant.health(),
                to,
                days_overdue,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{CareLevel, NewPlant};
    use crate::domain::HealthStatus::{Critical, Excellent, Good, NeedsAttention};

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    /// Medium-tier plant watered 2023-04-01, next watering 2023-04-08
    fn make_plant(status: HealthStatus) -> Plant {
        let mut data = NewPlant::new("Monstera", "Living Room");
        data.water_needs = Some(CareLevel::Medium);
        data.last_watered = Some(date("2023-04-01"));
        data.health = Some(status);
        Plant::new("1".parse().unwrap(), data, date("2023-04-01"))
    }

    #[test]
    fn rule_table() {
        assert_eq!(evaluate(Good, 8), Some(Critical));
        assert_eq!(evaluate(Excellent, 8), Some(Critical));
        assert_eq!(evaluate(NeedsAttention, 8), Some(Critical));
        assert_eq!(evaluate(Critical, 8), None);

        assert_eq!(evaluate(Good, 4), Some(NeedsAttention));
        assert_eq!(evaluate(Good, 7), Some(NeedsAttention));
        assert_eq!(evaluate(Excellent, 5), None);
        assert_eq!(evaluate(NeedsAttention, 5), None);

        assert_eq!(evaluate(NeedsAttention, -1), Some(Good));
        assert_eq!(evaluate(Critical, -1), Some(Good));
        assert_eq!(evaluate(Excellent, -1), None);
        assert_eq!(evaluate(Good, -1), None);
    }

    #[test]
    fn due_today_neither_degrades_nor_recovers() {
        for status in [Excellent, Good, NeedsAttention, Critical] {
            assert_eq!(evaluate(status, 0), None);
        }
    }

    #[test]
    fn three_days_overdue_stays_good() {
        let plants = vec![make_plant(Good)];
        assert!(assess(&plants, date("2023-04-11")).is_empty());
    }

    #[test]
    fn four_days_overdue_needs_attention() {
        let plants = vec![make_plant(Good)];
        let changes = assess(&plants, date("2023-04-12"));

        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].from, Good);
        assert_eq!(changes[0].to, NeedsAttention);
        assert_eq!(changes[0].days_overdue, 4);
    }

    #[test]
    fn eight_days_overdue_is_critical() {
        let plants = vec![make_plant(Good)];
        let changes = assess(&plants, date("2023-04-16"));

        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].to, Critical);
    }

    #[test]
    fn excellent_skips_needs_attention() {
        let plants = vec![make_plant(Excellent)];

        assert!(assess(&plants, date("2023-04-15")).is_empty());
        assert_eq!(assess(&plants, date("2023-04-16"))[0].to, Critical);
    }

    #[test]
    fn future_watering_recovers_critical() {
        let plants = vec![make_plant(Critical)];
        let changes = assess(&plants, date("2023-04-07"));

        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].to, Good);
    }
}
