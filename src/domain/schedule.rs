//! Care schedule calculation
//!
//! Turns a care tier and a reference date into the next due date. Watering
//! depends on the water tier; fertilizing is a fixed monthly interval for
//! every plant.

use chrono::{Days, NaiveDate};
use serde::Serialize;

use super::plant::{CareLevel, Plant};

/// Days between fertilizings, independent of any tier
pub const FERTILIZING_OFFSET_DAYS: u64 = 30;

/// Days between waterings for a water tier (Medium when unknown)
pub fn watering_offset_days(tier: Option<CareLevel>) -> u64 {
    match tier {
        Some(CareLevel::Low) => 14,
        Some(CareLevel::Medium) | None => 7,
        Some(CareLevel::High) => 3,
    }
}

/// Returns `today + offset` days
pub fn due_after(today: NaiveDate, offset: u64) -> NaiveDate {
    today
        .checked_add_days(Days::new(offset))
        .unwrap_or(NaiveDate::MAX)
}

/// Next watering date after watering on `last_watered`
pub fn next_watering(last_watered: NaiveDate, tier: Option<CareLevel>) -> NaiveDate {
    due_after(last_watered, watering_offset_days(tier))
}

/// Next fertilizing date after fertilizing on `last_fertilized`
pub fn next_fertilizing(last_fertilized: NaiveDate) -> NaiveDate {
    due_after(last_fertilized, FERTILIZING_OFFSET_DAYS)
}

/// How pressing an upcoming watering is relative to today
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WateringUrgency {
    Overdue,
    Today,
    Upcoming,
}

impl WateringUrgency {
    pub fn for_date(next_watering: NaiveDate, today: NaiveDate) -> Self {
        if next_watering < today {
            WateringUrgency::Overdue
        } else if next_watering == today {
            WateringUrgency::Today
        } else {
            WateringUrgency::Upcoming
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            WateringUrgency::Overdue => "overdue",
            WateringUrgency::Today => "today",
            WateringUrgency::Upcoming => "upcoming",
        }
    }
}

/// The `limit` plants due for watering soonest, earliest first
///
/// Ties keep the collection order.
pub fn upcoming_waterings(
    plants: &[Plant],
    today: NaiveDate,
    limit: usize,
) -> Vec<(&Plant, WateringUrgency)> {
    let mut sorted: Vec<&Plant> = plants.iter().collect();
    sorted.sort_by_key(|p| p.next_watering());
    sorted
        .into_iter()
        .take(limit)
        .map(|p| (p, WateringUrgency::for_date(p.next_watering(), today)))
        .collect()
}
