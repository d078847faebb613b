//! Plant domain model
//!
//! A plant is a tracked living object with a watering schedule, an optional
//! fertilizing schedule, a health status and an append-only care history.
//! Schedule dates are never set directly: they are derived from the last
//! care date and the plant's tiers through [`super::schedule`].

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

use super::id::PlantId;
use super::schedule;

/// Error parsing one of the plant enumerations from text
#[derive(Debug, Error, PartialEq)]
#[error("Invalid {kind} '{value}': expected one of {expected}")]
pub struct ParseEnumError {
    kind: &'static str,
    value: String,
    expected: &'static str,
}

/// Error raised when a plant is created or edited without a required field
#[derive(Debug, Error, PartialEq)]
#[error("Plant {field} must not be empty")]
pub struct ValidationError {
    pub field: &'static str,
}

fn require(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        Err(ValidationError { field })
    } else {
        Ok(())
    }
}

/// Where the plant lives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum PlantType {
    #[default]
    Indoor,
    Outdoor,
    #[serde(rename = "Indoor/Outdoor", alias = "Indoor-Outdoor")]
    IndoorOutdoor,
}

impl PlantType {
    pub fn label(&self) -> &'static str {
        match self {
            PlantType::Indoor => "Indoor",
            PlantType::Outdoor => "Outdoor",
            PlantType::IndoorOutdoor => "Indoor/Outdoor",
        }
    }
}

impl fmt::Display for PlantType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.label())
    }
}

impl FromStr for PlantType {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "indoor" => Ok(PlantType::Indoor),
            "outdoor" => Ok(PlantType::Outdoor),
            "indoor/outdoor" | "indoor-outdoor" | "both" => Ok(PlantType::IndoorOutdoor),
            _ => Err(ParseEnumError {
                kind: "plant type",
                value: s.to_string(),
                expected: "indoor, outdoor, indoor-outdoor",
            }),
        }
    }
}

/// Categorical need level for light or water
///
/// The water tier drives the watering interval. Snapshots may contain
/// free-text tiers such as "Low to Medium"; those deserialize as `Medium`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Default)]
pub enum CareLevel {
    Low,
    #[default]
    Medium,
    High,
}

impl CareLevel {
    pub fn label(&self) -> &'static str {
        match self {
            CareLevel::Low => "Low",
            CareLevel::Medium => "Medium",
            CareLevel::High => "High",
        }
    }
}

impl fmt::Display for CareLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.label())
    }
}

impl FromStr for CareLevel {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(CareLevel::Low),
            "medium" => Ok(CareLevel::Medium),
            "high" => Ok(CareLevel::High),
            _ => Err(ParseEnumError {
                kind: "care level",
                value: s.to_string(),
                expected: "low, medium, high",
            }),
        }
    }
}

impl<'de> Deserialize<'de> for CareLevel {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Ok(raw.parse().unwrap_or_else(|_| {
            tracing::debug!("Unrecognized care level '{}', using Medium", raw);
            CareLevel::Medium
        }))
    }
}

/// Wellbeing indicator derived from schedule adherence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum HealthStatus {
    Excellent,
    #[default]
    Good,
    #[serde(rename = "Needs Attention", alias = "NeedsAttention")]
    NeedsAttention,
    Critical,
}

impl HealthStatus {
    /// Returns true for the statuses counted as needing attention
    pub fn needs_attention(&self) -> bool {
        matches!(self, HealthStatus::NeedsAttention | HealthStatus::Critical)
    }

    pub fn label(&self) -> &'static str {
        match self {
            HealthStatus::Excellent => "Excellent",
            HealthStatus::Good => "Good",
            HealthStatus::NeedsAttention => "Needs Attention",
            HealthStatus::Critical => "Critical",
        }
    }
}

impl fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.label())
    }
}

impl FromStr for HealthStatus {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace(|c: char| c == '-' || c == '_', " ").as_str() {
            "excellent" => Ok(HealthStatus::Excellent),
            "good" => Ok(HealthStatus::Good),
            "needs attention" | "needsattention" => Ok(HealthStatus::NeedsAttention),
            "critical" => Ok(HealthStatus::Critical),
            _ => Err(ParseEnumError {
                kind: "health status",
                value: s.to_string(),
                expected: "excellent, good, needs-attention, critical",
            }),
        }
    }
}

/// Kind of care event recorded in the history
///
/// Serialized as plain text so histories written by other front ends
/// (e.g. "Added to garden", "Repotted") survive a load/save cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum CareAction {
    Added,
    Watered,
    Fertilized,
    Other(String),
}

impl CareAction {
    pub fn as_str(&self) -> &str {
        match self {
            CareAction::Added => "Added to collection",
            CareAction::Watered => "Watered",
            CareAction::Fertilized => "Fertilized",
            CareAction::Other(s) => s,
        }
    }
}

impl fmt::Display for CareAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl From<String> for CareAction {
    fn from(value: String) -> Self {
        match value.as_str() {
            "Added to collection" => CareAction::Added,
            "Watered" => CareAction::Watered,
            "Fertilized" => CareAction::Fertilized,
            _ => CareAction::Other(value),
        }
    }
}

impl From<CareAction> for String {
    fn from(action: CareAction) -> Self {
        match action {
            CareAction::Other(s) => s,
            other => other.as_str().to_string(),
        }
    }
}

/// One entry of a plant's care history
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CareEntry {
    pub date: NaiveDate,
    pub action: CareAction,
    #[serde(default)]
    pub notes: String,
}

impl CareEntry {
    pub fn new(date: NaiveDate, action: CareAction, notes: impl Into<String>) -> Self {
        Self {
            date,
            action,
            notes: notes.into(),
        }
    }
}

/// Free-text descriptive fields (no invariants attached)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlantDetails {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub care_notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pot_size: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub soil_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fertilizer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub humidity: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub propagation: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub common_issues: Vec<String>,
}

impl PlantDetails {
    /// Overwrites every field that is set in `other`
    pub fn merge(&mut self, other: PlantDetails) {
        fn take(target: &mut Option<String>, value: Option<String>) {
            if value.is_some() {
                *target = value;
            }
        }

        take(&mut self.image, other.image);
        take(&mut self.description, other.description);
        take(&mut self.care_notes, other.care_notes);
        take(&mut self.height, other.height);
        take(&mut self.pot_size, other.pot_size);
        take(&mut self.soil_type, other.soil_type);
        take(&mut self.fertilizer, other.fertilizer);
        take(&mut self.humidity, other.humidity);
        take(&mut self.temperature, other.temperature);
        take(&mut self.propagation, other.propagation);
        if !other.common_issues.is_empty() {
            self.common_issues = other.common_issues;
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == PlantDetails::default()
    }
}

/// Input for creating a plant (everything except the ID)
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewPlant {
    pub name: String,
    pub location: String,
    pub plant_type: PlantType,
    pub light_needs: CareLevel,
    /// Missing tier schedules like `Medium`
    pub water_needs: Option<CareLevel>,
    /// Defaults to `Good`
    pub health: Option<HealthStatus>,
    /// Defaults to the creation date
    pub acquired_date: Option<NaiveDate>,
    /// Defaults to the creation date
    pub last_watered: Option<NaiveDate>,
    /// Defaults to the creation date
    pub last_fertilized: Option<NaiveDate>,
    pub details: PlantDetails,
}

impl NewPlant {
    pub fn new(name: impl Into<String>, location: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            location: location.into(),
            ..Self::default()
        }
    }

    /// Checks the required fields
    pub fn validate(&self) -> Result<(), ValidationError> {
        require("name", &self.name)?;
        require("location", &self.location)
    }
}

/// Partial update merged into an existing plant
///
/// IDs, schedule dates and the care history are deliberately absent: they
/// only change through `water`, `fertilize` and the health scan.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlantPatch {
    pub name: Option<String>,
    pub location: Option<String>,
    pub plant_type: Option<PlantType>,
    pub light_needs: Option<CareLevel>,
    pub water_needs: Option<CareLevel>,
    pub health: Option<HealthStatus>,
    pub acquired_date: Option<NaiveDate>,
    pub details: PlantDetails,
}

impl PlantPatch {
    pub fn is_empty(&self) -> bool {
        *self == PlantPatch::default()
    }

    /// Rejects a patch that would blank a required field
    pub fn validate(&self) -> Result<(), ValidationError> {
        if let Some(name) = &self.name {
            require("name", name)?;
        }
        if let Some(location) = &self.location {
            require("location", location)?;
        }
        Ok(())
    }
}

/// A tracked plant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Plant {
    id: PlantId,

    pub name: String,

    pub location: String,

    #[serde(rename = "type", default)]
    pub plant_type: PlantType,

    #[serde(default)]
    pub light_needs: CareLevel,

    #[serde(default)]
    pub water_needs: CareLevel,

    #[serde(default)]
    health: HealthStatus,

    pub acquired_date: NaiveDate,

    last_watered: NaiveDate,

    next_watering: NaiveDate,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    last_fertilized: Option<NaiveDate>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    next_fertilizing: Option<NaiveDate>,

    #[serde(flatten)]
    pub details: PlantDetails,

    #[serde(default)]
    care_history: Vec<CareEntry>,
}

impl Plant {
    /// Creates a plant from validated input, deriving its schedule
    ///
    /// The history starts with a single "Added to collection" entry dated
    /// `today`.
    pub fn new(id: PlantId, data: NewPlant, today: NaiveDate) -> Self {
        let water_needs = data.water_needs.unwrap_or_default();
        let last_watered = data.last_watered.unwrap_or(today);
        let last_fertilized = data.last_fertilized.unwrap_or(today);

        Self {
            id,
            name: data.name.trim().to_string(),
            location: data.location.trim().to_string(),
            plant_type: data.plant_type,
            light_needs: data.light_needs,
            water_needs,
            health: data.health.unwrap_or_default(),
            acquired_date: data.acquired_date.unwrap_or(today),
            last_watered,
            next_watering: schedule::next_watering(last_watered, Some(water_needs)),
            last_fertilized: Some(last_fertilized),
            next_fertilizing: Some(schedule::next_fertilizing(last_fertilized)),
            details: data.details,
            care_history: vec![CareEntry::new(today, CareAction::Added, "")],
        }
    }

    pub fn id(&self) -> &PlantId {
        &self.id
    }

    pub fn health(&self) -> HealthStatus {
        self.health
    }

    pub fn last_watered(&self) -> NaiveDate {
        self.last_watered
    }

    pub fn next_watering(&self) -> NaiveDate {
        self.next_watering
    }

    pub fn last_fertilized(&self) -> Option<NaiveDate> {
        self.last_fertilized
    }

    pub fn next_fertilizing(&self) -> Option<NaiveDate> {
        self.next_fertilizing
    }

    /// Care history, oldest append last
    pub fn care_history(&self) -> &[CareEntry] {
        &self.care_history
    }

    /// Whole days since the next watering was due (negative if not yet due)
    pub fn days_overdue(&self, today: NaiveDate) -> i64 {
        (today - self.next_watering).num_days()
    }

    /// Returns true if watering is due today or earlier
    pub fn needs_watering(&self, today: NaiveDate) -> bool {
        self.next_watering <= today
    }

    /// Records a watering and reschedules from the water tier
    pub fn record_watering(&mut self, today: NaiveDate, notes: impl Into<String>) {
        self.last_watered = today;
        self.next_watering = schedule::next_watering(today, Some(self.water_needs));
        self.care_history
            .push(CareEntry::new(today, CareAction::Watered, notes));
    }

    /// Records a fertilizing and reschedules the next one
    pub fn record_fertilizing(&mut self, today: NaiveDate, notes: impl Into<String>) {
        self.last_fertilized = Some(today);
        self.next_fertilizing = Some(schedule::next_fertilizing(today));
        self.care_history
            .push(CareEntry::new(today, CareAction::Fertilized, notes));
    }

    /// Sets the health status
    pub fn set_health(&mut self, status: HealthStatus) {
        self.health = status;
    }

    /// Merges a validated patch; schedules and history are left alone
    pub fn apply(&mut self, patch: PlantPatch) {
        if let Some(name) = patch.name {
            self.name = name.trim().to_string();
        }
        if let Some(location) = patch.location {
            self.location = location.trim().to_string();
        }
        if let Some(plant_type) = patch.plant_type {
            self.plant_type = plant_type;
        }
        if let Some(light_needs) = patch.light_needs {
            self.light_needs = light_needs;
        }
        if let Some(water_needs) = patch.water_needs {
            self.water_needs = water_needs;
        }
        if let Some(health) = patch.health {
            self.health = health;
        }
        if let Some(acquired_date) = patch.acquired_date {
            self.acquired_date = acquired_date;
        }
        self.details.merge(patch.details);
    }
}
