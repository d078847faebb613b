//! Plant identifiers
//!
//! ID Format:
//! - Issued IDs: `p-{12-char-hash}` (e.g., `p-7f2b4c1d9e03`)
//! - Loaded IDs: any non-empty string without whitespace (the sample
//!   collection uses `1` through `6`)
//!
//! The hash is derived from the plant name, the creation instant and a
//! per-store sequence number, so two plants added in the same instant with
//! the same name still get different IDs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Number of hex characters kept from the digest
const HASH_LEN: usize = 12;

#[derive(Debug, Error, PartialEq)]
pub enum IdError {
    #[error("Plant ID must not be empty")]
    Empty,

    #[error("Invalid plant ID '{0}': IDs cannot contain whitespace")]
    Whitespace(String),
}

/// Generates a short hash from name, timestamp and sequence
fn generate_hash(name: &str, timestamp: DateTime<Utc>, sequence: u64) -> String {
    let input = format!(
        "{}\u{1f}{}\u{1f}{}",
        name,
        timestamp.timestamp_nanos_opt().unwrap_or(0),
        sequence
    );
    let hash = blake3::hash(input.as_bytes());
    let hex = hash.to_hex();
    hex[..HASH_LEN].to_string()
}

/// Identifier of a plant record, immutable once assigned
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PlantId(String);

impl PlantId {
    /// Creates a new ID for a plant added at `timestamp`
    ///
    /// The caller supplies a sequence number that never repeats within the
    /// store; the store still checks the result against existing IDs.
    pub fn generate(name: &str, timestamp: DateTime<Utc>, sequence: u64) -> Self {
        Self(format!("p-{}", generate_hash(name, timestamp, sequence)))
    }

    /// Returns the ID as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PlantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.0)
    }
}

impl FromStr for PlantId {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(IdError::Empty);
        }
        if s.chars().any(char::is_whitespace) {
            return Err(IdError::Whitespace(s.to_string()));
        }
        Ok(Self(s.to_string()))
    }
}

impl TryFrom<String> for PlantId {
    type Error = IdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<PlantId> for String {
    fn from(id: PlantId) -> Self {
        id.0
    }
}
