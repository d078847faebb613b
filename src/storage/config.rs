//! Configuration handling for Botaniq
//!
//! Configuration is stored in `<data-dir>/config.toml`. Every field has a
//! default, so a missing file or a partial file is fine.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// File name of the configuration inside the data directory
pub const CONFIG_FILE: &str = "config.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Failed to parse configuration: {0}")]
    Parse(String),
}

/// Settings for a plant collection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GardenConfig {
    /// Seconds between automatic health scans (default: one hour)
    pub scan_interval_secs: u64,

    /// Load the sample collection when no snapshot exists yet
    pub seed_on_first_run: bool,

    /// Number of plants shown by `upcoming`
    pub upcoming_limit: usize,

    /// Snapshot file name, relative to the data directory
    pub snapshot_file: String,
}

impl Default for GardenConfig {
    fn default() -> Self {
        Self {
            scan_interval_secs: 3600,
            seed_on_first_run: true,
            upcoming_limit: 5,
            snapshot_file: "plants.json".to_string(),
        }
    }
}

impl GardenConfig {
    /// Checks values that parse but make no sense
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.scan_interval_secs == 0 {
            return Err(ConfigError::Invalid(
                "scan_interval_secs must be greater than zero".to_string(),
            ));
        }
        if self.snapshot_file.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "snapshot_file must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    pub fn scan_interval(&self) -> Duration {
        Duration::from_secs(self.scan_interval_secs)
    }
}

/// Configuration bound to a data directory
#[derive(Debug, Clone)]
pub struct Config {
    pub garden: GardenConfig,
    pub data_dir: PathBuf,
}

impl Config {
    /// Returns the platform data directory used when none is given
    pub fn default_data_dir() -> Option<PathBuf> {
        ProjectDirs::from("dev", "botaniq", "botaniq").map(|dirs| dirs.data_dir().to_path_buf())
    }

    /// Loads configuration for a data directory, falling back to defaults
    pub fn load(data_dir: &Path) -> Result<Self> {
        let config_path = data_dir.join(CONFIG_FILE);

        let garden = if config_path.exists() {
            let content = fs::read_to_string(&config_path)
                .with_context(|| format!("Failed to read config: {}", config_path.display()))?;

            toml::from_str::<GardenConfig>(&content)
                .map_err(|e| ConfigError::Parse(e.to_string()))
                .context("Failed to parse config")?
        } else {
            GardenConfig::default()
        };

        garden
            .validate()
            .with_context(|| format!("Invalid config: {}", config_path.display()))?;

        Ok(Self {
            garden,
            data_dir: data_dir.to_path_buf(),
        })
    }

    /// Returns the path of the configuration file
    pub fn path(&self) -> PathBuf {
        self.data_dir.join(CONFIG_FILE)
    }

    /// Returns the path of the plant snapshot
    pub fn snapshot_path(&self) -> PathBuf {
        self.data_dir.join(&self.garden.snapshot_file)
    }
}
