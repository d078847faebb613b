//! Garden management
//!
//! A garden is a data directory holding the configuration and the plant
//! snapshot. It hands out snapshot gateways and opens stores over them.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use thiserror::Error;

use super::config::{Config, CONFIG_FILE};
use super::snapshot::{InitialCollection, SnapshotFile};
use crate::store::{Clock, PlantStore};

#[derive(Debug, Error)]
pub enum GardenError {
    #[error("No data directory given and no platform data directory found. Use --data-dir or set BOTANIQ_HOME.")]
    NoDataDir,

    #[error("Data directory {0} is not a directory")]
    NotADirectory(PathBuf),
}

const DEFAULT_CONFIG: &str = r#"# Botaniq configuration

# Seconds between automatic health scans in 'botaniq watch'
scan_interval_secs = 3600

# Load the sample collection when no plants have been saved yet
seed_on_first_run = true

# Number of plants listed by 'botaniq upcoming'
upcoming_limit = 5

# Plant snapshot, relative to this directory
snapshot_file = "plants.json"
"#;

/// A Botaniq data directory
pub struct Garden {
    config: Config,
}

impl Garden {
    /// Opens the garden at the given data directory
    ///
    /// The directory does not need to exist yet: it is created on the first
    /// save.
    pub fn open(data_dir: impl Into<PathBuf>) -> Result<Self> {
        let data_dir = data_dir.into();
        if data_dir.exists() && !data_dir.is_dir() {
            return Err(GardenError::NotADirectory(data_dir).into());
        }

        let config = Config::load(&data_dir)?;
        Ok(Self { config })
    }

    /// Opens the given data directory, or the platform default
    pub fn open_default(data_dir: Option<PathBuf>) -> Result<Self> {
        let data_dir = data_dir
            .or_else(Config::default_data_dir)
            .ok_or(GardenError::NoDataDir)?;
        Self::open(data_dir)
    }

    /// Creates the data directory and a commented default config
    ///
    /// Existing files are left untouched.
    pub fn init(data_dir: impl Into<PathBuf>) -> Result<Self> {
        let data_dir = data_dir.into();

        fs::create_dir_all(&data_dir).with_context(|| {
            format!("Failed to create data directory: {}", data_dir.display())
        })?;

        let config_path = data_dir.join(CONFIG_FILE);
        if !config_path.exists() {
            fs::write(&config_path, DEFAULT_CONFIG)
                .with_context(|| format!("Failed to write config: {}", config_path.display()))?;
        }

        Self::open(data_dir)
    }

    /// Returns the data directory
    pub fn data_dir(&self) -> &Path {
        &self.config.data_dir
    }

    /// Returns the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Returns the plant snapshot path
    pub fn snapshot_path(&self) -> PathBuf {
        self.config.snapshot_path()
    }

    /// Returns true once a snapshot has been saved
    pub fn has_snapshot(&self) -> bool {
        self.snapshot_path().exists()
    }

    /// Returns the snapshot gateway for this garden
    pub fn gateway(&self) -> SnapshotFile {
        let initial = if self.config.garden.seed_on_first_run {
            InitialCollection::Sample
        } else {
            InitialCollection::Empty
        };
        SnapshotFile::new(self.snapshot_path()).with_initial(initial)
    }

    /// Opens a store over this garden's snapshot
    pub fn load_store(&self, clock: Arc<dyn Clock>) -> Result<PlantStore> {
        let store = PlantStore::open(Box::new(self.gateway()), clock).with_context(|| {
            format!(
                "Failed to load plants from {}",
                self.snapshot_path().display()
            )
        })?;
        tracing::debug!(
            "Opened garden at {} with {} plants",
            self.data_dir().display(),
            store.len()
        );
        Ok(store)
    }
}
