//! Per-invocation state shared by the commands

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use chrono::NaiveDate;

use super::output::Output;
use crate::domain::PlantId;
use crate::storage::{Config, Garden, GardenError};
use crate::store::{Clock, FixedClock, PlantStore, SystemClock};

/// Where the data lives and what day it is
pub struct Session {
    data_dir: Option<PathBuf>,
    today: Option<NaiveDate>,
}

impl Session {
    pub fn new(data_dir: Option<PathBuf>, today: Option<NaiveDate>) -> Self {
        Self { data_dir, today }
    }

    /// Returns the pinned clock if `--today` was given, else the system clock
    pub fn clock(&self) -> Arc<dyn Clock> {
        match self.today {
            Some(today) => Arc::new(FixedClock::new(today)),
            None => Arc::new(SystemClock),
        }
    }

    /// Opens the garden for this invocation
    pub fn garden(&self, output: &Output) -> Result<Garden> {
        let garden = Garden::open_default(self.data_dir.clone())?;
        output.verbose_ctx(
            "garden",
            &format!("Using data directory: {}", garden.data_dir().display()),
        );
        Ok(garden)
    }

    /// Initializes the data directory
    pub fn init_garden(&self, output: &Output) -> Result<Garden> {
        let data_dir = self
            .data_dir
            .clone()
            .or_else(Config::default_data_dir)
            .ok_or(GardenError::NoDataDir)?;
        output.verbose_ctx("init", &format!("Initializing: {}", data_dir.display()));
        Garden::init(data_dir)
    }

    /// Opens the garden and loads its store as saved, without a health scan
    ///
    /// Used by the commands that run the scan themselves and report it.
    pub fn load_store(&self, output: &Output) -> Result<(Garden, PlantStore)> {
        let garden = self.garden(output)?;
        let store = garden.load_store(self.clock())?;
        output.verbose_ctx(
            "store",
            &format!("Loaded {} plants, today is {}", store.len(), store.today()),
        );
        Ok((garden, store))
    }

    /// Opens the garden, loads its store and brings every plant's health
    /// up to date for today
    pub fn open_store(&self, output: &Output) -> Result<(Garden, PlantStore)> {
        let (garden, mut store) = self.load_store(output)?;
        let changes = store.scan_health();
        if !changes.is_empty() {
            output.verbose_ctx(
                "store",
                &format!("Startup health scan changed {} plants", changes.len()),
            );
        }
        Ok((garden, store))
    }
}

/// Parses a plant ID given on the command line
pub fn parse_id(id: &str) -> Result<PlantId> {
    Ok(id.parse()?)
}
