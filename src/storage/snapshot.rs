//! Snapshot persistence for the plant collection
//!
//! The whole collection is stored as one JSON array in
//! `<data-dir>/plants.json`, read wholesale on startup and rewritten
//! wholesale after every mutation. Writers replace the file through a temp
//! file + rename. Readers and writers coordinate through a lock held on the
//! stable `<snapshot>.lock` sibling, never on the file being replaced.

use std::collections::HashSet;
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use fs2::FileExt;
use parking_lot::Mutex;
use thiserror::Error;

use super::seed;
use crate::domain::{Plant, PlantId};

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("Failed to {action} {path}: {source}")]
    Io {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to acquire lock on {path}: {source}")]
    Lock {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to serialize plant snapshot: {0}")]
    Serialize(#[source] serde_json::Error),

    #[error("Plant snapshot {path} is corrupt: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Plant snapshot contains duplicate plant ID {0}")]
    DuplicateId(PlantId),

    #[error("Built-in sample collection is invalid: {0}")]
    Seed(#[source] serde_json::Error),

    #[error("Snapshot storage unavailable: {0}")]
    Unavailable(String),
}

/// Fails on the first plant ID that appears twice in `plants`
pub fn ensure_unique_ids(plants: &[Plant]) -> Result<(), SnapshotError> {
    let mut seen = HashSet::with_capacity(plants.len());
    for plant in plants {
        if !seen.insert(plant.id()) {
            return Err(SnapshotError::DuplicateId(plant.id().clone()));
        }
    }
    Ok(())
}

/// Load/save boundary between the in-memory store and durable storage
pub trait SnapshotGateway: Send {
    /// Returns the last saved collection, or the initial collection if
    /// nothing was saved yet
    fn load(&self) -> Result<Vec<Plant>, SnapshotError>;

    /// Replaces the saved collection
    fn save(&self, plants: &[Plant]) -> Result<(), SnapshotError>;
}

/// What `load` returns when no snapshot exists yet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InitialCollection {
    /// The built-in sample plants
    #[default]
    Sample,
    Empty,
}

impl InitialCollection {
    fn plants(self) -> Result<Vec<Plant>, SnapshotError> {
        match self {
            InitialCollection::Sample => seed::sample_collection().map_err(SnapshotError::Seed),
            InitialCollection::Empty => Ok(Vec::new()),
        }
    }
}

/// Snapshot stored as a JSON file
pub struct SnapshotFile {
    path: PathBuf,
    initial: InitialCollection,
}

impl SnapshotFile {
    /// Creates a snapshot file at the given path
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            initial: InitialCollection::default(),
        }
    }

    /// Sets what an absent snapshot loads as
    pub fn with_initial(mut self, initial: InitialCollection) -> Self {
        self.initial = initial;
        self
    }

    /// Returns the path to the snapshot file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns true if a snapshot has been written
    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// `plants.json` -> `plants.json<suffix>`, next to the snapshot
    fn sibling(&self, suffix: &str) -> PathBuf {
        let mut raw = self.path.clone().into_os_string();
        raw.push(suffix);
        PathBuf::from(raw)
    }

    fn lock_path(&self) -> PathBuf {
        self.sibling(".lock")
    }

    fn temp_path(&self) -> PathBuf {
        self.sibling(".tmp")
    }

    /// Opens the lock file, creating it if needed. The lock lives as long
    /// as the returned handle.
    fn open_lock(&self) -> Result<File, SnapshotError> {
        let lock_path = self.lock_path();
        OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&lock_path)
            .map_err(|e| self.io_error("open lock file", &lock_path, e))
    }

    fn lock_error(&self, source: io::Error) -> SnapshotError {
        SnapshotError::Lock {
            path: self.lock_path(),
            source,
        }
    }

    fn io_error(&self, action: &'static str, path: &Path, source: io::Error) -> SnapshotError {
        SnapshotError::Io {
            action,
            path: path.to_path_buf(),
            source,
        }
    }
}

impl SnapshotGateway for SnapshotFile {
    fn load(&self) -> Result<Vec<Plant>, SnapshotError> {
        if !self.path.exists() {
            tracing::debug!(
                "No snapshot at {}, loading {:?} collection",
                self.path.display(),
                self.initial
            );
            return self.initial.plants();
        }

        let lock = self.open_lock()?;
        lock.lock_shared().map_err(|e| self.lock_error(e))?;

        let file = File::open(&self.path).map_err(|e| self.io_error("open", &self.path, e))?;
        let plants: Vec<Plant> = serde_json::from_reader(BufReader::new(&file)).map_err(
            |source| SnapshotError::Corrupt {
                path: self.path.clone(),
                source,
            },
        )?;

        tracing::debug!("Loaded {} plants from {}", plants.len(), self.path.display());

        // Lock is released when `lock` is dropped
        Ok(plants)
    }

    fn save(&self, plants: &[Plant]) -> Result<(), SnapshotError> {
        // Ensure parent directory exists
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| self.io_error("create directory", parent, e))?;
        }

        // One writer at a time from the temp write through the rename
        let lock = self.open_lock()?;
        lock.lock_exclusive().map_err(|e| self.lock_error(e))?;

        let temp_path = self.temp_path();
        {
            let file = OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .open(&temp_path)
                .map_err(|e| self.io_error("create temp file", &temp_path, e))?;

            let mut writer = BufWriter::new(&file);
            serde_json::to_writer_pretty(&mut writer, plants).map_err(SnapshotError::Serialize)?;
            writeln!(writer).map_err(|e| self.io_error("write", &temp_path, e))?;
            writer
                .flush()
                .map_err(|e| self.io_error("flush", &temp_path, e))?;
        }

        // Atomic rename
        fs::rename(&temp_path, &self.path).map_err(|e| self.io_error("replace", &self.path, e))?;
        drop(lock);

        tracing::debug!("Saved {} plants to {}", plants.len(), self.path.display());
        Ok(())
    }
}

/// Snapshot kept in memory, shared between clones
///
/// Used by tests and by embedders that persist the collection themselves.
#[derive(Clone, Default)]
pub struct MemorySnapshot {
    saved: Arc<Mutex<Option<Vec<Plant>>>>,
    initial: Vec<Plant>,
}

impl MemorySnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// A snapshot that loads `plants` until the first save
    pub fn with_initial(plants: Vec<Plant>) -> Self {
        Self {
            saved: Arc::default(),
            initial: plants,
        }
    }

    /// Returns the last saved collection, if any
    pub fn saved(&self) -> Option<Vec<Plant>> {
        self.saved.lock().clone()
    }
}

impl SnapshotGateway for MemorySnapshot {
    fn load(&self) -> Result<Vec<Plant>, SnapshotError> {
        Ok(self.saved().unwrap_or_else(|| self.initial.clone()))
    }

    fn save(&self, plants: &[Plant]) -> Result<(), SnapshotError> {
        *self.saved.lock() = Some(plants.to_vec());
        Ok(())
    }
}
