//! Best-score persistence
//!
//! Features:
//! - Versioned JSON envelope
//! - Atomic writes (tmp → save)
//! - In-memory store for tests and headless runs

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Current envelope version
pub const STORE_VERSION: u32 = 1;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store io error: {0}")]
    Io(#[from] io::Error),

    #[error("malformed store data: {0}")]
    Format(#[from] serde_json::Error),

    #[error("unsupported store version {found} (expected {expected})")]
    Version { found: u32, expected: u32 },

    #[error("store unavailable")]
    Unavailable,
}

/// Storage for a single best-score value
pub trait ScoreStore {
    /// Stored best, `None` if nothing was ever saved
    fn load_best(&mut self) -> Result<Option<u32>, StoreError>;

    fn save_best(&mut self, score: u32) -> Result<(), StoreError>;
}

/// On-disk envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
struct Envelope {
    version: u32,
    best_score: u32,
}

/// JSON file store
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn tmp_path(&self) -> PathBuf {
        self.path.with_extension("tmp")
    }
}

impl ScoreStore for JsonFileStore {
    fn load_best(&mut self) -> Result<Option<u32>, StoreError> {
        let json = match fs::read_to_string(&self.path) {
            Ok(json) => json,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let envelope: Envelope = serde_json::from_str(&json)?;
        if envelope.version != STORE_VERSION {
            return Err(StoreError::Version {
                found: envelope.version,
                expected: STORE_VERSION,
            });
        }
        Ok(Some(envelope.best_score))
    }

    fn save_best(&mut self, score: u32) -> Result<(), StoreError> {
        let envelope = Envelope {
            version: STORE_VERSION,
            best_score: score,
        };
        let json = serde_json::to_string_pretty(&envelope)?;

        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)?;
        }
        let tmp = self.tmp_path();
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

/// Volatile store; can be switched to fail every call
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    best: Option<u32>,
    failing: bool,
    writes: u32,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_best(best: u32) -> Self {
        Self {
            best: Some(best),
            ..Self::default()
        }
    }

    /// A store whose every call fails
    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Self::default()
        }
    }

    pub fn set_failing(&mut self, failing: bool) {
        self.failing = failing;
    }

    pub fn best(&self) -> Option<u32> {
        self.best
    }

    /// Successful writes so far
    pub fn writes(&self) -> u32 {
        self.writes
    }
}

impl ScoreStore for MemoryStore {
    fn load_best(&mut self) -> Result<Option<u32>, StoreError> {
        if self.failing {
            return Err(StoreError::Unavailable);
        }
        Ok(self.best)
    }

    fn save_best(&mut self, score: u32) -> Result<(), StoreError> {
        if self.failing {
            return Err(StoreError::Unavailable);
        }
        self.best = Some(score);
        self.writes += 1;
        Ok(())
    }
}
