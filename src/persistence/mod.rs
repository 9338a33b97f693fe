//! Best-distance persistence
//!
//! The only thing a run persists is a single best-distance scalar. Storage is
//! behind [`BestDistanceStore`] so the simulation never touches the file
//! system directly.
//!
//! File format: `{ "version": 1, "best_distance": 123.4 }`

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Current envelope version
pub const STORE_VERSION: u32 = 1;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage I/O failed for {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("stored record is malformed: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("unsupported record version {0}")]
    Version(u32),
}

/// Where the best distance lives between sessions
pub trait BestDistanceStore {
    /// Load the stored best, `None` if nothing was saved yet
    fn load(&self) -> Result<Option<f32>, StoreError>;
    fn save(&mut self, best: f32) -> Result<(), StoreError>;
}

/// Versioned JSON envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
struct Record {
    version: u32,
    best_distance: f32,
}

/// Keeps the best distance in memory only
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    pub best: Option<f32>,
}

impl BestDistanceStore for MemoryStore {
    fn load(&self) -> Result<Option<f32>, StoreError> {
        Ok(self.best)
    }

    fn save(&mut self, best: f32) -> Result<(), StoreError> {
        self.best = Some(best);
        Ok(())
    }
}

/// JSON file store, written via tmp file + rename
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

    fn io_err(&self, source: std::io::Error) -> StoreError {
        StoreError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

impl BestDistanceStore for JsonFileStore {
    fn load(&self) -> Result<Option<f32>, StoreError> {
        let json = match std::fs::read_to_string(&self.path) {
            Ok(json) => json,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(self.io_err(e)),
        };
        let record: Record = serde_json::from_str(&json)?;
        if record.version != STORE_VERSION {
            return Err(StoreError::Version(record.version));
        }
        Ok(Some(record.best_distance))
    }

    fn save(&mut self, best: f32) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(&Record {
            version: STORE_VERSION,
            best_distance: best,
        })?;
        let tmp = self.path.with_extension("tmp");
        std::fs::write(&tmp, json).map_err(|e| self.io_err(e))?;
        std::fs::rename(&tmp, &self.path).map_err(|e| self.io_err(e))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("glide_run_{}_{}.json", name, std::process::id()))
    }

    #[test]
    fn test_memory_store() {
        let mut store = MemoryStore::default();
        assert_eq!(store.load().unwrap(), None);
        store.save(42.5).unwrap();
        assert_eq!(store.load().unwrap(), Some(42.5));
    }

    #[test]
    fn test_json_store_missing_file_is_empty() {
        let store = JsonFileStore::new(temp_path("missing"));
        assert_eq!(store.load().unwrap(), None);
    }

    #[test]
    fn test_json_store_save_load() {
        let path = temp_path("save_load");
        let mut store = JsonFileStore::new(&path);
        store.save(128.0).unwrap();
        assert_eq!(store.load().unwrap(), Some(128.0));
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_json_store_rejects_bad_version() {
        let path = temp_path("bad_version");
        std::fs::write(&path, r#"{ "version": 99, "best_distance": 1.0 }"#).unwrap();
        let store = JsonFileStore::new(&path);
        assert!(matches!(store.load(), Err(StoreError::Version(99))));
        let _ = std::fs::remove_file(&path);
    }
}
