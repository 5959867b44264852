//! Synchronous key-value persistence boundary.
//!
//! The stores only ever see this trait: `get`/`set`/`remove` on string
//! keys, synchronous, one serialized collection per key. Two backends ship
//! with the crate: an in-memory map (tests, ephemeral sessions) and a
//! one-file-per-key directory with atomic writes.

use std::collections::HashMap;
use std::path::PathBuf;

use parking_lot::Mutex;

use crate::error::CoreError;

pub trait StorageBackend: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    /// May fail on quota exhaustion; any other outcome is a successful
    /// full-value overwrite.
    fn set(&self, key: &str, value: &str) -> Result<(), CoreError>;
    fn remove(&self, key: &str);
}

// =============================================================================
// In-memory backend
// =============================================================================

#[derive(Default)]
pub struct MemoryStorage {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StorageBackend for MemoryStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.lock().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), CoreError> {
        self.entries
            .lock()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) {
        self.entries.lock().remove(key);
    }
}

// =============================================================================
// File-backed backend
// =============================================================================

/// One `<key>.json` file per key under a data directory.
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    pub fn new(dir: PathBuf) -> Self {
        FileStorage { dir }
    }

    /// Default location under the platform data dir.
    pub fn default_dir() -> Option<PathBuf> {
        dirs::data_dir().map(|d| d.join("prospectdesk"))
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

impl StorageBackend for FileStorage {
    fn get(&self, key: &str) -> Option<String> {
        std::fs::read_to_string(self.path_for(key)).ok()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), CoreError> {
        std::fs::create_dir_all(&self.dir)
            .map_err(|e| CoreError::Storage(format!("create {}: {}", self.dir.display(), e)))?;
        let path = self.path_for(key);
        // Write to a temp file then rename so readers never see a torn value.
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, value)
            .map_err(|e| CoreError::Storage(format!("write {}: {}", tmp.display(), e)))?;
        std::fs::rename(&tmp, &path)
            .map_err(|e| CoreError::Storage(format!("rename {}: {}", path.display(), e)))?;
        Ok(())
    }

    fn remove(&self, key: &str) {
        let _ = std::fs::remove_file(self.path_for(key));
    }
}
