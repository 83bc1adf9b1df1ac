//! Key-value persistence behind the history lists.
//!
//! `FileStore` keeps one JSON document per key in a directory; `MemoryStore`
//! keeps everything in process and is used by tests and ephemeral sessions.

use parking_lot::Mutex;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::HistoryError;

/// String-keyed, string-valued durable storage.
pub trait KeyValueStore: Send + Sync {
    /// Read the raw value under `key`. `Ok(None)` when absent.
    fn get(&self, key: &str) -> Result<Option<String>, HistoryError>;

    /// Replace the value under `key`.
    fn set(&self, key: &str, value: &str) -> Result<(), HistoryError>;
}

/// File-backed store: `<dir>/<key>.json`.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Create a store rooted at `dir`. The directory is created on first write.
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    fn key_path(&self, key: &str) -> Result<PathBuf, HistoryError> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid {
            return Err(HistoryError::InvalidKey(key.to_string()));
        }
        Ok(self.dir.join(format!("{}.json", key)))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, HistoryError> {
        let path = self.key_path(key)?;
        match fs::read_to_string(&path) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(HistoryError::io(key, e)),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), HistoryError> {
        let path = self.key_path(key)?;
        fs::create_dir_all(&self.dir).map_err(|e| HistoryError::io(key, e))?;
        fs::write(&path, value).map_err(|e| HistoryError::io(key, e))?;
        tracing::debug!("Wrote {} bytes to {:?}", value.len(), path);
        Ok(())
    }
}

/// In-memory store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, HistoryError> {
        Ok(self.entries.lock().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), HistoryError> {
        self.entries.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }
}
