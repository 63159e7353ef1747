//! Generic persistent key-value string store.
//!
//! The registry and cache layers only depend on this trait; capacity limits
//! and the persistence mechanism are the implementation's business. A
//! capacity overrun is a distinct error because callers recover from it
//! differently than from a plain I/O failure.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("storage limit reached")]
    CapacityExceeded,

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, StoreError>;

/// String keys to string values, finite capacity, single writer.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
    fn remove(&self, key: &str) -> Result<()>;
}

/// In-memory store with an optional total-byte capacity. Backs tests and
/// ephemeral (no persistence) runs.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<BTreeMap<String, String>>,
    capacity_bytes: Option<usize>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store that rejects writes once the sum of key and value bytes would
    /// exceed `capacity_bytes`.
    pub fn with_capacity(capacity_bytes: usize) -> Self {
        Self {
            entries: Mutex::new(BTreeMap::new()),
            capacity_bytes: Some(capacity_bytes),
        }
    }

    fn entries(&self) -> std::sync::MutexGuard<'_, BTreeMap<String, String>> {
        self.entries.lock().expect("memory store mutex poisoned")
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut entries = self.entries();
        if let Some(capacity) = self.capacity_bytes {
            let occupied: usize = entries
                .iter()
                .filter(|(k, _)| k.as_str() != key)
                .map(|(k, v)| k.len() + v.len())
                .sum();
            if occupied + key.len() + value.len() > capacity {
                return Err(StoreError::CapacityExceeded);
            }
        }
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.entries().remove(key);
        Ok(())
    }
}

/// File-backed store: one file per key under a root directory, key
/// percent-encoded into the file name so arbitrary session names stay
/// filename-safe on every platform.
#[derive(Debug)]
pub struct FileStore {
    root: PathBuf,
    max_value_bytes: Option<usize>,
}

impl FileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            max_value_bytes: None,
        }
    }

    /// Reject any single value larger than `max_value_bytes`.
    pub fn with_value_limit(root: impl Into<PathBuf>, max_value_bytes: usize) -> Self {
        Self {
            root: root.into(),
            max_value_bytes: Some(max_value_bytes),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn key_path(&self, key: &str) -> PathBuf {
        self.root.join(format!("{}.json", urlencoding::encode(key)))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        match std::fs::read_to_string(self.key_path(key)) {
            Ok(value) => Ok(Some(value)),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        if let Some(limit) = self.max_value_bytes {
            if value.len() > limit {
                return Err(StoreError::CapacityExceeded);
            }
        }
        std::fs::create_dir_all(&self.root)?;
        std::fs::write(self.key_path(key), value)?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        match std::fs::remove_file(self.key_path(key)) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}
