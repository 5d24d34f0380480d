//! Key/value storage backends.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::Mutex;
use thiserror::Error;

/// Storage failures.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage is unavailable")]
    Unavailable,

    #[error("storage I/O failed: {0}")]
    Io(#[from] io::Error),

    #[error("failed to serialize value: {0}")]
    Serialize(String),

    #[error("failed to deserialize value: {0}")]
    Deserialize(String),

    #[error("storage quota exceeded: {needed} bytes > {quota} bytes")]
    QuotaExceeded { needed: usize, quota: usize },

    #[error("storage write rejected")]
    WriteRejected,
}

/// Durable string storage keyed by name (the page's local storage).
pub trait StorageBackend: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// Shared storage handle.
pub type SharedStorage = Arc<dyn StorageBackend>;

#[derive(Debug, Default)]
struct MemoryInner {
    values: HashMap<String, String>,
    reject_writes: bool,
    quota_bytes: Option<usize>,
}

/// In-memory storage; clones share the same contents.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    inner: Arc<Mutex<MemoryInner>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Limit the size of any single stored value.
    pub fn with_quota(quota_bytes: usize) -> Self {
        let storage = Self::new();
        storage.inner.lock().quota_bytes = Some(quota_bytes);
        storage
    }

    /// Make every subsequent write fail.
    pub fn reject_writes(&self, reject: bool) {
        self.inner.lock().reject_writes = reject;
    }

    /// Raw stored value, bypassing error handling.
    pub fn raw(&self, key: &str) -> Option<String> {
        self.inner.lock().values.get(key).cloned()
    }

    /// Store a raw value regardless of quota or rejection.
    pub fn insert_raw(&self, key: &str, value: &str) {
        self.inner
            .lock()
            .values
            .insert(key.to_string(), value.to_string());
    }
}

impl StorageBackend for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.inner.lock().values.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut inner = self.inner.lock();
        if inner.reject_writes {
            return Err(StorageError::WriteRejected);
        }
        if let Some(quota) = inner.quota_bytes {
            if value.len() > quota {
                return Err(StorageError::QuotaExceeded {
                    needed: value.len(),
                    quota,
                });
            }
        }
        inner.values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.inner.lock().values.remove(key);
        Ok(())
    }
}

/// One file per key inside a directory.
#[derive(Debug, Clone)]
pub struct FileStorage {
    root: PathBuf,
}

impl FileStorage {
    /// Open (creating if needed) a storage directory.
    pub fn open(root: impl AsRef<Path>) -> Result<Self, StorageError> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    fn path_for(&self, key: &str) -> PathBuf {
        let file_name: String = key
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        self.root.join(format!("{}.json", file_name))
    }
}

impl StorageBackend for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StorageError::Io(e)),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let path = self.path_for(key);
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, value)?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        match fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StorageError::Io(e)),
        }
    }
}

/// Stand-in for a runtime with no persistent storage capability.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnavailableStorage;

impl StorageBackend for UnavailableStorage {
    fn get(&self, _key: &str) -> Result<Option<String>, StorageError> {
        Err(StorageError::Unavailable)
    }

    fn set(&self, _key: &str, _value: &str) -> Result<(), StorageError> {
        Err(StorageError::Unavailable)
    }

    fn remove(&self, _key: &str) -> Result<(), StorageError> {
        Err(StorageError::Unavailable)
    }
}
