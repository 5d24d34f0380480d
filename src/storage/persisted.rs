//! Persisted blobs: the event log array and arbitrary JSON state objects.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::events::LogEntry;

use super::backend::{StorageBackend, StorageError};

/// What happened when reading persisted state.
#[derive(Debug, Clone, PartialEq)]
pub enum LoadOutcome {
    /// Data was read; the count is the number of log entries (1 for objects).
    Loaded(usize),
    Missing,
    Corrupt(String),
    Unavailable(String),
}

impl LoadOutcome {
    pub fn is_loaded(&self) -> bool {
        matches!(self, LoadOutcome::Loaded(_))
    }
}

/// Read the persisted log, keeping at most the newest `capacity` entries.
///
/// Missing, unreadable or malformed data yields an empty log.
pub fn load_log(
    backend: &dyn StorageBackend,
    key: &str,
    capacity: usize,
) -> (Vec<LogEntry>, LoadOutcome) {
    let raw = match backend.get(key) {
        Ok(Some(raw)) => raw,
        Ok(None) => return (Vec::new(), LoadOutcome::Missing),
        Err(e) => return (Vec::new(), LoadOutcome::Unavailable(e.to_string())),
    };

    match serde_json::from_str::<Vec<LogEntry>>(&raw) {
        Ok(mut entries) => {
            if entries.len() > capacity {
                entries.drain(..entries.len() - capacity);
            }
            let count = entries.len();
            (entries, LoadOutcome::Loaded(count))
        }
        Err(e) => (Vec::new(), LoadOutcome::Corrupt(e.to_string())),
    }
}

/// Write the newest `capacity` entries as a JSON array.
pub fn save_log<'a, I>(
    backend: &dyn StorageBackend,
    key: &str,
    entries: I,
    capacity: usize,
) -> Result<(), StorageError>
where
    I: IntoIterator<Item = &'a LogEntry>,
    I::IntoIter: ExactSizeIterator,
{
    let iter = entries.into_iter();
    let skip = iter.len().saturating_sub(capacity);
    let trimmed: Vec<&LogEntry> = iter.skip(skip).collect();
    let json =
        serde_json::to_string(&trimmed).map_err(|e| StorageError::Serialize(e.to_string()))?;
    backend.set(key, &json)
}

/// Read a JSON object; anything other than an object counts as corrupt and
/// yields the default value.
pub fn load_json<T>(backend: &dyn StorageBackend, key: &str) -> (T, LoadOutcome)
where
    T: DeserializeOwned + Default,
{
    let raw = match backend.get(key) {
        Ok(Some(raw)) => raw,
        Ok(None) => return (T::default(), LoadOutcome::Missing),
        Err(e) => return (T::default(), LoadOutcome::Unavailable(e.to_string())),
    };

    let value: Value = match serde_json::from_str(&raw) {
        Ok(v) => v,
        Err(e) => return (T::default(), LoadOutcome::Corrupt(e.to_string())),
    };

    if !value.is_object() {
        return (
            T::default(),
            LoadOutcome::Corrupt("persisted state is not an object".to_string()),
        );
    }

    match serde_json::from_value::<T>(value) {
        Ok(state) => (state, LoadOutcome::Loaded(1)),
        Err(e) => (T::default(), LoadOutcome::Corrupt(e.to_string())),
    }
}

pub fn save_json<T: Serialize>(
    backend: &dyn StorageBackend,
    key: &str,
    value: &T,
) -> Result<(), StorageError> {
    let json = serde_json::to_string(value).map_err(|e| StorageError::Serialize(e.to_string()))?;
    backend.set(key, &json)
}
