//! Bounded, persisted event log.
//!
//! A ring buffer of entries with a fixed capacity. Level counters are
//! maintained incrementally and always equal a full scan of the contents.
//! Every mutation is mirrored to storage; storage failures are reported to
//! the caller but never undo the in-memory change.

use std::collections::VecDeque;

use crate::events::{CounterSet, LogEntry};
use crate::storage::{load_log, save_log, LoadOutcome, SharedStorage, StorageError};

/// Result of pushing one entry.
#[derive(Debug)]
pub struct PushOutcome {
    /// Oldest entries dropped to stay within capacity.
    pub evicted: usize,
    pub persisted: Result<(), StorageError>,
}

pub struct BoundedEventLog {
    entries: VecDeque<LogEntry>,
    capacity: usize,
    counters: CounterSet,
    storage: SharedStorage,
    storage_key: String,
}

impl BoundedEventLog {
    /// Empty log; nothing is read from storage.
    pub fn new(capacity: usize, storage: SharedStorage, storage_key: &str) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
            counters: CounterSet::default(),
            storage,
            storage_key: storage_key.to_string(),
        }
    }

    /// Load the persisted log. Missing or malformed data yields an empty log.
    pub fn restore(capacity: usize, storage: SharedStorage, storage_key: &str) -> (Self, LoadOutcome) {
        let mut log = Self::new(capacity, storage, storage_key);
        let (entries, outcome) = load_log(log.storage.as_ref(), storage_key, log.capacity);
        log.counters = CounterSet::from_entries(&entries);
        log.entries = entries.into();
        (log, outcome)
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn counters(&self) -> CounterSet {
        self.counters
    }

    pub fn iter(&self) -> impl Iterator<Item = &LogEntry> {
        self.entries.iter()
    }

    /// Owned copy of the contents, oldest first.
    pub fn snapshot(&self) -> Vec<LogEntry> {
        self.entries.iter().cloned().collect()
    }

    /// Owned copy of the newest `n` entries, oldest first.
    pub fn recent(&self, n: usize) -> Vec<LogEntry> {
        let skip = self.entries.len().saturating_sub(n);
        self.entries.iter().skip(skip).cloned().collect()
    }

    /// Append at the end, evicting from the front when over capacity, then
    /// persist.
    pub fn push(&mut self, entry: LogEntry) -> PushOutcome {
        self.counters.record(entry.level);
        self.entries.push_back(entry);

        let mut evicted = 0;
        while self.entries.len() > self.capacity {
            if let Some(old) = self.entries.pop_front() {
                self.counters.forget(old.level);
                evicted += 1;
            }
        }

        PushOutcome {
            evicted,
            persisted: self.persist(),
        }
    }

    /// Empty the log and persist the empty state.
    pub fn clear(&mut self) -> Result<(), StorageError> {
        self.entries.clear();
        self.counters = CounterSet::default();
        self.persist()
    }

    pub fn persist(&self) -> Result<(), StorageError> {
        save_log(
            self.storage.as_ref(),
            &self.storage_key,
            &self.entries,
            self.capacity,
        )
    }
}
