//! Level-partition counters.

use serde::{Deserialize, Serialize};

use super::entry::{Level, LogEntry};

/// Counts of the current log contents by level.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CounterSet {
    pub total: u64,
    pub errors: u64,
    pub warnings: u64,
    pub info: u64,
}

impl CounterSet {
    /// Rebuild counters from a full scan.
    pub fn from_entries<'a, I>(entries: I) -> Self
    where
        I: IntoIterator<Item = &'a LogEntry>,
    {
        let mut counters = CounterSet::default();
        for entry in entries {
            counters.record(entry.level);
        }
        counters
    }

    pub fn record(&mut self, level: Level) {
        self.total += 1;
        *self.slot(level) += 1;
    }

    /// Undo `record` for an evicted entry.
    pub fn forget(&mut self, level: Level) {
        self.total = self.total.saturating_sub(1);
        let slot = self.slot(level);
        *slot = slot.saturating_sub(1);
    }

    pub fn is_zero(&self) -> bool {
        *self == CounterSet::default()
    }

    fn slot(&mut self, level: Level) -> &mut u64 {
        match level {
            Level::Error => &mut self.errors,
            Level::Warn => &mut self.warnings,
            Level::Info => &mut self.info,
        }
    }
}
