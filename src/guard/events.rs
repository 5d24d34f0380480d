//! Guard event log.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::{GuardEventLogConfig, GuardLogMode};
use crate::storage::{save_json, StorageBackend, StorageError};

/// Kinds of guard events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GuardEventKind {
    BanActive,
    BanSet,
    SuspiciousActivity,
}

impl GuardEventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            GuardEventKind::BanActive => "ban_active",
            GuardEventKind::BanSet => "ban_set",
            GuardEventKind::SuspiciousActivity => "suspicious_activity",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GuardEvent {
    #[serde(rename = "type")]
    pub kind: GuardEventKind,
    pub ts: String,
    pub correlation_id: String,
    pub payload: Value,
}

/// Read the locally stored guard events; malformed data reads as empty.
pub fn load_guard_events(backend: &dyn StorageBackend, key: &str) -> Vec<GuardEvent> {
    match backend.get(key) {
        Ok(Some(raw)) => serde_json::from_str(&raw).unwrap_or_default(),
        _ => Vec::new(),
    }
}

/// Write one event according to the configured mode.
pub fn emit_guard_event(
    config: &GuardEventLogConfig,
    backend: &dyn StorageBackend,
    event: &GuardEvent,
) -> Result<(), StorageError> {
    match config.mode {
        GuardLogMode::Silent => Ok(()),
        GuardLogMode::Console => {
            log::warn!(
                "GUARD_EVENT type={} correlation_id={} payload={}",
                event.kind.as_str(),
                event.correlation_id,
                event.payload
            );
            Ok(())
        }
        GuardLogMode::Local => {
            let mut existing = load_guard_events(backend, &config.local_key);
            existing.push(event.clone());
            if existing.len() > config.max_entries {
                let excess = existing.len() - config.max_entries;
                existing.drain(..excess);
            }
            save_json(backend, &config.local_key, &existing)
        }
    }
}
