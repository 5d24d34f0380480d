//! Log entries.
//!
//! An entry is created by an observation source, appended exactly once and
//! never mutated afterwards.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::clock::iso_timestamp;

/// Open key/value mapping carried by an entry.
pub type Details = Map<String, Value>;

/// Category of an observation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    Error,
    Performance,
    Resource,
    Network,
    Event,
    System,
    Anomaly,
    Custom,
}

impl EntryKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntryKind::Error => "error",
            EntryKind::Performance => "performance",
            EntryKind::Resource => "resource",
            EntryKind::Network => "network",
            EntryKind::Event => "event",
            EntryKind::System => "system",
            EntryKind::Anomaly => "anomaly",
            EntryKind::Custom => "custom",
        }
    }
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Entry severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Error,
    Warn,
    Info,
}

impl Level {
    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Error => "error",
            Level::Warn => "warn",
            Level::Info => "info",
        }
    }

    /// Lenient parse for externally supplied levels; unknown values are `Info`.
    pub fn parse_lenient(level: &str) -> Self {
        level.parse().unwrap_or(Level::Info)
    }
}

impl FromStr for Level {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "error" => Ok(Level::Error),
            "warn" | "warning" => Ok(Level::Warn),
            "info" => Ok(Level::Info),
            other => Err(format!("unknown level: {}", other)),
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-session fields stamped on every entry.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EntryEnvelope {
    pub app: String,
    pub version: String,
    pub env: String,
    pub user_agent: String,
    pub url: String,
}

/// A single structured log entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEntry {
    pub timestamp: String,
    #[serde(default)]
    pub app: String,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub env: String,
    #[serde(rename = "type")]
    pub kind: EntryKind,
    pub level: Level,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub details: Details,
    #[serde(default)]
    pub user_agent: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub offline: bool,
}

impl LogEntry {
    pub fn new(
        envelope: &EntryEnvelope,
        time: &DateTime<Utc>,
        kind: EntryKind,
        level: Level,
        message: &str,
        details: Details,
        offline: bool,
    ) -> Self {
        Self {
            timestamp: iso_timestamp(time),
            app: envelope.app.clone(),
            version: envelope.version.clone(),
            env: envelope.env.clone(),
            kind,
            level,
            message: message.to_string(),
            details,
            user_agent: envelope.user_agent.clone(),
            url: envelope.url.clone(),
            offline,
        }
    }

    pub fn detail(&self, key: &str) -> Option<&Value> {
        self.details.get(key)
    }
}

/// Build a `Details` map from a JSON object literal; non-objects yield an
/// empty map.
pub fn details_from(value: Value) -> Details {
    match value {
        Value::Object(map) => map,
        _ => Details::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn envelope() -> EntryEnvelope {
        EntryEnvelope {
            app: "app".to_string(),
            version: "1.0.0".to_string(),
            env: "test".to_string(),
            user_agent: "Mozilla/5.0".to_string(),
            url: "https://example.test/".to_string(),
        }
    }

    #[test]
    fn test_entry_json_shape() {
        let time = DateTime::from_timestamp_millis(0).unwrap();
        let entry = LogEntry::new(
            &envelope(),
            &time,
            EntryKind::Network,
            Level::Warn,
            "HTTP error",
            details_from(json!({"status": 503})),
            true,
        );

        let value = serde_json::to_value(&entry).unwrap();
        assert_eq!(value["type"], "network");
        assert_eq!(value["level"], "warn");
        assert_eq!(value["userAgent"], "Mozilla/5.0");
        assert_eq!(value["offline"], true);
        assert_eq!(value["details"]["status"], 503);
        assert_eq!(value["timestamp"], "1970-01-01T00:00:00.000Z");
    }

    #[test]
    fn test_entry_parses_minimal_json() {
        let entry: LogEntry = serde_json::from_str(
            r#"{"timestamp":"2026-01-01T00:00:00.000Z","type":"custom","level":"info"}"#,
        )
        .unwrap();
        assert_eq!(entry.kind, EntryKind::Custom);
        assert!(entry.details.is_empty());
        assert!(!entry.offline);
    }

    #[test]
    fn test_level_parse() {
        assert_eq!("WARNING".parse::<Level>(), Ok(Level::Warn));
        assert_eq!(Level::parse_lenient("error"), Level::Error);
        assert_eq!(Level::parse_lenient("verbose"), Level::Info);
    }

    #[test]
    fn test_details_from_non_object() {
        assert!(details_from(json!([1, 2])).is_empty());
    }
}
