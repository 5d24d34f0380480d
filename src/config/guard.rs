//! Request guard configuration.

use serde::{Deserialize, Serialize};

use crate::scoring::threat::ThreatLevel;

use super::ConfigError;

/// Value configured per threat level.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PerLevel<T> {
    pub low: T,
    pub medium: T,
    pub high: T,
}

impl<T: Copy> PerLevel<T> {
    pub fn for_level(&self, level: ThreatLevel) -> T {
        match level {
            ThreatLevel::Low => self.low,
            ThreatLevel::Medium => self.medium,
            ThreatLevel::High => self.high,
        }
    }
}

/// Where guard events are written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GuardLogMode {
    Silent,
    Console,
    Local,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GuardEventLogConfig {
    pub mode: GuardLogMode,
    pub local_key: String,
    pub max_entries: usize,
}

impl Default for GuardEventLogConfig {
    fn default() -> Self {
        Self {
            mode: GuardLogMode::Console,
            local_key: "pagepulse_guard_logs".to_string(),
            max_entries: 50,
        }
    }
}

/// Sliding-window throttling configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GuardConfig {
    pub window_ms: u64,
    pub base_max_requests: u32,
    /// Floor for the effective quota after the level penalty.
    pub min_effective_max: u32,
    pub penalty: PerLevel<u32>,
    pub ban_ms: PerLevel<u64>,
    pub storage_key: String,
    pub event_log: GuardEventLogConfig,
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self {
            window_ms: 60 * 1000,
            base_max_requests: 80,
            min_effective_max: 10,
            penalty: PerLevel {
                low: 0,
                medium: 20,
                high: 40,
            },
            ban_ms: PerLevel {
                low: 60 * 1000,
                medium: 3 * 60 * 1000,
                high: 5 * 60 * 1000,
            },
            storage_key: "pagepulse_guard_state_v2".to_string(),
            event_log: GuardEventLogConfig::default(),
        }
    }
}

impl GuardConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: GuardConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.base_max_requests == 0 {
            return Err(ConfigError::Invalid(
                "baseMaxRequests must be positive".to_string(),
            ));
        }
        if self.window_ms == 0 {
            return Err(ConfigError::Invalid("windowMs must be positive".to_string()));
        }
        Ok(())
    }

    /// Quota for the current window at the given threat level.
    pub fn effective_max_requests(&self, level: ThreatLevel) -> u32 {
        self.base_max_requests
            .saturating_sub(self.penalty.for_level(level))
            .max(self.min_effective_max)
    }

    pub fn ban_duration_ms(&self, level: ThreatLevel) -> u64 {
        self.ban_ms.for_level(level)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_effective_max_requests() {
        let config = GuardConfig::default();
        assert_eq!(config.effective_max_requests(ThreatLevel::Low), 80);
        assert_eq!(config.effective_max_requests(ThreatLevel::Medium), 60);
        assert_eq!(config.effective_max_requests(ThreatLevel::High), 40);
    }

    #[test]
    fn test_effective_max_floor() {
        let config = GuardConfig {
            base_max_requests: 30,
            ..GuardConfig::default()
        };
        assert_eq!(config.effective_max_requests(ThreatLevel::Medium), 10);
        assert_eq!(config.effective_max_requests(ThreatLevel::High), 10);
    }

    #[test]
    fn test_guard_config_json() {
        let config = GuardConfig::from_json_str(
            r#"{"baseMaxRequests": 120, "eventLog": {"mode": "local"}}"#,
        )
        .unwrap();
        assert_eq!(config.base_max_requests, 120);
        assert_eq!(config.event_log.mode, GuardLogMode::Local);
        assert_eq!(config.event_log.max_entries, 50);
        assert_eq!(config.ban_duration_ms(ThreatLevel::High), 300_000);

        assert!(GuardConfig::from_json_str(r#"{"baseMaxRequests": 0}"#).is_err());
    }
}
