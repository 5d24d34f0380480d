//! Monitor configuration.
//!
//! Every field has a default so a partial JSON document (or `{}`) is a valid
//! configuration.

use serde::{Deserialize, Serialize};

use super::ConfigError;

/// Top-level monitor configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MonitorConfig {
    pub app_name: String,
    pub app_version: String,
    pub environment: String,
    pub storage_key: String,
    pub max_log_entries: usize,
    /// Network failures retained for incident export.
    pub last_network_errors: usize,
    /// Most recent entries included in an incident report.
    pub incident_event_count: usize,
    pub click_throttle_ms: u64,
    pub thresholds: Thresholds,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            app_name: "Page Pulse Monitor".to_string(),
            app_version: "1.0.0".to_string(),
            environment: "production".to_string(),
            storage_key: "PAGEPULSE_LOGS".to_string(),
            max_log_entries: 800,
            last_network_errors: 20,
            incident_event_count: 50,
            click_throttle_ms: 300,
            thresholds: Thresholds::default(),
        }
    }
}

impl MonitorConfig {
    /// Parse and validate a JSON configuration document.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: MonitorConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_log_entries == 0 {
            return Err(ConfigError::Invalid(
                "maxLogEntries must be at least 1".to_string(),
            ));
        }
        if self.storage_key.is_empty() {
            return Err(ConfigError::Invalid("storageKey must not be empty".to_string()));
        }
        self.thresholds.validate()
    }
}

/// Anomaly scoring thresholds.
///
/// Error-rate and load-time critical levels are derived by doubling the
/// warn value; the other categories carry explicit critical values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Thresholds {
    pub error_rate_high: f64,
    pub slow_load_ms: u64,
    pub min_events_for_analysis: u64,
    pub network_error_rate_warn: f64,
    pub network_error_rate_crit: f64,
    pub resource_error_warn: u64,
    pub resource_error_crit: u64,
    pub fps_warn: f64,
    pub fps_crit: f64,
    pub fps_window_seconds: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            error_rate_high: 0.10,
            slow_load_ms: 3000,
            min_events_for_analysis: 20,
            network_error_rate_warn: 0.25,
            network_error_rate_crit: 0.5,
            resource_error_warn: 10,
            resource_error_crit: 30,
            fps_warn: 25.0,
            fps_crit: 15.0,
            fps_window_seconds: 30.0,
        }
    }
}

impl Thresholds {
    pub fn error_rate_critical(&self) -> f64 {
        self.error_rate_high * 2.0
    }

    pub fn very_slow_load_ms(&self) -> u64 {
        self.slow_load_ms.saturating_mul(2)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.error_rate_high > 0.0) {
            return Err(ConfigError::Invalid("errorRateHigh must be positive".to_string()));
        }
        if self.network_error_rate_crit < self.network_error_rate_warn {
            return Err(ConfigError::Invalid(
                "networkErrorRateCrit must not be below networkErrorRateWarn".to_string(),
            ));
        }
        if self.resource_error_crit < self.resource_error_warn {
            return Err(ConfigError::Invalid(
                "resourceErrorCrit must not be below resourceErrorWarn".to_string(),
            ));
        }
        if self.fps_crit > self.fps_warn {
            return Err(ConfigError::Invalid(
                "fpsCrit must not exceed fpsWarn".to_string(),
            ));
        }
        if !(self.fps_window_seconds > 0.0) {
            return Err(ConfigError::Invalid(
                "fpsWindowSeconds must be positive".to_string(),
            ));
        }
        Ok(())
    }
}
