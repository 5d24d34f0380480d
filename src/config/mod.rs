//! Configuration module.
//!
//! Serde-backed configuration for the monitor and the request guard:
//! - `MonitorConfig` / `Thresholds` for the event log and anomaly scoring
//! - `GuardConfig` for client-side request throttling

pub mod guard;
pub mod monitor;

pub use guard::*;
pub use monitor::*;

use thiserror::Error;

/// Configuration loading errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}
