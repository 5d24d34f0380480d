//! Page-health anomaly scoring.
//!
//! `evaluate` is a pure function of the current aggregates and thresholds.
//! Categories are checked in a fixed order; each one that crosses its warn
//! or critical threshold contributes a reason, and the overall level is the
//! highest severity seen.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::Thresholds;

/// Ordered page-health severity.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    #[default]
    Normal,
    Warning,
    Critical,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Normal => "normal",
            Severity::Warning => "warning",
            Severity::Critical => "critical",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Aggregates the scorer reads. Also the `stats` block of the anomaly summary.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignalSnapshot {
    pub total_events: u64,
    pub errors: u64,
    pub warnings: u64,
    pub info: u64,
    pub page_load_time: Option<u64>,
    pub fps_average: Option<f64>,
    pub fps_low_frames: u64,
    pub network_total: u64,
    pub network_errors: u64,
    pub resource_errors: u64,
    pub offline: bool,
}

/// Severity plus the reasons that produced it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnomalyVerdict {
    pub level: Severity,
    pub reasons: Vec<String>,
}

impl AnomalyVerdict {
    pub fn is_normal(&self) -> bool {
        self.level == Severity::Normal
    }

    fn raise(&mut self, severity: Severity, reason: String) {
        self.level = self.level.max(severity);
        self.reasons.push(reason);
    }
}

/// Verdict together with the aggregates it was computed from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnomalySummary {
    pub level: Severity,
    pub reasons: Vec<String>,
    pub stats: SignalSnapshot,
}

impl AnomalySummary {
    pub fn new(verdict: &AnomalyVerdict, stats: SignalSnapshot) -> Self {
        Self {
            level: verdict.level,
            reasons: verdict.reasons.clone(),
            stats,
        }
    }
}

fn percent(rate: f64) -> String {
    format!("{:.1}%", rate * 100.0)
}

/// Score the current aggregates.
pub fn evaluate(stats: &SignalSnapshot, thresholds: &Thresholds) -> AnomalyVerdict {
    let mut verdict = AnomalyVerdict::default();

    // [1] Script error rate, once enough events exist.
    let total = stats.total_events;
    if total > 0 && total >= thresholds.min_events_for_analysis {
        let rate = stats.errors as f64 / total as f64;
        if rate >= thresholds.error_rate_critical() {
            verdict.raise(
                Severity::Critical,
                format!("High script error rate: {}", percent(rate)),
            );
        } else if rate >= thresholds.error_rate_high {
            verdict.raise(
                Severity::Warning,
                format!("Elevated script error rate: {}", percent(rate)),
            );
        }
    }

    // [2] Page-load time.
    if let Some(load_ms) = stats.page_load_time {
        if load_ms > thresholds.very_slow_load_ms() {
            verdict.raise(
                Severity::Critical,
                format!("Very slow page load: {} ms", load_ms),
            );
        } else if load_ms > thresholds.slow_load_ms {
            verdict.raise(Severity::Warning, format!("Slow page load: {} ms", load_ms));
        }
    }

    // [3] Network error rate.
    if stats.network_total > 0 {
        let rate = stats.network_errors as f64 / stats.network_total as f64;
        if rate >= thresholds.network_error_rate_crit {
            verdict.raise(
                Severity::Critical,
                format!(
                    "High network error rate: {} ({}/{})",
                    percent(rate),
                    stats.network_errors,
                    stats.network_total
                ),
            );
        } else if rate >= thresholds.network_error_rate_warn {
            verdict.raise(
                Severity::Warning,
                format!(
                    "Elevated network error rate: {} ({}/{})",
                    percent(rate),
                    stats.network_errors,
                    stats.network_total
                ),
            );
        }
    }

    // [4] Failed resource loads (absolute count).
    if stats.resource_errors >= thresholds.resource_error_crit {
        verdict.raise(
            Severity::Critical,
            format!("Many failed resource loads: {} errors", stats.resource_errors),
        );
    } else if stats.resource_errors >= thresholds.resource_error_warn {
        verdict.raise(
            Severity::Warning,
            format!(
                "Notable number of failed resource loads: {} errors",
                stats.resource_errors
            ),
        );
    }

    // [5] Average FPS; lower is worse.
    if let Some(fps) = stats.fps_average {
        if fps <= thresholds.fps_crit {
            verdict.raise(
                Severity::Critical,
                format!("Very low rendering performance: ~{:.1} FPS", fps),
            );
        } else if fps <= thresholds.fps_warn {
            verdict.raise(
                Severity::Warning,
                format!("Low rendering performance: ~{:.1} FPS", fps),
            );
        }
    }

    verdict
}
