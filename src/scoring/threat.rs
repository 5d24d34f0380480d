//! Request-throttling threat scoring.
//!
//! Total score = user-agent points (0-3) + headless points + rate points
//! (0-3), bucketed into `low` (<3), `medium` (3-4) and `high` (>=5).

use std::fmt;

use serde::{Deserialize, Serialize};

use super::fingerprint::{
    detect_headless, match_suspicious_user_agent, user_agent_score, ClientFingerprint,
};

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum ThreatLevel {
    #[default]
    Low,
    Medium,
    High,
}

impl ThreatLevel {
    pub fn from_score(score: u32) -> Self {
        match score {
            s if s >= 5 => ThreatLevel::High,
            s if s >= 3 => ThreatLevel::Medium,
            _ => ThreatLevel::Low,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ThreatLevel::Low => "low",
            ThreatLevel::Medium => "medium",
            ThreatLevel::High => "high",
        }
    }
}

impl fmt::Display for ThreatLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of scoring one request.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ThreatAssessment {
    pub level: ThreatLevel,
    pub score: u32,
    pub rate_score: u32,
    pub ua_score: u32,
    pub ua_matches: Vec<String>,
    pub headless_signals: Vec<String>,
}

/// Rate points from the count/baseline ratio.
pub fn rate_score(count: u32, base_max: u32) -> u32 {
    if base_max == 0 {
        return 0;
    }
    let ratio = count as f64 / base_max as f64;
    if ratio >= 1.0 {
        3
    } else if ratio >= 0.8 {
        2
    } else if ratio >= 0.5 {
        1
    } else {
        0
    }
}

/// Score a request count in the current window against the client's
/// fingerprint. Pure; never fails.
pub fn assess_threat(
    count: u32,
    base_max: u32,
    fingerprint: &ClientFingerprint,
) -> ThreatAssessment {
    let ua_matches = match_suspicious_user_agent(&fingerprint.user_agent);
    let ua_score = user_agent_score(&ua_matches);
    let headless = detect_headless(fingerprint);
    let rate_score = rate_score(count, base_max);

    let score = ua_score + headless.score + rate_score;

    ThreatAssessment {
        level: ThreatLevel::from_score(score),
        score,
        rate_score,
        ua_score,
        ua_matches,
        headless_signals: headless.signals,
    }
}
