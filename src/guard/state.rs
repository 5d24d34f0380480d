//! Persisted guard state.

use serde::{Deserialize, Serialize};

use crate::scoring::threat::ThreatLevel;

/// Window and ban bookkeeping kept across page loads.
///
/// Timestamps are epoch milliseconds. Corrupted persisted data loads as the
/// default (empty) state.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ThreatState {
    pub window_start: Option<i64>,
    pub count: u32,
    pub ban_until: Option<i64>,
    pub last_threat_level: Option<ThreatLevel>,
    pub last_score: u32,
}

impl ThreatState {
    pub fn is_banned(&self, now_ms: i64) -> bool {
        matches!(self.ban_until, Some(until) if now_ms < until)
    }

    /// Start a fresh window when none exists or the current one has expired.
    /// Returns true when the window was reset.
    pub fn roll_window(&mut self, now_ms: i64, window_ms: u64) -> bool {
        let expired = match self.window_start {
            None => true,
            Some(start) => now_ms.saturating_sub(start) > window_ms as i64,
        };
        if expired {
            self.window_start = Some(now_ms);
            self.count = 0;
        }
        expired
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_keys() {
        let state = ThreatState {
            window_start: Some(1_000),
            count: 3,
            ban_until: None,
            last_threat_level: Some(ThreatLevel::Medium),
            last_score: 4,
        };
        let value = serde_json::to_value(&state).unwrap();
        assert_eq!(value["windowStart"], 1_000);
        assert_eq!(value["lastThreatLevel"], "medium");
        assert_eq!(value["banUntil"], serde_json::Value::Null);
        assert_eq!(value["lastScore"], 4);
    }

    #[test]
    fn test_is_banned() {
        let state = ThreatState {
            ban_until: Some(5_000),
            ..ThreatState::default()
        };
        assert!(state.is_banned(4_999));
        assert!(!state.is_banned(5_000));
        assert!(!ThreatState::default().is_banned(0));
    }

    #[test]
    fn test_roll_window() {
        let mut state = ThreatState::default();
        assert!(state.roll_window(1_000, 60_000));
        state.count = 7;

        assert!(!state.roll_window(61_000, 60_000));
        assert_eq!(state.count, 7);

        assert!(state.roll_window(61_001, 60_000));
        assert_eq!(state.count, 0);
        assert_eq!(state.window_start, Some(61_001));
    }
}
