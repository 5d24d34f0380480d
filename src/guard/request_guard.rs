//! Per-page-load request check.
//!
//! Decision order:
//! 1. An active ban short-circuits everything (no counting, no scoring).
//! 2. The window rolls over when it has expired, then the request is counted.
//! 3. The request is scored; exceeding the level's effective quota sets a ban.

use std::sync::Arc;

use serde_json::json;
use uuid::Uuid;

use crate::clock::{iso_timestamp, Clock, SharedClock, SystemClock};
use crate::config::GuardConfig;
use crate::logging::structured::LogContext;
use crate::scoring::fingerprint::ClientFingerprint;
use crate::scoring::threat::{assess_threat, ThreatAssessment, ThreatLevel};
use crate::storage::{load_json, save_json, LoadOutcome, SharedStorage};
use crate::{log_debug, log_info, log_warn};

use super::events::{emit_guard_event, GuardEvent, GuardEventKind};
use super::state::ThreatState;

/// Outcome of checking one page load.
#[derive(Debug, Clone, PartialEq)]
pub enum GuardDecision {
    /// A previous ban is still running; nothing was evaluated.
    BanActive {
        ban_until: i64,
        last_level: Option<ThreatLevel>,
    },
    /// This request exceeded the effective quota and started a ban.
    BanSet {
        assessment: ThreatAssessment,
        effective_max: u32,
        ban_until: i64,
    },
    Allowed {
        assessment: ThreatAssessment,
        effective_max: u32,
        count: u32,
    },
}

impl GuardDecision {
    pub fn is_blocked(&self) -> bool {
        !matches!(self, GuardDecision::Allowed { .. })
    }
}

pub struct RequestGuard {
    config: GuardConfig,
    storage: SharedStorage,
    clock: SharedClock,
    correlation_id: String,
    ctx: LogContext,
}

impl RequestGuard {
    pub fn new(config: GuardConfig, storage: SharedStorage) -> Self {
        Self::with_clock(config, storage, Arc::new(SystemClock::new()))
    }

    pub fn with_clock(config: GuardConfig, storage: SharedStorage, clock: SharedClock) -> Self {
        let correlation_id = format!(
            "{}-{:x}",
            &Uuid::new_v4().simple().to_string()[..8],
            clock.epoch_ms().max(0)
        );
        let ctx = LogContext::new(&correlation_id).with_source("guard");
        Self {
            config,
            storage,
            clock,
            correlation_id,
            ctx,
        }
    }

    pub fn correlation_id(&self) -> &str {
        &self.correlation_id
    }

    pub fn config(&self) -> &GuardConfig {
        &self.config
    }

    /// Current persisted state (empty when missing or corrupt).
    pub fn state(&self) -> ThreatState {
        let (state, outcome) = load_json::<ThreatState>(self.storage.as_ref(), &self.config.storage_key);
        if let LoadOutcome::Corrupt(reason) = &outcome {
            log_warn!(self.ctx, "GUARD_STATE_CORRUPT", reason = reason);
        }
        state
    }

    /// Count and score one page load for this client.
    pub fn check_request(&self, fingerprint: &ClientFingerprint) -> GuardDecision {
        let now = self.clock.epoch_ms();
        let mut state = self.state();

        if let Some(ban_until) = state.ban_until.filter(|_| state.is_banned(now)) {
            log_info!(self.ctx, "GUARD_BAN_ACTIVE", ban_until = ban_until, count = state.count);
            self.emit(
                GuardEventKind::BanActive,
                json!({
                    "ua": fingerprint.user_agent,
                    "threatLevel": state.last_threat_level.map(|l| l.as_str()).unwrap_or("unknown"),
                    "score": state.last_score,
                    "count": state.count,
                    "windowStart": state.window_start,
                    "banUntil": ban_until,
                }),
            );
            return GuardDecision::BanActive {
                ban_until,
                last_level: state.last_threat_level,
            };
        }

        if state.roll_window(now, self.config.window_ms) {
            log_debug!(self.ctx, "GUARD_WINDOW_START", window_start = now);
        }
        state.count = state.count.saturating_add(1);

        let assessment = assess_threat(state.count, self.config.base_max_requests, fingerprint);
        let effective_max = self.config.effective_max_requests(assessment.level);
        state.last_threat_level = Some(assessment.level);
        state.last_score = assessment.score;

        if state.count > effective_max {
            let ban_until = now + self.config.ban_duration_ms(assessment.level) as i64;
            state.ban_until = Some(ban_until);
            self.save(&state);

            log_warn!(
                self.ctx,
                "GUARD_BAN_SET",
                level = assessment.level.as_str(),
                score = assessment.score,
                count = state.count,
                effective_max = effective_max,
                ban_until = ban_until,
            );
            self.emit(
                GuardEventKind::BanSet,
                json!({
                    "ua": fingerprint.user_agent,
                    "threatLevel": assessment.level,
                    "score": assessment.score,
                    "uaMatches": assessment.ua_matches,
                    "headlessSignals": assessment.headless_signals,
                    "count": state.count,
                    "windowStart": state.window_start,
                    "banUntil": ban_until,
                    "effectiveMax": effective_max,
                }),
            );
            return GuardDecision::BanSet {
                assessment,
                effective_max,
                ban_until,
            };
        }

        self.save(&state);

        if assessment.level != ThreatLevel::Low {
            self.emit(
                GuardEventKind::SuspiciousActivity,
                json!({
                    "ua": fingerprint.user_agent,
                    "threatLevel": assessment.level,
                    "score": assessment.score,
                    "uaMatches": assessment.ua_matches,
                    "headlessSignals": assessment.headless_signals,
                    "count": state.count,
                    "windowStart": state.window_start,
                    "effectiveMax": effective_max,
                }),
            );
        }

        GuardDecision::Allowed {
            assessment,
            effective_max,
            count: state.count,
        }
    }

    fn save(&self, state: &ThreatState) {
        if let Err(e) = save_json(self.storage.as_ref(), &self.config.storage_key, state) {
            log_warn!(self.ctx, "GUARD_STATE_SAVE_FAILED", error = e.to_string());
        }
    }

    fn emit(&self, kind: GuardEventKind, payload: serde_json::Value) {
        let event = GuardEvent {
            kind,
            ts: iso_timestamp(&self.clock.wall_time()),
            correlation_id: self.correlation_id.clone(),
            payload,
        };
        if let Err(e) = emit_guard_event(&self.config.event_log, self.storage.as_ref(), &event) {
            log_debug!(self.ctx, "GUARD_EVENT_DROPPED", kind = kind.as_str(), error = e.to_string());
        }
    }
}
