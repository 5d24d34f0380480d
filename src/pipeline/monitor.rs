//! The monitoring session.
//!
//! `Monitor` owns every piece of session state (log, signal counters, frame
//! sampler, current verdict and session flags). Observation sources call into
//! it; each append updates the counters, persists the log and re-scores.
//!
//! The first non-empty verdict of a session appends one synthetic `anomaly`
//! entry. The flag is set before that entry is appended, so re-scoring after
//! it cannot trigger a second one.

use std::sync::Arc;

use serde::Serialize;
use serde_json::{json, Value};

use crate::clock::{Clock, SharedClock, SystemClock};
use crate::config::MonitorConfig;
use crate::events::{details_from, CounterSet, Details, EntryEnvelope, EntryKind, Level, LogEntry};
use crate::logging::structured::LogContext;
use crate::sampling::FrameRateSampler;
use crate::scoring::{evaluate, AnomalySummary, AnomalyVerdict, Severity, SignalSnapshot};
use crate::storage::{LoadOutcome, SharedStorage, StorageError};
use crate::{log_debug, log_info, log_warn};

use super::aggregator::SignalAggregator;
use super::context::{PageContext, SessionContext};
use super::event_log::BoundedEventLog;

/// Result of appending one entry.
#[derive(Debug)]
pub struct AppendOutcome {
    pub evicted: usize,
    pub persisted: Result<(), StorageError>,
    /// This append produced the session's synthetic anomaly entry.
    pub anomaly_reported: bool,
}

/// Compact state for a status widget.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonitorStatus {
    pub level: Severity,
    pub total_events: u64,
    pub errors: u64,
    pub network_errors: u64,
}

pub struct Monitor {
    config: MonitorConfig,
    session: SessionContext,
    ctx: LogContext,
    clock: SharedClock,
    envelope: EntryEnvelope,
    log: BoundedEventLog,
    signals: SignalAggregator,
    frames: FrameRateSampler,
    verdict: AnomalyVerdict,
    first_anomaly_reported: bool,
    load_outcome: LoadOutcome,
    pub(crate) last_click_ms: Option<f64>,
}

impl Monitor {
    /// Start a session: restore the persisted log, then append the
    /// initialisation entry.
    pub fn new(
        config: MonitorConfig,
        page: PageContext,
        storage: SharedStorage,
        clock: SharedClock,
    ) -> Self {
        let session = SessionContext::new(page, clock.wall_time());
        let ctx = session.log_context();

        let (log, load_outcome) =
            BoundedEventLog::restore(config.max_log_entries, storage, &config.storage_key);
        match &load_outcome {
            LoadOutcome::Loaded(count) => {
                log_info!(ctx, "LOG_RESTORED", entries = count);
            }
            LoadOutcome::Missing => {
                log_debug!(ctx, "LOG_RESTORE_EMPTY");
            }
            LoadOutcome::Corrupt(reason) => {
                log_warn!(ctx, "LOG_RESTORE_CORRUPT", reason = reason);
            }
            LoadOutcome::Unavailable(reason) => {
                log_warn!(ctx, "STORAGE_UNAVAILABLE", reason = reason);
            }
        }

        let envelope = EntryEnvelope {
            app: config.app_name.clone(),
            version: config.app_version.clone(),
            env: config.environment.clone(),
            user_agent: session.page.user_agent.clone(),
            url: session.page.url.clone(),
        };
        let signals = SignalAggregator::new(session.page.offline, config.last_network_errors);
        let frames = FrameRateSampler::new(
            config.thresholds.fps_warn,
            config.thresholds.fps_window_seconds,
        );

        let mut monitor = Self {
            config,
            session,
            ctx,
            clock,
            envelope,
            log,
            signals,
            frames,
            verdict: AnomalyVerdict::default(),
            first_anomaly_reported: false,
            load_outcome,
            last_click_ms: None,
        };

        let details = json!({
            "config": {
                "appName": monitor.config.app_name,
                "env": monitor.config.environment,
            },
            "sessionId": monitor.session.session_id,
        });
        monitor.append(
            EntryKind::System,
            Level::Info,
            "Monitor initialised.",
            details_from(details),
        );

        monitor
    }

    /// Default configuration on the real clock.
    pub fn with_storage(storage: SharedStorage) -> Self {
        Self::new(
            MonitorConfig::default(),
            PageContext::default(),
            storage,
            Arc::new(SystemClock::new()),
        )
    }

    pub fn config(&self) -> &MonitorConfig {
        &self.config
    }

    pub fn session(&self) -> &SessionContext {
        &self.session
    }

    pub fn log_context(&self) -> &LogContext {
        &self.ctx
    }

    pub fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }

    /// How the persisted log was read at start-up.
    pub fn load_outcome(&self) -> &LoadOutcome {
        &self.load_outcome
    }

    /// Build an entry stamped with the current time and connectivity.
    pub fn entry(&self, kind: EntryKind, level: Level, message: &str, details: Details) -> LogEntry {
        LogEntry::new(
            &self.envelope,
            &self.clock.wall_time(),
            kind,
            level,
            message,
            details,
            self.signals.is_offline(),
        )
    }

    /// Build and append an entry.
    pub fn append(
        &mut self,
        kind: EntryKind,
        level: Level,
        message: &str,
        details: Details,
    ) -> AppendOutcome {
        let entry = self.entry(kind, level, message, details);
        self.append_entry(entry)
    }

    /// Append a prepared entry: update counters, evict, persist, re-score.
    pub fn append_entry(&mut self, entry: LogEntry) -> AppendOutcome {
        let (mut evicted, mut persisted) = self.push(entry);
        let anomaly = self.rescore();
        let anomaly_reported = anomaly.is_some();
        if let Some((anomaly_evicted, anomaly_persisted)) = anomaly {
            evicted += anomaly_evicted;
            persisted = persisted.and(anomaly_persisted);
        }
        AppendOutcome {
            evicted,
            persisted,
            anomaly_reported,
        }
    }

    fn push(&mut self, entry: LogEntry) -> (usize, Result<(), StorageError>) {
        log_debug!(
            self.ctx,
            "ENTRY_APPENDED",
            kind = entry.kind.as_str(),
            level = entry.level.as_str(),
            total = self.log.len() + 1,
        );
        let outcome = self.log.push(entry);
        if let Err(e) = &outcome.persisted {
            log_warn!(
                self.ctx,
                "PERSIST_FAILED",
                key = self.config.storage_key,
                error = e.to_string(),
            );
        }
        (outcome.evicted, outcome.persisted)
    }

    /// Recompute the verdict. When this call appends the session's anomaly
    /// entry, returns that push's eviction count and persistence result.
    pub(crate) fn rescore(&mut self) -> Option<(usize, Result<(), StorageError>)> {
        self.verdict = evaluate(&self.stats(), &self.config.thresholds);

        if self.first_anomaly_reported || self.verdict.reasons.is_empty() {
            return None;
        }
        self.first_anomaly_reported = true;

        let summary = self.summary();
        let level = if summary.level == Severity::Critical {
            Level::Error
        } else {
            Level::Warn
        };
        log_warn!(
            self.ctx,
            "ANOMALY_FIRST",
            level = summary.level.as_str(),
            reasons = summary.reasons.len(),
        );

        let details = json!({
            "reasons": summary.reasons,
            "summary": summary,
        });
        let entry = self.entry(
            EntryKind::Anomaly,
            level,
            "Anomaly engine detected irregularities.",
            details_from(details),
        );
        let pushed = self.push(entry);
        self.verdict = evaluate(&self.stats(), &self.config.thresholds);
        Some(pushed)
    }

    /// Empty the log and zero every signal. The verdict returns to normal.
    pub fn clear(&mut self) -> Result<(), StorageError> {
        let result = self.log.clear();
        self.signals.reset();
        self.frames.reset_aggregates();
        self.rescore();

        match &result {
            Ok(()) => {
                log_info!(self.ctx, "LOG_CLEARED");
            }
            Err(e) => {
                log_warn!(self.ctx, "LOG_CLEAR_PERSIST_FAILED", error = e.to_string());
            }
        }
        result
    }

    /// Owned copy of the log, oldest first.
    pub fn snapshot(&self) -> Vec<LogEntry> {
        self.log.snapshot()
    }

    pub fn recent(&self, n: usize) -> Vec<LogEntry> {
        self.log.recent(n)
    }

    pub fn len(&self) -> usize {
        self.log.len()
    }

    pub fn is_empty(&self) -> bool {
        self.log.is_empty()
    }

    pub fn counters(&self) -> CounterSet {
        self.log.counters()
    }

    pub fn verdict(&self) -> &AnomalyVerdict {
        &self.verdict
    }

    pub fn first_anomaly_reported(&self) -> bool {
        self.first_anomaly_reported
    }

    pub fn stats(&self) -> SignalSnapshot {
        self.signals.snapshot(&self.log.counters(), &self.frames)
    }

    pub fn summary(&self) -> AnomalySummary {
        AnomalySummary::new(&self.verdict, self.stats())
    }

    pub fn status(&self) -> MonitorStatus {
        let counters = self.log.counters();
        MonitorStatus {
            level: self.verdict.level,
            total_events: counters.total,
            errors: counters.errors,
            network_errors: self.signals.network().error_count,
        }
    }

    pub fn signals(&self) -> &SignalAggregator {
        &self.signals
    }

    pub(crate) fn signals_mut(&mut self) -> &mut SignalAggregator {
        &mut self.signals
    }

    pub fn frames(&self) -> &FrameRateSampler {
        &self.frames
    }

    pub(crate) fn frames_mut(&mut self) -> &mut FrameRateSampler {
        &mut self.frames
    }

    /// Append an entry on behalf of an external caller. Unknown levels are
    /// recorded as `info`.
    pub fn log_custom(&mut self, level: &str, message: &str, details: Option<Value>) -> AppendOutcome {
        let details = details.map(details_from).unwrap_or_default();
        self.append(EntryKind::Custom, Level::parse_lenient(level), message, details)
    }

    /// Like `log_custom` with any serializable details. A value that cannot
    /// be serialized is dropped with a warning and nothing is appended.
    pub fn log_custom_with<T: Serialize>(
        &mut self,
        level: &str,
        message: &str,
        details: &T,
    ) -> Option<AppendOutcome> {
        match serde_json::to_value(details) {
            Ok(value) => Some(self.log_custom(level, message, Some(value))),
            Err(e) => {
                log_warn!(self.ctx, "CUSTOM_DETAILS_REJECTED", error = e.to_string());
                None
            }
        }
    }
}
