//! End-to-end scenarios over the public API.

use std::sync::Arc;

use pagepulse_core::clock::{Clock, ManualClock};
use pagepulse_core::config::{GuardConfig, MonitorConfig, Thresholds};
use pagepulse_core::guard::{GuardDecision, RequestGuard};
use pagepulse_core::pipeline::{Monitor, PageContext};
use pagepulse_core::scoring::{evaluate, ClientFingerprint, Severity, SignalSnapshot, ThreatLevel};
use pagepulse_core::sources::{HttpRequest, HttpResponse, ObservedTransport, Transport, TransportError};
use pagepulse_core::storage::MemoryStorage;
use pagepulse_core::{EntryKind, Level};

fn monitor(storage: &MemoryStorage, clock: &ManualClock) -> Monitor {
    Monitor::new(
        MonitorConfig::default(),
        PageContext::new("Mozilla/5.0 (X11; Linux x86_64)", "https://shop.test/"),
        Arc::new(storage.clone()),
        Arc::new(clock.clone()),
    )
}

fn snapshot_with_errors(total: u64, errors: u64) -> SignalSnapshot {
    SignalSnapshot {
        total_events: total,
        errors,
        info: total - errors,
        ..SignalSnapshot::default()
    }
}

#[test]
fn test_error_rate_warning_and_critical() {
    let thresholds = Thresholds::default();

    let warning = evaluate(&snapshot_with_errors(25, 3), &thresholds);
    assert_eq!(warning.level, Severity::Warning);
    assert!(warning.reasons[0].contains("error rate"));

    let critical = evaluate(&snapshot_with_errors(25, 10), &thresholds);
    assert_eq!(critical.level, Severity::Critical);
}

#[test]
fn test_error_rate_through_monitor() {
    let storage = MemoryStorage::new();
    let clock = ManualClock::at_epoch_ms(1_700_000_000_000);
    let mut monitor = monitor(&storage, &clock);

    // init entry + 21 info + 3 errors = 25 events, 12% errors.
    for i in 0..21 {
        monitor.log_custom("info", &format!("step {}", i), None);
    }
    assert!(monitor.verdict().is_normal());
    for _ in 0..3 {
        monitor.log_custom("error", "payment failed", None);
    }

    // The anomaly entry itself is a warning and does not change the rate.
    assert_eq!(monitor.verdict().level, Severity::Warning);
    assert_eq!(monitor.counters().errors, 3);
}

#[test]
fn test_slow_page_load_is_critical() {
    let storage = MemoryStorage::new();
    let clock = ManualClock::at_epoch_ms(0);
    let mut monitor = monitor(&storage, &clock);

    monitor.record_page_load(7000.0);
    assert_eq!(monitor.verdict().level, Severity::Critical);
    assert!(monitor.verdict().reasons[0].contains("7000"));
}

#[test]
fn test_fps_scenarios() {
    let thresholds = Thresholds::default();

    let low = SignalSnapshot {
        fps_average: Some(12.0),
        ..SignalSnapshot::default()
    };
    assert_eq!(evaluate(&low, &thresholds).level, Severity::Critical);

    let degraded = SignalSnapshot {
        fps_average: Some(20.0),
        ..SignalSnapshot::default()
    };
    assert!(evaluate(&degraded, &thresholds).level >= Severity::Warning);
}

#[test]
fn test_clear_returns_to_normal() {
    let storage = MemoryStorage::new();
    let clock = ManualClock::at_epoch_ms(0);
    let mut monitor = monitor(&storage, &clock);

    monitor.record_page_load(9000.0);
    for _ in 0..40 {
        monitor.log_custom("error", "boom", None);
    }
    assert_eq!(monitor.verdict().level, Severity::Critical);

    monitor.clear().unwrap();
    assert_eq!(monitor.verdict().level, Severity::Normal);
    assert!(monitor.verdict().reasons.is_empty());
    let counters = monitor.counters();
    assert_eq!((counters.total, counters.errors, counters.warnings, counters.info), (0, 0, 0, 0));

    // Page load is captured once per session, even across a clear.
    assert!(monitor.record_page_load(9000.0).is_none());
    assert!(monitor.verdict().is_normal());
}

#[test]
fn test_single_anomaly_entry_per_session() {
    let storage = MemoryStorage::new();
    let clock = ManualClock::at_epoch_ms(0);
    let mut monitor = monitor(&storage, &clock);

    monitor.record_page_load(4000.0);
    assert_eq!(monitor.verdict().level, Severity::Warning);
    for _ in 0..40 {
        monitor.log_custom("error", "boom", None);
    }
    assert_eq!(monitor.verdict().level, Severity::Critical);

    let before_clear = monitor
        .snapshot()
        .iter()
        .filter(|e| e.kind == EntryKind::Anomaly)
        .count();
    assert_eq!(before_clear, 1);

    monitor.clear().unwrap();
    monitor.log_custom("error", "after clear", None);

    let anomalies: Vec<_> = storage_entries(&storage)
        .into_iter()
        .filter(|e| e["type"] == "anomaly")
        .collect();
    assert!(anomalies.is_empty(), "cleared log keeps no anomaly entries");
    assert!(monitor.first_anomaly_reported());
    assert!(monitor
        .snapshot()
        .iter()
        .all(|e| e.kind != EntryKind::Anomaly));
}

fn storage_entries(storage: &MemoryStorage) -> Vec<serde_json::Value> {
    let raw = storage.raw("PAGEPULSE_LOGS").unwrap_or_else(|| "[]".to_string());
    serde_json::from_str(&raw).unwrap()
}

#[test]
fn test_log_capacity_and_persistence() {
    let storage = MemoryStorage::new();
    let clock = ManualClock::at_epoch_ms(0);
    let mut config = MonitorConfig::default();
    config.max_log_entries = 10;
    let mut monitor = Monitor::new(
        config.clone(),
        PageContext::default(),
        Arc::new(storage.clone()),
        Arc::new(clock.clone()),
    );

    for i in 0..25 {
        monitor.log_custom("info", &format!("entry {}", i), None);
    }
    assert_eq!(monitor.len(), 10);
    assert_eq!(monitor.snapshot()[0].message, "entry 15");
    assert_eq!(storage_entries(&storage).len(), 10);

    let restored = Monitor::new(config, PageContext::default(), Arc::new(storage.clone()), Arc::new(clock));
    assert_eq!(restored.len(), 10);
    assert_eq!(restored.snapshot()[0].message, "entry 16");
    assert_eq!(restored.counters().info, 10);
}

#[test]
fn test_failed_writes_keep_memory_authoritative() {
    let storage = MemoryStorage::new();
    let clock = ManualClock::at_epoch_ms(0);
    let mut monitor = monitor(&storage, &clock);

    storage.reject_writes(true);
    let outcome = monitor.log_custom("warn", "not persisted", None);
    assert!(outcome.persisted.is_err());
    assert_eq!(monitor.len(), 2);
    assert_eq!(storage_entries(&storage).len(), 1);

    storage.reject_writes(false);
    monitor.log_custom("info", "persisted again", None);
    assert_eq!(storage_entries(&storage).len(), 3);
}

struct FlakyBackend {
    calls: usize,
}

impl Transport for FlakyBackend {
    fn send(&mut self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        self.calls += 1;
        match self.calls % 4 {
            0 => Err(TransportError::Network("reset".to_string())),
            1 => Ok(HttpResponse::new(500, "Internal Server Error", &request.url)),
            _ => Ok(HttpResponse::new(200, "OK", &request.url)),
        }
    }
}

#[test]
fn test_network_errors_drive_verdict() {
    let storage = MemoryStorage::new();
    let clock = ManualClock::at_epoch_ms(0);
    let mut monitor = monitor(&storage, &clock);

    {
        let mut transport = ObservedTransport::new(FlakyBackend { calls: 0 }, &mut monitor);
        for _ in 0..8 {
            let _ = transport.send(&HttpRequest::get("/api/cart"));
        }
    }

    let stats = monitor.stats();
    assert_eq!(stats.network_total, 8);
    assert_eq!(stats.network_errors, 4);
    // 50% is the critical ratio.
    assert_eq!(monitor.verdict().level, Severity::Critical);

    let levels: Vec<Level> = monitor.last_network_errors().iter().map(|e| e.level).collect();
    assert_eq!(levels, vec![Level::Warn, Level::Error, Level::Warn, Level::Error]);
}

fn guard(storage: &MemoryStorage, clock: &ManualClock) -> RequestGuard {
    RequestGuard::with_clock(
        GuardConfig::default(),
        Arc::new(storage.clone()),
        Arc::new(clock.clone()),
    )
}

#[test]
fn test_guard_medium_quota_bans_on_61st_request() {
    let storage = MemoryStorage::new();
    let clock = ManualClock::at_epoch_ms(1_700_000_000_000);
    let guard = guard(&storage, &clock);
    let fingerprint = ClientFingerprint::from_user_agent("curl/8.4.0");

    for i in 1..=60 {
        match guard.check_request(&fingerprint) {
            GuardDecision::Allowed {
                assessment,
                effective_max,
                count,
            } => {
                assert_eq!(assessment.level, ThreatLevel::Medium);
                assert_eq!(effective_max, 60);
                assert_eq!(count, i);
            }
            other => panic!("request {} unexpectedly {:?}", i, other),
        }
        clock.advance_ms(100.0);
    }

    let decision = guard.check_request(&fingerprint);
    let ban_until = match decision {
        GuardDecision::BanSet {
            assessment,
            effective_max,
            ban_until,
        } => {
            assert_eq!(assessment.level, ThreatLevel::Medium);
            assert_eq!(effective_max, 60);
            assert_eq!(ban_until, clock.epoch_ms() + 180_000);
            ban_until
        }
        other => panic!("expected a ban, got {:?}", other),
    };

    clock.advance_ms(60_000.0);
    assert!(matches!(
        guard.check_request(&fingerprint),
        GuardDecision::BanActive { ban_until: b, .. } if b == ban_until
    ));

    clock.advance_ms(120_001.0);
    assert!(!guard.check_request(&fingerprint).is_blocked());
    assert_eq!(guard.state().count, 1);
}

#[test]
fn test_guard_state_survives_new_instance() {
    let storage = MemoryStorage::new();
    let clock = ManualClock::at_epoch_ms(1_700_000_000_000);
    let fingerprint = ClientFingerprint::from_user_agent("curl/8.4.0");

    {
        let first = guard(&storage, &clock);
        for _ in 0..61 {
            first.check_request(&fingerprint);
        }
    }

    let second = guard(&storage, &clock);
    assert!(second.check_request(&fingerprint).is_blocked());
}
