//! Append throughput at capacity and scorer cost.

use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};

use pagepulse_core::clock::ManualClock;
use pagepulse_core::config::{MonitorConfig, Thresholds};
use pagepulse_core::pipeline::{Monitor, PageContext};
use pagepulse_core::scoring::{evaluate, SignalSnapshot};
use pagepulse_core::storage::MemoryStorage;

fn full_monitor() -> Monitor {
    let mut monitor = Monitor::new(
        MonitorConfig::default(),
        PageContext::new("Mozilla/5.0", "https://bench.test/"),
        Arc::new(MemoryStorage::new()),
        Arc::new(ManualClock::at_epoch_ms(0)),
    );
    let capacity = monitor.config().max_log_entries;
    for i in 0..capacity {
        monitor.log_custom("info", &format!("warmup {}", i), None);
    }
    monitor
}

fn bench_append_at_capacity(c: &mut Criterion) {
    c.bench_function("append_at_capacity", |b| {
        b.iter_batched(
            full_monitor,
            |mut monitor| {
                for _ in 0..10 {
                    black_box(monitor.log_custom("warn", "bench", None));
                }
                monitor
            },
            BatchSize::LargeInput,
        )
    });
}

fn bench_evaluate(c: &mut Criterion) {
    let thresholds = Thresholds::default();
    let stats = SignalSnapshot {
        total_events: 800,
        errors: 120,
        warnings: 80,
        info: 600,
        page_load_time: Some(4200),
        fps_average: Some(22.0),
        fps_low_frames: 340,
        network_total: 90,
        network_errors: 30,
        resource_errors: 12,
        offline: false,
    };

    c.bench_function("evaluate", |b| {
        b.iter(|| evaluate(black_box(&stats), black_box(&thresholds)))
    });
}

criterion_group!(benches, bench_append_at_capacity, bench_evaluate);
criterion_main!(benches);
