//! PagePulse Core - Client-embedded telemetry and anomaly scoring
//!
//! This crate keeps a bounded history of page observations and classifies the
//! page's health from them. The implementation prioritizes:
//!
//! 1. **Bounded memory** - The event log never exceeds its configured capacity
//! 2. **Logging** - Every decision point logged with session context
//! 3. **Determinism** - Scoring is a pure function of the current aggregates
//!
//! ## Architecture
//!
//! The crate is organized into modules:
//! - `pipeline` - The `Monitor` session aggregate, event log and signal counters
//! - `sources` - Observation adapters (errors, clicks, connectivity, network, frames)
//! - `sampling` - Windowed frame-rate sampler
//! - `scoring` - Anomaly verdicts, fingerprint signals and threat levels
//! - `guard` - Client-side request throttling with persisted ban state
//! - `export` - Log export and incident report artifacts
//! - `storage` - Key/value persistence backends
//! - `config` - Monitor and guard configuration
//! - `clock` - Injectable time and frame-tick sources
//! - `logging` - Structured logging with session context

pub mod clock;
pub mod config;
pub mod events;
pub mod export;
pub mod guard;
pub mod logging;
pub mod pipeline;
pub mod sampling;
pub mod scoring;
pub mod sources;
pub mod storage;

pub use config::{GuardConfig, MonitorConfig, Thresholds};
pub use events::{EntryKind, Level, LogEntry};
pub use export::{ArtifactSink, DirectorySink, ExportError, MemorySink};
pub use guard::{GuardDecision, RequestGuard};
pub use pipeline::{AppendOutcome, Monitor, MonitorStatus, PageContext};
pub use scoring::{evaluate, AnomalyVerdict, Severity, SignalSnapshot, ThreatLevel};
pub use storage::{FileStorage, LoadOutcome, MemoryStorage, StorageBackend, StorageError};

/// Initialize the default diagnostic logger.
///
/// Safe to call more than once; only the first call installs the logger.
pub fn init_logger() {
    let _ = env_logger::builder()
        .filter_level(log::LevelFilter::Info)
        .format_timestamp_millis()
        .try_init();
}
