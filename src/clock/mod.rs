//! Time capabilities.
//!
//! Wall-clock and monotonic time are injected through the `Clock` trait and
//! animation-frame timestamps through `TickSource`, so the sampler, the
//! monitor and the guard run deterministically under test.

use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Duration, Utc};
use parking_lot::Mutex;

/// Source of monotonic and wall-clock time.
pub trait Clock: Send + Sync {
    /// Monotonic milliseconds since an arbitrary origin.
    fn now_ms(&self) -> f64;

    fn wall_time(&self) -> DateTime<Utc>;

    /// Wall time as milliseconds since the Unix epoch.
    fn epoch_ms(&self) -> i64 {
        self.wall_time().timestamp_millis()
    }
}

/// Real time.
#[derive(Debug, Clone)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now_ms(&self) -> f64 {
        self.origin.elapsed().as_secs_f64() * 1000.0
    }

    fn wall_time(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

#[derive(Debug)]
struct ManualState {
    mono_ms: f64,
    wall: DateTime<Utc>,
}

/// Hand-driven clock; clones share the same time.
#[derive(Debug, Clone)]
pub struct ManualClock {
    state: Arc<Mutex<ManualState>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            state: Arc::new(Mutex::new(ManualState {
                mono_ms: 0.0,
                wall: start,
            })),
        }
    }

    /// Clock starting at the Unix epoch plus `epoch_ms`.
    pub fn at_epoch_ms(epoch_ms: i64) -> Self {
        Self::new(DateTime::from_timestamp_millis(epoch_ms).unwrap_or_else(Utc::now))
    }

    /// Move both monotonic and wall time forward.
    pub fn advance_ms(&self, ms: f64) {
        let mut state = self.state.lock();
        state.mono_ms += ms;
        state.wall += Duration::microseconds((ms * 1000.0) as i64);
    }

    /// Set monotonic time without touching wall time.
    pub fn set_now_ms(&self, ms: f64) {
        self.state.lock().mono_ms = ms;
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> f64 {
        self.state.lock().mono_ms
    }

    fn wall_time(&self) -> DateTime<Utc> {
        self.state.lock().wall
    }
}

/// Shared clock handle.
pub type SharedClock = Arc<dyn Clock>;

/// Supplier of animation-frame timestamps (monotonic ms).
///
/// A hosting page yields forever; `None` ends the sampling loop.
pub trait TickSource {
    fn next_frame(&mut self) -> Option<f64>;
}

impl<I> TickSource for I
where
    I: Iterator<Item = f64>,
{
    fn next_frame(&mut self) -> Option<f64> {
        self.next()
    }
}

/// ISO-8601 with millisecond precision and a `Z` suffix.
pub fn iso_timestamp(time: &DateTime<Utc>) -> String {
    time.to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}
