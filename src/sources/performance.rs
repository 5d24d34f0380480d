//! Page-load capture and the frame-rate loop.

use serde_json::json;

use crate::clock::TickSource;
use crate::events::{details_from, EntryKind, Level};
use crate::pipeline::{AppendOutcome, Monitor};
use crate::{log_debug, log_info};

/// Upper bound (exclusive) for a plausible page-load measurement.
pub const MAX_PAGE_LOAD_MS: f64 = 60_000.0;

impl Monitor {
    /// Capture the initial page-load time. Accepted once per session and
    /// only for `0 < ms < 60000`.
    pub fn record_page_load(&mut self, load_ms: f64) -> Option<AppendOutcome> {
        let rounded = load_ms.round();
        if !(rounded > 0.0 && rounded < MAX_PAGE_LOAD_MS) {
            log_debug!(self.log_context(), "PAGE_LOAD_REJECTED", load_ms = load_ms);
            return None;
        }
        let load_ms = rounded as u64;
        if !self.signals_mut().record_page_load(load_ms) {
            return None;
        }

        Some(self.append(
            EntryKind::Performance,
            Level::Info,
            "Initial page-load measurement.",
            details_from(json!({ "loadTimeMs": load_ms })),
        ))
    }

    /// Enter the sampling state at the clock's current time. Hosts without
    /// a frame-scheduling primitive never call this and FPS stays unknown.
    pub fn start_frame_sampling(&mut self) {
        let now = self.clock().now_ms();
        self.frames_mut().start(now);
    }

    /// Feed one frame timestamp. A closed window appends a `performance`
    /// entry and re-scores.
    pub fn on_frame(&mut self, now_ms: f64) -> Option<AppendOutcome> {
        let summary = self.frames_mut().on_frame(now_ms)?;

        let ctx = self.session().source_context("frames");
        log_info!(
            ctx,
            "FPS_WINDOW_CLOSED",
            average = summary.fps_average,
            low_frames = summary.fps_low_frames,
            samples = summary.sample_count,
        );

        let details = json!({
            "fpsAverage": summary.fps_average,
            "fpsLowFrames": summary.fps_low_frames,
            "windowSeconds": summary.window_seconds,
        });
        Some(self.append(
            EntryKind::Performance,
            Level::Info,
            "Frame-rate window closed.",
            details_from(details),
        ))
    }

    /// Run the sampling loop until the source is exhausted. Returns the
    /// number of windows closed.
    pub fn drive_frames<S>(&mut self, source: &mut S) -> usize
    where
        S: TickSource + ?Sized,
    {
        if !self.frames().is_sampling() {
            self.start_frame_sampling();
        }
        let mut closed = 0;
        while let Some(now) = source.next_frame() {
            if self.on_frame(now).is_some() {
                closed += 1;
            }
        }
        closed
    }
}
