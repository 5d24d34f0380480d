//! Windowed frame-rate sampler.
//!
//! `Idle -> Sampling`. Each frame contributes `1000 / dt` when
//! `0 < dt < 1000` ms; larger gaps come from suspended tabs and are skipped.
//! Once a window's wall time has elapsed the collected samples are averaged
//! and the window restarts. The low-frame counter is session-cumulative.

use serde::Serialize;

/// Longest frame delta still counted as a real frame.
pub const MAX_FRAME_DELTA_MS: f64 = 1000.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SamplerState {
    Idle,
    Sampling { window_start: f64, last_frame: f64 },
}

/// Emitted when a sampling window closes.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WindowSummary {
    /// Average of the last non-empty window.
    pub fps_average: Option<f64>,
    pub fps_low_frames: u64,
    pub sample_count: usize,
    pub window_seconds: f64,
}

#[derive(Debug, Clone)]
pub struct FrameRateSampler {
    state: SamplerState,
    samples: Vec<f64>,
    average: Option<f64>,
    low_frame_count: u64,
    warn_fps: f64,
    window_seconds: f64,
}

impl FrameRateSampler {
    pub fn new(warn_fps: f64, window_seconds: f64) -> Self {
        Self {
            state: SamplerState::Idle,
            samples: Vec::new(),
            average: None,
            low_frame_count: 0,
            warn_fps,
            window_seconds,
        }
    }

    pub fn state(&self) -> SamplerState {
        self.state
    }

    pub fn is_sampling(&self) -> bool {
        matches!(self.state, SamplerState::Sampling { .. })
    }

    pub fn average(&self) -> Option<f64> {
        self.average
    }

    pub fn low_frame_count(&self) -> u64 {
        self.low_frame_count
    }

    /// Samples collected in the open window.
    pub fn pending_samples(&self) -> &[f64] {
        &self.samples
    }

    /// Enter `Sampling`. Calling again while sampling is a no-op.
    pub fn start(&mut self, now_ms: f64) {
        if self.is_sampling() {
            return;
        }
        self.state = SamplerState::Sampling {
            window_start: now_ms,
            last_frame: now_ms,
        };
    }

    /// Feed one frame timestamp. Returns a summary when the window closes.
    pub fn on_frame(&mut self, now_ms: f64) -> Option<WindowSummary> {
        let (window_start, last_frame) = match self.state {
            SamplerState::Idle => return None,
            SamplerState::Sampling {
                window_start,
                last_frame,
            } => (window_start, last_frame),
        };

        let dt = now_ms - last_frame;
        self.state = SamplerState::Sampling {
            window_start,
            last_frame: now_ms,
        };

        if !(dt > 0.0 && dt < MAX_FRAME_DELTA_MS) {
            return None;
        }

        let fps = 1000.0 / dt;
        self.samples.push(fps);
        if fps < self.warn_fps {
            self.low_frame_count += 1;
        }

        let elapsed_seconds = (now_ms - window_start) / 1000.0;
        if elapsed_seconds < self.window_seconds {
            return None;
        }

        Some(self.close_window(now_ms))
    }

    fn close_window(&mut self, now_ms: f64) -> WindowSummary {
        let sample_count = self.samples.len();
        if sample_count > 0 {
            let sum: f64 = self.samples.iter().sum();
            self.average = Some(sum / sample_count as f64);
        }
        self.samples.clear();
        self.state = SamplerState::Sampling {
            window_start: now_ms,
            last_frame: now_ms,
        };

        WindowSummary {
            fps_average: self.average,
            fps_low_frames: self.low_frame_count,
            sample_count,
            window_seconds: self.window_seconds,
        }
    }

    /// Drop the average and the open window's samples. The low-frame
    /// counter is session-cumulative and survives. Sampling keeps running.
    pub fn reset_aggregates(&mut self) {
        self.samples.clear();
        self.average = None;
    }
}
