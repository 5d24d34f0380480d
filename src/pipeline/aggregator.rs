//! Running signal counters.
//!
//! Session-monotonic totals the log's level counters cannot provide: network
//! requests and failures, failed resource loads, page-load time and
//! connectivity. Failures are counted only by the sources that observe them,
//! never inferred from an entry's kind, so the network error count can only
//! grow alongside a call that was counted in `total_requests`.

use std::collections::VecDeque;

use crate::events::{CounterSet, LogEntry};
use crate::sampling::FrameRateSampler;
use crate::scoring::SignalSnapshot;

#[derive(Debug, Clone, Default)]
pub struct NetworkState {
    pub total_requests: u64,
    pub error_count: u64,
    pub is_offline: bool,
}

#[derive(Debug, Clone)]
pub struct SignalAggregator {
    network: NetworkState,
    resource_errors: u64,
    page_load_time: Option<u64>,
    page_load_captured: bool,
    last_network_errors: VecDeque<LogEntry>,
    last_network_errors_cap: usize,
}

impl SignalAggregator {
    pub fn new(offline: bool, last_network_errors_cap: usize) -> Self {
        Self {
            network: NetworkState {
                is_offline: offline,
                ..NetworkState::default()
            },
            resource_errors: 0,
            page_load_time: None,
            page_load_captured: false,
            last_network_errors: VecDeque::new(),
            last_network_errors_cap,
        }
    }

    pub fn network(&self) -> &NetworkState {
        &self.network
    }

    pub fn resource_errors(&self) -> u64 {
        self.resource_errors
    }

    pub fn page_load_time(&self) -> Option<u64> {
        self.page_load_time
    }

    pub fn is_offline(&self) -> bool {
        self.network.is_offline
    }

    pub fn set_offline(&mut self, offline: bool) {
        self.network.is_offline = offline;
    }

    /// A network call was issued.
    pub fn record_request(&mut self) {
        self.network.total_requests += 1;
    }

    /// Record the page-load time once per session. Returns false when a
    /// value was already captured.
    pub fn record_page_load(&mut self, load_ms: u64) -> bool {
        if self.page_load_captured {
            return false;
        }
        self.page_load_captured = true;
        self.page_load_time = Some(load_ms);
        true
    }

    /// A resource failed to load.
    pub fn record_resource_error(&mut self) {
        self.resource_errors += 1;
    }

    /// An observed call failed; `entry` is the log entry describing it.
    pub fn record_network_error(&mut self, entry: &LogEntry) {
        self.network.error_count += 1;
        self.last_network_errors.push_back(entry.clone());
        while self.last_network_errors.len() > self.last_network_errors_cap {
            self.last_network_errors.pop_front();
        }
    }

    /// Most recent network failures, oldest first.
    pub fn last_network_errors(&self) -> Vec<LogEntry> {
        self.last_network_errors.iter().cloned().collect()
    }

    /// Zero every signal. Connectivity and the once-per-session page-load
    /// capture flag are kept.
    pub fn reset(&mut self) {
        self.network.total_requests = 0;
        self.network.error_count = 0;
        self.resource_errors = 0;
        self.page_load_time = None;
        self.last_network_errors.clear();
    }

    /// Scorer input assembled from the log counters, these signals and the
    /// frame sampler.
    pub fn snapshot(&self, counters: &CounterSet, frames: &FrameRateSampler) -> SignalSnapshot {
        SignalSnapshot {
            total_events: counters.total,
            errors: counters.errors,
            warnings: counters.warnings,
            info: counters.info,
            page_load_time: self.page_load_time,
            fps_average: frames.average(),
            fps_low_frames: frames.low_frame_count(),
            network_total: self.network.total_requests,
            network_errors: self.network.error_count,
            resource_errors: self.resource_errors,
            offline: self.network.is_offline,
        }
    }
}
