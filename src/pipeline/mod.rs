//! Session pipeline.
//!
//! Wires the bounded event log, the signal aggregator, the frame sampler and
//! the anomaly scorer into one `Monitor` per page session.

pub mod aggregator;
pub mod context;
pub mod event_log;
pub mod monitor;

pub use aggregator::*;
pub use context::*;
pub use event_log::*;
pub use monitor::*;
