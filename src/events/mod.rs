//! Event log data model.
//!
//! Structured log entries and the level-partition counters derived from them.

pub mod counters;
pub mod entry;

pub use counters::*;
pub use entry::*;
