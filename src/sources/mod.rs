//! Observation sources.
//!
//! Typed adapters that turn host-page observations into log entries on a
//! `Monitor`:
//! - `errors`: script errors, unhandled rejections, failed resource loads
//! - `interaction`: click activity and connectivity transitions
//! - `performance`: page-load capture and the frame-rate loop
//! - `network`: the transport decorator that reports call outcomes

pub mod errors;
pub mod interaction;
pub mod network;
pub mod performance;

pub use errors::*;
pub use interaction::*;
pub use network::*;
pub use performance::*;

/// Keep at most `max` characters.
pub(crate) fn truncate_chars(value: &str, max: usize) -> String {
    value.chars().take(max).collect()
}
