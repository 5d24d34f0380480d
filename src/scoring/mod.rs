//! Scoring module.
//!
//! Rule-based multi-signal scoring:
//! - `anomaly` turns page-health aggregates into a severity verdict
//! - `fingerprint` scores client identity signals
//! - `threat` combines request rate and fingerprint into a threat level

pub mod anomaly;
pub mod fingerprint;
pub mod threat;

pub use anomaly::*;
pub use fingerprint::*;
pub use threat::*;
