//! Diagnostic output for the monitor and the guard, written through `log`
//! with a session/source prefix on each line.

pub mod structured;

pub use structured::*;
