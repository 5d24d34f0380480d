//! Frame-rate sampling.
//!
//! Converts animation-frame timestamps into windowed FPS averages.

pub mod frame_rate;

pub use frame_rate::*;
