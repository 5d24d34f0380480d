//! Client-side request guard.
//!
//! Advisory throttling: a per-client request counter over a sliding window,
//! scored with the fingerprint signals, persisted between page loads. Clearing
//! client storage resets it, so it is not a security boundary.

pub mod events;
pub mod request_guard;
pub mod state;

pub use events::*;
pub use request_guard::*;
pub use state::*;
