//! Storage module.
//!
//! Durable key/value persistence behind the `StorageBackend` trait, plus
//! helpers that read and write the persisted log blob and guard state.
//! Persistence is best-effort: callers receive explicit outcomes but the
//! in-memory state stays authoritative.

pub mod backend;
pub mod persisted;

pub use backend::*;
pub use persisted::*;
