//! Export module.
//!
//! Serializes the session for the download collaborator:
//! - `payload`: the full-log export and the incident report shapes
//! - `sink`: where finished artifacts are delivered

pub mod payload;
pub mod sink;

pub use payload::*;
pub use sink::*;

use thiserror::Error;

/// Export failures.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("failed to serialize export: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("artifact sink rejected {file_name}: {reason}")]
    Sink { file_name: String, reason: String },
}
