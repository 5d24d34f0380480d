//! Artifact delivery.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};

use super::ExportError;
use crate::clock::iso_timestamp;

pub const JSON_MIME: &str = "application/json";

/// A finished export ready for download.
#[derive(Debug, Clone, PartialEq)]
pub struct Artifact {
    pub file_name: String,
    pub mime: String,
    pub content: String,
}

/// The download collaborator.
pub trait ArtifactSink {
    fn deliver(&mut self, artifact: &Artifact) -> Result<(), ExportError>;
}

/// `<base>-<timestamp>.json` with `:` and `.` in the timestamp replaced by `-`.
pub fn artifact_file_name(base: &str, time: &DateTime<Utc>) -> String {
    let stamp = iso_timestamp(time).replace(|c: char| c == ':' || c == '.', "-");
    format!("{}-{}.json", base, stamp)
}

/// Keeps delivered artifacts in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    pub artifacts: Vec<Artifact>,
    /// Refuse every delivery.
    pub reject: bool,
}

impl ArtifactSink for MemorySink {
    fn deliver(&mut self, artifact: &Artifact) -> Result<(), ExportError> {
        if self.reject {
            return Err(ExportError::Sink {
                file_name: artifact.file_name.clone(),
                reason: "sink is rejecting deliveries".to_string(),
            });
        }
        self.artifacts.push(artifact.clone());
        Ok(())
    }
}

/// Writes artifacts as files under a directory.
#[derive(Debug, Clone)]
pub struct DirectorySink {
    root: PathBuf,
}

impl DirectorySink {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    pub fn path_for(&self, artifact: &Artifact) -> PathBuf {
        self.root.join(&artifact.file_name)
    }
}

impl ArtifactSink for DirectorySink {
    fn deliver(&mut self, artifact: &Artifact) -> Result<(), ExportError> {
        let sink_error = |e: std::io::Error| ExportError::Sink {
            file_name: artifact.file_name.clone(),
            reason: e.to_string(),
        };
        fs::create_dir_all(&self.root).map_err(sink_error)?;
        fs::write(self.path_for(artifact), &artifact.content).map_err(sink_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_artifact_file_name() {
        let time = DateTime::from_timestamp_millis(1_700_000_000_123).unwrap();
        assert_eq!(
            artifact_file_name("pagepulse-logs", &time),
            "pagepulse-logs-2023-11-14T22-13-20-123Z.json"
        );
    }

    #[test]
    fn test_directory_sink_writes_file() {
        let root = std::env::temp_dir().join(format!("pagepulse-sink-{}", uuid::Uuid::new_v4()));
        let mut sink = DirectorySink::new(&root);
        let artifact = Artifact {
            file_name: "report.json".to_string(),
            mime: JSON_MIME.to_string(),
            content: "{}".to_string(),
        };

        sink.deliver(&artifact).unwrap();
        assert_eq!(fs::read_to_string(root.join("report.json")).unwrap(), "{}");
        fs::remove_dir_all(&root).ok();
    }
}
