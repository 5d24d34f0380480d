//! Export payload shapes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::sink::{artifact_file_name, Artifact, ArtifactSink, JSON_MIME};
use super::ExportError;
use crate::clock::iso_timestamp;
use crate::events::LogEntry;
use crate::pipeline::Monitor;
use crate::scoring::AnomalySummary;
use crate::{log_info, log_warn};

pub const LOGS_ARTIFACT_BASE: &str = "pagepulse-logs";
pub const INCIDENT_ARTIFACT_BASE: &str = "pagepulse-incident-report";

/// Full-log export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportPayload {
    pub exported_at: String,
    pub app: String,
    pub version: String,
    pub env: String,
    pub anomaly: AnomalySummary,
    pub logs: Vec<LogEntry>,
}

/// Incident report: the verdict, recent network failures and the tail of
/// the log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncidentReport {
    pub generated_at: String,
    pub app: String,
    pub version: String,
    pub env: String,
    pub summary: AnomalySummary,
    pub last_network_errors: Vec<LogEntry>,
    pub last_events: Vec<LogEntry>,
}

impl Monitor {
    pub fn export_payload(&self) -> ExportPayload {
        let config = self.config();
        ExportPayload {
            exported_at: iso_timestamp(&self.clock().wall_time()),
            app: config.app_name.clone(),
            version: config.app_version.clone(),
            env: config.environment.clone(),
            anomaly: self.summary(),
            logs: self.snapshot(),
        }
    }

    pub fn incident_report(&self) -> IncidentReport {
        let config = self.config();
        IncidentReport {
            generated_at: iso_timestamp(&self.clock().wall_time()),
            app: config.app_name.clone(),
            version: config.app_version.clone(),
            env: config.environment.clone(),
            summary: self.summary(),
            last_network_errors: self.last_network_errors(),
            last_events: self.recent(config.incident_event_count),
        }
    }

    /// Deliver the full-log export. Returns the artifact's file name.
    pub fn export_logs(&self, sink: &mut dyn ArtifactSink) -> Result<String, ExportError> {
        let content = serde_json::to_string_pretty(&self.export_payload())?;
        self.deliver(sink, LOGS_ARTIFACT_BASE, content)
    }

    /// Deliver the incident report. Returns the artifact's file name.
    pub fn export_incident(&self, sink: &mut dyn ArtifactSink) -> Result<String, ExportError> {
        let content = serde_json::to_string_pretty(&self.incident_report())?;
        self.deliver(sink, INCIDENT_ARTIFACT_BASE, content)
    }

    fn deliver(
        &self,
        sink: &mut dyn ArtifactSink,
        base: &str,
        content: String,
    ) -> Result<String, ExportError> {
        let now: DateTime<Utc> = self.clock().wall_time();
        let artifact = Artifact {
            file_name: artifact_file_name(base, &now),
            mime: JSON_MIME.to_string(),
            content,
        };

        let ctx = self.session().source_context("export");
        match sink.deliver(&artifact) {
            Ok(()) => {
                log_info!(
                    ctx,
                    "EXPORT_DELIVERED",
                    file = artifact.file_name,
                    bytes = artifact.content.len(),
                );
                Ok(artifact.file_name)
            }
            Err(e) => {
                log_warn!(ctx, "EXPORT_FAILED", file = artifact.file_name, error = e.to_string());
                Err(e)
            }
        }
    }
}
