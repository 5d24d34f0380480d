//! Script, rejection and resource-load failures.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::truncate_chars;
use crate::events::{details_from, EntryKind, Level};
use crate::pipeline::{AppendOutcome, Monitor};
use crate::log_debug;

/// Longest `outerHTML` excerpt kept on a resource entry.
pub const OUTER_HTML_MAX_CHARS: usize = 300;

/// An uncaught script error.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScriptError {
    pub message: String,
    pub file: String,
    pub line: Option<u32>,
    pub column: Option<u32>,
    pub stack: String,
}

/// An unhandled promise rejection.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Rejection {
    pub message: String,
    pub stack: String,
}

impl Rejection {
    /// Describe an arbitrary rejection reason.
    ///
    /// Strings are used as-is, objects with a string `message` contribute
    /// that message and any `stack`; everything else is rendered as pretty
    /// JSON.
    pub fn from_reason(reason: &Value) -> Self {
        let stack = reason
            .get("stack")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();

        let message = match reason {
            Value::String(s) => s.clone(),
            Value::Object(map) => match map.get("message").and_then(Value::as_str) {
                Some(m) if !m.is_empty() => m.to_string(),
                _ => pretty_or_empty(reason),
            },
            _ => pretty_or_empty(reason),
        };

        Self { message, stack }
    }
}

fn pretty_or_empty(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| "{}".to_string())
}

/// An element whose resource failed to load.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceFailure {
    pub tag: String,
    pub src: String,
    pub outer_html: String,
}

impl Monitor {
    pub fn record_script_error(&mut self, error: &ScriptError) -> AppendOutcome {
        let details = json!({
            "message": error.message,
            "file": error.file,
            "line": error.line,
            "column": error.column,
            "stack": error.stack,
        });
        self.append(
            EntryKind::Error,
            Level::Error,
            "Unhandled script error.",
            details_from(details),
        )
    }

    pub fn record_rejection(&mut self, rejection: &Rejection) -> AppendOutcome {
        let details = json!({
            "message": rejection.message,
            "stack": rejection.stack,
        });
        self.append(
            EntryKind::Error,
            Level::Error,
            "Unhandled promise rejection.",
            details_from(details),
        )
    }

    /// Counts toward the resource-error signal.
    pub fn record_resource_failure(&mut self, failure: &ResourceFailure) -> AppendOutcome {
        let ctx = self.session().source_context("resource");
        log_debug!(ctx, "RESOURCE_FAILED", tag = failure.tag, src = failure.src);
        self.signals_mut().record_resource_error();

        let details = json!({
            "tag": failure.tag,
            "src": failure.src,
            "outerHTML": truncate_chars(&failure.outer_html, OUTER_HTML_MAX_CHARS),
        });
        self.append(
            EntryKind::Resource,
            Level::Warn,
            "Resource failed to load.",
            details_from(details),
        )
    }
}
