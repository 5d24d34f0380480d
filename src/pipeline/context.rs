//! Session context.
//!
//! Identifies one page session for diagnostic logging and carries the page
//! facts stamped on every entry.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::logging::structured::LogContext;

/// Facts about the hosting page supplied at start-up.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageContext {
    pub user_agent: String,
    pub url: String,
    /// Connectivity at start-up.
    #[serde(default)]
    pub offline: bool,
}

impl PageContext {
    pub fn new(user_agent: &str, url: &str) -> Self {
        Self {
            user_agent: user_agent.to_string(),
            url: url.to_string(),
            offline: false,
        }
    }
}

/// Context for one monitoring session.
#[derive(Debug, Clone)]
pub struct SessionContext {
    pub session_id: String,
    pub started_at: DateTime<Utc>,
    pub page: PageContext,
}

impl SessionContext {
    pub fn new(page: PageContext, started_at: DateTime<Utc>) -> Self {
        let session_id = format!("session-{}", &Uuid::new_v4().to_string()[..8]);

        Self {
            session_id,
            started_at,
            page,
        }
    }

    pub fn log_context(&self) -> LogContext {
        LogContext::new(&self.session_id)
    }

    /// Log context for a named observation source.
    pub fn source_context(&self, source: &str) -> LogContext {
        self.log_context().with_source(source)
    }
}
