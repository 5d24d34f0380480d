//! Session-tagged diagnostic lines.
//!
//! Every line starts with `[session=<id>]`, followed by `[source=<name>]`
//! when an observation source (network, frames, export, guard) emitted it,
//! then an upper-case event name and `key=value` pairs.

use std::fmt;

/// Prefix carried by every diagnostic line a `Monitor` or `RequestGuard` writes.
#[derive(Debug, Clone)]
pub struct LogContext {
    pub session_id: String,
    pub source: Option<String>,
}

impl LogContext {
    pub fn new(session_id: &str) -> Self {
        Self {
            session_id: session_id.to_string(),
            source: None,
        }
    }

    /// Same session, tagged with the emitting observation source.
    pub fn with_source(&self, source: &str) -> Self {
        Self {
            session_id: self.session_id.clone(),
            source: Some(source.to_string()),
        }
    }
}

impl fmt::Display for LogContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.source {
            Some(src) => write!(f, "[session={}] [source={}]", self.session_id, src),
            None => write!(f, "[session={}]", self.session_id),
        }
    }
}

/// `EVENT key=value ...` at info, prefixed by the context.
#[macro_export]
macro_rules! log_info {
    ($ctx:expr, $event:expr $(, $key:ident = $value:expr)* $(,)?) => {
        log::info!(
            concat!("{} {}" $(, " ", stringify!($key), "={:?}")*),
            $ctx,
            $event
            $(, $value)*
        );
    };
}

/// Warn-level variant of [`log_info!`]; used for degraded persistence and bans.
#[macro_export]
macro_rules! log_warn {
    ($ctx:expr, $event:expr $(, $key:ident = $value:expr)* $(,)?) => {
        log::warn!(
            concat!("{} {}" $(, " ", stringify!($key), "={:?}")*),
            $ctx,
            $event
            $(, $value)*
        );
    };
}

/// Error-level variant of [`log_info!`].
#[macro_export]
macro_rules! log_error {
    ($ctx:expr, $event:expr $(, $key:ident = $value:expr)* $(,)?) => {
        log::error!(
            concat!("{} {}" $(, " ", stringify!($key), "={:?}")*),
            $ctx,
            $event
            $(, $value)*
        );
    };
}

/// Debug-level variant; rejected page-load samples and routine calls land here.
#[macro_export]
macro_rules! log_debug {
    ($ctx:expr, $event:expr $(, $key:ident = $value:expr)* $(,)?) => {
        log::debug!(
            concat!("{} {}" $(, " ", stringify!($key), "={:?}")*),
            $ctx,
            $event
            $(, $value)*
        );
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_context_display() {
        let ctx = LogContext::new("session-123");
        assert_eq!(format!("{}", ctx), "[session=session-123]");

        let ctx_with_source = ctx.with_source("network");
        assert_eq!(
            format!("{}", ctx_with_source),
            "[session=session-123] [source=network]"
        );
    }

    #[test]
    fn test_macros_accept_key_values() {
        let ctx = LogContext::new("session-macro");
        crate::log_debug!(ctx, "MACRO_CHECK", count = 3, kind = "network");
        crate::log_info!(ctx, "MACRO_CHECK", count = 3);
    }
}
