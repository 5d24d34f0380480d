//! Click activity and connectivity transitions.

use serde::{Deserialize, Serialize};
use serde_json::json;

use super::truncate_chars;
use crate::events::{details_from, Details, EntryKind, Level};
use crate::pipeline::{AppendOutcome, Monitor};
use crate::log_info;

/// Longest text snippet kept from a clicked element.
pub const CLICK_TEXT_MAX_CHARS: usize = 50;

/// The element a click landed on.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Click {
    pub tag: String,
    pub id: String,
    pub classes: String,
    pub text: String,
}

impl Monitor {
    /// Record a click, at most one per `clickThrottleMs`. Returns `None` for
    /// throttled clicks.
    pub fn record_click(&mut self, click: &Click) -> Option<AppendOutcome> {
        let now = self.clock().now_ms();
        let throttle = self.config().click_throttle_ms as f64;
        if let Some(last) = self.last_click_ms {
            if now - last < throttle {
                return None;
            }
        }
        self.last_click_ms = Some(now);

        let details = json!({
            "element": {
                "tag": click.tag,
                "id": click.id,
                "classes": click.classes,
                "textSnippet": truncate_chars(&click.text, CLICK_TEXT_MAX_CHARS),
            }
        });
        Some(self.append(
            EntryKind::Event,
            Level::Info,
            "User click.",
            details_from(details),
        ))
    }

    /// Connectivity changed. The new state is applied before the entry is
    /// built, so the entry's `offline` flag already reflects it.
    pub fn set_offline(&mut self, offline: bool) -> AppendOutcome {
        self.signals_mut().set_offline(offline);
        let ctx = self.session().source_context("connectivity");
        log_info!(ctx, "CONNECTIVITY_CHANGED", offline = offline);

        if offline {
            self.append(
                EntryKind::System,
                Level::Warn,
                "Browser went offline.",
                Details::new(),
            )
        } else {
            self.append(
                EntryKind::System,
                Level::Info,
                "Browser back online.",
                Details::new(),
            )
        }
    }

    pub fn is_offline(&self) -> bool {
        self.signals().is_offline()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::clock::ManualClock;
    use crate::config::MonitorConfig;
    use crate::pipeline::PageContext;
    use crate::storage::MemoryStorage;

    fn monitor(clock: &ManualClock) -> Monitor {
        Monitor::new(
            MonitorConfig::default(),
            PageContext::default(),
            Arc::new(MemoryStorage::new()),
            Arc::new(clock.clone()),
        )
    }

    fn click(text: &str) -> Click {
        Click {
            tag: "BUTTON".to_string(),
            id: "buy".to_string(),
            classes: "btn primary".to_string(),
            text: text.to_string(),
        }
    }

    #[test]
    fn test_click_throttle() {
        let clock = ManualClock::at_epoch_ms(0);
        let mut monitor = monitor(&clock);

        assert!(monitor.record_click(&click("Buy")).is_some());
        clock.advance_ms(100.0);
        assert!(monitor.record_click(&click("Buy")).is_none());
        clock.advance_ms(200.0);
        assert!(monitor.record_click(&click("Buy")).is_some());

        let clicks = monitor
            .snapshot()
            .into_iter()
            .filter(|e| e.kind == EntryKind::Event)
            .count();
        assert_eq!(clicks, 2);
    }

    #[test]
    fn test_click_text_truncated() {
        let clock = ManualClock::at_epoch_ms(0);
        let mut monitor = monitor(&clock);
        monitor.record_click(&click(&"a".repeat(80)));

        let entry = monitor.recent(1).remove(0);
        let snippet = entry.details["element"]["textSnippet"].as_str().unwrap();
        assert_eq!(snippet.len(), CLICK_TEXT_MAX_CHARS);
    }

    #[test]
    fn test_connectivity_entries() {
        let clock = ManualClock::at_epoch_ms(0);
        let mut monitor = monitor(&clock);

        monitor.set_offline(true);
        let offline = monitor.recent(1).remove(0);
        assert_eq!(offline.level, Level::Warn);
        assert!(offline.offline);
        assert!(monitor.is_offline());
        assert!(monitor.stats().offline);

        monitor.set_offline(false);
        let online = monitor.recent(1).remove(0);
        assert_eq!(online.level, Level::Info);
        assert!(!online.offline);
    }
}
