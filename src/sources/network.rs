//! Network-call observation.
//!
//! `ObservedTransport` decorates any `Transport` and reports each call to a
//! `CallObserver`. `Monitor` is the usual observer: a started call counts
//! toward `totalRequests`, a failed one appends a `network` entry.
//!
//! Hosts with asynchronous transports can drive the observer directly with
//! `call_started` and one of the completion methods. Entries are appended in
//! completion order, not issue order.

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;

use crate::events::{details_from, EntryKind, Level, LogEntry};
use crate::pipeline::Monitor;
use crate::log_debug;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HttpRequest {
    pub method: String,
    pub url: String,
    #[serde(default)]
    pub body: Option<String>,
}

impl HttpRequest {
    pub fn new(method: &str, url: &str) -> Self {
        Self {
            method: method.to_string(),
            url: url.to_string(),
            body: None,
        }
    }

    pub fn get(url: &str) -> Self {
        Self::new("GET", url)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HttpResponse {
    pub status: u16,
    pub status_text: String,
    pub url: String,
    #[serde(default)]
    pub body: String,
}

impl HttpResponse {
    pub fn new(status: u16, status_text: &str, url: &str) -> Self {
        Self {
            status,
            status_text: status_text.to_string(),
            url: url.to_string(),
            body: String::new(),
        }
    }

    /// Status `0` (no response) and `>= 400` are failures.
    pub fn is_failure(&self) -> bool {
        self.status == 0 || self.status >= 400
    }
}

/// The call never produced a response.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum TransportError {
    #[error("network failure: {0}")]
    Network(String),

    #[error("request aborted")]
    Aborted,

    #[error("request timed out after {0} ms")]
    Timeout(u64),
}

/// The underlying network primitive.
pub trait Transport {
    fn send(&mut self, request: &HttpRequest) -> Result<HttpResponse, TransportError>;
}

/// A call that was issued and has not completed yet.
#[derive(Debug, Clone, PartialEq)]
pub struct InFlight {
    pub method: String,
    pub url: String,
    pub started_at_ms: f64,
}

/// Receives call outcomes from an `ObservedTransport`.
pub trait CallObserver {
    fn call_started(&mut self, request: &HttpRequest) -> InFlight;
    fn call_completed(&mut self, call: InFlight, response: &HttpResponse);
    fn call_failed(&mut self, call: InFlight, error: &TransportError);
}

/// Transport decorator reporting every call to an observer.
pub struct ObservedTransport<T, O> {
    inner: T,
    observer: O,
}

impl<T, O> ObservedTransport<T, O>
where
    T: Transport,
    O: CallObserver,
{
    pub fn new(inner: T, observer: O) -> Self {
        Self { inner, observer }
    }

    pub fn observer(&self) -> &O {
        &self.observer
    }

    pub fn into_parts(self) -> (T, O) {
        (self.inner, self.observer)
    }
}

impl<T, O> Transport for ObservedTransport<T, O>
where
    T: Transport,
    O: CallObserver,
{
    fn send(&mut self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        let call = self.observer.call_started(request);
        match self.inner.send(request) {
            Ok(response) => {
                self.observer.call_completed(call, &response);
                Ok(response)
            }
            Err(e) => {
                self.observer.call_failed(call, &e);
                Err(e)
            }
        }
    }
}

impl Monitor {
    fn call_duration_ms(&self, call: &InFlight) -> u64 {
        (self.clock().now_ms() - call.started_at_ms).max(0.0).round() as u64
    }

    fn record_call_failure(&mut self, entry: LogEntry) {
        self.signals_mut().record_network_error(&entry);
        self.append_entry(entry);
    }

    /// Network failures retained for the incident report, oldest first.
    pub fn last_network_errors(&self) -> Vec<LogEntry> {
        self.signals().last_network_errors()
    }
}

impl CallObserver for Monitor {
    fn call_started(&mut self, request: &HttpRequest) -> InFlight {
        self.signals_mut().record_request();
        InFlight {
            method: request.method.clone(),
            url: request.url.clone(),
            started_at_ms: self.clock().now_ms(),
        }
    }

    fn call_completed(&mut self, call: InFlight, response: &HttpResponse) {
        let duration = self.call_duration_ms(&call);
        if !response.is_failure() {
            let ctx = self.session().source_context("network");
            log_debug!(ctx, "CALL_OK", status = response.status, duration_ms = duration);
            // A success lowers the error rate.
            self.rescore();
            return;
        }

        let url = if response.url.is_empty() {
            call.url.clone()
        } else {
            response.url.clone()
        };
        let details = json!({
            "url": url,
            "status": response.status,
            "statusText": response.status_text,
            "method": call.method,
            "durationMs": duration,
        });
        let entry = self.entry(
            EntryKind::Network,
            Level::Warn,
            "HTTP error response.",
            details_from(details),
        );
        self.record_call_failure(entry);
    }

    fn call_failed(&mut self, call: InFlight, error: &TransportError) {
        let duration = self.call_duration_ms(&call);
        let details = json!({
            "message": error.to_string(),
            "url": call.url,
            "method": call.method,
            "durationMs": duration,
        });
        let entry = self.entry(
            EntryKind::Network,
            Level::Error,
            "Network request failed.",
            details_from(details),
        );
        self.record_call_failure(entry);
    }
}

impl<O: CallObserver + ?Sized> CallObserver for &mut O {
    fn call_started(&mut self, request: &HttpRequest) -> InFlight {
        (**self).call_started(request)
    }

    fn call_completed(&mut self, call: InFlight, response: &HttpResponse) {
        (**self).call_completed(call, response)
    }

    fn call_failed(&mut self, call: InFlight, error: &TransportError) {
        (**self).call_failed(call, error)
    }
}

impl<O: CallObserver> CallObserver for Rc<RefCell<O>> {
    fn call_started(&mut self, request: &HttpRequest) -> InFlight {
        self.borrow_mut().call_started(request)
    }

    fn call_completed(&mut self, call: InFlight, response: &HttpResponse) {
        self.borrow_mut().call_completed(call, response)
    }

    fn call_failed(&mut self, call: InFlight, error: &TransportError) {
        self.borrow_mut().call_failed(call, error)
    }
}

impl<O: CallObserver> CallObserver for Arc<Mutex<O>> {
    fn call_started(&mut self, request: &HttpRequest) -> InFlight {
        self.lock().call_started(request)
    }

    fn call_completed(&mut self, call: InFlight, response: &HttpResponse) {
        self.lock().call_completed(call, response)
    }

    fn call_failed(&mut self, call: InFlight, error: &TransportError) {
        self.lock().call_failed(call, error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;

    use crate::clock::ManualClock;
    use crate::config::MonitorConfig;
    use crate::pipeline::PageContext;
    use crate::scoring::Severity;
    use crate::storage::MemoryStorage;

    struct ScriptedTransport {
        clock: ManualClock,
        replies: VecDeque<Result<HttpResponse, TransportError>>,
    }

    impl Transport for ScriptedTransport {
        fn send(&mut self, _request: &HttpRequest) -> Result<HttpResponse, TransportError> {
            self.clock.advance_ms(120.0);
            self.replies
                .pop_front()
                .unwrap_or(Err(TransportError::Aborted))
        }
    }

    fn setup(
        replies: Vec<Result<HttpResponse, TransportError>>,
    ) -> (Monitor, ScriptedTransport) {
        let clock = ManualClock::at_epoch_ms(0);
        let monitor = Monitor::new(
            MonitorConfig::default(),
            PageContext::default(),
            Arc::new(MemoryStorage::new()),
            Arc::new(clock.clone()),
        );
        let transport = ScriptedTransport {
            clock,
            replies: replies.into(),
        };
        (monitor, transport)
    }

    #[test]
    fn test_success_appends_nothing() {
        let (mut monitor, inner) = setup(vec![Ok(HttpResponse::new(200, "OK", "/a"))]);
        let mut transport = ObservedTransport::new(inner, &mut monitor);

        let response = transport.send(&HttpRequest::get("/a")).unwrap();
        assert_eq!(response.status, 200);
        drop(transport);

        assert_eq!(monitor.stats().network_total, 1);
        assert_eq!(monitor.stats().network_errors, 0);
        assert_eq!(monitor.len(), 1);
    }

    #[test]
    fn test_http_error_entry() {
        let (mut monitor, inner) = setup(vec![
            Ok(HttpResponse::new(503, "Service Unavailable", "")),
            Ok(HttpResponse::new(0, "", "/b")),
        ]);
        let mut transport = ObservedTransport::new(inner, &mut monitor);
        transport.send(&HttpRequest::new("POST", "/a")).unwrap();
        transport.send(&HttpRequest::get("/b")).unwrap();
        drop(transport);

        let errors = monitor.last_network_errors();
        assert_eq!(errors.len(), 2);
        assert_eq!(errors[0].level, Level::Warn);
        assert_eq!(errors[0].details["url"], "/a");
        assert_eq!(errors[0].details["status"], 503);
        assert_eq!(errors[0].details["method"], "POST");
        assert_eq!(errors[0].details["durationMs"], 120);
        assert_eq!(errors[1].details["status"], 0);
        assert_eq!(monitor.stats().network_errors, 2);
    }

    #[test]
    fn test_transport_failure_propagates() {
        let (mut monitor, inner) =
            setup(vec![Err(TransportError::Network("connection reset".to_string()))]);
        let mut transport = ObservedTransport::new(inner, &mut monitor);

        let err = transport.send(&HttpRequest::get("/c")).unwrap_err();
        assert_eq!(err, TransportError::Network("connection reset".to_string()));
        drop(transport);

        let entry = monitor.recent(2).remove(0);
        assert_eq!(entry.kind, EntryKind::Network);
        assert_eq!(entry.level, Level::Error);
        assert_eq!(entry.details["message"], "network failure: connection reset");
        // One failed call out of one is a critical network error rate.
        assert_eq!(monitor.verdict().level, Severity::Critical);
    }

    #[test]
    fn test_success_lowers_verdict() {
        let mut replies = vec![Ok(HttpResponse::new(500, "Internal Server Error", "/x"))];
        replies.extend((0..3).map(|_| Ok(HttpResponse::new(200, "OK", "/x"))));
        let (mut monitor, inner) = setup(replies);
        let mut transport = ObservedTransport::new(inner, &mut monitor);
        for _ in 0..4 {
            transport.send(&HttpRequest::get("/x")).unwrap();
        }
        drop(transport);

        // 1 of 4 is exactly the warn ratio.
        assert_eq!(monitor.verdict().level, Severity::Warning);
    }

    #[test]
    fn test_completion_order() {
        let (mut monitor, _) = setup(Vec::new());
        let first = monitor.call_started(&HttpRequest::get("/slow"));
        let second = monitor.call_started(&HttpRequest::get("/fast"));

        monitor.call_failed(second, &TransportError::Timeout(50));
        monitor.call_failed(first, &TransportError::Aborted);

        let urls: Vec<_> = monitor
            .last_network_errors()
            .into_iter()
            .map(|e| e.details["url"].as_str().unwrap_or_default().to_string())
            .collect();
        assert_eq!(urls, vec!["/fast", "/slow"]);
    }

    #[test]
    fn test_shared_observer() {
        let (monitor, inner) = setup(vec![Ok(HttpResponse::new(404, "Not Found", "/d"))]);
        let shared = Rc::new(RefCell::new(monitor));
        let mut transport = ObservedTransport::new(inner, Rc::clone(&shared));
        transport.send(&HttpRequest::get("/d")).unwrap();

        assert_eq!(shared.borrow().stats().network_errors, 1);
    }
}
