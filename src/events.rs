//! Diagnostic events emitted by the analyzer and the resource downloader.
//!
//! Library code never prints. It hands a [`ProbeEvent`] to an [`EventSink`];
//! the binary installs [`LogSink`], which forwards events to the `log` facade
//! with a severity and key-value fields.

use serde::Serialize;
use std::path::PathBuf;
use std::sync::Mutex;

/// Every event the probe emits
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum ProbeEvent {
    /// A page is about to be fetched
    AnalysisStarted { url: String },
    /// A page could not be fetched; the analysis yields no result
    FetchFailed { url: String, error: String },
    /// A page was fetched and both extractions ran
    PageAnalyzed {
        url: String,
        json_findings: usize,
        endpoints: usize,
    },
    /// The login form was submitted and the session left the login page
    LoginSucceeded { login_url: String, cookies: usize },
    /// A resource was written to disk
    ResourceSaved {
        url: String,
        path: PathBuf,
        bytes: usize,
    },
    /// A resource could not be downloaded or written
    DownloadFailed { url: String, error: String },
}

impl ProbeEvent {
    /// Severity the event is logged at
    pub fn level(&self) -> log::Level {
        match self {
            ProbeEvent::FetchFailed { .. } => log::Level::Error,
            ProbeEvent::DownloadFailed { .. } => log::Level::Warn,
            ProbeEvent::AnalysisStarted { .. }
            | ProbeEvent::PageAnalyzed { .. }
            | ProbeEvent::LoginSucceeded { .. } => log::Level::Info,
            ProbeEvent::ResourceSaved { .. } => log::Level::Debug,
        }
    }
}

/// Receives diagnostic events
pub trait EventSink: Send + Sync {
    fn emit(&self, event: ProbeEvent);
}

/// Forwards events to the `log` facade
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSink;

impl EventSink for LogSink {
    fn emit(&self, event: ProbeEvent) {
        let level = event.level();
        match &event {
            ProbeEvent::AnalysisStarted { url } => {
                ::log::log!(level, url = url.as_str(); "Analyzing {}", url);
            }
            ProbeEvent::FetchFailed { url, error } => {
                ::log::log!(level, url = url.as_str(), error = error.as_str(); "Error fetching {}: {}", url, error);
            }
            ProbeEvent::PageAnalyzed {
                url,
                json_findings,
                endpoints,
            } => {
                ::log::log!(
                    level,
                    url = url.as_str(), json_findings = *json_findings, endpoints = *endpoints;
                    "Analyzed {}: {} JSON values, {} endpoints",
                    url,
                    json_findings,
                    endpoints
                );
            }
            ProbeEvent::LoginSucceeded { login_url, cookies } => {
                ::log::log!(level, login_url = login_url.as_str(), cookies = *cookies; "Login successful at {} ({} cookies)", login_url, cookies);
            }
            ProbeEvent::ResourceSaved { url, path, bytes } => {
                ::log::log!(level, url = url.as_str(), bytes = *bytes; "Saved {} -> {}", url, path.display());
            }
            ProbeEvent::DownloadFailed { url, error } => {
                ::log::log!(level, url = url.as_str(), error = error.as_str(); "Failed to save {}: {}", url, error);
            }
        }
    }
}

/// Keeps every event in memory, for tests and for callers that want to inspect a run
#[derive(Debug, Default)]
pub struct RecordingSink {
    events: Mutex<Vec<ProbeEvent>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// A copy of the events seen so far
    pub fn events(&self) -> Vec<ProbeEvent> {
        self.events.lock().map(|e| e.clone()).unwrap_or_default()
    }

    /// Number of recorded events matching `predicate`
    pub fn count(&self, predicate: impl Fn(&ProbeEvent) -> bool) -> usize {
        self.events().into_iter().filter(|e| predicate(e)).count()
    }
}

impl EventSink for RecordingSink {
    fn emit(&self, event: ProbeEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event);
        }
    }
}
