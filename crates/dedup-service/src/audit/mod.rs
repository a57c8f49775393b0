//! Request-outcome audit sinks
//!
//! Every handled request — success or terminal failure, routing fallbacks
//! included — is reported exactly once to the configured sinks before the
//! response goes out. Sinks are observers, not participants: they are never
//! on the decision path, and a failing sink must not fail the request.

use std::fmt;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;

use serde_json::{json, Value};
use tracing::{info, warn};

/// Lightweight description of an inbound request for audit reporting
#[derive(Debug, Clone)]
pub struct RequestInfo {
    pub method: String,
    pub path: String,
}

impl RequestInfo {
    /// Describe a request by method and path
    pub fn new(method: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            path: path.into(),
        }
    }
}

impl fmt::Display for RequestInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method, self.path)
    }
}

/// Receives one success or error notification per handled request
pub trait AuditSink: Send + Sync + fmt::Debug {
    fn success(&self, request: &RequestInfo, response: &Value);
    fn error(&self, request: &RequestInfo, error: &str);
}

/// Reports outcomes as structured tracing events
#[derive(Debug, Default)]
pub struct TracingSink;

impl AuditSink for TracingSink {
    fn success(&self, request: &RequestInfo, response: &Value) {
        info!(request = %request, response = %response, "request handled");
    }

    fn error(&self, request: &RequestInfo, error: &str) {
        warn!(request = %request, error = %error, "request failed");
    }
}

/// Discards every report
#[derive(Debug, Default)]
pub struct NullSink;

impl AuditSink for NullSink {
    fn success(&self, _request: &RequestInfo, _response: &Value) {}

    fn error(&self, _request: &RequestInfo, _error: &str) {}
}

/// Appends one timestamped JSON line per report to a log file
#[derive(Debug)]
pub struct FileSink {
    file: Mutex<File>,
}

impl FileSink {
    /// Open (or create) the audit log for appending
    pub fn open(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            file: Mutex::new(file),
        })
    }

    fn write_entry(&self, entry: Value) {
        let mut file = self.file.lock().unwrap();
        if let Err(err) = writeln!(file, "{entry}") {
            warn!(error = %err, "audit file write failed");
        }
    }
}

impl AuditSink for FileSink {
    fn success(&self, request: &RequestInfo, response: &Value) {
        self.write_entry(json!({
            "time": chrono::Utc::now().to_rfc3339(),
            "outcome": "success",
            "request": request.to_string(),
            "response": response,
        }));
    }

    fn error(&self, request: &RequestInfo, error: &str) {
        self.write_entry(json!({
            "time": chrono::Utc::now().to_rfc3339(),
            "outcome": "error",
            "request": request.to_string(),
            "error": error,
        }));
    }
}
