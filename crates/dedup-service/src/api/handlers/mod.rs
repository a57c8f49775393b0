//! Request handlers for the two service operations

pub mod identify;
pub mod register;

pub use identify::identify;
pub use register::register_key;

use std::sync::Arc;

use axum::body::Bytes;
use axum::http::header::CONTENT_LENGTH;
use axum::http::HeaderMap;
use serde_json::Value;
use tracing::debug;

use crate::api::error::ApiError;
use crate::api::MAX_REQUEST_BYTES;
use crate::audit::{AuditSink, RequestInfo};
use crate::core::DedupEngine;
use crate::keys::KeyRegistry;

/// Application state shared across handlers
pub struct AppState {
    /// Authorized keys and the super-key
    pub registry: KeyRegistry,
    /// Duplicate-detection engine over the fact store
    pub engine: DedupEngine,
    /// Outcome sinks, each notified once per handled request
    pub audit: Vec<Arc<dyn AuditSink>>,
}

impl AppState {
    /// Fan a success report out to every sink
    pub fn audit_success(&self, request: &RequestInfo, response: &Value) {
        for sink in &self.audit {
            sink.success(request, response);
        }
    }

    /// Fan an error report out to every sink
    pub fn audit_error(&self, request: &RequestInfo, error: &str) {
        for sink in &self.audit {
            sink.error(request, error);
        }
    }
}

/// Refuse oversized bodies.
///
/// Content-Length is consulted first so an oversized upload is refused
/// before its bytes are inspected; a body arriving without the header is
/// checked by actual length.
pub(crate) fn check_size(headers: &HeaderMap, body: &Bytes) -> Result<(), ApiError> {
    let declared = headers
        .get(CONTENT_LENGTH)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.parse::<usize>().ok());

    if declared.is_some_and(|len| len > MAX_REQUEST_BYTES) || body.len() > MAX_REQUEST_BYTES {
        return Err(ApiError::PayloadTooLarge);
    }
    Ok(())
}

/// Parse the raw body as JSON; the parse detail stays server-side
pub(crate) fn parse_body(body: &Bytes) -> Result<Value, ApiError> {
    serde_json::from_slice(body).map_err(|err| {
        debug!(error = %err, "request body is not valid JSON");
        ApiError::BadRequest(format!("malformed JSON: {err}"))
    })
}
