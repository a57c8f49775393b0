//! Wire-level error vocabulary
//!
//! Internal failures collapse onto a small, stable set of statuses and fixed
//! bodies. Validation and authorization detail stays server-side; it is
//! logged and audited, never returned to the client.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

use dedup_core::schema::SchemaError;

use crate::keys::RegistryError;
use crate::storage::StoreError;

/// Fixed client-facing message for malformed or invalid request bodies
pub const E_BAD_REQUEST: &str = "bad request";
/// Fixed client-facing message for unknown keys and super-key mismatches
pub const E_UNAUTHORIZED: &str = "unauthorized key";
/// Fixed client-facing message for oversized request bodies
pub const E_REQUEST_TOO_LARGE: &str = "request body too large";

/// Terminal request failure
#[derive(Debug, Error)]
pub enum ApiError {
    /// Unknown path
    #[error("not found")]
    NotFound,

    /// Known path, non-POST method
    #[error("method not allowed")]
    MethodNotAllowed,

    /// Body over the size ceiling
    #[error("request body exceeds {} bytes", crate::api::MAX_REQUEST_BYTES)]
    PayloadTooLarge,

    /// Malformed JSON or schema violation; the detail is for logs and audit
    #[error("{0}")]
    BadRequest(String),

    /// Unknown key or super-key mismatch; the detail is for logs and audit
    #[error("{0}")]
    Forbidden(String),

    /// Unexpected processing failure, reported to the client as a 400
    #[error("{0}")]
    Internal(String),
}

/// Client-facing error body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        // 404 and 405 carry no body. Nothing maps to 500: unexpected
        // failures surface as a 400 with their string representation.
        match self {
            ApiError::NotFound => StatusCode::NOT_FOUND.into_response(),
            ApiError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED.into_response(),
            ApiError::PayloadTooLarge => {
                error_body(StatusCode::PAYLOAD_TOO_LARGE, E_REQUEST_TOO_LARGE)
            }
            ApiError::BadRequest(_) => error_body(StatusCode::BAD_REQUEST, E_BAD_REQUEST),
            ApiError::Forbidden(_) => error_body(StatusCode::FORBIDDEN, E_UNAUTHORIZED),
            ApiError::Internal(detail) => error_body(StatusCode::BAD_REQUEST, &detail),
        }
    }
}

fn error_body(status: StatusCode, message: &str) -> Response {
    (
        status,
        Json(ErrorResponse {
            error: message.to_string(),
        }),
    )
        .into_response()
}

impl From<SchemaError> for ApiError {
    fn from(err: SchemaError) -> Self {
        ApiError::BadRequest(err.to_string())
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        ApiError::Internal(err.to_string())
    }
}

impl From<RegistryError> for ApiError {
    fn from(err: RegistryError) -> Self {
        match err {
            RegistryError::Forbidden => ApiError::Forbidden("super-key mismatch".into()),
            RegistryError::Store(err) => ApiError::Internal(err.to_string()),
        }
    }
}
