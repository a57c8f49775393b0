//! Register-key handler
//!
//! Mints a new client key on behalf of the super-key holder. Registering an
//! already-known key is not an error; the response says so.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, Method, Uri};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::Value;
use tracing::warn;

use dedup_core::schema;
use dedup_core::types::{KeyRegistrationRequest, KeyRegistrationResponse};

use crate::api::error::ApiError;
use crate::api::handlers::{check_size, parse_body, AppState};
use crate::audit::RequestInfo;

/// Register a new client key
///
/// POST /register
pub async fn register_key(
    State(state): State<Arc<AppState>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let request = RequestInfo::new(method.as_str(), uri.path());

    match process(&state, &headers, &body).await {
        Ok(response) => {
            state.audit_success(&request, &response);
            Json(response).into_response()
        }
        Err(err) => {
            state.audit_error(&request, &err.to_string());
            err.into_response()
        }
    }
}

async fn process(state: &AppState, headers: &HeaderMap, body: &Bytes) -> Result<Value, ApiError> {
    check_size(headers, body)?;
    let payload = parse_body(body)?;

    let request: KeyRegistrationRequest =
        schema::decode(&schema::KEY_REGISTRATION_REQUEST, payload).map_err(|err| {
            warn!(error = %err, "key registration request failed validation");
            ApiError::from(err)
        })?;

    let outcome = state
        .registry
        .register(&request.superkey, &request.newkey)
        .await
        .map_err(|err| {
            warn!(key = %request.newkey, error = %err, "key registration refused");
            ApiError::from(err)
        })?;

    let response = KeyRegistrationResponse {
        key: request.newkey,
        registered: outcome,
    };

    serde_json::to_value(&response).map_err(|err| ApiError::Internal(err.to_string()))
}
