//! Identify handler
//!
//! Turns an untrusted body into a validated request, authorizes the key, and
//! renders the engine's verdicts — one result per item, in submission order.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, Method, Uri};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::Value;
use tracing::warn;

use dedup_core::schema;
use dedup_core::types::{IdentifyRequest, IdentifyResponse, IdentifyResult};

use crate::api::error::ApiError;
use crate::api::handlers::{check_size, parse_body, AppState};
use crate::audit::RequestInfo;

/// Identify content items as unique or duplicate
///
/// POST /
pub async fn identify(
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

    let request: IdentifyRequest =
        schema::decode(&schema::IDENTIFY_REQUEST, payload).map_err(|err| {
            warn!(error = %err, "identify request failed validation");
            ApiError::from(err)
        })?;

    if !state.registry.is_authorized(&request.key) {
        warn!(key = %request.key, "identify request with unknown key");
        return Err(ApiError::Forbidden(format!(
            "unknown key `{}`",
            request.key
        )));
    }

    let verdicts = state
        .engine
        .identify(&request.key, &request.content_items)
        .await?;

    let response = IdentifyResponse {
        key: request.key,
        results: verdicts
            .into_iter()
            .map(|verdict| IdentifyResult {
                id: verdict.id,
                result: verdict.result,
            })
            .collect(),
    };

    serde_json::to_value(&response).map_err(|err| ApiError::Internal(err.to_string()))
}
