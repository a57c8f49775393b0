//! Protocol layer: routing, size/method constraints, and error mapping

pub mod error;
pub mod handlers;

pub use handlers::AppState;

use std::sync::Arc;

use axum::extract::State;
use axum::http::{Method, Uri};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::audit::RequestInfo;
use error::ApiError;

/// Identify route
pub const R_IDENTIFY: &str = "/";
/// Key registration route
pub const R_REGISTER_KEY: &str = "/register";
/// Max size of a request body; bigger is refused with 413
pub const MAX_REQUEST_BYTES: usize = 1024;

/// Create the API router
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route(
            R_IDENTIFY,
            post(handlers::identify).fallback(method_not_allowed),
        )
        .route(
            R_REGISTER_KEY,
            post(handlers::register_key).fallback(method_not_allowed),
        )
        .fallback(not_found)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Terminal for known paths hit with a non-POST method; audited like every
/// other outcome
async fn method_not_allowed(
    State(state): State<Arc<AppState>>,
    method: Method,
    uri: Uri,
) -> Response {
    let request = RequestInfo::new(method.as_str(), uri.path());
    let err = ApiError::MethodNotAllowed;
    state.audit_error(&request, &err.to_string());
    err.into_response()
}

/// Terminal for unknown paths
async fn not_found(State(state): State<Arc<AppState>>, method: Method, uri: Uri) -> Response {
    let request = RequestInfo::new(method.as_str(), uri.path());
    let err = ApiError::NotFound;
    state.audit_error(&request, &err.to_string());
    err.into_response()
}
