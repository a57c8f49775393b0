//! Integration tests for the dedup service wire protocol
//!
//! These tests drive the real router end to end:
//! - Duplicate identification (idempotence, order-independence, the
//!   conjunctive multi-collection rule)
//! - Key registration and key isolation
//! - The full wire error table (404/405/413/400/403) with its fixed bodies

use std::collections::HashSet;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use dedup_service::api::error::{E_BAD_REQUEST, E_REQUEST_TOO_LARGE, E_UNAUTHORIZED};
use dedup_service::{
    create_router, AppState, DedupEngine, FactStore, KeyRegistry, MemoryStore, NullSink,
};

const TEST_KEY: &str = "dedup_test_key";
const TEST_SUPERKEY: &str = "dedup_test_superkey";

// =============================================================================
// Test Helpers
// =============================================================================

async fn test_app() -> Router {
    let store: Arc<dyn FactStore> = Arc::new(MemoryStore::new());
    let registry = KeyRegistry::bootstrap(
        HashSet::from([TEST_KEY.to_string()]),
        TEST_SUPERKEY.to_string(),
        store.clone(),
    )
    .await
    .expect("Failed to seed key registry");

    let state = Arc::new(AppState {
        registry,
        engine: DedupEngine::new(store),
        audit: vec![Arc::new(NullSink)],
    });

    create_router(state)
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.expect("request failed");
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("failed to read body");

    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("body is not JSON")
    };
    (status, body)
}

async fn post(app: &Router, path: &str, body: String) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri(path)
        .header("content-type", "application/json")
        .body(Body::from(body))
        .unwrap();
    send(app, request).await
}

async fn post_json(app: &Router, path: &str, body: &Value) -> (StatusCode, Value) {
    post(app, path, body.to_string()).await
}

fn identify_req(key: &str, items: Value) -> Value {
    json!({"key": key, "contentItems": items})
}

fn item(id: &str, collections: Value) -> Value {
    json!({"id": id, "difcollections": collections})
}

fn coll(name: &str, difs: Value) -> Value {
    json!({"name": name, "difs": difs})
}

fn error_body(message: &str) -> Value {
    json!({"error": message})
}

// =============================================================================
// Identification
// =============================================================================

#[tokio::test]
async fn example_item_is_unique_then_duplicate() {
    let app = test_app().await;
    let request = identify_req(
        TEST_KEY,
        json!([item("x", json!([coll("c", json!([{"type": "t", "value": "v"}]))]))]),
    );

    let (status, body) = post_json(&app, "/", &request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({"key": TEST_KEY, "results": [{"id": "x", "result": "unique"}]})
    );

    let (status, body) = post_json(&app, "/", &request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({"key": TEST_KEY, "results": [{"id": "x", "result": "duplicate"}]})
    );
}

#[tokio::test]
async fn one_known_collection_makes_an_item_duplicate() {
    let app = test_app().await;
    let c1 = coll("c1", json!([{"type": "t1", "value": "v1"}]));
    let c2 = coll("c2", json!([{"type": "t2", "value": "v2"}]));
    let c3 = coll("c3", json!([{"type": "t3", "value": "v3"}]));

    let (status, body) = post_json(
        &app,
        "/",
        &identify_req(TEST_KEY, json!([item("i1", json!([c1, c2.clone()]))])),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["results"][0]["result"], "unique");

    // c2 is known, c3 is not: duplicate, but c3 gets recorded anyway.
    let (status, body) = post_json(
        &app,
        "/",
        &identify_req(TEST_KEY, json!([item("i2", json!([c2, c3.clone()]))])),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["results"][0]["result"], "duplicate");

    let (status, body) = post_json(
        &app,
        "/",
        &identify_req(TEST_KEY, json!([item("i3", json!([c3]))])),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["results"][0]["result"], "duplicate");
}

#[tokio::test]
async fn dif_order_does_not_matter() {
    let app = test_app().await;
    let d1 = json!({"type": "t1", "value": "v1"});
    let d2 = json!({"type": "t2", "value": "v2"});

    let (status, body) = post_json(
        &app,
        "/",
        &identify_req(
            TEST_KEY,
            json!([item("i12", json!([coll("c", json!([d1.clone(), d2.clone()]))]))]),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["results"][0]["result"], "unique");

    let (status, body) = post_json(
        &app,
        "/",
        &identify_req(
            TEST_KEY,
            json!([item("i21", json!([coll("c", json!([d2, d1]))]))]),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["results"][0]["result"], "duplicate");
}

#[tokio::test]
async fn results_follow_submission_order_within_one_request() {
    let app = test_app().await;
    let shared = coll("c", json!([{"type": "t", "value": "v"}]));

    // The second item shares the first item's collection; recording happens
    // collection-by-collection, so it sees the first item's write.
    let (status, body) = post_json(
        &app,
        "/",
        &identify_req(
            TEST_KEY,
            json!([
                item("first", json!([shared.clone()])),
                item("second", json!([shared]))
            ]),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["results"],
        json!([
            {"id": "first", "result": "unique"},
            {"id": "second", "result": "duplicate"}
        ])
    );
}

// =============================================================================
// Key Registration
// =============================================================================

#[tokio::test]
async fn registering_a_key_is_idempotent() {
    let app = test_app().await;
    let request = json!({"superkey": TEST_SUPERKEY, "newkey": "dedup_test_key2"});

    let (status, body) = post_json(&app, "/register", &request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({"key": "dedup_test_key2", "registered": "registered"})
    );

    let (status, body) = post_json(&app, "/register", &request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({"key": "dedup_test_key2", "registered": "already registered"})
    );
}

#[tokio::test]
async fn new_key_sees_existing_content_as_unique() {
    let app = test_app().await;
    let items = json!([item("x", json!([coll("c", json!([{"type": "t", "value": "v"}]))]))]);

    let (status, _) = post_json(&app, "/", &identify_req(TEST_KEY, items.clone())).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = post_json(
        &app,
        "/register",
        &json!({"superkey": TEST_SUPERKEY, "newkey": "fresh_key"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = post_json(&app, "/", &identify_req("fresh_key", items)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({"key": "fresh_key", "results": [{"id": "x", "result": "unique"}]})
    );
}

#[tokio::test]
async fn wrong_superkey_is_rejected_and_adds_nothing() {
    let app = test_app().await;

    let (status, body) = post_json(
        &app,
        "/register",
        &json!({"superkey": "wrong", "newkey": "sneaky_key"}),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body, error_body(E_UNAUTHORIZED));

    // The refused key must not have become usable.
    let items = json!([item("x", json!([coll("c", json!([{"type": "t", "value": "v"}]))]))]);
    let (status, body) = post_json(&app, "/", &identify_req("sneaky_key", items)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body, error_body(E_UNAUTHORIZED));
}

// =============================================================================
// Error Table
// =============================================================================

#[tokio::test]
async fn unknown_key_is_rejected() {
    let app = test_app().await;
    let items = json!([item("x", json!([coll("c", json!([{"type": "t", "value": "v"}]))]))]);

    let (status, body) = post_json(&app, "/", &identify_req("bad_key", items)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body, error_body(E_UNAUTHORIZED));
}

#[tokio::test]
async fn missing_fields_are_rejected() {
    let app = test_app().await;

    let (status, body) = post_json(&app, "/", &json!({})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, error_body(E_BAD_REQUEST));
}

#[tokio::test]
async fn extra_fields_are_rejected() {
    let app = test_app().await;
    let mut request = identify_req(
        TEST_KEY,
        json!([item("x", json!([coll("c", json!([{"type": "t", "value": "v"}]))]))]),
    );
    request["extra"] = json!("extra");

    let (status, body) = post_json(&app, "/", &request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, error_body(E_BAD_REQUEST));
}

#[tokio::test]
async fn empty_dif_list_is_rejected() {
    let app = test_app().await;
    let request = identify_req(TEST_KEY, json!([item("x", json!([coll("c", json!([]))]))]));

    let (status, body) = post_json(&app, "/", &request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, error_body(E_BAD_REQUEST));
}

#[tokio::test]
async fn malformed_json_is_rejected() {
    let app = test_app().await;

    let (status, body) = post(&app, "/", "this is not json".into()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, error_body(E_BAD_REQUEST));
}

#[tokio::test]
async fn oversized_body_is_rejected() {
    let app = test_app().await;
    let padding = " ".repeat(1025);

    let (status, body) = post(&app, "/", format!("{{\"too_large\": \"{padding}\"}}")).await;
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(body, error_body(E_REQUEST_TOO_LARGE));
}

#[tokio::test]
async fn declared_oversized_length_is_rejected_before_parsing() {
    let app = test_app().await;
    let request = Request::builder()
        .method("POST")
        .uri("/")
        .header("content-type", "application/json")
        .header("content-length", "4096")
        .body(Body::from("{}"))
        .unwrap();

    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(body, error_body(E_REQUEST_TOO_LARGE));
}

#[tokio::test]
async fn unknown_path_is_not_found() {
    let app = test_app().await;

    let (status, body) = post(&app, "/nope", "{}".into()).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, Value::Null);
}

#[tokio::test]
async fn non_post_methods_are_refused() {
    let app = test_app().await;

    for path in ["/", "/register"] {
        let request = Request::builder()
            .method("GET")
            .uri(path)
            .body(Body::empty())
            .unwrap();

        let (status, body) = send(&app, request).await;
        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(body, Value::Null);
    }
}
