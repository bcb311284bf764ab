// Integration tests for the ingestion endpoints.
//
// The routers run against a real in-memory EventStore, so these exercise the
// full normalize -> store -> query path without a network listener.

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use skywatch::api::create_app;
use skywatch::config::SkywatchConfig;
use skywatch::store::EventStore;
use std::sync::Arc;
use tower::ServiceExt;

fn create_test_app() -> (Router, Arc<EventStore>) {
    let config = SkywatchConfig::default();
    let store = Arc::new(EventStore::new(config.store.clone()));
    (create_app(Arc::clone(&store), &config), store)
}

fn post(uri: &str, body: Body) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("Content-Type", "application/json")
        .body(body)
        .unwrap()
}

async fn response_json(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

/// Posting one telemetry record accepts it and makes it queryable
#[tokio::test]
async fn test_single_telemetry_accepted_and_queryable() {
    let (app, _store) = create_test_app();

    let body = json!({"payload": {"drone_id": "BLUE-1", "lat": 13.7563, "lon": 100.5018}});
    let response = app
        .clone()
        .oneshot(post("/api/telemetry", Body::from(body.to_string())))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response_json(response).await["accepted"], json!(1));

    let response = app
        .oneshot(Request::builder().uri("/api/telemetry").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let events = response_json(response).await;
    let events = events.as_array().unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0]["payload"]["drone_id"], json!("BLUE-1"));
    assert_eq!(events[0]["type"], json!("telemetry:update"));
}

/// A null body accepts nothing and leaves collections unchanged
#[tokio::test]
async fn test_null_body_rejected() {
    let (app, store) = create_test_app();

    let response = app
        .oneshot(post("/api/telemetry", Body::from("null")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(store.summary().totals.telemetry, 0);
}

/// Malformed batch members are dropped; siblings still land
#[tokio::test]
async fn test_batch_partial_acceptance() {
    let (app, store) = create_test_app();

    let body = json!([
        {"payload": {"drone_id": "BLUE-1"}},
        42,
        {"payload": {"drone_id": "RED-7"}},
    ]);
    let response = app
        .oneshot(post("/api/telemetry", Body::from(body.to_string())))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response_json(response).await["accepted"], json!(2));
    assert_eq!(store.summary().totals.telemetry, 2);
}

/// /api/events has no fallback type; typeless records are rejected
#[tokio::test]
async fn test_events_endpoint_requires_type() {
    let (app, _store) = create_test_app();

    let body = json!({"payload": {"drone_id": "BLUE-1"}});
    let response = app
        .clone()
        .oneshot(post("/api/events", Body::from(body.to_string())))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = json!({"type": "status:ping", "payload": {}});
    let response = app
        .oneshot(post("/api/events", Body::from(body.to_string())))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

/// Detection route applies its own fallback type
#[tokio::test]
async fn test_detection_fallback_type() {
    let (app, store) = create_test_app();

    let body = json!({"payload": {"detection_id": "d-1", "lat": 1.0, "lon": 2.0}});
    let response = app
        .oneshot(post("/api/detections", Body::from(body.to_string())))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let summary = store.summary();
    assert_eq!(summary.totals.detections, 1);
    assert_eq!(summary.latest_detection.unwrap().kind, "detection:new");
}

/// Invalid JSON is a 400, not a crash
#[tokio::test]
async fn test_invalid_json_rejected() {
    let (app, _store) = create_test_app();

    let response = app
        .oneshot(post("/api/telemetry", Body::from("{not json")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

/// Oversized single-object body is refused before deserialization
#[tokio::test]
async fn test_body_too_large_returns_413() {
    let mut config = SkywatchConfig::default();
    config.server.body_limit_single_bytes = 64;
    let store = Arc::new(EventStore::new(config.store.clone()));
    let app = create_app(store, &config);

    let oversized = format!(
        "{{\"payload\": {{\"drone_id\": \"{}\"}}}}",
        "x".repeat(100)
    );
    let response = app
        .oneshot(post("/api/telemetry", Body::from(oversized)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
}

/// Events accepted over HTTP reach broadcast subscribers
#[tokio::test]
async fn test_ingest_reaches_subscribers() {
    let (app, store) = create_test_app();
    let mut rx = store.subscribe();

    let body = json!({"payload": {"detection_id": "d-9"}});
    app.oneshot(post("/api/detections", Body::from(body.to_string())))
        .await
        .unwrap();

    let event = rx.try_recv().unwrap();
    assert_eq!(event.payload_str("detection_id"), Some("d-9"));
}
