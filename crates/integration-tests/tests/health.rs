//! Integration tests for probes and cross-cutting response headers.

use aabhushan_integration_tests::TestApp;
use axum::body::Body;
use axum::http::{Request, StatusCode};

#[tokio::test]
async fn test_liveness() {
    let app = TestApp::new();
    let response = app.get("/health", None).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.text(), "ok");
}

#[tokio::test]
async fn test_readiness_with_memory_store() {
    let app = TestApp::new();
    let response = app.get("/health/ready", None).await;
    assert_eq!(response.status, StatusCode::OK);
}

#[tokio::test]
async fn test_unknown_route_not_found() {
    let app = TestApp::new();
    let response = app.get("/api/orders", None).await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_security_headers_present() {
    let app = TestApp::new();
    let response = app.get("/api/products", None).await;

    let header = |name: &str| {
        response
            .headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned)
    };
    assert_eq!(header("x-frame-options").as_deref(), Some("DENY"));
    assert_eq!(header("x-content-type-options").as_deref(), Some("nosniff"));
    assert_eq!(header("cache-control").as_deref(), Some("no-store"));
    assert!(header("content-security-policy").is_some());
    assert!(header("strict-transport-security").is_some());
}

#[tokio::test]
async fn test_request_id_generated() {
    let app = TestApp::new();
    let response = app.get("/health", None).await;

    let id = response
        .headers
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    assert!(!id.is_empty());
}

#[tokio::test]
async fn test_request_id_propagated() {
    let app = TestApp::new();
    let response = app
        .send(
            Request::builder()
                .uri("/health")
                .header("x-request-id", "edge-1234")
                .body(Body::empty())
                .expect("valid request"),
        )
        .await;

    assert_eq!(
        response
            .headers
            .get("x-request-id")
            .and_then(|v| v.to_str().ok()),
        Some("edge-1234")
    );
}
