//! Integration tests for session sync.
//!
//! The app's backend API URL points at a loopback stub, so the middleware's
//! provider lookups are real HTTP calls that the stub counts.

use aabhushan_integration_tests::{ProviderStub, TestApp, provider_user, session_token};
use axum::http::StatusCode;
use serde_json::json;

// =============================================================================
// Reconciliation
// =============================================================================

#[tokio::test]
async fn test_first_request_creates_document() {
    let stub = ProviderStub::start().await;
    stub.add_user(provider_user("user_ss1", "kavya@example.in", "Kavya", "Nair"));
    let app = TestApp::with_provider(&stub);

    let response = app.get("/api/user", Some(&session_token("user_ss1"))).await;

    assert_eq!(response.status, StatusCode::OK);
    let body = response.json();
    assert_eq!(body["user"]["email"], "kavya@example.in");
    assert_eq!(body["role"], "customer");
    assert_eq!(app.documents_for("user_ss1").await.len(), 1);
    assert_eq!(stub.hits(), 1);
}

#[tokio::test]
async fn test_repeat_requests_within_ttl_skip_lookup() {
    let stub = ProviderStub::start().await;
    stub.add_user(provider_user("user_ss2", "ira@example.in", "Ira", "Sen"));
    let app = TestApp::with_provider(&stub);
    let token = session_token("user_ss2");

    app.get("/api/user", Some(&token)).await;
    let second = app.get("/api/check-admin", Some(&token)).await;
    let third = app.get("/api/products/crystals", Some(&token)).await;

    assert_eq!(second.status, StatusCode::OK);
    assert_eq!(third.status, StatusCode::OK);
    assert_eq!(stub.hits(), 1);
    assert_eq!(app.documents_for("user_ss2").await.len(), 1);
}

// =============================================================================
// Upstream Failures
// =============================================================================

#[tokio::test]
async fn test_unknown_provider_user_does_not_block_request() {
    let stub = ProviderStub::start().await;
    let app = TestApp::with_provider(&stub);
    let token = session_token("user_ss3");

    let response = app.get("/api/user", Some(&token)).await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.json()["message"], "User needs to be synced first");

    let catalog = app.get("/api/products", Some(&token)).await;
    assert_eq!(catalog.status, StatusCode::OK);

    // failed lookups are not remembered
    assert_eq!(stub.hits(), 2);
    assert!(app.documents_for("user_ss3").await.is_empty());
}

#[tokio::test]
async fn test_provider_error_does_not_block_request() {
    let stub = ProviderStub::failing().await;
    let app = TestApp::with_provider(&stub);
    let token = session_token("user_ss4");

    let catalog = app.get("/api/products/kalapatt", Some(&token)).await;
    assert_eq!(catalog.status, StatusCode::OK);

    let response = app.get("/api/user", Some(&token)).await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(stub.hits(), 2);
}

// =============================================================================
// Exempt Paths
// =============================================================================

#[tokio::test]
async fn test_exempt_paths_skip_lookup() {
    let stub = ProviderStub::start().await;
    stub.add_user(provider_user("user_ss5", "tara@example.in", "Tara", "Das"));
    let app = TestApp::with_provider(&stub);
    let token = session_token("user_ss5");

    let sync = app
        .post_json(
            "/api/sync-user",
            &json!({
                "userData": {
                    "clerkId": "user_ss5",
                    "email": "tara@example.in",
                    "firstName": "Tara",
                    "lastName": "Das",
                }
            }),
            Some(&token),
        )
        .await;
    assert_eq!(sync.status, StatusCode::OK);

    let status = app.get("/api/webhook/clerk", Some(&token)).await;
    assert_eq!(status.status, StatusCode::OK);

    let health = app.get("/health", Some(&token)).await;
    assert_eq!(health.status, StatusCode::OK);

    assert_eq!(stub.hits(), 0);
}
