//! Integration tests for the identity provider webhook.
//!
//! Deliveries are signed with the test secret and posted through the full
//! router, so signature checks, idempotency and the document writes are all
//! exercised together.

use aabhushan_core::UserRole;
use aabhushan_integration_tests::{TestApp, provider_user, webhook_event};
use axum::http::StatusCode;
use serde_json::json;

// =============================================================================
// Lifecycle Events
// =============================================================================

#[tokio::test]
async fn test_user_created_creates_customer_document() {
    let app = TestApp::new();
    let payload = webhook_event(
        "user.created",
        provider_user("user_wh1", "asha@example.in", "Asha", "Rao"),
    );

    let response = app.deliver_webhook("msg_created_1", &payload).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.text(), "Success");

    let docs = app.documents_for("user_wh1").await;
    assert_eq!(docs.len(), 1);
    let user = &docs[0];
    assert_eq!(user.email, "asha@example.in");
    assert_eq!(user.first_name, "Asha");
    assert_eq!(user.last_name, "Rao");
    assert_eq!(user.role, UserRole::Customer);
    assert!(user.is_active);
    assert!(user.email_verified);
}

#[tokio::test]
async fn test_user_created_twice_keeps_one_document() {
    let app = TestApp::new();
    let payload = webhook_event(
        "user.created",
        provider_user("user_wh2", "meera@example.in", "Meera", "Iyer"),
    );

    app.deliver_webhook("msg_created_a", &payload).await;
    let response = app.deliver_webhook("msg_created_b", &payload).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(app.documents_for("user_wh2").await.len(), 1);
}

#[tokio::test]
async fn test_user_updated_changes_profile_and_keeps_role() {
    let app = TestApp::new();
    app.seed_user("user_wh3", "old@example.in", UserRole::Admin)
        .await;

    let payload = webhook_event(
        "user.updated",
        provider_user("user_wh3", "new@example.in", "Kavya", "Nair"),
    );
    let response = app.deliver_webhook("msg_updated_1", &payload).await;
    assert_eq!(response.status, StatusCode::OK);

    let docs = app.documents_for("user_wh3").await;
    assert_eq!(docs.len(), 1);
    assert_eq!(docs[0].email, "new@example.in");
    assert_eq!(docs[0].first_name, "Kavya");
    assert_eq!(docs[0].role, UserRole::Admin);
}

#[tokio::test]
async fn test_user_updated_for_unknown_user_creates_document() {
    let app = TestApp::new();
    let payload = webhook_event(
        "user.updated",
        provider_user("user_wh4", "late@example.in", "Late", "Arrival"),
    );

    let response = app.deliver_webhook("msg_updated_2", &payload).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(app.documents_for("user_wh4").await.len(), 1);
}

#[tokio::test]
async fn test_user_deleted_deactivates_document() {
    let app = TestApp::new();
    app.seed_user("user_wh5", "gone@example.in", UserRole::Customer)
        .await;

    let payload = webhook_event("user.deleted", json!({ "id": "user_wh5", "deleted": true }));
    let response = app.deliver_webhook("msg_deleted_1", &payload).await;
    assert_eq!(response.status, StatusCode::OK);

    let docs = app.documents_for("user_wh5").await;
    assert!(!docs[0].is_active);
}

#[tokio::test]
async fn test_user_deleted_for_unknown_user_succeeds() {
    let app = TestApp::new();
    let payload = webhook_event("user.deleted", json!({ "id": "user_never", "deleted": true }));

    let response = app.deliver_webhook("msg_deleted_2", &payload).await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(app.documents_for("user_never").await.is_empty());
}

#[tokio::test]
async fn test_unhandled_event_type_is_acknowledged() {
    let app = TestApp::new();
    let payload = webhook_event("session.created", json!({ "id": "sess_1" }));

    let response = app.deliver_webhook("msg_session_1", &payload).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.text(), "Unhandled event type: session.created");
}

// =============================================================================
// Verification
// =============================================================================

#[tokio::test]
async fn test_missing_svix_headers_rejected() {
    let app = TestApp::new();
    let response = app
        .post_json(
            "/api/webhook/clerk",
            &webhook_event("user.created", provider_user("user_x", "x@example.in", "X", "Y")),
            None,
        )
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.text(), "Error occurred -- no svix headers");
    assert!(app.documents_for("user_x").await.is_empty());
}

#[tokio::test]
async fn test_tampered_body_rejected() {
    let app = TestApp::new();
    let signed = webhook_event(
        "user.created",
        provider_user("user_t1", "real@example.in", "Real", "User"),
    )
    .to_string();
    let tampered = signed.replace("real@example.in", "evil@example.in");
    let timestamp = chrono::Utc::now().timestamp();
    let signature = app.signature("msg_tamper", timestamp, &signed);

    let response = app
        .deliver_raw("msg_tamper", timestamp, &signature, &tampered)
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.text(), "Error occurred -- invalid signature");
    assert!(app.documents_for("user_t1").await.is_empty());
}

#[tokio::test]
async fn test_signature_for_other_message_id_rejected() {
    let app = TestApp::new();
    let body = webhook_event(
        "user.created",
        provider_user("user_t2", "t2@example.in", "T", "Two"),
    )
    .to_string();
    let timestamp = chrono::Utc::now().timestamp();
    let signature = app.signature("msg_original", timestamp, &body);

    let response = app
        .deliver_raw("msg_replayed", timestamp, &signature, &body)
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_stale_timestamp_rejected() {
    let app = TestApp::new();
    let body = webhook_event(
        "user.created",
        provider_user("user_old", "old@example.in", "Old", "Delivery"),
    )
    .to_string();
    let an_hour_ago = chrono::Utc::now().timestamp() - 3600;

    let response = app.deliver_signed("msg_stale", an_hour_ago, &body).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert!(app.documents_for("user_old").await.is_empty());
}

#[tokio::test]
async fn test_malformed_payload_rejected() {
    let app = TestApp::new();
    let timestamp = chrono::Utc::now().timestamp();

    let response = app.deliver_signed("msg_garbage", timestamp, "not json").await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_user_created_without_email_fails_and_can_be_retried() {
    let app = TestApp::new();
    let mut user = provider_user("user_noemail", "x@example.in", "No", "Email");
    user["email_addresses"] = json!([]);
    let payload = webhook_event("user.created", user);

    let response = app.deliver_webhook("msg_noemail", &payload).await;
    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(response.text(), "Error processing webhook");

    // A failed delivery is not recorded, so the provider's retry is processed.
    let fixed = webhook_event(
        "user.created",
        provider_user("user_noemail", "fixed@example.in", "No", "Email"),
    );
    let body = fixed.to_string();
    let retry = app
        .deliver_signed("msg_noemail", chrono::Utc::now().timestamp(), &body)
        .await;
    assert_eq!(retry.status, StatusCode::OK);
    assert_eq!(retry.text(), "Success");
}

// =============================================================================
// Idempotency
// =============================================================================

#[tokio::test]
async fn test_redelivery_is_acknowledged_without_writing() {
    let app = TestApp::new();
    let payload = webhook_event(
        "user.created",
        provider_user("user_dup", "dup@example.in", "Dup", "Licate"),
    );

    let first = app.deliver_webhook("msg_dup", &payload).await;
    assert_eq!(first.text(), "Success");
    let creates = app.users.create_calls();
    let finds = app.users.find_calls();

    let second = app.deliver_webhook("msg_dup", &payload).await;
    assert_eq!(second.status, StatusCode::OK);
    assert_eq!(second.text(), "Already processed");
    assert_eq!(app.users.create_calls(), creates);
    assert_eq!(app.users.find_calls(), finds);
}

#[tokio::test]
async fn test_concurrent_redeliveries_create_one_document() {
    let app = TestApp::new();
    let body = webhook_event(
        "user.created",
        provider_user("user_race", "race@example.in", "Rhea", "Bose"),
    )
    .to_string();
    let timestamp = chrono::Utc::now().timestamp();

    let (first, second) = tokio::join!(
        app.deliver_signed("msg_race", timestamp, &body),
        app.deliver_signed("msg_race", timestamp, &body),
    );

    assert_eq!(first.status, StatusCode::OK);
    assert_eq!(second.status, StatusCode::OK);
    assert_eq!(app.documents_for("user_race").await.len(), 1);
}

// =============================================================================
// Status Endpoint
// =============================================================================

#[tokio::test]
async fn test_status_reports_configuration() {
    let app = TestApp::new();
    let response = app.get("/api/webhook/clerk", None).await;

    assert_eq!(response.status, StatusCode::OK);
    let body = response.json();
    assert_eq!(body["status"], "ok");
    assert_eq!(body["environment"]["hasWebhookSecret"], true);
    assert_eq!(body["environment"]["hasDatabaseId"], true);
    assert_eq!(body["environment"]["hasUsersCollectionId"], true);
    assert!(body["timestamp"].is_string());
}

#[tokio::test]
async fn test_delivery_without_secret_configured_fails() {
    let mut config = aabhushan_integration_tests::test_config();
    config.identity.webhook_secret = None;
    let app = TestApp::with_config(config);

    let status = app.get("/api/webhook/clerk", None).await.json();
    assert_eq!(status["environment"]["hasWebhookSecret"], false);

    let payload = webhook_event(
        "user.created",
        provider_user("user_nosecret", "n@example.in", "N", "S"),
    );
    let response = app.deliver_webhook("msg_nosecret", &payload).await;
    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(app.documents_for("user_nosecret").await.is_empty());
}
