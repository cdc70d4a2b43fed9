//! Identity provider webhook receiver.
//!
//! Deliveries are signed by Svix. Responses are plain text because the
//! provider's delivery log shows the body verbatim.

use axum::{
    Json,
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use serde_json::{Value, json};

use crate::error::add_breadcrumb;
use crate::identity::{SvixHeaders, WebhookEvent};
use crate::services::WebhookOutcome;
use crate::state::AppState;

/// Connectivity check for the webhook endpoint.
pub async fn status(State(state): State<AppState>) -> Json<Value> {
    let (has_database_id, has_users_collection_id) = state.store_ids_configured();
    Json(json!({
        "status": "ok",
        "message": "Clerk webhook endpoint is reachable",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "environment": {
            "hasWebhookSecret": state.webhook_verifier().is_some(),
            "hasDatabaseId": has_database_id,
            "hasUsersCollectionId": has_users_collection_id,
        },
    }))
}

/// Verify and apply one webhook delivery.
pub async fn receive(State(state): State<AppState>, headers: HeaderMap, body: Bytes) -> Response {
    let Some(verifier) = state.webhook_verifier() else {
        tracing::error!("Webhook received but CLERK_WEBHOOK_SECRET is not configured");
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            "Error: webhook secret not configured",
        )
            .into_response();
    };

    let svix = match SvixHeaders::from_headers(&headers) {
        Ok(svix) => svix,
        Err(e) => {
            tracing::warn!(error = %e, "Webhook rejected");
            return (StatusCode::BAD_REQUEST, "Error occurred -- no svix headers").into_response();
        }
    };

    if let Err(e) = verifier.verify(&svix, &body) {
        tracing::warn!(msg_id = svix.id, error = %e, "Webhook signature verification failed");
        return (StatusCode::BAD_REQUEST, "Error occurred -- invalid signature").into_response();
    }

    // Not atomic with the insert after processing: concurrent redeliveries of
    // one message can both run, so event handling must stay idempotent.
    let msg_id = svix.id.to_owned();
    if state.seen_webhooks().contains_key(&msg_id) {
        tracing::info!(%msg_id, "Duplicate webhook delivery acknowledged");
        return (StatusCode::OK, "Already processed").into_response();
    }

    let event = match serde_json::from_slice::<WebhookEvent>(&body).map(WebhookEvent::into_typed) {
        Ok(Ok(event)) => event,
        Ok(Err(e)) | Err(e) => {
            tracing::warn!(%msg_id, error = %e, "Malformed webhook payload");
            return (StatusCode::BAD_REQUEST, "Error occurred -- invalid payload").into_response();
        }
    };

    add_breadcrumb("webhook", "Identity event received", Some(&[("msg_id", msg_id.as_str())]));

    match state.sync().handle_event(event).await {
        Ok(WebhookOutcome::Unhandled(event_type)) => {
            tracing::info!(%msg_id, %event_type, "Unhandled webhook event type");
            (StatusCode::OK, format!("Unhandled event type: {event_type}")).into_response()
        }
        Ok(outcome) => {
            match &outcome {
                WebhookOutcome::Synced(synced) => tracing::info!(
                    %msg_id,
                    document_id = %synced.user.id,
                    action = ?synced.action,
                    "Webhook processed"
                ),
                WebhookOutcome::Deactivated(user) => tracing::info!(
                    %msg_id,
                    found = user.is_some(),
                    "Webhook processed: user deactivated"
                ),
                WebhookOutcome::Unhandled(_) => {}
            }
            state.seen_webhooks().insert(msg_id, ()).await;
            (StatusCode::OK, "Success").into_response()
        }
        Err(e) => {
            let event_id = sentry::capture_error(&e);
            tracing::error!(
                %msg_id,
                error = %e,
                sentry_event_id = %event_id,
                "Error processing webhook"
            );
            (StatusCode::INTERNAL_SERVER_ERROR, "Error processing webhook").into_response()
        }
    }
}
