//! Sync route: called by the client after sign-in.

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::identity::SyncUserData;
use crate::middleware::RequireSession;
use crate::models::UserDocument;
use crate::services::SyncAction;
use crate::state::AppState;

/// Sync request body.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncRequest {
    #[serde(default)]
    pub user_data: SyncUserData,
}

/// Sync response body.
#[derive(Debug, Serialize)]
pub struct SyncResponse {
    pub success: bool,
    pub user: UserDocument,
    pub action: SyncAction,
}

/// Synced document response body.
#[derive(Debug, Serialize)]
pub struct SyncedUserResponse {
    pub success: bool,
    pub user: UserDocument,
}

/// Find, create or update the signed-in user's document.
pub async fn sync_user(
    State(state): State<AppState>,
    RequireSession(session): RequireSession,
    payload: std::result::Result<Json<SyncRequest>, JsonRejection>,
) -> Result<Json<SyncResponse>> {
    let Json(request) = payload.map_err(|e| {
        AppError::BadRequest(format!("Invalid request body: {}", e.body_text()))
    })?;

    let outcome = state
        .sync()
        .sync_session_user(&session, &request.user_data)
        .await?;

    // The document is current; session sync can skip this user for a while.
    state
        .synced_sessions()
        .insert(session.user_id.clone(), ())
        .await;

    tracing::info!(
        provider_id = %session.user_id,
        document_id = %outcome.user.id,
        action = ?outcome.action,
        "User synced"
    );

    Ok(Json(SyncResponse {
        success: true,
        user: outcome.user,
        action: outcome.action,
    }))
}

/// The signed-in user's document, if it has been synced.
pub async fn synced_user(
    State(state): State<AppState>,
    RequireSession(session): RequireSession,
) -> Result<Json<SyncedUserResponse>> {
    let user = state
        .directory()
        .find(&session.user_id)
        .await?
        .ok_or(AppError::UserNotSynced)?;

    Ok(Json(SyncedUserResponse {
        success: true,
        user,
    }))
}
