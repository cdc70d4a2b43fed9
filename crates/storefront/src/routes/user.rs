//! Current-user routes.

use axum::{Json, extract::State};
use serde::Serialize;

use aabhushan_core::{DocumentId, ProviderUserId, UserRole};

use crate::error::{AppError, Result};
use crate::middleware::RequireSession;
use crate::models::UserDocument;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct CurrentUserResponse {
    pub success: bool,
    pub user: UserDocument,
    pub role: UserRole,
}

/// Identity fields of the admin check response.
#[derive(Debug, Serialize)]
pub struct AdminCheckUser {
    #[serde(rename = "$id")]
    pub id: DocumentId,
    pub clerk_id: ProviderUserId,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub role: UserRole,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminCheckResponse {
    pub success: bool,
    pub is_admin: bool,
    pub user: AdminCheckUser,
}

impl From<UserDocument> for AdminCheckUser {
    fn from(user: UserDocument) -> Self {
        Self {
            id: user.id,
            clerk_id: user.clerk_id,
            email: user.email,
            first_name: user.first_name,
            last_name: user.last_name,
            role: user.role,
        }
    }
}

async fn current_document(state: &AppState, session_user: &ProviderUserId) -> Result<UserDocument> {
    state
        .directory()
        .find(session_user)
        .await?
        .ok_or(AppError::UserNotSynced)
}

/// The signed-in user's document and role.
pub async fn current_user(
    State(state): State<AppState>,
    RequireSession(session): RequireSession,
) -> Result<Json<CurrentUserResponse>> {
    let user = current_document(&state, &session.user_id).await?;
    Ok(Json(CurrentUserResponse {
        success: true,
        role: user.role,
        user,
    }))
}

/// Whether the signed-in user is an admin.
pub async fn check_admin(
    State(state): State<AppState>,
    RequireSession(session): RequireSession,
) -> Result<Json<AdminCheckResponse>> {
    let user = current_document(&state, &session.user_id).await?;
    Ok(Json(AdminCheckResponse {
        success: true,
        is_admin: user.is_admin(),
        user: user.into(),
    }))
}
