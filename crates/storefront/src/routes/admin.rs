//! Admin user management.

use axum::{
    Json,
    extract::{Path, Query, State, rejection::JsonRejection},
};
use serde::{Deserialize, Serialize};

use aabhushan_core::{ProviderUserId, UserRole};

use crate::error::{AppError, Result};
use crate::middleware::RequireAdmin;
use crate::models::UserDocument;
use crate::state::AppState;

const DEFAULT_PAGE_SIZE: u32 = 25;
const MAX_PAGE_SIZE: u32 = 100;

#[derive(Debug, Default, Deserialize)]
pub struct ListUsersQuery {
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct UserListResponse {
    pub success: bool,
    pub users: Vec<UserDocument>,
    pub limit: u32,
    pub offset: u32,
}

#[derive(Debug, Deserialize)]
pub struct SetRoleRequest {
    pub role: String,
}

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub success: bool,
    pub user: UserDocument,
}

fn parse_provider_id(raw: &str) -> Result<ProviderUserId> {
    ProviderUserId::parse(raw).map_err(|e| AppError::BadRequest(format!("Invalid user id: {e}")))
}

/// List user documents, newest first.
pub async fn list_users(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Query(query): Query<ListUsersQuery>,
) -> Result<Json<UserListResponse>> {
    let limit = query.limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE);
    let offset = query.offset.unwrap_or(0);
    let users = state.directory().list(limit, offset).await?;

    Ok(Json(UserListResponse {
        success: true,
        users,
        limit,
        offset,
    }))
}

/// Change a user's role.
pub async fn set_role(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(provider_id): Path<String>,
    payload: std::result::Result<Json<SetRoleRequest>, JsonRejection>,
) -> Result<Json<UserResponse>> {
    let provider_id = parse_provider_id(&provider_id)?;
    let Json(request) = payload.map_err(|e| {
        AppError::BadRequest(format!("Invalid request body: {}", e.body_text()))
    })?;
    let role: UserRole = request
        .role
        .parse()
        .map_err(|e: aabhushan_core::RoleError| AppError::BadRequest(e.to_string()))?;

    let user = state.directory().set_role(&provider_id, role).await?;
    tracing::info!(
        admin = %admin.clerk_id,
        %provider_id,
        %role,
        "User role changed"
    );

    Ok(Json(UserResponse {
        success: true,
        user,
    }))
}

/// Deactivate a user.
pub async fn deactivate(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(provider_id): Path<String>,
) -> Result<Json<UserResponse>> {
    let provider_id = parse_provider_id(&provider_id)?;
    let user = state
        .directory()
        .deactivate(&provider_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User {provider_id}")))?;
    tracing::info!(admin = %admin.clerk_id, %provider_id, "User deactivated by admin");

    Ok(Json(UserResponse {
        success: true,
        user,
    }))
}
