//! User document management commands.
//!
//! # Usage
//!
//! ```bash
//! aabhushan-cli users list --limit 20 --offset 40
//! aabhushan-cli users show user_2abc
//! aabhushan-cli users set-role user_2abc admin
//! aabhushan-cli users deactivate user_2abc
//! ```
//!
//! # Environment Variables
//!
//! - `APPWRITE_ENDPOINT` - API endpoint (defaults to Appwrite Cloud)
//! - `APPWRITE_PROJECT_ID`, `APPWRITE_API_KEY` - project and server key
//! - `APPWRITE_DATABASE_ID`, `APPWRITE_USERS_COLLECTION_ID` - users collection
//! - `APPWRITE_STORAGE_BUCKET_ID` - required by the shared config loader

use std::sync::Arc;

use aabhushan_core::{IdError, ProviderUserId, RoleError, UserRole};
use aabhushan_storefront::config::{AppwriteConfig, ConfigError};
use aabhushan_storefront::db::{AppwriteClient, AppwriteUserStore, RepositoryError};
use aabhushan_storefront::models::UserDocument;
use aabhushan_storefront::services::UserDirectory;
use thiserror::Error;

/// Errors that can occur during user operations.
#[derive(Debug, Error)]
pub enum UsersError {
    /// Appwrite settings are missing or invalid.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Document store error.
    #[error("Document store error: {0}")]
    Repository(#[from] RepositoryError),

    /// Invalid provider user id.
    #[error("Invalid user id: {0}")]
    InvalidId(#[from] IdError),

    /// Invalid role.
    #[error(transparent)]
    InvalidRole(#[from] RoleError),

    /// No document for the provider id.
    #[error("No user document for {0}")]
    NotFound(String),
}

fn directory() -> Result<UserDirectory, UsersError> {
    dotenvy::dotenv().ok();

    let config = AppwriteConfig::from_env()?;
    tracing::info!(
        endpoint = %config.endpoint,
        project = %config.project_id,
        "Connecting to Appwrite..."
    );
    let client = AppwriteClient::new(&config)?;
    Ok(UserDirectory::new(Arc::new(AppwriteUserStore::new(
        client, &config,
    ))))
}

fn log_user(user: &UserDocument) {
    tracing::info!(
        "{} {} <{}> role={} active={} verified={} created={}",
        user.clerk_id,
        user.display_name(),
        user.email,
        user.role,
        user.is_active,
        user.email_verified,
        user.created_at
            .map_or_else(|| "-".to_owned(), |t| t.to_rfc3339()),
    );
}

/// List user documents, newest first.
///
/// # Errors
///
/// Returns `UsersError` if configuration is missing or the store fails.
pub async fn list(limit: u32, offset: u32) -> Result<(), UsersError> {
    let users = directory()?.list(limit, offset).await?;
    tracing::info!("{} user(s) (offset {})", users.len(), offset);
    for user in &users {
        log_user(user);
    }
    Ok(())
}

/// Show one user.
///
/// # Errors
///
/// Returns `UsersError::NotFound` if no document exists for the id.
pub async fn show(provider_id: &str) -> Result<(), UsersError> {
    let provider_id = ProviderUserId::parse(provider_id)?;
    let user = directory()?
        .find(&provider_id)
        .await?
        .ok_or_else(|| UsersError::NotFound(provider_id.to_string()))?;

    log_user(&user);
    tracing::info!("  document id: {}", user.id);
    if !user.phone_number.is_empty() {
        tracing::info!("  phone: {}", user.phone_number);
    }
    if !user.profile_image.is_empty() {
        tracing::info!("  image: {}", user.profile_image);
    }
    Ok(())
}

/// Change a user's role.
///
/// # Errors
///
/// Returns `UsersError` if the role is unknown, the user does not exist, or
/// the store fails.
pub async fn set_role(provider_id: &str, role: &str) -> Result<(), UsersError> {
    let provider_id = ProviderUserId::parse(provider_id)?;
    let role: UserRole = role.parse()?;

    let user = directory()?
        .set_role(&provider_id, role)
        .await
        .map_err(|e| match e {
            RepositoryError::NotFound => UsersError::NotFound(provider_id.to_string()),
            other => UsersError::Repository(other),
        })?;

    tracing::info!("Role updated successfully!");
    log_user(&user);
    Ok(())
}

/// Mark a user inactive.
///
/// # Errors
///
/// Returns `UsersError::NotFound` if no document exists for the id.
pub async fn deactivate(provider_id: &str) -> Result<(), UsersError> {
    let provider_id = ProviderUserId::parse(provider_id)?;
    let user = directory()?
        .deactivate(&provider_id)
        .await?
        .ok_or_else(|| UsersError::NotFound(provider_id.to_string()))?;

    tracing::info!("User deactivated.");
    log_user(&user);
    Ok(())
}
