//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures errors to Sentry before
//! responding to the client. All API handlers return `Result<T, AppError>`,
//! which renders as a JSON body `{ "error": ..., "details": ... }`.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::db::RepositoryError;
use crate::services::media::StorageError;
use crate::services::sync::SyncError;

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// Document store operation failed.
    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),

    /// User synchronization failed.
    #[error("Sync error: {0}")]
    Sync(#[from] SyncError),

    /// Image upload failed.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// A session exists but no user document has been written for it yet.
    #[error("User not synced")]
    UserNotSynced,

    /// No valid session.
    #[error("Unauthorized")]
    Unauthorized,

    /// Authenticated, but not allowed.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Rate limited.
    #[error("Rate limited")]
    RateLimited,

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// JSON error body.
#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
}

impl AppError {
    /// HTTP status for this error.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Repository(RepositoryError::NotFound) | Self::NotFound(_) | Self::UserNotSynced => {
                StatusCode::NOT_FOUND
            }
            Self::Repository(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Sync(err) => match err {
                SyncError::MissingProviderId | SyncError::Profile(_) => StatusCode::BAD_REQUEST,
                SyncError::ProviderMismatch => StatusCode::FORBIDDEN,
                SyncError::Repository(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::Storage(err) => match err {
                StorageError::NoFiles | StorageError::NotAnImage(_) | StorageError::TooLarge { .. } => {
                    StatusCode::BAD_REQUEST
                }
                StorageError::Repository(_) => StatusCode::BAD_GATEWAY,
            },
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::RateLimited => StatusCode::TOO_MANY_REQUESTS,
        }
    }

    fn body(&self) -> ErrorBody {
        let (error, details, message) = match self {
            Self::Repository(RepositoryError::NotFound) => ("Not found".to_string(), None, None),
            Self::Repository(_) | Self::Internal(_) | Self::Sync(SyncError::Repository(_)) => {
                ("Internal server error".to_string(), None, None)
            }
            Self::Sync(SyncError::MissingProviderId) => {
                ("Missing required field: clerkId".to_string(), None, None)
            }
            Self::Sync(SyncError::ProviderMismatch) => (
                "Forbidden".to_string(),
                Some("clerkId does not match the signed-in user".to_string()),
                None,
            ),
            Self::Sync(SyncError::Profile(err)) => {
                ("Invalid user data".to_string(), Some(err.to_string()), None)
            }
            Self::Storage(StorageError::Repository(_)) => {
                ("Failed to upload images".to_string(), None, None)
            }
            Self::Storage(err) => (err.to_string(), None, None),
            Self::NotFound(what) => ("Not found".to_string(), Some(what.clone()), None),
            Self::UserNotSynced => (
                "User not found".to_string(),
                None,
                Some("User needs to be synced first".to_string()),
            ),
            Self::Unauthorized => ("Unauthorized".to_string(), None, None),
            Self::Forbidden(reason) => ("Forbidden".to_string(), Some(reason.clone()), None),
            Self::BadRequest(reason) => (reason.clone(), None, None),
            Self::RateLimited => ("Too many requests".to_string(), None, None),
        };
        ErrorBody {
            error,
            details,
            message,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Capture server errors to Sentry
        if status.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        (status, Json(self.body())).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Set the Sentry user context from a provider user ID.
///
/// Called once a session has been verified so errors are associated with users.
pub fn set_sentry_user(user_id: &impl ToString, email: Option<&str>) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_string()),
            email: email.map(String::from),
            ..Default::default()
        }));
    });
}

/// Add a breadcrumb for user actions.
///
/// Breadcrumbs appear in Sentry error reports to show the trail of actions
/// leading up to an error.
pub fn add_breadcrumb(category: &str, message: &str, data: Option<&[(&str, &str)]>) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };

    if let Some(pairs) = data {
        for (key, value) in pairs {
            breadcrumb.data.insert(
                (*key).to_string(),
                serde_json::Value::String((*value).to_string()),
            );
        }
    }

    sentry::add_breadcrumb(breadcrumb);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_error_display() {
        let err = AppError::NotFound("product cr-999".to_string());
        assert_eq!(err.to_string(), "Not found: product cr-999");

        let err = AppError::BadRequest("invalid input".to_string());
        assert_eq!(err.to_string(), "Bad request: invalid input");
    }

    #[test]
    fn test_app_error_status_codes() {
        fn get_status(err: AppError) -> StatusCode {
            err.into_response().status()
        }

        assert_eq!(
            get_status(AppError::NotFound("test".to_string())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(get_status(AppError::UserNotSynced), StatusCode::NOT_FOUND);
        assert_eq!(get_status(AppError::Unauthorized), StatusCode::UNAUTHORIZED);
        assert_eq!(
            get_status(AppError::Sync(SyncError::ProviderMismatch)),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            get_status(AppError::Sync(SyncError::MissingProviderId)),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(AppError::Storage(StorageError::NoFiles)),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(AppError::RateLimited),
            StatusCode::TOO_MANY_REQUESTS
        );
        assert_eq!(
            get_status(AppError::Internal("test".to_string())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_internal_errors_are_not_leaked() {
        let body = AppError::Repository(RepositoryError::DataCorruption(
            "secret detail".to_string(),
        ))
        .body();
        assert_eq!(body.error, "Internal server error");
        assert!(body.details.is_none());
    }

    #[test]
    fn test_user_not_synced_body() {
        let body = AppError::UserNotSynced.body();
        assert_eq!(body.error, "User not found");
        assert_eq!(body.message.as_deref(), Some("User needs to be synced first"));
    }
}
