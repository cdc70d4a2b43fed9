//! Authentication extractors.
//!
//! The session middleware puts a verified [`Session`] into request
//! extensions; these extractors read it back in handlers.

use axum::{extract::FromRequestParts, http::request::Parts};

use crate::error::AppError;
use crate::identity::Session;
use crate::models::UserDocument;
use crate::state::AppState;

/// Extractor that requires a verified session.
///
/// Rejects with 401 when the request has no valid session token.
///
/// # Example
///
/// ```rust,ignore
/// async fn handler(RequireSession(session): RequireSession) -> String {
///     session.user_id.to_string()
/// }
/// ```
#[derive(Debug, Clone)]
pub struct RequireSession(pub Session);

impl<S> FromRequestParts<S> for RequireSession
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Session>()
            .cloned()
            .map(Self)
            .ok_or(AppError::Unauthorized)
    }
}

/// Extractor that requires an active admin user document.
///
/// - 401 without a session
/// - 403 when the user has no document, is inactive, or is not an admin
#[derive(Debug, Clone)]
pub struct RequireAdmin(pub UserDocument);

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let RequireSession(session) = RequireSession::from_request_parts(parts, state).await?;

        let user = state
            .directory()
            .find(&session.user_id)
            .await?
            .filter(UserDocument::can_administer)
            .ok_or_else(|| {
                tracing::warn!(provider_id = %session.user_id, "Admin access denied");
                AppError::Forbidden("Admin access required".to_string())
            })?;

        Ok(Self(user))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::http::Request;

    use aabhushan_core::ProviderUserId;

    use super::*;

    fn parts(session: Option<Session>) -> Parts {
        let mut request = Request::builder().uri("/api/user").body(()).unwrap();
        if let Some(session) = session {
            request.extensions_mut().insert(session);
        }
        request.into_parts().0
    }

    fn session() -> Session {
        Session {
            user_id: ProviderUserId::parse("user_2abc").unwrap(),
            session_id: Some("sess_1".to_string()),
        }
    }

    #[tokio::test]
    async fn test_require_session_reads_extension() {
        let RequireSession(found) =
            RequireSession::from_request_parts(&mut parts(Some(session())), &())
                .await
                .unwrap();
        assert_eq!(found.user_id.as_str(), "user_2abc");
    }

    #[tokio::test]
    async fn test_require_session_rejects_anonymous() {
        let err = RequireSession::from_request_parts(&mut parts(None), &())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Unauthorized));
    }
}
