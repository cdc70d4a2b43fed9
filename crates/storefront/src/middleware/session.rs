//! Session verification and session sync.
//!
//! Every request carrying a valid provider session token gets a [`Session`]
//! extension. If that user has not been reconciled within the session sync
//! TTL, their provider record is fetched and written through the user
//! directory before the handler runs, so a freshly signed-in user has a
//! document by the time the first API call lands.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use tracing::Span;

use crate::error::set_sentry_user;
use crate::identity::Session;
use crate::identity::session::token_from_headers;
use crate::state::AppState;

/// Paths that reconcile users themselves or must stay cheap.
const SYNC_EXEMPT_PREFIXES: [&str; 3] = ["/api/webhook", "/api/sync-user", "/health"];

fn is_sync_exempt(path: &str) -> bool {
    SYNC_EXEMPT_PREFIXES
        .iter()
        .any(|prefix| path.starts_with(prefix))
}

/// Verify the session token, if any, and run session sync.
///
/// Never rejects a request: routes that need a session use
/// [`RequireSession`](super::RequireSession).
pub async fn session_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let session = state.session_verifier().and_then(|verifier| {
        let token = token_from_headers(request.headers())?;
        verifier
            .verify(token)
            .inspect_err(|e| tracing::debug!(error = %e, "Ignoring invalid session token"))
            .ok()
    });

    if let Some(session) = session {
        Span::current().record("user_id", session.user_id.as_str());
        set_sentry_user(&session.user_id, None);

        if !is_sync_exempt(request.uri().path()) {
            sync_if_stale(&state, &session).await;
        }
        request.extensions_mut().insert(session);
    }

    next.run(request).await
}

/// Reconcile the session user unless it was done within the TTL.
///
/// Failures are logged; the request proceeds either way and the next request
/// retries.
pub async fn sync_if_stale(state: &AppState, session: &Session) {
    let Some(provider) = state.provider() else {
        return;
    };
    if state.synced_sessions().contains_key(&session.user_id) {
        return;
    }

    let user = match provider.get_user(&session.user_id).await {
        Ok(user) => user,
        Err(e) => {
            tracing::warn!(
                provider_id = %session.user_id,
                error = %e,
                "Session sync: failed to fetch provider user"
            );
            return;
        }
    };

    match state.sync().sync_provider_user(&user).await {
        Ok(outcome) => {
            tracing::debug!(
                provider_id = %session.user_id,
                action = ?outcome.action,
                "Session sync complete"
            );
            state
                .synced_sessions()
                .insert(session.user_id.clone(), ())
                .await;
        }
        Err(e) => {
            tracing::warn!(
                provider_id = %session.user_id,
                error = %e,
                "Session sync failed"
            );
        }
    }
}
