//! User synchronization entry points.
//!
//! Three paths keep user documents in line with the identity provider:
//!
//! - the sync route, called by the client after sign-in
//! - session sync, run by middleware for sessions not synced recently
//! - the lifecycle webhook
//!
//! All three map their input through `IdentityProfile` and write through
//! `UserDirectory`.

use thiserror::Error;
use tracing::instrument;

use aabhushan_core::ProviderUserId;

use super::users::{SyncOutcome, UserDirectory};
use crate::config::SyncConfig;
use crate::db::RepositoryError;
use crate::identity::{IdentityEvent, IdentityProfile, ProfileError, ProviderUser, Session, SyncUserData};
use crate::models::UserDocument;

/// Errors from a sync operation.
#[derive(Debug, Error)]
pub enum SyncError {
    /// The request body did not name a user.
    #[error("missing clerkId")]
    MissingProviderId,

    /// The body names a different user than the session.
    #[error("clerkId does not match the session user")]
    ProviderMismatch,

    /// The payload could not be mapped to a profile.
    #[error("invalid profile: {0}")]
    Profile(#[from] ProfileError),

    /// The document store failed.
    #[error("repository error: {0}")]
    Repository(#[from] RepositoryError),
}

/// What a webhook delivery did.
#[derive(Debug, Clone)]
pub enum WebhookOutcome {
    /// `user.created` or `user.updated` processed.
    Synced(SyncOutcome),
    /// `user.deleted` processed; `None` when the user was never stored.
    Deactivated(Option<UserDocument>),
    /// Event type the storefront does not act on.
    Unhandled(String),
}

/// Orchestrates the sync entry points.
#[derive(Clone)]
pub struct UserSyncService {
    directory: UserDirectory,
    config: SyncConfig,
}

impl UserSyncService {
    /// Create the service.
    #[must_use]
    pub const fn new(directory: UserDirectory, config: SyncConfig) -> Self {
        Self { directory, config }
    }

    /// The directory this service writes through.
    #[must_use]
    pub const fn directory(&self) -> &UserDirectory {
        &self.directory
    }

    /// Sync route: reconcile the signed-in user from client-supplied data.
    ///
    /// # Errors
    ///
    /// - `SyncError::MissingProviderId` if the body has no `clerkId`
    /// - `SyncError::ProviderMismatch` if it names another user
    /// - `SyncError::Profile` / `SyncError::Repository` on mapping or store failure
    #[instrument(skip(self, session, data), fields(provider_id = %session.user_id))]
    pub async fn sync_session_user(
        &self,
        session: &Session,
        data: &SyncUserData,
    ) -> Result<SyncOutcome, SyncError> {
        let claimed = data
            .clerk_id
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or(SyncError::MissingProviderId)?;
        if claimed != session.user_id.as_str() {
            tracing::warn!(claimed, "Sync request for another user");
            return Err(SyncError::ProviderMismatch);
        }

        let profile = IdentityProfile::from_sync_data(data)?;
        self.directory
            .reconcile_with_retry(&profile, self.config.max_attempts, self.config.retry_delay)
            .await
    }

    /// Session sync: reconcile from the provider's own user record.
    ///
    /// # Errors
    ///
    /// Returns `SyncError` if the record cannot be mapped or the store fails.
    #[instrument(skip(self, user))]
    pub async fn sync_provider_user(&self, user: &ProviderUser) -> Result<SyncOutcome, SyncError> {
        let profile = IdentityProfile::from_provider_user(user)?;
        self.directory.upsert(&profile).await
    }

    /// Webhook: apply one lifecycle event.
    ///
    /// # Errors
    ///
    /// Returns `SyncError` if the payload cannot be mapped or the store fails.
    #[instrument(skip(self, event))]
    pub async fn handle_event(&self, event: IdentityEvent) -> Result<WebhookOutcome, SyncError> {
        match event {
            IdentityEvent::UserCreated(user) => {
                let profile = IdentityProfile::from_provider_user(&user)?;
                tracing::info!(provider_id = %profile.provider_id, "Processing user.created");
                Ok(WebhookOutcome::Synced(
                    self.directory.create_if_absent(&profile).await?,
                ))
            }
            IdentityEvent::UserUpdated(user) => {
                let profile = IdentityProfile::from_provider_user(&user)?;
                tracing::info!(provider_id = %profile.provider_id, "Processing user.updated");
                Ok(WebhookOutcome::Synced(self.directory.upsert(&profile).await?))
            }
            IdentityEvent::UserDeleted(deleted) => {
                let provider_id = ProviderUserId::parse(
                    deleted.id.as_deref().ok_or(ProfileError::MissingId)?,
                )
                .map_err(ProfileError::from)?;
                tracing::info!(%provider_id, "Processing user.deleted");
                Ok(WebhookOutcome::Deactivated(
                    self.directory.deactivate(&provider_id).await?,
                ))
            }
            IdentityEvent::Unhandled(event_type) => {
                tracing::debug!(%event_type, "Ignoring webhook event");
                Ok(WebhookOutcome::Unhandled(event_type))
            }
        }
    }
}
