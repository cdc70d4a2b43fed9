//! User directory: find, create-if-absent, diff-update and deactivate.
//!
//! The document store has no unique index on `clerk_id`, so every create is
//! preceded by a lookup. Within this process, writes for the same provider ID
//! are serialized by a per-user async lock; across processes the lookup
//! immediately before create is the only guard.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use serde::Serialize;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::instrument;

use aabhushan_core::{ProviderUserId, UserRole};

use super::sync::SyncError;
use crate::db::{RepositoryError, UserStore};
use crate::identity::IdentityProfile;
use crate::models::{UserDocument, UserPatch};

/// What a sync call did to the user document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncAction {
    Created,
    FoundExisting,
    Updated,
    NoChanges,
}

/// Result of a sync: the current document and what happened to it.
#[derive(Debug, Clone)]
pub struct SyncOutcome {
    pub user: UserDocument,
    pub action: SyncAction,
}

/// Per-user async locks.
///
/// An entry lives while any caller holds or waits on it, so two writers for
/// the same ID always share one mutex.
#[derive(Clone, Default)]
struct UserLocks {
    entries: Arc<Mutex<HashMap<ProviderUserId, Arc<Mutex<()>>>>>,
}

impl UserLocks {
    async fn acquire(&self, provider_id: &ProviderUserId) -> OwnedMutexGuard<()> {
        let lock = {
            let mut entries = self.entries.lock().await;
            entries.retain(|_, lock| Arc::strong_count(lock) > 1);
            Arc::clone(entries.entry(provider_id.clone()).or_default())
        };
        lock.lock_owned().await
    }

    #[cfg(test)]
    async fn len(&self) -> usize {
        let mut entries = self.entries.lock().await;
        entries.retain(|_, lock| Arc::strong_count(lock) > 1);
        entries.len()
    }
}

/// Access to user documents with upsert semantics.
#[derive(Clone)]
pub struct UserDirectory {
    store: Arc<dyn UserStore>,
    locks: UserLocks,
}

impl UserDirectory {
    /// Create a directory over a store.
    #[must_use]
    pub fn new(store: Arc<dyn UserStore>) -> Self {
        Self {
            store,
            locks: UserLocks::default(),
        }
    }

    /// The underlying store.
    #[must_use]
    pub fn store(&self) -> &Arc<dyn UserStore> {
        &self.store
    }

    async fn lock(&self, provider_id: &ProviderUserId) -> OwnedMutexGuard<()> {
        self.locks.acquire(provider_id).await
    }

    /// First document for a provider ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the store query fails.
    pub async fn find(
        &self,
        provider_id: &ProviderUserId,
    ) -> Result<Option<UserDocument>, RepositoryError> {
        self.store.find_by_provider_id(provider_id).await
    }

    /// Return the existing document or create one.
    ///
    /// # Errors
    ///
    /// Returns `SyncError::Profile` if a create is needed and the profile has
    /// no email, or `SyncError::Repository` if the store fails.
    #[instrument(skip(self, profile), fields(provider_id = %profile.provider_id))]
    pub async fn create_if_absent(&self, profile: &IdentityProfile) -> Result<SyncOutcome, SyncError> {
        let _guard = self.lock(&profile.provider_id).await;
        match self.find(&profile.provider_id).await? {
            Some(user) => {
                tracing::info!(document_id = %user.id, "User already exists");
                Ok(SyncOutcome {
                    user,
                    action: SyncAction::FoundExisting,
                })
            }
            None => self.create(profile).await,
        }
    }

    /// Create the document if absent, otherwise apply the profile.
    ///
    /// # Errors
    ///
    /// Returns `SyncError` if a create is needed without an email, or the store fails.
    #[instrument(skip(self, profile), fields(provider_id = %profile.provider_id))]
    pub async fn upsert(&self, profile: &IdentityProfile) -> Result<SyncOutcome, SyncError> {
        let _guard = self.lock(&profile.provider_id).await;
        match self.find(&profile.provider_id).await? {
            Some(existing) => self.apply_profile(&existing, profile).await,
            None => {
                tracing::info!("User missing on update, creating");
                self.create(profile).await
            }
        }
    }

    /// Look the user up with retries, then create or update.
    ///
    /// Covers the window where a document written by a concurrent request is
    /// not yet visible to queries.
    ///
    /// # Errors
    ///
    /// Returns `SyncError` if a create is needed without an email, or the store fails.
    #[instrument(skip(self, profile), fields(provider_id = %profile.provider_id))]
    pub async fn reconcile_with_retry(
        &self,
        profile: &IdentityProfile,
        max_attempts: u32,
        retry_delay: Duration,
    ) -> Result<SyncOutcome, SyncError> {
        let _guard = self.lock(&profile.provider_id).await;

        let mut existing = None;
        for attempt in 1..=max_attempts.max(1) {
            existing = self.find(&profile.provider_id).await?;
            if existing.is_some() {
                break;
            }
            if attempt < max_attempts {
                tracing::debug!(attempt, "User not visible yet, retrying lookup");
                tokio::time::sleep(retry_delay).await;
            }
        }

        if let Some(existing) = existing {
            return self.apply_profile(&existing, profile).await;
        }

        // Final check right before creating
        if let Some(user) = self.find(&profile.provider_id).await? {
            tracing::info!(document_id = %user.id, "User appeared before create");
            return Ok(SyncOutcome {
                user,
                action: SyncAction::FoundExisting,
            });
        }

        self.create(profile).await
    }

    async fn create(&self, profile: &IdentityProfile) -> Result<SyncOutcome, SyncError> {
        let new_user = profile.to_new_user(Utc::now())?;
        let user = self.store.create(&new_user).await?;
        tracing::info!(document_id = %user.id, "User created");
        Ok(SyncOutcome {
            user,
            action: SyncAction::Created,
        })
    }

    /// Write the fields of `profile` that differ from `existing`.
    ///
    /// # Errors
    ///
    /// Returns `SyncError::Repository` if the update fails.
    pub async fn apply_profile(
        &self,
        existing: &UserDocument,
        profile: &IdentityProfile,
    ) -> Result<SyncOutcome, SyncError> {
        let patch = profile.diff(existing);
        if patch.is_empty() {
            return Ok(SyncOutcome {
                user: existing.clone(),
                action: SyncAction::NoChanges,
            });
        }

        tracing::info!(fields = ?patch.changed_fields(), "Updating user");
        let user = self
            .store
            .update(&existing.id, &patch.stamped(Utc::now()))
            .await?;
        Ok(SyncOutcome {
            user,
            action: SyncAction::Updated,
        })
    }

    /// Mark a user inactive. Returns `None` without writing if absent.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the store fails.
    #[instrument(skip(self))]
    pub async fn deactivate(
        &self,
        provider_id: &ProviderUserId,
    ) -> Result<Option<UserDocument>, RepositoryError> {
        let _guard = self.lock(provider_id).await;
        let Some(existing) = self.find(provider_id).await? else {
            tracing::info!("User not found for deactivation");
            return Ok(None);
        };
        if !existing.is_active {
            return Ok(Some(existing));
        }

        let patch = UserPatch {
            is_active: Some(false),
            ..UserPatch::default()
        };
        let user = self
            .store
            .update(&existing.id, &patch.stamped(Utc::now()))
            .await?;
        tracing::info!(document_id = %user.id, "User deactivated");
        Ok(Some(user))
    }

    /// Change a user's role.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user does not exist.
    #[instrument(skip(self))]
    pub async fn set_role(
        &self,
        provider_id: &ProviderUserId,
        role: UserRole,
    ) -> Result<UserDocument, RepositoryError> {
        let _guard = self.lock(provider_id).await;
        let existing = self
            .find(provider_id)
            .await?
            .ok_or(RepositoryError::NotFound)?;
        if existing.role == role {
            return Ok(existing);
        }

        let patch = UserPatch {
            role: Some(role),
            ..UserPatch::default()
        };
        self.store
            .update(&existing.id, &patch.stamped(Utc::now()))
            .await
    }

    /// Documents, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the store fails.
    pub async fn list(&self, limit: u32, offset: u32) -> Result<Vec<UserDocument>, RepositoryError> {
        self.store.list(limit, offset).await
    }
}
