//! Application state shared across handlers.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;

use aabhushan_core::{IdError, ProviderUserId};

use crate::catalog::Catalog;
use crate::config::{StoreConfig, StorefrontConfig};
use crate::db::{self, MediaStore, RepositoryError, UserStore};
use crate::identity::webhook::TIMESTAMP_TOLERANCE_SECS;
use crate::identity::{
    ProviderClient, ProviderError, SessionError, SessionVerifier, WebhookError, WebhookVerifier,
};
use crate::services::{MediaService, UserDirectory, UserSyncService};

/// Error building application state.
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("document store: {0}")]
    Repository(#[from] RepositoryError),
    #[error("webhook secret: {0}")]
    Webhook(#[from] WebhookError),
    #[error("session key: {0}")]
    Session(#[from] SessionError),
    #[error("identity provider client: {0}")]
    Provider(#[from] ProviderError),
    #[error("catalog: {0}")]
    Catalog(#[from] IdError),
}

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to the
/// stores, verifiers and caches every request may need.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    sync: UserSyncService,
    media: MediaService,
    webhook_verifier: Option<WebhookVerifier>,
    session_verifier: Option<SessionVerifier>,
    provider: Option<ProviderClient>,
    catalog: Catalog,
    /// Webhook message ids already processed.
    seen_webhooks: Cache<String, ()>,
    /// Provider ids whose document was reconciled recently.
    synced_sessions: Cache<ProviderUserId, ()>,
}

impl AppState {
    /// Create application state with the stores selected by `config`.
    ///
    /// # Errors
    ///
    /// Returns an error if a store client, verifier or the catalog cannot be
    /// built.
    pub fn new(config: StorefrontConfig) -> Result<Self, StateError> {
        let (users, media) = db::create_stores(&config)?;
        Self::with_stores(config, users, media)
    }

    /// Create application state over explicit stores.
    ///
    /// # Errors
    ///
    /// Returns an error if a verifier, the provider client or the catalog
    /// cannot be built.
    pub fn with_stores(
        config: StorefrontConfig,
        users: Arc<dyn UserStore>,
        media: Arc<dyn MediaStore>,
    ) -> Result<Self, StateError> {
        let identity = &config.identity;

        let webhook_verifier = identity
            .webhook_secret
            .as_ref()
            .map(WebhookVerifier::from_secret)
            .transpose()?;
        let session_verifier = identity
            .jwt_public_key
            .as_deref()
            .map(|pem| SessionVerifier::from_pem(pem, identity.authorized_parties.clone()))
            .transpose()?;
        let provider = identity
            .secret_key
            .as_ref()
            .map(|key| ProviderClient::new(&identity.api_url, key))
            .transpose()?;

        if webhook_verifier.is_none() {
            tracing::warn!("CLERK_WEBHOOK_SECRET not set; webhook deliveries will be rejected");
        }
        if session_verifier.is_none() {
            tracing::warn!("CLERK_JWT_KEY not set; every request is anonymous");
        }
        if provider.is_none() {
            tracing::info!("CLERK_SECRET_KEY not set; session sync disabled");
        }

        let sync = UserSyncService::new(UserDirectory::new(users), config.sync);
        let seen_webhooks = Cache::builder()
            .max_capacity(10_000)
            .time_to_live(Duration::from_secs(TIMESTAMP_TOLERANCE_SECS.unsigned_abs()))
            .build();
        let synced_sessions = Cache::builder()
            .max_capacity(100_000)
            .time_to_live(config.sync.session_sync_ttl)
            .build();

        Ok(Self {
            inner: Arc::new(AppStateInner {
                sync,
                media: MediaService::new(media),
                webhook_verifier,
                session_verifier,
                provider,
                catalog: Catalog::sample()?,
                seen_webhooks,
                synced_sessions,
                config,
            }),
        })
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// User sync entry points.
    #[must_use]
    pub fn sync(&self) -> &UserSyncService {
        &self.inner.sync
    }

    /// User document access.
    #[must_use]
    pub fn directory(&self) -> &UserDirectory {
        self.inner.sync.directory()
    }

    #[must_use]
    pub fn media(&self) -> &MediaService {
        &self.inner.media
    }

    /// Webhook signature verifier, if a secret is configured.
    #[must_use]
    pub fn webhook_verifier(&self) -> Option<&WebhookVerifier> {
        self.inner.webhook_verifier.as_ref()
    }

    /// Session token verifier, if a public key is configured.
    #[must_use]
    pub fn session_verifier(&self) -> Option<&SessionVerifier> {
        self.inner.session_verifier.as_ref()
    }

    /// Identity provider backend client, if a secret key is configured.
    #[must_use]
    pub fn provider(&self) -> Option<&ProviderClient> {
        self.inner.provider.as_ref()
    }

    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.inner.catalog
    }

    #[must_use]
    pub fn seen_webhooks(&self) -> &Cache<String, ()> {
        &self.inner.seen_webhooks
    }

    #[must_use]
    pub fn synced_sessions(&self) -> &Cache<ProviderUserId, ()> {
        &self.inner.synced_sessions
    }

    /// Whether the database id and the users collection id are configured.
    #[must_use]
    pub fn store_ids_configured(&self) -> (bool, bool) {
        match &self.inner.config.store {
            StoreConfig::Appwrite(appwrite) => (
                !appwrite.database_id.is_empty(),
                !appwrite.users_collection_id.is_empty(),
            ),
            StoreConfig::Memory => (true, true),
        }
    }
}
