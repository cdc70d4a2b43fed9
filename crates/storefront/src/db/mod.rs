//! Document store access for storefront users and media.
//!
//! # Collections
//!
//! - `users` - One document per identity-provider user, keyed by `clerk_id`
//!
//! # Buckets
//!
//! - product images uploaded through the admin API
//!
//! # Backends
//!
//! - [`appwrite`] - Hosted Appwrite project over its REST API
//! - [`memory`] - Process-local store for development and tests
//!
//! The store has no unique index on `clerk_id`, so callers must look a user up
//! immediately before creating one (see `services::users::UserDirectory`).

pub mod appwrite;
pub mod memory;

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use aabhushan_core::{DocumentId, ProviderUserId};

use crate::config::{StoreConfig, StorefrontConfig};
use crate::models::{NewUser, UserDocument, UserPatch};

pub use appwrite::{AppwriteClient, AppwriteMediaStore, AppwriteUserStore};
pub use memory::{MemoryMediaStore, MemoryUserStore};

/// Errors that can occur during document store operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Transport error talking to the store.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// The store rejected the request.
    #[error("store error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Data in the store is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., document already exists).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

/// Accessor for the users collection.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Short backend name for logs.
    fn backend(&self) -> &'static str;

    /// First document whose `clerk_id` equals `provider_id`.
    async fn find_by_provider_id(
        &self,
        provider_id: &ProviderUserId,
    ) -> Result<Option<UserDocument>, RepositoryError>;

    /// Create a document with a store-assigned ID.
    async fn create(&self, user: &NewUser) -> Result<UserDocument, RepositoryError>;

    /// Write the `Some` fields of `patch` and return the updated document.
    ///
    /// Returns `RepositoryError::NotFound` when the document does not exist.
    async fn update(
        &self,
        id: &DocumentId,
        patch: &UserPatch,
    ) -> Result<UserDocument, RepositoryError>;

    /// Documents ordered newest first.
    async fn list(&self, limit: u32, offset: u32) -> Result<Vec<UserDocument>, RepositoryError>;

    /// Cheap round trip used by the readiness probe.
    async fn ping(&self) -> Result<(), RepositoryError>;
}

/// Upload target for product images.
#[async_trait]
pub trait MediaStore: Send + Sync {
    /// Store a file and return its public view URL.
    async fn upload(
        &self,
        file_name: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<String, RepositoryError>;
}

/// Build the user and media stores selected by configuration.
///
/// # Errors
///
/// Returns `RepositoryError::Http` if the HTTP client cannot be built.
pub fn create_stores(
    config: &StorefrontConfig,
) -> Result<(Arc<dyn UserStore>, Arc<dyn MediaStore>), RepositoryError> {
    match &config.store {
        StoreConfig::Appwrite(appwrite) => {
            let client = AppwriteClient::new(appwrite)?;
            Ok((
                Arc::new(AppwriteUserStore::new(client.clone(), appwrite)),
                Arc::new(AppwriteMediaStore::new(client, appwrite)),
            ))
        }
        StoreConfig::Memory => Ok((
            Arc::new(MemoryUserStore::new()),
            Arc::new(MemoryMediaStore::new(&config.base_url)),
        )),
    }
}
