//! In-memory document store for local development and tests.
//!
//! Mirrors the hosted store's semantics: no unique index on `clerk_id`, IDs
//! assigned on create, newest-first listing. Documents can also be staged to
//! appear only after a number of lookups, which reproduces the hosted store's
//! read-after-write lag.

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::sync::Mutex;
use uuid::Uuid;

use aabhushan_core::{DocumentId, ProviderUserId};

use super::{MediaStore, RepositoryError, UserStore};
use crate::models::{NewUser, UserDocument, UserPatch};

#[derive(Default)]
struct Inner {
    /// Visible documents in insertion order.
    documents: Vec<UserDocument>,
    /// Documents that become visible once `find_calls` reaches the threshold.
    staged: Vec<(usize, UserDocument)>,
}

/// Process-local users collection.
#[derive(Default)]
pub struct MemoryUserStore {
    inner: Mutex<Inner>,
    find_calls: AtomicUsize,
    create_calls: AtomicUsize,
    update_calls: AtomicUsize,
}

impl MemoryUserStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a document directly, bypassing the create path.
    pub async fn insert(&self, document: UserDocument) {
        self.inner.lock().await.documents.push(document);
    }

    /// Stage a document that becomes visible after `lookups` more
    /// `find_by_provider_id` calls.
    pub async fn insert_after_lookups(&self, document: UserDocument, lookups: usize) {
        let threshold = self.find_calls.load(Ordering::SeqCst) + lookups;
        self.inner.lock().await.staged.push((threshold, document));
    }

    /// Number of `find_by_provider_id` calls so far.
    pub fn find_calls(&self) -> usize {
        self.find_calls.load(Ordering::SeqCst)
    }

    /// Number of documents created through the store API.
    pub fn create_calls(&self) -> usize {
        self.create_calls.load(Ordering::SeqCst)
    }

    /// Number of updates written through the store API.
    pub fn update_calls(&self) -> usize {
        self.update_calls.load(Ordering::SeqCst)
    }

    /// All visible documents for a provider ID (duplicates included).
    pub async fn documents_for(&self, provider_id: &ProviderUserId) -> Vec<UserDocument> {
        self.inner
            .lock()
            .await
            .documents
            .iter()
            .filter(|d| &d.clerk_id == provider_id)
            .cloned()
            .collect()
    }

    fn promote_staged(inner: &mut Inner, calls: usize) {
        let (ready, waiting): (Vec<_>, Vec<_>) = std::mem::take(&mut inner.staged)
            .into_iter()
            .partition(|(threshold, _)| *threshold <= calls);
        inner.staged = waiting;
        inner
            .documents
            .extend(ready.into_iter().map(|(_, document)| document));
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn find_by_provider_id(
        &self,
        provider_id: &ProviderUserId,
    ) -> Result<Option<UserDocument>, RepositoryError> {
        let calls = self.find_calls.fetch_add(1, Ordering::SeqCst) + 1;
        let mut inner = self.inner.lock().await;
        Self::promote_staged(&mut inner, calls);
        Ok(inner
            .documents
            .iter()
            .find(|d| &d.clerk_id == provider_id)
            .cloned())
    }

    async fn create(&self, user: &NewUser) -> Result<UserDocument, RepositoryError> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);
        let id = DocumentId::parse(&Uuid::new_v4().simple().to_string())
            .map_err(|e| RepositoryError::DataCorruption(e.to_string()))?;
        let document = user.clone().into_document(id);
        self.inner.lock().await.documents.push(document.clone());
        Ok(document)
    }

    async fn update(
        &self,
        id: &DocumentId,
        patch: &UserPatch,
    ) -> Result<UserDocument, RepositoryError> {
        self.update_calls.fetch_add(1, Ordering::SeqCst);
        let mut inner = self.inner.lock().await;
        let document = inner
            .documents
            .iter_mut()
            .find(|d| &d.id == id)
            .ok_or(RepositoryError::NotFound)?;
        document.apply(patch);
        Ok(document.clone())
    }

    async fn list(&self, limit: u32, offset: u32) -> Result<Vec<UserDocument>, RepositoryError> {
        let inner = self.inner.lock().await;
        Ok(inner
            .documents
            .iter()
            .rev()
            .skip(offset as usize)
            .take(limit as usize)
            .cloned()
            .collect())
    }

    async fn ping(&self) -> Result<(), RepositoryError> {
        Ok(())
    }
}

/// Media store that keeps uploads in memory and serves nothing.
pub struct MemoryMediaStore {
    base_url: String,
    files: Mutex<Vec<(String, String, usize)>>,
}

impl MemoryMediaStore {
    /// Create a store whose URLs are rooted at `base_url`.
    #[must_use]
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_owned(),
            files: Mutex::new(Vec::new()),
        }
    }

    /// Number of files uploaded so far.
    pub async fn len(&self) -> usize {
        self.files.lock().await.len()
    }

    /// True when nothing has been uploaded.
    pub async fn is_empty(&self) -> bool {
        self.files.lock().await.is_empty()
    }
}

#[async_trait]
impl MediaStore for MemoryMediaStore {
    async fn upload(
        &self,
        file_name: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<String, RepositoryError> {
        let id = Uuid::new_v4().simple().to_string();
        self.files
            .lock()
            .await
            .push((id.clone(), content_type.to_owned(), bytes.len()));
        Ok(format!("{}/media/{id}/{file_name}", self.base_url))
    }
}
