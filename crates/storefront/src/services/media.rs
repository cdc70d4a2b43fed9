//! Product image uploads.

use std::sync::Arc;

use thiserror::Error;
use tracing::instrument;

use crate::db::{MediaStore, RepositoryError};

/// Largest accepted image.
pub const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;

/// Errors uploading images.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("No files provided")]
    NoFiles,
    #[error("File {0} is not an image")]
    NotAnImage(String),
    #[error("File {name} is too large. Maximum size is 5MB")]
    TooLarge { name: String, size: usize },
    #[error("storage error: {0}")]
    Repository(#[from] RepositoryError),
}

/// One file from a multipart upload.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl ImageUpload {
    /// Check content type and size.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotAnImage` or `StorageError::TooLarge`.
    pub fn validate(&self) -> Result<(), StorageError> {
        if !self.content_type.starts_with("image/") {
            return Err(StorageError::NotAnImage(self.file_name.clone()));
        }
        if self.bytes.len() > MAX_IMAGE_BYTES {
            return Err(StorageError::TooLarge {
                name: self.file_name.clone(),
                size: self.bytes.len(),
            });
        }
        Ok(())
    }
}

/// Validates and stores product images.
#[derive(Clone)]
pub struct MediaService {
    store: Arc<dyn MediaStore>,
}

impl MediaService {
    #[must_use]
    pub fn new(store: Arc<dyn MediaStore>) -> Self {
        Self { store }
    }

    /// Upload every file and return their URLs in order.
    ///
    /// All files are validated before the first upload, so a bad file in the
    /// batch stores nothing.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the batch is empty, a file is invalid, or the
    /// store rejects an upload.
    #[instrument(skip(self, files), fields(count = files.len()))]
    pub async fn upload_images(&self, files: Vec<ImageUpload>) -> Result<Vec<String>, StorageError> {
        if files.is_empty() {
            return Err(StorageError::NoFiles);
        }
        for file in &files {
            file.validate()?;
        }

        let mut urls = Vec::with_capacity(files.len());
        for file in files {
            let url = self
                .store
                .upload(&file.file_name, &file.content_type, file.bytes)
                .await?;
            urls.push(url);
        }
        tracing::info!(count = urls.len(), "Images uploaded");
        Ok(urls)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use crate::db::MemoryMediaStore;

    use super::*;

    fn upload(name: &str, content_type: &str, size: usize) -> ImageUpload {
        ImageUpload {
            file_name: name.to_string(),
            content_type: content_type.to_string(),
            bytes: vec![0; size],
        }
    }

    #[test]
    fn test_validate() {
        assert!(upload("a.png", "image/png", 10).validate().is_ok());
        assert!(matches!(
            upload("a.pdf", "application/pdf", 10).validate(),
            Err(StorageError::NotAnImage(name)) if name == "a.pdf"
        ));
        assert!(upload("max.jpg", "image/jpeg", MAX_IMAGE_BYTES).validate().is_ok());
        assert!(matches!(
            upload("big.jpg", "image/jpeg", MAX_IMAGE_BYTES + 1).validate(),
            Err(StorageError::TooLarge { .. })
        ));
    }

    #[tokio::test]
    async fn test_invalid_file_stores_nothing() {
        let store = Arc::new(MemoryMediaStore::new("http://localhost:3000"));
        let service = MediaService::new(store.clone());
        let result = service
            .upload_images(vec![
                upload("ok.png", "image/png", 10),
                upload("notes.txt", "text/plain", 10),
            ])
            .await;
        assert!(matches!(result, Err(StorageError::NotAnImage(_))));
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_upload_images() {
        let store = Arc::new(MemoryMediaStore::new("http://localhost:3000"));
        let service = MediaService::new(store.clone());
        let urls = service
            .upload_images(vec![
                upload("a.png", "image/png", 10),
                upload("b.webp", "image/webp", 10),
            ])
            .await
            .unwrap();
        assert_eq!(urls.len(), 2);
        assert!(urls[1].ends_with("/b.webp"));
        assert_eq!(store.len().await, 2);
    }

    #[tokio::test]
    async fn test_empty_batch() {
        let service = MediaService::new(Arc::new(MemoryMediaStore::new("http://x")));
        assert!(matches!(
            service.upload_images(Vec::new()).await,
            Err(StorageError::NoFiles)
        ));
    }
}
