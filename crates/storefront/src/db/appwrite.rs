//! Appwrite REST client for the users collection and the media bucket.
//!
//! Queries use Appwrite's JSON query syntax passed as repeated `queries[]`
//! parameters, e.g. `{"method":"equal","attribute":"clerk_id","values":["user_1"]}`.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::multipart::{Form, Part};
use secrecy::ExposeSecret;
use serde::Deserialize;
use serde_json::json;
use tracing::instrument;

use aabhushan_core::{DocumentId, ProviderUserId};

use super::{MediaStore, RepositoryError, UserStore};
use crate::config::AppwriteConfig;
use crate::models::{NewUser, UserDocument, UserPatch};

/// Let the server assign the document or file ID.
const UNIQUE_ID: &str = "unique()";

/// Thin authenticated HTTP client for one Appwrite project.
#[derive(Clone)]
pub struct AppwriteClient {
    http: reqwest::Client,
    endpoint: String,
    project_id: String,
}

impl AppwriteClient {
    /// Create a client with the project and API key headers preset.
    ///
    /// # Errors
    ///
    /// Returns error if the API key is not a valid header value or the HTTP
    /// client fails to build.
    pub fn new(config: &AppwriteConfig) -> Result<Self, RepositoryError> {
        let mut headers = HeaderMap::new();

        headers.insert(
            "X-Appwrite-Project",
            HeaderValue::from_str(&config.project_id).map_err(|e| {
                RepositoryError::DataCorruption(format!("Invalid project id: {e}"))
            })?,
        );

        let mut key = HeaderValue::from_str(config.api_key.expose_secret())
            .map_err(|e| RepositoryError::DataCorruption(format!("Invalid API key format: {e}")))?;
        key.set_sensitive(true);
        headers.insert("X-Appwrite-Key", key);

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(std::time::Duration::from_secs(15))
            .build()?;

        Ok(Self {
            http,
            endpoint: config.endpoint.clone(),
            project_id: config.project_id.clone(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.endpoint)
    }
}

/// Error body returned by Appwrite.
#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    #[serde(default)]
    message: String,
}

/// List response wrapper.
#[derive(Debug, Deserialize)]
struct DocumentList<T> {
    documents: Vec<T>,
}

/// Map a non-success response to a `RepositoryError`.
async fn error_for(response: reqwest::Response) -> RepositoryError {
    let status = response.status();
    let message = response
        .json::<ApiErrorBody>()
        .await
        .map(|body| body.message)
        .unwrap_or_default();

    match status.as_u16() {
        404 => RepositoryError::NotFound,
        409 => RepositoryError::Conflict(message),
        code => RepositoryError::Api {
            status: code,
            message,
        },
    }
}

/// Decode a successful JSON response, treating shape mismatches as corruption.
async fn decode<T: serde::de::DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T, RepositoryError> {
    if !response.status().is_success() {
        return Err(error_for(response).await);
    }
    let bytes = response.bytes().await?;
    serde_json::from_slice(&bytes)
        .map_err(|e| RepositoryError::DataCorruption(format!("unexpected response shape: {e}")))
}

fn equal_query(attribute: &str, value: &str) -> String {
    json!({ "method": "equal", "attribute": attribute, "values": [value] }).to_string()
}

fn limit_query(limit: u32) -> String {
    json!({ "method": "limit", "values": [limit] }).to_string()
}

fn offset_query(offset: u32) -> String {
    json!({ "method": "offset", "values": [offset] }).to_string()
}

fn order_desc_query(attribute: &str) -> String {
    json!({ "method": "orderDesc", "attribute": attribute }).to_string()
}

/// Users collection accessor.
#[derive(Clone)]
pub struct AppwriteUserStore {
    client: AppwriteClient,
    documents_path: String,
}

impl AppwriteUserStore {
    /// Create an accessor for the configured users collection.
    #[must_use]
    pub fn new(client: AppwriteClient, config: &AppwriteConfig) -> Self {
        Self {
            client,
            documents_path: format!(
                "/databases/{}/collections/{}/documents",
                config.database_id, config.users_collection_id
            ),
        }
    }

    fn documents_url(&self) -> String {
        self.client.url(&self.documents_path)
    }

    fn document_url(&self, id: &DocumentId) -> String {
        format!("{}/{}", self.documents_url(), id)
    }
}

#[async_trait]
impl UserStore for AppwriteUserStore {
    fn backend(&self) -> &'static str {
        "appwrite"
    }

    #[instrument(skip(self), fields(provider_id = %provider_id))]
    async fn find_by_provider_id(
        &self,
        provider_id: &ProviderUserId,
    ) -> Result<Option<UserDocument>, RepositoryError> {
        let response = self
            .client
            .http
            .get(self.documents_url())
            .query(&[
                ("queries[]", equal_query("clerk_id", provider_id.as_str())),
                ("queries[]", limit_query(1)),
            ])
            .send()
            .await?;

        let list: DocumentList<UserDocument> = decode(response).await?;
        Ok(list.documents.into_iter().next())
    }

    #[instrument(skip(self, user), fields(provider_id = %user.clerk_id))]
    async fn create(&self, user: &NewUser) -> Result<UserDocument, RepositoryError> {
        let body = json!({ "documentId": UNIQUE_ID, "data": user });
        let response = self
            .client
            .http
            .post(self.documents_url())
            .json(&body)
            .send()
            .await?;
        decode(response).await
    }

    #[instrument(skip(self, patch), fields(document_id = %id, fields = ?patch.changed_fields()))]
    async fn update(
        &self,
        id: &DocumentId,
        patch: &UserPatch,
    ) -> Result<UserDocument, RepositoryError> {
        let body = json!({ "data": patch });
        let response = self
            .client
            .http
            .patch(self.document_url(id))
            .json(&body)
            .send()
            .await?;
        decode(response).await
    }

    #[instrument(skip(self))]
    async fn list(&self, limit: u32, offset: u32) -> Result<Vec<UserDocument>, RepositoryError> {
        let response = self
            .client
            .http
            .get(self.documents_url())
            .query(&[
                ("queries[]", order_desc_query("$createdAt")),
                ("queries[]", limit_query(limit)),
                ("queries[]", offset_query(offset)),
            ])
            .send()
            .await?;

        let list: DocumentList<UserDocument> = decode(response).await?;
        Ok(list.documents)
    }

    async fn ping(&self) -> Result<(), RepositoryError> {
        let response = self
            .client
            .http
            .get(self.documents_url())
            .query(&[("queries[]", limit_query(1))])
            .send()
            .await?;
        let _: DocumentList<serde_json::Value> = decode(response).await?;
        Ok(())
    }
}

/// File metadata returned after an upload.
#[derive(Debug, Deserialize)]
struct StoredFile {
    #[serde(rename = "$id")]
    id: String,
}

/// Storage bucket accessor for product images.
#[derive(Clone)]
pub struct AppwriteMediaStore {
    client: AppwriteClient,
    bucket_id: String,
}

impl AppwriteMediaStore {
    /// Create an accessor for the configured bucket.
    #[must_use]
    pub fn new(client: AppwriteClient, config: &AppwriteConfig) -> Self {
        Self {
            client,
            bucket_id: config.storage_bucket_id.clone(),
        }
    }

    /// Public view URL for a stored file.
    #[must_use]
    pub fn view_url(&self, file_id: &str) -> String {
        format!(
            "{}/storage/buckets/{}/files/{file_id}/view?project={}",
            self.client.endpoint, self.bucket_id, self.client.project_id
        )
    }
}

#[async_trait]
impl MediaStore for AppwriteMediaStore {
    #[instrument(skip(self, bytes), fields(size = bytes.len()))]
    async fn upload(
        &self,
        file_name: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<String, RepositoryError> {
        let part = Part::bytes(bytes)
            .file_name(file_name.to_owned())
            .mime_str(content_type)?;
        let form = Form::new().text("fileId", UNIQUE_ID).part("file", part);

        let response = self
            .client
            .http
            .post(
                self.client
                    .url(&format!("/storage/buckets/{}/files", self.bucket_id)),
            )
            .multipart(form)
            .send()
            .await?;

        let file: StoredFile = decode(response).await?;
        Ok(self.view_url(&file.id))
    }
}
