//! Identity provider backend API client.
//!
//! Used by session sync to fetch the full user record for a verified session.

use reqwest::header::{HeaderMap, HeaderValue};
use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;
use tracing::instrument;

use aabhushan_core::ProviderUserId;

use super::events::ProviderUser;

/// Errors that can occur when calling the backend API.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned an error response.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// User not found.
    #[error("User not found: {0}")]
    UserNotFound(String),

    /// Failed to build the client.
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Backend API client.
#[derive(Clone)]
pub struct ProviderClient {
    client: reqwest::Client,
    api_url: String,
}

impl ProviderClient {
    /// Create a new client authenticated with the secret key.
    ///
    /// # Errors
    ///
    /// Returns error if the key is not a valid header value or the HTTP
    /// client fails to build.
    pub fn new(api_url: &str, secret_key: &SecretString) -> Result<Self, ProviderError> {
        let mut headers = HeaderMap::new();

        let mut auth = HeaderValue::from_str(&format!("Bearer {}", secret_key.expose_secret()))
            .map_err(|e| ProviderError::Config(format!("Invalid secret key format: {e}")))?;
        auth.set_sensitive(true);
        headers.insert("Authorization", auth);

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(std::time::Duration::from_secs(10))
            .build()?;

        Ok(Self {
            client,
            api_url: api_url.trim_end_matches('/').to_owned(),
        })
    }

    /// Fetch a user record.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the user does not exist.
    #[instrument(skip(self), fields(provider_id = %user_id))]
    pub async fn get_user(&self, user_id: &ProviderUserId) -> Result<ProviderUser, ProviderError> {
        let url = format!("{}/users/{}", self.api_url, user_id);
        let response = self.client.get(&url).send().await?;
        let status = response.status();

        if status.as_u16() == 404 {
            return Err(ProviderError::UserNotFound(user_id.to_string()));
        }
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(ProviderError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(response.json().await?)
    }
}
