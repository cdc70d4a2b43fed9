//! Webhook testing commands.
//!
//! # Usage
//!
//! ```bash
//! aabhushan-cli webhook sign --payload user_created.json
//! ```
//!
//! Prints the three Svix headers for the payload, signed with
//! `CLERK_WEBHOOK_SECRET`, plus a ready-to-run curl command against
//! `STOREFRONT_BASE_URL` (default `http://localhost:3000`).

use std::path::Path;

use aabhushan_storefront::identity::webhook::{HEADER_ID, HEADER_SIGNATURE, HEADER_TIMESTAMP};
use aabhushan_storefront::identity::{WebhookError, WebhookVerifier};
use secrecy::SecretString;
use thiserror::Error;

/// Errors that can occur while signing a payload.
#[derive(Debug, Error)]
pub enum WebhookCommandError {
    /// Required environment variable is missing.
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    /// Payload file could not be read.
    #[error("Failed to read {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    /// Secret is not a valid `whsec_` secret.
    #[error("Invalid webhook secret: {0}")]
    Secret(#[from] WebhookError),
}

/// Sign a payload file and print the delivery headers.
///
/// # Errors
///
/// Returns `WebhookCommandError` if the secret is missing or invalid, or the
/// payload file cannot be read.
pub async fn sign(
    payload: &Path,
    msg_id: Option<String>,
    timestamp: Option<i64>,
) -> Result<(), WebhookCommandError> {
    dotenvy::dotenv().ok();

    let secret = std::env::var("CLERK_WEBHOOK_SECRET")
        .map_err(|_| WebhookCommandError::MissingEnvVar("CLERK_WEBHOOK_SECRET"))?;
    let verifier = WebhookVerifier::from_secret(&SecretString::from(secret))?;

    let body = tokio::fs::read(payload)
        .await
        .map_err(|source| WebhookCommandError::Read {
            path: payload.display().to_string(),
            source,
        })?;

    let msg_id = msg_id.unwrap_or_else(|| format!("msg_{}", uuid::Uuid::new_v4().simple()));
    let timestamp = timestamp.unwrap_or_else(|| chrono::Utc::now().timestamp());
    let signature = verifier.sign(&msg_id, timestamp, &body)?;

    let base_url = std::env::var("STOREFRONT_BASE_URL")
        .unwrap_or_else(|_| "http://localhost:3000".to_owned());

    tracing::info!("{}: {}", HEADER_ID, msg_id);
    tracing::info!("{}: {}", HEADER_TIMESTAMP, timestamp);
    tracing::info!("{}: {}", HEADER_SIGNATURE, signature);
    tracing::info!("");
    tracing::info!("Deliver with:");
    tracing::info!(
        "  curl -X POST {}/api/webhook/clerk -H 'content-type: application/json' -H '{}: {}' -H '{}: {}' -H '{}: {}' --data-binary @{}",
        base_url.trim_end_matches('/'),
        HEADER_ID,
        msg_id,
        HEADER_TIMESTAMP,
        timestamp,
        HEADER_SIGNATURE,
        signature,
        payload.display(),
    );
    tracing::info!("The signature is valid for 5 minutes.");

    Ok(())
}
