//! Svix signature verification for identity provider webhooks.
//!
//! Signed content is `"{svix-id}.{svix-timestamp}.{raw body}"`, signed with
//! HMAC-SHA256 keyed by the base64-decoded part of the `whsec_` secret. The
//! `svix-signature` header carries one or more space-separated `v1,<base64>`
//! entries (several during secret rotation); any one matching is accepted.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use sha2::Sha256;
use thiserror::Error;

type HmacSha256 = Hmac<Sha256>;

const SECRET_PREFIX: &str = "whsec_";
const SIGNATURE_VERSION: &str = "v1";

/// Header names set by Svix.
pub const HEADER_ID: &str = "svix-id";
pub const HEADER_TIMESTAMP: &str = "svix-timestamp";
pub const HEADER_SIGNATURE: &str = "svix-signature";

/// Maximum clock skew between the signature timestamp and now.
pub const TIMESTAMP_TOLERANCE_SECS: i64 = 5 * 60;

/// Errors verifying a webhook delivery.
#[derive(Debug, Error)]
pub enum WebhookError {
    #[error("missing svix headers")]
    MissingHeaders,
    #[error("invalid webhook secret")]
    InvalidSecret,
    #[error("invalid signature timestamp")]
    InvalidTimestamp,
    #[error("signature timestamp outside tolerance")]
    TimestampOutOfTolerance,
    #[error("no matching signature")]
    SignatureMismatch,
}

/// The three Svix headers of one delivery.
#[derive(Debug, Clone, Copy)]
pub struct SvixHeaders<'a> {
    pub id: &'a str,
    pub timestamp: &'a str,
    pub signature: &'a str,
}

impl<'a> SvixHeaders<'a> {
    /// Extract the headers, failing if any is missing or not ASCII.
    ///
    /// # Errors
    ///
    /// Returns `WebhookError::MissingHeaders` if a header is absent.
    pub fn from_headers(headers: &'a axum::http::HeaderMap) -> Result<Self, WebhookError> {
        let get = |name: &str| {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .filter(|v| !v.is_empty())
                .ok_or(WebhookError::MissingHeaders)
        };
        Ok(Self {
            id: get(HEADER_ID)?,
            timestamp: get(HEADER_TIMESTAMP)?,
            signature: get(HEADER_SIGNATURE)?,
        })
    }
}

/// Verifies (and, for local tooling, produces) webhook signatures.
#[derive(Clone)]
pub struct WebhookVerifier {
    key: SecretString,
}

impl std::fmt::Debug for WebhookVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebhookVerifier")
            .field("key", &"[REDACTED]")
            .finish()
    }
}

impl WebhookVerifier {
    /// Build a verifier from a `whsec_` secret.
    ///
    /// # Errors
    ///
    /// Returns `WebhookError::InvalidSecret` if the prefix is missing or the
    /// key is not valid base64.
    pub fn from_secret(secret: &SecretString) -> Result<Self, WebhookError> {
        let encoded = secret
            .expose_secret()
            .strip_prefix(SECRET_PREFIX)
            .ok_or(WebhookError::InvalidSecret)?;
        STANDARD
            .decode(encoded)
            .map_err(|_| WebhookError::InvalidSecret)?;
        Ok(Self {
            key: SecretString::from(encoded.to_owned()),
        })
    }

    fn mac(&self, headers_id: &str, timestamp: &str, body: &[u8]) -> Result<HmacSha256, WebhookError> {
        let key = STANDARD
            .decode(self.key.expose_secret())
            .map_err(|_| WebhookError::InvalidSecret)?;
        let mut mac = HmacSha256::new_from_slice(&key).map_err(|_| WebhookError::InvalidSecret)?;
        mac.update(headers_id.as_bytes());
        mac.update(b".");
        mac.update(timestamp.as_bytes());
        mac.update(b".");
        mac.update(body);
        Ok(mac)
    }

    /// Verify a delivery against the current time.
    ///
    /// # Errors
    ///
    /// Returns `WebhookError` if the timestamp is stale or no signature matches.
    pub fn verify(&self, headers: &SvixHeaders<'_>, body: &[u8]) -> Result<(), WebhookError> {
        self.verify_at(headers, body, chrono::Utc::now().timestamp())
    }

    /// Verify a delivery as of `now` (Unix seconds).
    ///
    /// # Errors
    ///
    /// Returns `WebhookError` if the timestamp is stale or no signature matches.
    pub fn verify_at(
        &self,
        headers: &SvixHeaders<'_>,
        body: &[u8],
        now: i64,
    ) -> Result<(), WebhookError> {
        let timestamp: i64 = headers
            .timestamp
            .trim()
            .parse()
            .map_err(|_| WebhookError::InvalidTimestamp)?;
        if now.abs_diff(timestamp) > TIMESTAMP_TOLERANCE_SECS.unsigned_abs() {
            return Err(WebhookError::TimestampOutOfTolerance);
        }

        let mac = self.mac(headers.id, headers.timestamp, body)?;

        let matched = headers
            .signature
            .split_whitespace()
            .filter_map(|entry| entry.split_once(','))
            .filter(|(version, _)| *version == SIGNATURE_VERSION)
            .filter_map(|(_, sig)| STANDARD.decode(sig).ok())
            // verify_slice compares in constant time
            .any(|sig| mac.clone().verify_slice(&sig).is_ok());

        if matched {
            Ok(())
        } else {
            Err(WebhookError::SignatureMismatch)
        }
    }

    /// Produce a `v1,<base64>` signature for a payload.
    ///
    /// # Errors
    ///
    /// Returns `WebhookError::InvalidSecret` if the stored key is unusable.
    pub fn sign(&self, msg_id: &str, timestamp: i64, body: &[u8]) -> Result<String, WebhookError> {
        let mac = self.mac(msg_id, &timestamp.to_string(), body)?;
        Ok(format!(
            "{SIGNATURE_VERSION},{}",
            STANDARD.encode(mac.finalize().into_bytes())
        ))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const NOW: i64 = 1_700_000_000;

    fn verifier() -> WebhookVerifier {
        let secret = format!("whsec_{}", STANDARD.encode(b"aabhushan-webhook-test-key"));
        WebhookVerifier::from_secret(&SecretString::from(secret)).unwrap()
    }

    fn headers<'a>(id: &'a str, ts: &'a str, sig: &'a str) -> SvixHeaders<'a> {
        SvixHeaders {
            id,
            timestamp: ts,
            signature: sig,
        }
    }

    #[test]
    fn test_sign_then_verify() {
        let v = verifier();
        let body = br#"{"type":"user.created","data":{}}"#;
        let sig = v.sign("msg_1", NOW, body).unwrap();
        let ts = NOW.to_string();
        assert!(v.verify_at(&headers("msg_1", &ts, &sig), body, NOW).is_ok());
    }

    #[test]
    fn test_known_vector() {
        // Svix reference vector
        let v = WebhookVerifier::from_secret(&SecretString::from(
            "whsec_MfKQ9r8GKYqrTwjUPD8ILPZIo2LaLaSw".to_string(),
        ))
        .unwrap();
        let body = br#"{"test": 2432232314}"#;
        let sig = v.sign("msg_p5jXN8AQM9LWM0D4loKWxJek", 1_614_265_330, body).unwrap();
        assert_eq!(sig, "v1,g0hM9SsE+OTPJTGt/tmIKtSyZlE3uFJELVlNIOLJ1OE=");
    }

    #[test]
    fn test_any_matching_entry_accepted() {
        let v = verifier();
        let body = b"{}";
        let good = v.sign("msg_2", NOW, body).unwrap();
        let header = format!("v1,AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA= v2,xyz {good}");
        let ts = NOW.to_string();
        assert!(v.verify_at(&headers("msg_2", &ts, &header), body, NOW).is_ok());
    }

    #[test]
    fn test_tampered_body_rejected() {
        let v = verifier();
        let sig = v.sign("msg_3", NOW, b"original").unwrap();
        let ts = NOW.to_string();
        assert!(matches!(
            v.verify_at(&headers("msg_3", &ts, &sig), b"tampered", NOW),
            Err(WebhookError::SignatureMismatch)
        ));
    }

    #[test]
    fn test_stale_timestamp_rejected() {
        let v = verifier();
        let old = NOW - TIMESTAMP_TOLERANCE_SECS - 1;
        let sig = v.sign("msg_4", old, b"{}").unwrap();
        let ts = old.to_string();
        assert!(matches!(
            v.verify_at(&headers("msg_4", &ts, &sig), b"{}", NOW),
            Err(WebhookError::TimestampOutOfTolerance)
        ));
    }

    #[test]
    fn test_extreme_timestamps_rejected() {
        let v = verifier();
        for ts in [i64::MIN, i64::MAX] {
            let ts = ts.to_string();
            assert!(matches!(
                v.verify_at(&headers("msg_6", &ts, "v1,abc"), b"{}", NOW),
                Err(WebhookError::TimestampOutOfTolerance)
            ));
        }
        let ts = NOW.to_string();
        assert!(matches!(
            v.verify_at(&headers("msg_6", &ts, "v1,abc"), b"{}", i64::MIN),
            Err(WebhookError::TimestampOutOfTolerance)
        ));
    }

    #[test]
    fn test_non_numeric_timestamp_rejected() {
        let v = verifier();
        assert!(matches!(
            v.verify_at(&headers("msg_5", "yesterday", "v1,abc"), b"{}", NOW),
            Err(WebhookError::InvalidTimestamp)
        ));
    }

    #[test]
    fn test_secret_requires_prefix() {
        assert!(matches!(
            WebhookVerifier::from_secret(&SecretString::from("MfKQ9r8GKYqrTwjU".to_string())),
            Err(WebhookError::InvalidSecret)
        ));
    }

    #[test]
    fn test_headers_missing() {
        let mut map = axum::http::HeaderMap::new();
        map.insert(HEADER_ID, "msg_1".parse().unwrap());
        map.insert(HEADER_TIMESTAMP, "1".parse().unwrap());
        assert!(matches!(
            SvixHeaders::from_headers(&map),
            Err(WebhookError::MissingHeaders)
        ));
    }
}
