//! Offline verification of identity provider session tokens.
//!
//! Session tokens are short-lived RS256 JWTs. They arrive either as an
//! `Authorization: Bearer` header (API clients) or in the `__session` cookie
//! (browser requests on the storefront domain).

use axum::http::{HeaderMap, header};
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use serde::Deserialize;
use thiserror::Error;

use aabhushan_core::ProviderUserId;

/// Cookie the provider's frontend SDK stores the session token in.
pub const SESSION_COOKIE: &str = "__session";

/// Errors verifying a session token.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("invalid public key: {0}")]
    InvalidKey(jsonwebtoken::errors::Error),
    #[error("invalid session token: {0}")]
    InvalidToken(#[from] jsonwebtoken::errors::Error),
    #[error("unauthorized party: {0}")]
    UnauthorizedParty(String),
    #[error("invalid subject: {0}")]
    InvalidSubject(String),
}

/// Registered and provider-specific claims the storefront reads.
#[derive(Debug, Clone, Deserialize)]
pub struct SessionClaims {
    pub sub: String,
    pub exp: i64,
    #[serde(default)]
    pub azp: Option<String>,
    #[serde(default)]
    pub sid: Option<String>,
}

/// A verified session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    /// Provider user ID (`sub`).
    pub user_id: ProviderUserId,
    /// Provider session ID (`sid`), when present.
    pub session_id: Option<String>,
}

/// Verifies session tokens against the provider's public key.
#[derive(Clone)]
pub struct SessionVerifier {
    key: DecodingKey,
    validation: Validation,
    authorized_parties: Vec<String>,
}

impl SessionVerifier {
    /// Build a verifier from a PEM-encoded RSA public key.
    ///
    /// An empty `authorized_parties` list accepts any `azp`.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::InvalidKey` if the PEM cannot be parsed.
    pub fn from_pem(pem: &str, authorized_parties: Vec<String>) -> Result<Self, SessionError> {
        let key = DecodingKey::from_rsa_pem(pem.as_bytes()).map_err(SessionError::InvalidKey)?;

        let mut validation = Validation::new(Algorithm::RS256);
        validation.validate_exp = true;
        validation.validate_nbf = true;
        validation.validate_aud = false;
        validation.leeway = 5;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Ok(Self {
            key,
            validation,
            authorized_parties,
        })
    }

    /// Verify a raw token.
    ///
    /// # Errors
    ///
    /// Returns `SessionError` if the signature, expiry, not-before or
    /// authorized party check fails.
    pub fn verify(&self, token: &str) -> Result<Session, SessionError> {
        let data = decode::<SessionClaims>(token, &self.key, &self.validation)?;
        let claims = data.claims;

        if !self.authorized_parties.is_empty() {
            let azp = claims.azp.as_deref().unwrap_or_default();
            if !self.authorized_parties.iter().any(|p| p == azp) {
                return Err(SessionError::UnauthorizedParty(azp.to_owned()));
            }
        }

        let user_id = ProviderUserId::parse(&claims.sub)
            .map_err(|e| SessionError::InvalidSubject(e.to_string()))?;

        Ok(Session {
            user_id,
            session_id: claims.sid,
        })
    }
}

/// Find the session token on a request: bearer header first, then cookie.
#[must_use]
pub fn token_from_headers(headers: &HeaderMap) -> Option<&str> {
    let bearer = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty());
    if bearer.is_some() {
        return bearer;
    }

    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .map(|(_, value)| value)
        .filter(|t| !t.is_empty())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;

    #[test]
    fn test_token_from_bearer() {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer abc.def.ghi"));
        headers.insert(header::COOKIE, HeaderValue::from_static("__session=cookie.token"));
        assert_eq!(token_from_headers(&headers), Some("abc.def.ghi"));
    }

    #[test]
    fn test_token_from_cookie() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("theme=dark; __session=cookie.token; other=1"),
        );
        assert_eq!(token_from_headers(&headers), Some("cookie.token"));
    }

    #[test]
    fn test_no_token() {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_static("__session_other=x"));
        assert_eq!(token_from_headers(&headers), None);
    }

    #[test]
    fn test_invalid_pem_rejected() {
        assert!(matches!(
            SessionVerifier::from_pem("not a key", Vec::new()),
            Err(SessionError::InvalidKey(_))
        ));
    }
}
