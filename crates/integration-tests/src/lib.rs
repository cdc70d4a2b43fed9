//! Integration tests for Aabhushan.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p aabhushan-integration-tests
//! ```
//!
//! Tests drive the full storefront router in-process with
//! `tower::ServiceExt::oneshot`. Users and media live in the in-memory
//! stores, webhook deliveries are signed with a fixed test secret, and
//! session tokens are signed with the RS256 key under `fixtures/`.
//!
//! # Test Categories
//!
//! - `webhook` - signed identity provider deliveries
//! - `sync` - the sync route
//! - `session_sync` - background sync against a stub backend API
//! - `user_api` - current user, admin check and admin user management
//! - `uploads` - admin image uploads
//! - `catalog` - product listings and detail
//! - `health` - probes and response headers

#![allow(clippy::missing_panics_doc, clippy::must_use_candidate)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use aabhushan_core::{DocumentId, ProviderUserId, UserRole};
use aabhushan_storefront::config::StorefrontConfig;
use aabhushan_storefront::db::{MemoryMediaStore, MemoryUserStore};
use aabhushan_storefront::identity::WebhookVerifier;
use aabhushan_storefront::models::UserDocument;
use aabhushan_storefront::state::AppState;
use axum::body::{Body, Bytes};
use axum::extract::{Path, State};
use axum::http::{HeaderMap, Method, Request, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use secrecy::SecretString;
use serde_json::{Value, json};
use tower::ServiceExt;

/// Public base URL of the test app.
pub const BASE_URL: &str = "http://localhost:3000";

/// Webhook signing secret.
pub const WEBHOOK_SECRET: &str = "whsec_YWFiaHVzaGFuLWludGVncmF0aW9uLXdlYmhvb2sta2V5";

/// `azp` accepted by the test app.
pub const AUTHORIZED_PARTY: &str = "http://localhost:5173";

/// Public half of the session signing key.
pub const SESSION_PUBLIC_KEY: &str = include_str!("../fixtures/session_public_key.pem");

const SESSION_SIGNING_KEY: &str = include_str!("../fixtures/session_signing_key.pem");

/// A key the app does not trust.
const FOREIGN_SIGNING_KEY: &str = include_str!("../fixtures/foreign_signing_key.pem");

/// Storefront config for tests: memory stores, test secrets, no backend API.
pub fn test_config() -> StorefrontConfig {
    let mut config = StorefrontConfig::for_memory_store(BASE_URL);
    config.identity.webhook_secret = Some(SecretString::from(WEBHOOK_SECRET));
    config.identity.jwt_public_key = Some(SESSION_PUBLIC_KEY.to_owned());
    config.identity.authorized_parties = vec![AUTHORIZED_PARTY.to_owned()];
    config.sync.retry_delay = Duration::from_millis(1);
    config
}

/// Backend API key handed to the app when it talks to a [`ProviderStub`].
pub const PROVIDER_SECRET_KEY: &str = "sk_test_aabhushan_provider_stub";

#[derive(Clone, Default)]
struct StubState {
    hits: Arc<AtomicUsize>,
    users: Arc<Mutex<HashMap<String, Value>>>,
    failing: bool,
}

async fn stub_get_user(State(stub): State<StubState>, Path(id): Path<String>) -> Response {
    stub.hits.fetch_add(1, Ordering::SeqCst);
    if stub.failing {
        return (StatusCode::INTERNAL_SERVER_ERROR, "upstream unavailable").into_response();
    }
    let user = stub.users.lock().expect("stub lock").get(&id).cloned();
    match user {
        Some(user) => Json(user).into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(json!({ "errors": [{ "code": "resource_not_found" }] })),
        )
            .into_response(),
    }
}

/// Identity provider backend API served on a loopback port.
///
/// Only `GET /users/{id}` is implemented; every call is counted.
pub struct ProviderStub {
    url: String,
    state: StubState,
}

impl ProviderStub {
    /// Serve users added with [`ProviderStub::add_user`]; others get 404.
    pub async fn start() -> Self {
        Self::spawn(StubState::default()).await
    }

    /// Answer every lookup with 500.
    pub async fn failing() -> Self {
        Self::spawn(StubState {
            failing: true,
            ..StubState::default()
        })
        .await
    }

    async fn spawn(state: StubState) -> Self {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("stub binds");
        let addr = listener.local_addr().expect("stub has an address");
        let router = Router::new()
            .route("/users/{id}", get(stub_get_user))
            .with_state(state.clone());
        tokio::spawn(async move {
            axum::serve(listener, router).await.expect("stub serves");
        });

        Self {
            url: format!("http://{addr}"),
            state,
        }
    }

    /// Base URL to use as the backend API URL.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Make `user` (a [`provider_user`] object) retrievable by its `id`.
    pub fn add_user(&self, user: Value) {
        let id = user["id"].as_str().expect("user has an id").to_owned();
        self.state.users.lock().expect("stub lock").insert(id, user);
    }

    /// Lookups served so far.
    pub fn hits(&self) -> usize {
        self.state.hits.load(Ordering::SeqCst)
    }
}

/// The app under test plus handles on its stores.
pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub users: Arc<MemoryUserStore>,
    pub media: Arc<MemoryMediaStore>,
    webhook: WebhookVerifier,
}

/// A buffered response.
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl TestResponse {
    /// Body parsed as JSON.
    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.body).unwrap_or_else(|e| {
            panic!(
                "response body is not JSON ({e}): {}",
                String::from_utf8_lossy(&self.body)
            )
        })
    }

    /// Body as text.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

impl Default for TestApp {
    fn default() -> Self {
        Self::new()
    }
}

impl TestApp {
    /// Build the app with [`test_config`].
    pub fn new() -> Self {
        Self::with_config(test_config())
    }

    /// Build the app with session sync pointed at `stub`.
    pub fn with_provider(stub: &ProviderStub) -> Self {
        let mut config = test_config();
        config.identity.secret_key = Some(SecretString::from(PROVIDER_SECRET_KEY));
        config.identity.api_url = stub.url().to_owned();
        Self::with_config(config)
    }

    /// Build the app with a custom config (stores are always in memory).
    pub fn with_config(config: StorefrontConfig) -> Self {
        let users = Arc::new(MemoryUserStore::new());
        let media = Arc::new(MemoryMediaStore::new(BASE_URL));
        let state = AppState::with_stores(config, users.clone(), media.clone())
            .expect("test state builds");
        let webhook = WebhookVerifier::from_secret(&SecretString::from(WEBHOOK_SECRET))
            .expect("test webhook secret is valid");

        Self {
            router: aabhushan_storefront::app(state.clone()),
            state,
            users,
            media,
            webhook,
        }
    }

    /// Send a request through the router.
    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible");
        let status = response.status();
        let headers = response.headers().clone();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body is readable");
        TestResponse {
            status,
            headers,
            body,
        }
    }

    fn builder(method: Method, uri: &str, token: Option<&str>) -> axum::http::request::Builder {
        let builder = Request::builder().method(method).uri(uri);
        match token {
            Some(token) => builder.header(header::AUTHORIZATION, format!("Bearer {token}")),
            None => builder,
        }
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> TestResponse {
        self.send(
            Self::builder(Method::GET, uri, token)
                .body(Body::empty())
                .expect("valid request"),
        )
        .await
    }

    pub async fn send_json(
        &self,
        method: Method,
        uri: &str,
        body: &Value,
        token: Option<&str>,
    ) -> TestResponse {
        self.send(
            Self::builder(method, uri, token)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .expect("valid request"),
        )
        .await
    }

    pub async fn post_json(&self, uri: &str, body: &Value, token: Option<&str>) -> TestResponse {
        self.send_json(Method::POST, uri, body, token).await
    }

    /// Deliver a webhook signed now.
    pub async fn deliver_webhook(&self, msg_id: &str, payload: &Value) -> TestResponse {
        let body = payload.to_string();
        let timestamp = chrono::Utc::now().timestamp();
        self.deliver_signed(msg_id, timestamp, &body).await
    }

    /// Svix signature for a delivery.
    pub fn signature(&self, msg_id: &str, timestamp: i64, body: &str) -> String {
        self.webhook
            .sign(msg_id, timestamp, body.as_bytes())
            .expect("test secret signs")
    }

    /// Deliver a webhook signed for `timestamp`.
    pub async fn deliver_signed(&self, msg_id: &str, timestamp: i64, body: &str) -> TestResponse {
        let signature = self.signature(msg_id, timestamp, body);
        self.deliver_raw(msg_id, timestamp, &signature, body).await
    }

    /// Deliver a webhook with explicit Svix headers.
    pub async fn deliver_raw(
        &self,
        msg_id: &str,
        timestamp: i64,
        signature: &str,
        body: &str,
    ) -> TestResponse {
        self.send(
            Request::builder()
                .method(Method::POST)
                .uri("/api/webhook/clerk")
                .header(header::CONTENT_TYPE, "application/json")
                .header("svix-id", msg_id)
                .header("svix-timestamp", timestamp.to_string())
                .header("svix-signature", signature)
                .body(Body::from(body.to_owned()))
                .expect("valid request"),
        )
        .await
    }

    /// Store a user document directly.
    pub async fn seed_user(&self, provider_id: &str, email: &str, role: UserRole) -> UserDocument {
        let now = chrono::Utc::now();
        let document = UserDocument {
            id: DocumentId::parse(&uuid::Uuid::new_v4().simple().to_string())
                .expect("uuid is a valid id"),
            clerk_id: ProviderUserId::parse(provider_id).expect("valid provider id"),
            email: email.to_owned(),
            first_name: "Seeded".to_owned(),
            last_name: "User".to_owned(),
            profile_image: String::new(),
            phone_number: String::new(),
            role,
            is_active: true,
            email_verified: true,
            created_at: Some(now),
            updated_at: Some(now),
        };
        self.users.insert(document.clone()).await;
        document
    }

    /// Documents stored for a provider id.
    pub async fn documents_for(&self, provider_id: &str) -> Vec<UserDocument> {
        self.users
            .documents_for(&ProviderUserId::parse(provider_id).expect("valid provider id"))
            .await
    }
}

fn sign_claims(claims: &Value, pem: &str) -> String {
    let key = EncodingKey::from_rsa_pem(pem.as_bytes()).expect("fixture key parses");
    jsonwebtoken::encode(&Header::new(Algorithm::RS256), claims, &key).expect("token encodes")
}

/// Claims of a live session for `sub`.
pub fn session_claims(sub: &str) -> Value {
    let now = chrono::Utc::now().timestamp();
    json!({
        "sub": sub,
        "sid": format!("sess_{sub}"),
        "azp": AUTHORIZED_PARTY,
        "iat": now,
        "nbf": now - 5,
        "exp": now + 300,
    })
}

/// A valid session token for `sub`.
pub fn session_token(sub: &str) -> String {
    sign_claims(&session_claims(sub), SESSION_SIGNING_KEY)
}

/// A token with custom claims, signed with the trusted key.
pub fn session_token_with(claims: &Value) -> String {
    sign_claims(claims, SESSION_SIGNING_KEY)
}

/// A well-formed token signed with a key the app does not trust.
pub fn foreign_session_token(sub: &str) -> String {
    sign_claims(&session_claims(sub), FOREIGN_SIGNING_KEY)
}

/// Provider user object as delivered in `user.*` webhooks.
pub fn provider_user(id: &str, email: &str, first_name: &str, last_name: &str) -> Value {
    json!({
        "id": id,
        "object": "user",
        "primary_email_address_id": format!("idn_{id}"),
        "email_addresses": [{
            "id": format!("idn_{id}"),
            "email_address": email,
            "verification": { "status": "verified", "strategy": "email_code" },
        }],
        "phone_numbers": [],
        "first_name": first_name,
        "last_name": last_name,
        "image_url": "https://img.clerk.com/avatar.png",
        "external_accounts": [],
        "created_at": 1_716_000_000_000_i64,
        "updated_at": 1_716_000_000_000_i64,
    })
}

/// A webhook envelope.
pub fn webhook_event(event_type: &str, data: Value) -> Value {
    json!({
        "type": event_type,
        "object": "event",
        "data": data,
    })
}
