//! HTTP route handlers for storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                              - Liveness
//! GET  /health/ready                        - Readiness (document store ping)
//!
//! # Identity
//! GET  /api/webhook/clerk                   - Webhook connectivity status
//! POST /api/webhook/clerk                   - Signed identity provider events
//! POST /api/sync-user                       - Reconcile the signed-in user
//! GET  /api/sync-user                       - Read the signed-in user's document
//! GET  /api/user                            - Current user and role
//! GET  /api/check-admin                     - Admin flag for the current user
//!
//! # Catalog
//! GET  /api/products                        - Categories with product counts
//! GET  /api/products/{category}             - Filter/sort/search/paginate a category
//! GET  /api/products/{category}/{id}        - Product detail
//!
//! # Admin (requires admin role)
//! GET  /api/admin/users                     - List user documents
//! PUT  /api/admin/users/{provider_id}/role  - Change a user's role
//! POST /api/admin/users/{provider_id}/deactivate - Deactivate a user
//! POST /api/upload-images                   - Upload product images
//! ```

pub mod admin;
pub mod health;
pub mod products;
pub mod sync;
pub mod uploads;
pub mod user;
pub mod webhook;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post, put},
};

use crate::middleware::{sync_rate_limiter, upload_rate_limiter, webhook_rate_limiter};
use crate::state::AppState;

/// Multipart body limit for image uploads (several files of up to 5 MiB).
pub const UPLOAD_BODY_LIMIT: usize = 25 * 1024 * 1024;

/// Create the identity routes router.
pub fn identity_routes() -> Router<AppState> {
    let webhook = Router::new()
        .route("/webhook/clerk", get(webhook::status).post(webhook::receive))
        .route_layer(webhook_rate_limiter());

    let sync = Router::new()
        .route("/sync-user", post(sync::sync_user).get(sync::synced_user))
        .route_layer(sync_rate_limiter());

    Router::new()
        .merge(webhook)
        .merge(sync)
        .route("/user", get(user::current_user))
        .route("/check-admin", get(user::check_admin))
}

/// Create the catalog routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::index))
        .route("/{category}", get(products::list))
        .route("/{category}/{id}", get(products::show))
}

/// Create the admin routes router.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/users", get(admin::list_users))
        .route("/users/{provider_id}/role", put(admin::set_role))
        .route("/users/{provider_id}/deactivate", post(admin::deactivate))
}

/// Create the upload routes router.
pub fn upload_routes() -> Router<AppState> {
    Router::new()
        .route("/upload-images", post(uploads::upload_images))
        .route_layer(upload_rate_limiter())
        .layer(DefaultBodyLimit::max(UPLOAD_BODY_LIMIT))
}

/// Create all `/api` routes.
pub fn api_routes() -> Router<AppState> {
    identity_routes()
        .merge(upload_routes())
        .nest("/products", product_routes())
        .nest("/admin", admin_routes())
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
        .nest("/api", api_routes())
}
