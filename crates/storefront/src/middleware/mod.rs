//! HTTP middleware stack for storefront.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (capture errors, transactions)
//! 2. `TraceLayer` (request span)
//! 3. Request ID (record on the span, echo in the response)
//! 4. Security headers
//! 5. Session (verify token, session sync)
//! 6. Rate limiting (per route group, governor)

pub mod auth;
pub mod rate_limit;
pub mod request_id;
pub mod security_headers;
pub mod session;

pub use auth::{RequireAdmin, RequireSession};
pub use rate_limit::{sync_rate_limiter, upload_rate_limiter, webhook_rate_limiter};
pub use request_id::{RequestId, request_id_middleware};
pub use security_headers::security_headers_middleware;
pub use session::session_middleware;
