//! Identity provider integration.
//!
//! - [`events`] - user payloads delivered by webhooks and the backend API
//! - [`profile`] - the single mapping from those payloads to stored documents
//! - [`webhook`] - Svix signature verification
//! - [`session`] - session token verification
//! - [`provider`] - backend API client

pub mod events;
pub mod profile;
pub mod provider;
pub mod session;
pub mod webhook;

pub use events::{IdentityEvent, ProviderUser, WebhookEvent};
pub use profile::{IdentityProfile, ProfileError, SyncUserData};
pub use provider::{ProviderClient, ProviderError};
pub use session::{Session, SessionError, SessionVerifier};
pub use webhook::{SvixHeaders, WebhookError, WebhookVerifier};
