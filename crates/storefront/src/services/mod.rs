//! Business logic services.

pub mod media;
pub mod sync;
pub mod users;

pub use media::{ImageUpload, MediaService, StorageError};
pub use sync::{SyncError, UserSyncService, WebhookOutcome};
pub use users::{SyncAction, SyncOutcome, UserDirectory};
