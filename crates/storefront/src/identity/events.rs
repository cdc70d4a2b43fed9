//! Identity provider payload types.
//!
//! The same user object shape is delivered in `user.created`/`user.updated`
//! webhook events and returned by the backend API's `GET /users/{id}`.

use serde::{Deserialize, Deserializer};

/// Top-level webhook envelope.
#[derive(Debug, Clone, Deserialize)]
pub struct WebhookEvent {
    /// Event type, e.g. `user.created`.
    #[serde(rename = "type")]
    pub event_type: String,
    /// Event payload; its shape depends on `event_type`.
    #[serde(default)]
    pub data: serde_json::Value,
}

/// Typed view of a webhook event.
#[derive(Debug, Clone)]
pub enum IdentityEvent {
    UserCreated(ProviderUser),
    UserUpdated(ProviderUser),
    UserDeleted(DeletedObject),
    Unhandled(String),
}

impl WebhookEvent {
    /// Decode the payload for the event types the storefront handles.
    ///
    /// # Errors
    ///
    /// Returns a `serde_json::Error` if a handled event's payload is malformed.
    pub fn into_typed(self) -> Result<IdentityEvent, serde_json::Error> {
        match self.event_type.as_str() {
            "user.created" => Ok(IdentityEvent::UserCreated(serde_json::from_value(self.data)?)),
            "user.updated" => Ok(IdentityEvent::UserUpdated(serde_json::from_value(self.data)?)),
            "user.deleted" => Ok(IdentityEvent::UserDeleted(serde_json::from_value(self.data)?)),
            _ => Ok(IdentityEvent::Unhandled(self.event_type)),
        }
    }
}

/// Provider user record.
///
/// Nullable profile fields are `Option<Option<String>>`: the outer option is
/// "present in the payload", the inner one is "non-null".
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProviderUser {
    pub id: Option<String>,
    #[serde(default)]
    pub primary_email_address_id: Option<String>,
    #[serde(default)]
    pub email_addresses: Vec<EmailAddress>,
    #[serde(default)]
    pub phone_numbers: Vec<PhoneNumber>,
    #[serde(default, deserialize_with = "present")]
    pub first_name: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub last_name: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub image_url: Option<Option<String>>,
    #[serde(default)]
    pub external_accounts: Vec<ExternalAccount>,
}

impl ProviderUser {
    /// The primary email entry: the one matching `primary_email_address_id`,
    /// otherwise the first.
    #[must_use]
    pub fn primary_email(&self) -> Option<&EmailAddress> {
        self.primary_email_address_id
            .as_deref()
            .and_then(|primary| {
                self.email_addresses
                    .iter()
                    .find(|e| e.id.as_deref() == Some(primary))
            })
            .or_else(|| self.email_addresses.first())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct EmailAddress {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub email_address: String,
    #[serde(default)]
    pub verification: Option<Verification>,
}

impl EmailAddress {
    /// Whether the provider reports this address verified.
    #[must_use]
    pub fn is_verified(&self) -> bool {
        self.verification
            .as_ref()
            .and_then(|v| v.status.as_deref())
            == Some("verified")
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Verification {
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PhoneNumber {
    #[serde(default)]
    pub phone_number: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExternalAccount {
    #[serde(default)]
    pub provider: String,
}

/// Payload of `user.deleted`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DeletedObject {
    pub id: Option<String>,
    #[serde(default)]
    pub deleted: bool,
}

/// Deserialize a field that may be `null`, distinguishing it from absence.
fn present<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}
