//! User document types.
//!
//! `UserDocument` mirrors a document in the users collection. Fields written by
//! older code paths may be `null` or missing; deserialization tolerates both.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use aabhushan_core::{DocumentId, ProviderUserId, UserRole};

/// A user document as stored in the users collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserDocument {
    /// Document-store ID.
    #[serde(rename = "$id")]
    pub id: DocumentId,
    /// Identity-provider user ID (unique key).
    pub clerk_id: ProviderUserId,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub email: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub first_name: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub last_name: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub profile_image: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub phone_number: String,
    #[serde(default)]
    pub role: UserRole,
    /// `false` once the identity provider reports the user deleted.
    #[serde(default = "default_active")]
    pub is_active: bool,
    #[serde(default)]
    pub email_verified: bool,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl UserDocument {
    /// Display name, falling back to the email address.
    #[must_use]
    pub fn display_name(&self) -> String {
        let full = format!("{} {}", self.first_name, self.last_name);
        let full = full.trim();
        if full.is_empty() {
            self.email.clone()
        } else {
            full.to_owned()
        }
    }

    /// Whether the stored role is `admin`.
    #[must_use]
    pub const fn is_admin(&self) -> bool {
        self.role.is_admin()
    }

    /// Whether this user may use the admin API (admin role, not deactivated).
    #[must_use]
    pub const fn can_administer(&self) -> bool {
        self.is_active && self.is_admin()
    }

    /// Apply a patch in place (used by stores that hold documents locally).
    pub fn apply(&mut self, patch: &UserPatch) {
        if let Some(email) = &patch.email {
            self.email.clone_from(email);
        }
        if let Some(first_name) = &patch.first_name {
            self.first_name.clone_from(first_name);
        }
        if let Some(last_name) = &patch.last_name {
            self.last_name.clone_from(last_name);
        }
        if let Some(profile_image) = &patch.profile_image {
            self.profile_image.clone_from(profile_image);
        }
        if let Some(phone_number) = &patch.phone_number {
            self.phone_number.clone_from(phone_number);
        }
        if let Some(role) = patch.role {
            self.role = role;
        }
        if let Some(is_active) = patch.is_active {
            self.is_active = is_active;
        }
        if let Some(email_verified) = patch.email_verified {
            self.email_verified = email_verified;
        }
        if let Some(updated_at) = patch.updated_at {
            self.updated_at = Some(updated_at);
        }
    }
}

/// Payload for creating a user document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewUser {
    pub clerk_id: ProviderUserId,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub profile_image: String,
    pub phone_number: String,
    pub role: UserRole,
    pub is_active: bool,
    pub email_verified: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl NewUser {
    /// Materialize a stored document from this payload.
    #[must_use]
    pub fn into_document(self, id: DocumentId) -> UserDocument {
        UserDocument {
            id,
            clerk_id: self.clerk_id,
            email: self.email,
            first_name: self.first_name,
            last_name: self.last_name,
            profile_image: self.profile_image,
            phone_number: self.phone_number,
            role: self.role,
            is_active: self.is_active,
            email_verified: self.email_verified,
            created_at: Some(self.created_at),
            updated_at: Some(self.updated_at),
        }
    }
}

/// Partial update of a user document. Only `Some` fields are written.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UserPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile_image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<UserRole>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email_verified: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl UserPatch {
    /// True when the patch changes nothing besides the timestamp.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.email.is_none()
            && self.first_name.is_none()
            && self.last_name.is_none()
            && self.profile_image.is_none()
            && self.phone_number.is_none()
            && self.role.is_none()
            && self.is_active.is_none()
            && self.email_verified.is_none()
    }

    /// Names of the fields this patch writes, for logging.
    #[must_use]
    pub fn changed_fields(&self) -> Vec<&'static str> {
        [
            ("email", self.email.is_some()),
            ("first_name", self.first_name.is_some()),
            ("last_name", self.last_name.is_some()),
            ("profile_image", self.profile_image.is_some()),
            ("phone_number", self.phone_number.is_some()),
            ("role", self.role.is_some()),
            ("is_active", self.is_active.is_some()),
            ("email_verified", self.email_verified.is_some()),
        ]
        .into_iter()
        .filter_map(|(name, set)| set.then_some(name))
        .collect()
    }

    /// Stamp the patch with its write time.
    #[must_use]
    pub fn stamped(mut self, now: DateTime<Utc>) -> Self {
        self.updated_at = Some(now);
        self
    }
}

const fn default_active() -> bool {
    true
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}
