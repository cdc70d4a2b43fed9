//! Normalized identity profile shared by every sync entry point.
//!
//! Webhook payloads, backend API user records and the sync route body all
//! map into [`IdentityProfile`]. The diff against a stored document and the
//! shape of a new document are computed here and nowhere else.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use thiserror::Error;

use aabhushan_core::{Email, EmailError, IdError, ProviderUserId, UserRole};

use super::events::ProviderUser;
use crate::models::{NewUser, UserDocument, UserPatch};

const GOOGLE_IMAGE_HOST: &str = "googleusercontent.com";
const GOOGLE_OAUTH_PROVIDER: &str = "oauth_google";

/// Errors building or applying a profile.
#[derive(Debug, Error)]
pub enum ProfileError {
    #[error("missing user id")]
    MissingId,
    #[error("invalid user id: {0}")]
    InvalidId(#[from] IdError),
    #[error("missing primary email address")]
    MissingEmail,
    #[error("invalid email address: {0}")]
    InvalidEmail(#[from] EmailError),
}

/// A provider user's profile, with `None` meaning "not provided".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityProfile {
    pub provider_id: ProviderUserId,
    pub email: Option<Email>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub profile_image: Option<String>,
    pub phone_number: Option<String>,
    pub email_verified: Option<bool>,
    /// Signed up through Google (trusted as verified).
    pub google_signup: bool,
}

/// `userData` body of the sync route.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncUserData {
    pub clerk_id: Option<String>,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub profile_image_url: Option<String>,
    pub phone_number: Option<String>,
    pub email_verified: Option<bool>,
    /// Accepted for compatibility; roles are never taken from the client.
    pub role: Option<String>,
}

/// Blank input is "not provided"; anything else is kept as sent.
fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .filter(|s| !s.trim().is_empty())
        .map(String::from)
}

fn is_google_image(url: Option<&str>) -> bool {
    url.is_some_and(|u| u.contains(GOOGLE_IMAGE_HOST))
}

impl IdentityProfile {
    /// Map a provider user record (webhook payload or backend API response).
    ///
    /// Absent name/image fields stay "not provided"; fields present as `null`
    /// are provided as empty strings.
    ///
    /// # Errors
    ///
    /// Returns `ProfileError` if the id is missing or the primary email is malformed.
    pub fn from_provider_user(user: &ProviderUser) -> Result<Self, ProfileError> {
        let provider_id = ProviderUserId::parse(user.id.as_deref().ok_or(ProfileError::MissingId)?)?;

        let primary = user.primary_email();
        let email = primary
            .and_then(|e| non_empty(Some(&e.email_address)))
            .map(|e| Email::parse(&e))
            .transpose()?;
        let email_verified = Some(primary.is_some_and(super::events::EmailAddress::is_verified));

        let phone_number = user
            .phone_numbers
            .first()
            .and_then(|p| non_empty(Some(&p.phone_number)));

        let profile_image = user.image_url.clone().map(Option::unwrap_or_default);
        let google_signup = is_google_image(profile_image.as_deref())
            || user
                .external_accounts
                .iter()
                .any(|a| a.provider == GOOGLE_OAUTH_PROVIDER);

        Ok(Self {
            provider_id,
            email,
            first_name: user.first_name.clone().map(Option::unwrap_or_default),
            last_name: user.last_name.clone().map(Option::unwrap_or_default),
            profile_image,
            phone_number,
            email_verified,
            google_signup,
        })
    }

    /// Map the sync route body. Empty strings are "not provided".
    ///
    /// # Errors
    ///
    /// Returns `ProfileError` if `clerkId` is missing or the email is malformed.
    pub fn from_sync_data(data: &SyncUserData) -> Result<Self, ProfileError> {
        let provider_id = non_empty(data.clerk_id.as_deref())
            .ok_or(ProfileError::MissingId)
            .and_then(|id| Ok(ProviderUserId::parse(&id)?))?;

        let email = non_empty(data.email.as_deref())
            .map(|e| Email::parse(&e))
            .transpose()?;
        let profile_image = non_empty(data.profile_image_url.as_deref());
        let google_signup = email.is_some()
            && (is_google_image(profile_image.as_deref()) || data.email_verified == Some(true));

        Ok(Self {
            provider_id,
            email,
            first_name: non_empty(data.first_name.as_deref()),
            last_name: non_empty(data.last_name.as_deref()),
            profile_image,
            phone_number: non_empty(data.phone_number.as_deref()),
            email_verified: data.email_verified,
            google_signup,
        })
    }

    /// Verified flag for a newly created document.
    #[must_use]
    pub fn verified_for_new_user(&self) -> bool {
        self.google_signup || self.email_verified.unwrap_or(false)
    }

    /// Payload for a new document. Requires an email.
    ///
    /// # Errors
    ///
    /// Returns `ProfileError::MissingEmail` if no email was provided.
    pub fn to_new_user(&self, now: DateTime<Utc>) -> Result<NewUser, ProfileError> {
        let email = self.email.as_ref().ok_or(ProfileError::MissingEmail)?;
        Ok(NewUser {
            clerk_id: self.provider_id.clone(),
            email: email.as_str().to_owned(),
            first_name: self.first_name.clone().unwrap_or_default(),
            last_name: self.last_name.clone().unwrap_or_default(),
            profile_image: self.profile_image.clone().unwrap_or_default(),
            phone_number: self.phone_number.clone().unwrap_or_default(),
            role: UserRole::Customer,
            is_active: true,
            email_verified: self.verified_for_new_user(),
            created_at: now,
            updated_at: now,
        })
    }

    /// Fields that are provided and differ from `existing`.
    ///
    /// Email and phone are never cleared; the verified flag is compared only
    /// when known. The returned patch carries no timestamp.
    #[must_use]
    pub fn diff(&self, existing: &UserDocument) -> UserPatch {
        fn changed(new: Option<&String>, old: &str) -> Option<String> {
            new.filter(|v| v.as_str() != old).cloned()
        }

        UserPatch {
            email: self
                .email
                .as_ref()
                .map(Email::as_str)
                .filter(|e| *e != existing.email)
                .map(String::from),
            first_name: changed(self.first_name.as_ref(), &existing.first_name),
            last_name: changed(self.last_name.as_ref(), &existing.last_name),
            profile_image: changed(self.profile_image.as_ref(), &existing.profile_image),
            phone_number: changed(
                self.phone_number.as_ref().filter(|p| !p.is_empty()),
                &existing.phone_number,
            ),
            email_verified: self
                .email_verified
                .filter(|v| *v != existing.email_verified),
            ..UserPatch::default()
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use aabhushan_core::DocumentId;

    use super::*;

    fn provider_user(json: &str) -> ProviderUser {
        serde_json::from_str(json).unwrap()
    }

    fn stored(profile: &IdentityProfile) -> UserDocument {
        profile
            .to_new_user(Utc::now())
            .unwrap()
            .into_document(DocumentId::parse("doc1").unwrap())
    }

    #[test]
    fn test_from_provider_user_full() {
        let user = provider_user(
            r#"{
                "id": "user_2abc",
                "email_addresses": [{"email_address": "Priya@Example.in",
                                     "verification": {"status": "verified"}}],
                "phone_numbers": [{"phone_number": "+919876543210"}],
                "first_name": "Priya",
                "last_name": null,
                "image_url": "https://img.clerk.com/abc"
            }"#,
        );
        let profile = IdentityProfile::from_provider_user(&user).unwrap();
        assert_eq!(profile.provider_id.as_str(), "user_2abc");
        assert_eq!(profile.email.unwrap().as_str(), "Priya@Example.in");
        assert_eq!(profile.first_name.as_deref(), Some("Priya"));
        assert_eq!(profile.last_name.as_deref(), Some(""));
        assert_eq!(profile.phone_number.as_deref(), Some("+919876543210"));
        assert_eq!(profile.email_verified, Some(true));
        assert!(!profile.google_signup);
    }

    #[test]
    fn test_from_provider_user_google_signup() {
        let by_image = provider_user(
            r#"{"id":"user_1","image_url":"https://lh3.googleusercontent.com/a/x",
                "email_addresses":[{"email_address":"a@gmail.com"}]}"#,
        );
        let profile = IdentityProfile::from_provider_user(&by_image).unwrap();
        assert!(profile.google_signup);
        assert_eq!(profile.email_verified, Some(false));
        assert!(profile.verified_for_new_user());

        let by_account = provider_user(
            r#"{"id":"user_1","external_accounts":[{"provider":"oauth_google"}],
                "email_addresses":[{"email_address":"a@gmail.com"}]}"#,
        );
        assert!(IdentityProfile::from_provider_user(&by_account).unwrap().google_signup);
    }

    #[test]
    fn test_from_provider_user_requires_id() {
        let user = provider_user(r#"{"email_addresses":[]}"#);
        assert!(matches!(
            IdentityProfile::from_provider_user(&user),
            Err(ProfileError::MissingId)
        ));
    }

    #[test]
    fn test_to_new_user_requires_email() {
        let user = provider_user(r#"{"id":"user_1"}"#);
        let profile = IdentityProfile::from_provider_user(&user).unwrap();
        assert!(matches!(
            profile.to_new_user(Utc::now()),
            Err(ProfileError::MissingEmail)
        ));
    }

    #[test]
    fn test_from_sync_data_empty_strings_not_provided() {
        let data = SyncUserData {
            clerk_id: Some("user_1".to_string()),
            email: Some("a@example.in".to_string()),
            first_name: Some(String::new()),
            last_name: Some("Sharma".to_string()),
            phone_number: Some("  ".to_string()),
            ..SyncUserData::default()
        };
        let profile = IdentityProfile::from_sync_data(&data).unwrap();
        assert_eq!(profile.first_name, None);
        assert_eq!(profile.last_name.as_deref(), Some("Sharma"));
        assert_eq!(profile.phone_number, None);
        assert_eq!(profile.email_verified, None);
        assert!(!profile.google_signup);
    }

    #[test]
    fn test_from_sync_data_keeps_values_as_sent() {
        let data = SyncUserData {
            clerk_id: Some(" user_1 ".to_string()),
            email: Some("a@example.in".to_string()),
            first_name: Some(" Priya ".to_string()),
            last_name: Some("Sharma\t".to_string()),
            profile_image_url: Some(" https://img.clerk.com/a.png".to_string()),
            ..SyncUserData::default()
        };
        let profile = IdentityProfile::from_sync_data(&data).unwrap();
        assert_eq!(profile.provider_id.as_str(), "user_1");
        assert_eq!(profile.first_name.as_deref(), Some(" Priya "));
        assert_eq!(profile.last_name.as_deref(), Some("Sharma\t"));
        assert_eq!(
            profile.profile_image.as_deref(),
            Some(" https://img.clerk.com/a.png")
        );
    }

    #[test]
    fn test_from_sync_data_verified_implies_google() {
        let data = SyncUserData {
            clerk_id: Some("user_1".to_string()),
            email: Some("a@example.in".to_string()),
            email_verified: Some(true),
            ..SyncUserData::default()
        };
        assert!(IdentityProfile::from_sync_data(&data).unwrap().google_signup);
    }

    #[test]
    fn test_from_sync_data_missing_clerk_id() {
        let data = SyncUserData {
            clerk_id: Some(String::new()),
            ..SyncUserData::default()
        };
        assert!(matches!(
            IdentityProfile::from_sync_data(&data),
            Err(ProfileError::MissingId)
        ));
    }

    #[test]
    fn test_new_user_defaults() {
        let data = SyncUserData {
            clerk_id: Some("user_1".to_string()),
            email: Some("a@example.in".to_string()),
            role: Some("admin".to_string()),
            ..SyncUserData::default()
        };
        let new_user = IdentityProfile::from_sync_data(&data)
            .unwrap()
            .to_new_user(Utc::now())
            .unwrap();
        assert_eq!(new_user.role, UserRole::Customer);
        assert!(new_user.is_active);
        assert!(!new_user.email_verified);
        assert_eq!(new_user.first_name, "");
    }

    #[test]
    fn test_diff_identical_profile_is_empty() {
        let data = SyncUserData {
            clerk_id: Some("user_1".to_string()),
            email: Some("a@example.in".to_string()),
            first_name: Some("Asha".to_string()),
            email_verified: Some(false),
            ..SyncUserData::default()
        };
        let profile = IdentityProfile::from_sync_data(&data).unwrap();
        let existing = stored(&profile);
        assert!(profile.diff(&existing).is_empty());
    }

    #[test]
    fn test_diff_only_changed_fields() {
        let original = IdentityProfile::from_sync_data(&SyncUserData {
            clerk_id: Some("user_1".to_string()),
            email: Some("a@example.in".to_string()),
            first_name: Some("Asha".to_string()),
            phone_number: Some("+911111111111".to_string()),
            ..SyncUserData::default()
        })
        .unwrap();
        let existing = stored(&original);

        let update = IdentityProfile::from_sync_data(&SyncUserData {
            clerk_id: Some("user_1".to_string()),
            email: Some("a@example.in".to_string()),
            first_name: Some("Asha Rani".to_string()),
            email_verified: Some(true),
            ..SyncUserData::default()
        })
        .unwrap();

        let patch = update.diff(&existing);
        assert_eq!(patch.first_name.as_deref(), Some("Asha Rani"));
        assert_eq!(patch.email, None);
        assert_eq!(patch.phone_number, None);
        assert_eq!(patch.email_verified, Some(true));
        assert_eq!(patch.updated_at, None);
    }

    #[test]
    fn test_diff_null_name_clears_field() {
        let existing = stored(
            &IdentityProfile::from_provider_user(&provider_user(
                r#"{"id":"user_1","first_name":"Asha",
                    "email_addresses":[{"email_address":"a@example.in"}]}"#,
            ))
            .unwrap(),
        );
        let update = IdentityProfile::from_provider_user(&provider_user(
            r#"{"id":"user_1","first_name":null,
                "email_addresses":[{"email_address":"a@example.in"}]}"#,
        ))
        .unwrap();
        assert_eq!(update.diff(&existing).first_name.as_deref(), Some(""));
    }
}
