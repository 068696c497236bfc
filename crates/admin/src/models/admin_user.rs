//! Admin user domain types.
//!
//! An admin is an identity-provider account that also has a row in
//! `admin.admin_user`; the provider owns the password, this record owns the
//! role and profile.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use folio_core::Email;

// Re-export AdminRole from core for convenience
pub use folio_core::AdminRole;

use crate::error::FieldError;

const MAX_DISPLAY_NAME_LENGTH: usize = 80;
const MAX_BIO_LENGTH: usize = 2_000;

/// An admin user (domain type).
#[derive(Debug, Clone, Serialize)]
pub struct AdminUser {
    /// Identity-provider user id.
    pub uid: String,
    /// Admin's email address.
    pub email: Email,
    /// Admin's display name.
    pub display_name: String,
    /// Admin's role/permission level.
    pub role: AdminRole,
    /// Short biography shown on the portfolio's about page.
    pub bio: String,
    /// Avatar image URL.
    pub avatar_url: Option<String>,
    /// Last successful console sign-in.
    pub last_login_at: Option<DateTime<Utc>>,
    /// When the admin was created.
    pub created_at: DateTime<Utc>,
    /// When the admin was last updated.
    pub updated_at: DateTime<Utc>,
}

/// Editable profile fields.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfileUpdate {
    pub display_name: String,
    #[serde(default)]
    pub bio: String,
    #[serde(default)]
    pub avatar_url: Option<String>,
}

impl ProfileUpdate {
    /// Trim fields and check lengths and the avatar URL scheme.
    ///
    /// # Errors
    ///
    /// Returns every invalid field.
    pub fn validate(mut self) -> Result<Self, Vec<FieldError>> {
        let mut errors = Vec::new();

        self.display_name = self.display_name.trim().to_string();
        self.bio = self.bio.trim().to_string();
        self.avatar_url = self
            .avatar_url
            .map(|url| url.trim().to_string())
            .filter(|url| !url.is_empty());

        if self.display_name.is_empty() {
            errors.push(FieldError::new("display_name", "Display name is required."));
        } else if self.display_name.chars().count() > MAX_DISPLAY_NAME_LENGTH {
            errors.push(FieldError::new(
                "display_name",
                format!("Display name must be at most {MAX_DISPLAY_NAME_LENGTH} characters."),
            ));
        }
        if self.bio.chars().count() > MAX_BIO_LENGTH {
            errors.push(FieldError::new(
                "bio",
                format!("Bio must be at most {MAX_BIO_LENGTH} characters."),
            ));
        }
        if let Some(url) = &self.avatar_url
            && !is_http_url(url)
        {
            errors.push(FieldError::new(
                "avatar_url",
                "Avatar URL must start with http:// or https://.",
            ));
        }

        if errors.is_empty() {
            Ok(self)
        } else {
            Err(errors)
        }
    }
}

/// Whether `value` parses as an absolute http(s) URL.
pub(crate) fn is_http_url(value: &str) -> bool {
    url::Url::parse(value).is_ok_and(|url| matches!(url.scheme(), "http" | "https"))
}
