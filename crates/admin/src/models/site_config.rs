//! Site-wide configuration document (`site.config` setting).

use serde::{Deserialize, Serialize};

use folio_core::Email;

use super::admin_user::is_http_url;
use crate::error::FieldError;

/// Settings key the document is stored under.
pub const SITE_CONFIG_KEY: &str = "site.config";

const MAX_SOCIAL_LINKS: usize = 12;

/// A link shown in the site footer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SocialLink {
    /// Display label, e.g. "GitHub".
    pub label: String,
    pub url: String,
}

/// Public site configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    pub site_title: String,
    pub tagline: String,
    /// Where contact notifications go; blank disables notifications.
    pub contact_email: Option<String>,
    pub social_links: Vec<SocialLink>,
    /// Shows the "available for work" badge.
    pub available_for_work: bool,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            site_title: "Portfolio".to_string(),
            tagline: String::new(),
            contact_email: None,
            social_links: Vec::new(),
            available_for_work: false,
        }
    }
}

impl SiteConfig {
    /// Normalize and check the document.
    ///
    /// # Errors
    ///
    /// Returns every invalid field.
    pub fn validate(mut self) -> Result<Self, Vec<FieldError>> {
        let mut errors = Vec::new();

        self.site_title = self.site_title.trim().to_string();
        self.tagline = self.tagline.trim().to_string();
        if self.site_title.is_empty() {
            errors.push(FieldError::new("site_title", "Site title is required."));
        }

        self.contact_email = match self.contact_email.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) => match Email::parse(raw) {
                Ok(email) => Some(email.to_string()),
                Err(_) => {
                    errors.push(FieldError::new(
                        "contact_email",
                        "Please enter a valid email address.",
                    ));
                    Some(raw.to_string())
                }
            },
        };

        if self.social_links.len() > MAX_SOCIAL_LINKS {
            errors.push(FieldError::new(
                "social_links",
                format!("At most {MAX_SOCIAL_LINKS} links are allowed."),
            ));
        }
        for link in &mut self.social_links {
            link.label = link.label.trim().to_string();
            link.url = link.url.trim().to_string();
        }
        if self
            .social_links
            .iter()
            .any(|link| link.label.is_empty() || !is_http_url(&link.url))
        {
            errors.push(FieldError::new(
                "social_links",
                "Each link needs a label and an http(s) URL.",
            ));
        }

        if errors.is_empty() {
            Ok(self)
        } else {
            Err(errors)
        }
    }
}
