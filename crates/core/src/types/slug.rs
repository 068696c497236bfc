//! URL slug for portfolio projects.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`Slug`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum SlugError {
    #[error("slug cannot be empty")]
    Empty,
    #[error("slug must be at most {max} characters")]
    TooLong { max: usize },
    #[error("slug may only contain lowercase letters, digits and single hyphens")]
    InvalidFormat,
}

/// A lowercase kebab-case path segment such as `terminal-blog`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(try_from = "String", into = "String")]
pub struct Slug(String);

impl Slug {
    pub const MAX_LENGTH: usize = 80;

    /// Parse an existing slug without altering it.
    ///
    /// # Errors
    ///
    /// Returns an error unless the input is 1-80 characters of `[a-z0-9]`
    /// separated by single hyphens, with no leading or trailing hyphen.
    pub fn parse(s: &str) -> Result<Self, SlugError> {
        if s.is_empty() {
            return Err(SlugError::Empty);
        }
        if s.len() > Self::MAX_LENGTH {
            return Err(SlugError::TooLong {
                max: Self::MAX_LENGTH,
            });
        }
        let valid_chars = s
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-');
        if !valid_chars || s.starts_with('-') || s.ends_with('-') || s.contains("--") {
            return Err(SlugError::InvalidFormat);
        }
        Ok(Self(s.to_owned()))
    }

    /// Derive a slug from a free-form title.
    ///
    /// Runs of anything that is not an ASCII letter or digit collapse into
    /// one hyphen, and the result is truncated at a hyphen boundary.
    ///
    /// # Errors
    ///
    /// Returns [`SlugError::Empty`] if the title has no ASCII alphanumerics.
    pub fn from_title(title: &str) -> Result<Self, SlugError> {
        let mut slug = String::with_capacity(title.len());
        for c in title.chars() {
            if c.is_ascii_alphanumeric() {
                slug.push(c.to_ascii_lowercase());
            } else if !slug.is_empty() && !slug.ends_with('-') {
                slug.push('-');
            }
        }

        if slug.len() > Self::MAX_LENGTH {
            slug.truncate(Self::MAX_LENGTH);
        }
        while slug.ends_with('-') {
            slug.pop();
        }

        Self::parse(&slug)
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Slug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Slug {
    type Error = SlugError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Slug> for String {
    fn from(slug: Slug) -> Self {
        slug.0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn derives_from_title() {
        let slug = Slug::from_title("  Terminal Blog: v2.0 (Rust!) ").unwrap();
        assert_eq!(slug.as_str(), "terminal-blog-v2-0-rust");
    }

    #[test]
    fn title_without_ascii_alphanumerics_is_empty() {
        assert_eq!(Slug::from_title("!!! ???"), Err(SlugError::Empty));
    }

    #[test]
    fn derived_slug_never_ends_with_hyphen_after_truncation() {
        let title = format!("{} tail", "a".repeat(Slug::MAX_LENGTH - 1));
        let slug = Slug::from_title(&title).unwrap();
        assert!(!slug.as_str().ends_with('-'));
        assert!(slug.as_str().len() <= Slug::MAX_LENGTH);
    }

    #[test]
    fn parse_rejects_bad_shapes() {
        assert_eq!(Slug::parse("Upper"), Err(SlugError::InvalidFormat));
        assert_eq!(Slug::parse("-lead"), Err(SlugError::InvalidFormat));
        assert_eq!(Slug::parse("double--dash"), Err(SlugError::InvalidFormat));
        assert!(Slug::parse("ok-slug-2").is_ok());
    }
}
