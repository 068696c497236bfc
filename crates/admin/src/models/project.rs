//! Portfolio projects edited from the console.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use folio_core::{ProjectId, Slug, SlugError};

use super::admin_user::is_http_url;
use crate::error::FieldError;

const MAX_TITLE_LENGTH: usize = 120;
const MAX_SUMMARY_LENGTH: usize = 500;
const MAX_TAGS: usize = 20;
const MAX_TAG_LENGTH: usize = 40;

/// A portfolio project (domain type).
#[derive(Debug, Clone, Serialize)]
pub struct Project {
    pub id: ProjectId,
    pub slug: Slug,
    pub title: String,
    pub summary: String,
    /// Markdown body.
    pub body: String,
    pub tags: Vec<String>,
    /// Media CDN public id of the cover image.
    pub cover_image: Option<String>,
    pub repo_url: Option<String>,
    pub live_url: Option<String>,
    pub featured: bool,
    pub published: bool,
    pub sort_order: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Create/update payload from the project editor.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ProjectInput {
    pub title: String,
    /// Derived from the title when blank.
    pub slug: Option<String>,
    pub summary: String,
    pub body: String,
    pub tags: Vec<String>,
    pub cover_image: Option<String>,
    pub repo_url: Option<String>,
    pub live_url: Option<String>,
    pub featured: bool,
    pub published: bool,
    pub sort_order: i32,
}

/// A project payload that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidProject {
    pub slug: Slug,
    pub title: String,
    pub summary: String,
    pub body: String,
    pub tags: Vec<String>,
    pub cover_image: Option<String>,
    pub repo_url: Option<String>,
    pub live_url: Option<String>,
    pub featured: bool,
    pub published: bool,
    pub sort_order: i32,
}

fn non_blank(value: Option<&String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn slug_message(err: &SlugError) -> String {
    match err {
        SlugError::Empty => "Slug is required (or give the project a title with letters or digits).".to_string(),
        other => format!("Slug {other}."),
    }
}

impl ProjectInput {
    /// Normalize and check the payload.
    ///
    /// # Errors
    ///
    /// Returns every invalid field.
    pub fn validate(&self) -> Result<ValidProject, Vec<FieldError>> {
        let mut errors = Vec::new();
        let title = self.title.trim().to_string();

        if title.is_empty() {
            errors.push(FieldError::new("title", "Title is required."));
        } else if title.chars().count() > MAX_TITLE_LENGTH {
            errors.push(FieldError::new(
                "title",
                format!("Title must be at most {MAX_TITLE_LENGTH} characters."),
            ));
        }

        let slug = match non_blank(self.slug.as_ref()) {
            Some(slug) => Slug::parse(&slug),
            None => Slug::from_title(&title),
        };
        if let Err(err) = &slug {
            // A missing title already explains an underivable slug.
            if !(title.is_empty() && self.slug.is_none()) {
                errors.push(FieldError::new("slug", slug_message(err)));
            }
        }

        let summary = self.summary.trim().to_string();
        if summary.chars().count() > MAX_SUMMARY_LENGTH {
            errors.push(FieldError::new(
                "summary",
                format!("Summary must be at most {MAX_SUMMARY_LENGTH} characters."),
            ));
        }

        let mut tags: Vec<String> = Vec::new();
        for tag in self.tags.iter().map(|t| t.trim().to_lowercase()) {
            if !tag.is_empty() && !tags.contains(&tag) {
                tags.push(tag);
            }
        }
        if tags.len() > MAX_TAGS {
            errors.push(FieldError::new(
                "tags",
                format!("At most {MAX_TAGS} tags are allowed."),
            ));
        }
        if tags.iter().any(|t| t.chars().count() > MAX_TAG_LENGTH) {
            errors.push(FieldError::new(
                "tags",
                format!("Tags must be at most {MAX_TAG_LENGTH} characters."),
            ));
        }

        let repo_url = non_blank(self.repo_url.as_ref());
        let live_url = non_blank(self.live_url.as_ref());
        for (field, url) in [("repo_url", &repo_url), ("live_url", &live_url)] {
            if url.as_deref().is_some_and(|u| !is_http_url(u)) {
                errors.push(FieldError::new(
                    field,
                    "URL must start with http:// or https://.",
                ));
            }
        }

        match slug {
            Ok(slug) if errors.is_empty() => Ok(ValidProject {
                slug,
                title,
                summary,
                body: self.body.trim_end().to_string(),
                tags,
                cover_image: non_blank(self.cover_image.as_ref()),
                repo_url,
                live_url,
                featured: self.featured,
                published: self.published,
                sort_order: self.sort_order,
            }),
            _ => Err(errors),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn input(title: &str) -> ProjectInput {
        ProjectInput {
            title: title.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn slug_is_derived_from_title_when_blank() {
        let mut project = input("Terminal Blog");
        project.slug = Some("  ".to_string());
        let valid = project.validate().unwrap();
        assert_eq!(valid.slug.as_str(), "terminal-blog");
    }

    #[test]
    fn explicit_slug_must_be_kebab_case() {
        let mut project = input("Terminal Blog");
        project.slug = Some("Terminal_Blog".to_string());
        let errors = project.validate().unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "slug");
    }

    #[test]
    fn missing_title_reports_only_title() {
        let errors = input("   ").validate().unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "title");
    }

    #[test]
    fn tags_are_normalized_and_deduplicated() {
        let mut project = input("Synth");
        project.tags = vec![
            "Rust".to_string(),
            " rust ".to_string(),
            String::new(),
            "Audio".to_string(),
        ];
        assert_eq!(project.validate().unwrap().tags, vec!["rust", "audio"]);
    }

    #[test]
    fn urls_must_be_http() {
        let mut project = input("Synth");
        project.repo_url = Some("git@github.com:me/synth.git".to_string());
        project.live_url = Some("https://synth.example.com".to_string());
        let errors = project.validate().unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "repo_url");
    }
}
