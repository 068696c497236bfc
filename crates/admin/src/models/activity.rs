//! Activity log entries.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

use folio_core::ActivityId;

/// Significant console actions worth an audit record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityAction {
    SignIn,
    SignOut,
    PasswordChanged,
    ProfileUpdated,
    SubmissionStatusChanged,
    SubmissionDeleted,
    SubmissionsBulkUpdated,
    ProjectCreated,
    ProjectUpdated,
    ProjectDeleted,
    SiteConfigUpdated,
    MediaUploaded,
    MediaDeleted,
}

impl ActivityAction {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::SignIn => "sign_in",
            Self::SignOut => "sign_out",
            Self::PasswordChanged => "password_changed",
            Self::ProfileUpdated => "profile_updated",
            Self::SubmissionStatusChanged => "submission_status_changed",
            Self::SubmissionDeleted => "submission_deleted",
            Self::SubmissionsBulkUpdated => "submissions_bulk_updated",
            Self::ProjectCreated => "project_created",
            Self::ProjectUpdated => "project_updated",
            Self::ProjectDeleted => "project_deleted",
            Self::SiteConfigUpdated => "site_config_updated",
            Self::MediaUploaded => "media_uploaded",
            Self::MediaDeleted => "media_deleted",
        }
    }
}

impl std::fmt::Display for ActivityAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An activity record about to be written.
#[derive(Debug, Clone, PartialEq)]
pub struct NewActivity {
    pub admin_uid: Option<String>,
    pub console_session_id: Option<String>,
    pub action: ActivityAction,
    /// What was acted on, e.g. `project:12` or a media public id.
    pub target: Option<String>,
    pub details: Value,
}

/// A stored activity record.
#[derive(Debug, Clone, Serialize)]
pub struct ActivityEntry {
    pub id: ActivityId,
    pub admin_uid: Option<String>,
    pub console_session_id: Option<String>,
    /// Stored as text so entries written by newer builds still load.
    pub action: String,
    pub target: Option<String>,
    pub details: Value,
    pub created_at: DateTime<Utc>,
}
