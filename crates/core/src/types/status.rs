//! Status and role enums stored in the `admin` schema.

use serde::{Deserialize, Serialize};

/// Triage status of a contact-form submission.
///
/// The usual path is `new → read → replied → archived`, but an admin may set
/// any status directly (for example to un-archive a thread).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "admin.submission_status", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionStatus {
    #[default]
    New,
    Read,
    Replied,
    Archived,
}

impl SubmissionStatus {
    /// All statuses in triage order.
    pub const ALL: [Self; 4] = [Self::New, Self::Read, Self::Replied, Self::Archived];

    /// The string used in the database and in query parameters.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::New => "new",
            Self::Read => "read",
            Self::Replied => "replied",
            Self::Archived => "archived",
        }
    }

    /// Whether the submission still needs the admin's attention.
    #[must_use]
    pub const fn is_open(self) -> bool {
        matches!(self, Self::New | Self::Read)
    }
}

impl std::fmt::Display for SubmissionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for SubmissionStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "new" => Ok(Self::New),
            "read" => Ok(Self::Read),
            "replied" => Ok(Self::Replied),
            "archived" => Ok(Self::Archived),
            _ => Err(format!("invalid submission status: {s}")),
        }
    }
}

/// Admin role with different permission levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "admin.admin_role", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum AdminRole {
    /// Site owner: everything, including site configuration.
    Owner,
    /// Can triage submissions and edit content and media.
    Editor,
}

impl AdminRole {
    /// Whether this role may change the site configuration document.
    #[must_use]
    pub const fn can_configure_site(self) -> bool {
        matches!(self, Self::Owner)
    }
}

impl std::fmt::Display for AdminRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Owner => write!(f, "owner"),
            Self::Editor => write!(f, "editor"),
        }
    }
}

impl std::str::FromStr for AdminRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "owner" => Ok(Self::Owner),
            "editor" => Ok(Self::Editor),
            _ => Err(format!("invalid admin role: {s}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_round_trips_through_str() {
        for status in SubmissionStatus::ALL {
            assert_eq!(status.as_str().parse::<SubmissionStatus>(), Ok(status));
        }
        assert!("spam".parse::<SubmissionStatus>().is_err());
    }

    #[test]
    fn only_new_and_read_are_open() {
        assert!(SubmissionStatus::New.is_open());
        assert!(SubmissionStatus::Read.is_open());
        assert!(!SubmissionStatus::Replied.is_open());
        assert!(!SubmissionStatus::Archived.is_open());
    }

    #[test]
    fn only_owner_configures_site() {
        assert!(AdminRole::Owner.can_configure_site());
        assert!(!AdminRole::Editor.can_configure_site());
        assert_eq!("editor".parse::<AdminRole>(), Ok(AdminRole::Editor));
    }
}
