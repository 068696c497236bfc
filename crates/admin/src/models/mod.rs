//! Domain models for admin.

pub mod activity;
pub mod admin_user;
pub mod project;
pub mod session;
pub mod site_config;
pub mod submission;

pub use activity::{ActivityAction, ActivityEntry, NewActivity};
pub use admin_user::{AdminRole, AdminUser, ProfileUpdate};
pub use project::{Project, ProjectInput, ValidProject};
pub use session::{CurrentAdmin, keys as session_keys};
pub use site_config::{SITE_CONFIG_KEY, SiteConfig, SocialLink};
pub use submission::{
    BulkAction, BulkRequest, NewSubmission, Page, StatusUpdate, Submission, SubmissionQuery,
    SubmissionStats, ValidSubmission,
};
