//! Database operations for admin `PostgreSQL`.
//!
//! ## Tables (schema `admin`)
//!
//! - `admin_user` - Identity-provider users granted console access
//! - `contact_submission` - Contact-form inbox
//! - `project` - Portfolio projects
//! - `setting` - JSON settings documents (site configuration)
//! - `activity_log` - Best-effort audit trail of console actions
//! - `session` - tower-sessions store (lockout record lives in here)
//!
//! Queries are built at runtime with `sqlx::query_as::<_, Row>` so the
//! crate compiles without a live database or offline query data.
//!
//! # Migrations
//!
//! Migrations are stored in `crates/admin/migrations/` and run via:
//! ```bash
//! cargo run -p folio-cli -- migrate
//! ```

pub mod activity;
pub mod admin_users;
pub mod projects;
pub mod settings;
pub mod submissions;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub use activity::ActivityRepository;
pub use admin_users::AdminUserRepository;
pub use projects::ProjectRepository;
pub use settings::SettingsRepository;
pub use submissions::SubmissionRepository;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., unique slug).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

impl RepositoryError {
    /// Map unique-constraint violations to [`RepositoryError::Conflict`].
    pub(crate) fn unique_violation(err: sqlx::Error, message: &str) -> Self {
        match &err {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                Self::Conflict(message.to_string())
            }
            _ => Self::Database(err),
        }
    }
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
