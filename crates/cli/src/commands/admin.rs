//! Admin user management commands.
//!
//! Console access is keyed by the identity provider's user id: create the
//! account in the provider first, then grant it here.
//!
//! # Usage
//!
//! ```bash
//! folio-cli admin grant -u <uid> -e owner@example.com -n "Site Owner" -r owner
//! folio-cli admin revoke -u <uid>
//! folio-cli admin list
//! ```
//!
//! # Environment Variables
//!
//! - `ADMIN_DATABASE_URL` (or `DATABASE_URL`) - `PostgreSQL` connection string

use folio_admin::db::{AdminUserRepository, RepositoryError, create_pool};
use folio_core::{AdminRole, Email};
use thiserror::Error;

use super::{MissingEnvVar, database_url};

/// Errors that can occur during admin operations.
#[derive(Debug, Error)]
pub enum AdminError {
    /// Required environment variable is missing.
    #[error(transparent)]
    MissingEnvVar(#[from] MissingEnvVar),

    /// Database connection error.
    #[error("Database connection error: {0}")]
    Database(#[from] sqlx::Error),

    /// Repository operation failed.
    #[error("{0}")]
    Repository(#[from] RepositoryError),

    /// Invalid role.
    #[error("Invalid role: {0}. Valid roles: owner, editor")]
    InvalidRole(String),

    /// Invalid email.
    #[error("Invalid email: {0}")]
    InvalidEmail(String),

    /// Display name is blank.
    #[error("Display name must not be empty")]
    EmptyName,
}

/// Check and normalize grant arguments before touching the database.
fn parse_grant(email: &str, name: &str, role: &str) -> Result<(Email, String, AdminRole), AdminError> {
    let role: AdminRole = role
        .parse()
        .map_err(|_| AdminError::InvalidRole(role.to_owned()))?;
    let email = Email::parse(email).map_err(|_| AdminError::InvalidEmail(email.to_owned()))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(AdminError::EmptyName);
    }
    Ok((email, name.to_owned(), role))
}

/// Grant console access, or update the role and details of an existing admin.
///
/// # Errors
///
/// Returns an error for invalid arguments, or if the email already belongs
/// to a different admin.
pub async fn grant(uid: &str, email: &str, name: &str, role: &str) -> Result<(), AdminError> {
    let (email, name, role) = parse_grant(email, name, role)?;

    tracing::info!("Connecting to admin database...");
    let pool = create_pool(&database_url()?).await?;

    let admin = AdminUserRepository::new(&pool)
        .grant(uid, &email, &name, role)
        .await?;

    tracing::info!(
        "Admin access granted! UID: {}, Email: {}, Role: {}",
        admin.uid,
        admin.email,
        admin.role
    );
    Ok(())
}

/// Revoke console access.
///
/// # Errors
///
/// Returns an error if no admin has this uid.
pub async fn revoke(uid: &str) -> Result<(), AdminError> {
    tracing::info!("Connecting to admin database...");
    let pool = create_pool(&database_url()?).await?;

    AdminUserRepository::new(&pool).revoke(uid).await?;

    tracing::info!("Admin access revoked for UID: {}", uid);
    tracing::warn!("Existing console sessions stay valid until they expire (24h of inactivity).");
    Ok(())
}

/// Print every admin.
///
/// # Errors
///
/// Returns an error if the query fails.
pub async fn list() -> Result<(), AdminError> {
    let pool = create_pool(&database_url()?).await?;
    let admins = AdminUserRepository::new(&pool).list_all().await?;

    #[allow(clippy::print_stdout)]
    {
        if admins.is_empty() {
            println!("No admins. Grant one with: folio-cli admin grant");
        }
        for admin in admins {
            let last_login = admin
                .last_login_at
                .map_or_else(|| "never".to_owned(), |t| t.to_rfc3339());
            println!(
                "{:<30} {:<32} {:<8} {:<24} last login: {}",
                admin.uid, admin.email, admin.role, admin.display_name, last_login
            );
        }
    }
    Ok(())
}
