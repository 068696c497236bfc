//! Admin user repository for database operations.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use folio_core::{AdminRole, Email};

use super::RepositoryError;
use crate::models::{AdminUser, ProfileUpdate};

const SELECT_ADMIN_USER: &str = r"
    SELECT uid, email, display_name, role, bio, avatar_url,
           last_login_at, created_at, updated_at
    FROM admin.admin_user
";

/// Internal row type for `PostgreSQL` admin user queries.
#[derive(Debug, sqlx::FromRow)]
struct AdminUserRow {
    uid: String,
    email: String,
    display_name: String,
    role: AdminRole,
    bio: String,
    avatar_url: Option<String>,
    last_login_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<AdminUserRow> for AdminUser {
    type Error = RepositoryError;

    fn try_from(row: AdminUserRow) -> Result<Self, Self::Error> {
        let email = Email::parse(&row.email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
        })?;

        Ok(Self {
            uid: row.uid,
            email,
            display_name: row.display_name,
            role: row.role,
            bio: row.bio,
            avatar_url: row.avatar_url,
            last_login_at: row.last_login_at,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Repository for admin user database operations.
pub struct AdminUserRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> AdminUserRepository<'a> {
    /// Create a new admin user repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List all admin users, oldest grant first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the data is invalid.
    pub async fn list_all(&self) -> Result<Vec<AdminUser>, RepositoryError> {
        let rows = sqlx::query_as::<_, AdminUserRow>(&format!(
            "{SELECT_ADMIN_USER} ORDER BY created_at ASC"
        ))
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    /// Get an admin by identity-provider uid. `None` means "not an admin".
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the data is invalid.
    pub async fn get_by_uid(&self, uid: &str) -> Result<Option<AdminUser>, RepositoryError> {
        let row = sqlx::query_as::<_, AdminUserRow>(&format!("{SELECT_ADMIN_USER} WHERE uid = $1"))
            .bind(uid)
            .fetch_optional(self.pool)
            .await?;

        row.map(TryInto::try_into).transpose()
    }

    /// Grant console access, or update the role and email of an existing grant.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if another uid already uses the email.
    pub async fn grant(
        &self,
        uid: &str,
        email: &Email,
        display_name: &str,
        role: AdminRole,
    ) -> Result<AdminUser, RepositoryError> {
        let row = sqlx::query_as::<_, AdminUserRow>(
            r"
            INSERT INTO admin.admin_user (uid, email, display_name, role)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (uid) DO UPDATE
                SET email = EXCLUDED.email, role = EXCLUDED.role, updated_at = NOW()
            RETURNING uid, email, display_name, role, bio, avatar_url,
                      last_login_at, created_at, updated_at
            ",
        )
        .bind(uid)
        .bind(email.as_str())
        .bind(display_name)
        .bind(role)
        .fetch_one(self.pool)
        .await
        .map_err(|e| RepositoryError::unique_violation(e, "email is already granted to another user"))?;

        row.try_into()
    }

    /// Revoke console access.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the uid had no grant.
    pub async fn revoke(&self, uid: &str) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM admin.admin_user WHERE uid = $1")
            .bind(uid)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Update the editable profile fields.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the admin does not exist.
    pub async fn update_profile(
        &self,
        uid: &str,
        profile: &ProfileUpdate,
    ) -> Result<AdminUser, RepositoryError> {
        let row = sqlx::query_as::<_, AdminUserRow>(
            r"
            UPDATE admin.admin_user
            SET display_name = $2, bio = $3, avatar_url = $4, updated_at = NOW()
            WHERE uid = $1
            RETURNING uid, email, display_name, role, bio, avatar_url,
                      last_login_at, created_at, updated_at
            ",
        )
        .bind(uid)
        .bind(&profile.display_name)
        .bind(&profile.bio)
        .bind(profile.avatar_url.as_deref())
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        row.try_into()
    }

    /// Stamp the last successful sign-in.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the update fails.
    pub async fn touch_last_login(&self, uid: &str) -> Result<(), RepositoryError> {
        sqlx::query("UPDATE admin.admin_user SET last_login_at = NOW() WHERE uid = $1")
            .bind(uid)
            .execute(self.pool)
            .await?;
        Ok(())
    }
}
