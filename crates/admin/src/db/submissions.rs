//! Contact submission repository.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use folio_core::{Email, SubmissionId, SubmissionStatus};

use super::RepositoryError;
use crate::models::{Submission, ValidSubmission};

const RETURNING_COLUMNS: &str =
    "id, name, email, subject, message, status, replied_at, created_at, updated_at";

/// Internal row type for `PostgreSQL` submission queries.
#[derive(Debug, sqlx::FromRow)]
struct SubmissionRow {
    id: i64,
    name: String,
    email: String,
    subject: String,
    message: String,
    status: SubmissionStatus,
    replied_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<SubmissionRow> for Submission {
    type Error = RepositoryError;

    fn try_from(row: SubmissionRow) -> Result<Self, Self::Error> {
        let email = Email::parse(&row.email).map_err(|e| {
            RepositoryError::DataCorruption(format!(
                "invalid email on submission {}: {e}",
                row.id
            ))
        })?;

        Ok(Self {
            id: SubmissionId::new(row.id),
            name: row.name,
            email,
            subject: row.subject,
            message: row.message,
            status: row.status,
            replied_at: row.replied_at,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Repository for the contact-form inbox.
pub struct SubmissionRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> SubmissionRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Load the whole inbox, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_all(&self) -> Result<Vec<Submission>, RepositoryError> {
        let rows = sqlx::query_as::<_, SubmissionRow>(&format!(
            "SELECT {RETURNING_COLUMNS} FROM admin.contact_submission ORDER BY created_at DESC"
        ))
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no submission has this id.
    pub async fn get(&self, id: SubmissionId) -> Result<Submission, RepositoryError> {
        sqlx::query_as::<_, SubmissionRow>(&format!(
            "SELECT {RETURNING_COLUMNS} FROM admin.contact_submission WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)?
        .try_into()
    }

    /// Store a submission from the public contact form.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create(&self, submission: &ValidSubmission) -> Result<Submission, RepositoryError> {
        sqlx::query_as::<_, SubmissionRow>(&format!(
            r"
            INSERT INTO admin.contact_submission (name, email, subject, message)
            VALUES ($1, $2, $3, $4)
            RETURNING {RETURNING_COLUMNS}
            "
        ))
        .bind(&submission.name)
        .bind(submission.email.as_str())
        .bind(&submission.subject)
        .bind(&submission.message)
        .fetch_one(self.pool)
        .await?
        .try_into()
    }

    /// Set the status of one submission.
    ///
    /// Moving to `replied` stamps `replied_at` the first time; the stamp is
    /// kept when the thread is later archived.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no submission has this id.
    pub async fn set_status(
        &self,
        id: SubmissionId,
        status: SubmissionStatus,
    ) -> Result<Submission, RepositoryError> {
        sqlx::query_as::<_, SubmissionRow>(&format!(
            r"
            UPDATE admin.contact_submission
            SET status = $2,
                replied_at = CASE
                    WHEN $2 = 'replied'::admin.submission_status
                        THEN COALESCE(replied_at, NOW())
                    ELSE replied_at
                END,
                updated_at = NOW()
            WHERE id = $1
            RETURNING {RETURNING_COLUMNS}
            "
        ))
        .bind(id)
        .bind(status)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)?
        .try_into()
    }

    /// Mark a `new` submission as `read`; other statuses are left alone.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the update fails.
    pub async fn mark_read_if_new(&self, id: SubmissionId) -> Result<bool, RepositoryError> {
        let result = sqlx::query(
            r"
            UPDATE admin.contact_submission
            SET status = 'read', updated_at = NOW()
            WHERE id = $1 AND status = 'new'
            ",
        )
        .bind(id)
        .execute(self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Set the status of many submissions. Returns the number updated.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the update fails.
    pub async fn set_status_many(
        &self,
        ids: &[SubmissionId],
        status: SubmissionStatus,
    ) -> Result<u64, RepositoryError> {
        let raw: Vec<i64> = ids.iter().map(SubmissionId::as_i64).collect();
        let result = sqlx::query(
            r"
            UPDATE admin.contact_submission
            SET status = $2,
                replied_at = CASE
                    WHEN $2 = 'replied'::admin.submission_status
                        THEN COALESCE(replied_at, NOW())
                    ELSE replied_at
                END,
                updated_at = NOW()
            WHERE id = ANY($1)
            ",
        )
        .bind(&raw)
        .bind(status)
        .execute(self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no submission has this id.
    pub async fn delete(&self, id: SubmissionId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM admin.contact_submission WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Delete many submissions. Returns the number deleted.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the delete fails.
    pub async fn delete_many(&self, ids: &[SubmissionId]) -> Result<u64, RepositoryError> {
        let raw: Vec<i64> = ids.iter().map(SubmissionId::as_i64).collect();
        let result = sqlx::query("DELETE FROM admin.contact_submission WHERE id = ANY($1)")
            .bind(&raw)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}
