//! Activity log repository.

use chrono::{DateTime, Utc};
use serde_json::Value as JsonValue;
use sqlx::PgPool;

use folio_core::ActivityId;

use super::RepositoryError;
use crate::models::{ActivityEntry, NewActivity};

/// Largest page the dashboard may request.
pub const MAX_RECENT: i64 = 200;

#[derive(Debug, sqlx::FromRow)]
struct ActivityRow {
    id: i64,
    admin_uid: Option<String>,
    console_session_id: Option<String>,
    action: String,
    target: Option<String>,
    details: JsonValue,
    created_at: DateTime<Utc>,
}

impl From<ActivityRow> for ActivityEntry {
    fn from(row: ActivityRow) -> Self {
        Self {
            id: ActivityId::new(row.id),
            admin_uid: row.admin_uid,
            console_session_id: row.console_session_id,
            action: row.action,
            target: row.target,
            details: row.details,
            created_at: row.created_at,
        }
    }
}

/// Repository for the activity log.
#[derive(Clone, Copy)]
pub struct ActivityRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ActivityRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn insert(&self, activity: &NewActivity) -> Result<(), RepositoryError> {
        sqlx::query(
            r"
            INSERT INTO admin.activity_log
                (admin_uid, console_session_id, action, target, details)
            VALUES ($1, $2, $3, $4, $5)
            ",
        )
        .bind(activity.admin_uid.as_deref())
        .bind(activity.console_session_id.as_deref())
        .bind(activity.action.as_str())
        .bind(activity.target.as_deref())
        .bind(&activity.details)
        .execute(self.pool)
        .await?;

        Ok(())
    }

    /// Newest entries first, at most `limit` (clamped to 1..=200).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn recent(&self, limit: i64) -> Result<Vec<ActivityEntry>, RepositoryError> {
        let rows = sqlx::query_as::<_, ActivityRow>(
            r"
            SELECT id, admin_uid, console_session_id, action, target, details, created_at
            FROM admin.activity_log
            ORDER BY created_at DESC, id DESC
            LIMIT $1
            ",
        )
        .bind(limit.clamp(1, MAX_RECENT))
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }
}
