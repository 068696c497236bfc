//! Settings database operations.
//!
//! Settings are JSON documents keyed by a dotted name such as `site.config`.

use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value as JsonValue;
use sqlx::PgPool;

use super::RepositoryError;

/// Repository for JSON settings documents.
pub struct SettingsRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> SettingsRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get a raw setting value.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn get_setting(&self, key: &str) -> Result<Option<JsonValue>, RepositoryError> {
        let value = sqlx::query_scalar::<_, JsonValue>("SELECT value FROM admin.setting WHERE key = $1")
            .bind(key)
            .fetch_optional(self.pool)
            .await?;

        Ok(value)
    }

    /// Set a raw setting value.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn set_setting(&self, key: &str, value: &JsonValue) -> Result<(), RepositoryError> {
        sqlx::query(
            r"
            INSERT INTO admin.setting (key, value)
            VALUES ($1, $2)
            ON CONFLICT (key) DO UPDATE SET value = EXCLUDED.value, updated_at = NOW()
            ",
        )
        .bind(key)
        .bind(value)
        .execute(self.pool)
        .await?;

        Ok(())
    }

    /// Get a typed setting, falling back to `T::default()` when unset.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::DataCorruption` if the stored document does
    /// not match `T`.
    pub async fn get_typed<T: DeserializeOwned + Default>(
        &self,
        key: &str,
    ) -> Result<T, RepositoryError> {
        match self.get_setting(key).await? {
            Some(value) => serde_json::from_value(value).map_err(|e| {
                RepositoryError::DataCorruption(format!("invalid setting {key}: {e}"))
            }),
            None => Ok(T::default()),
        }
    }

    /// Store a typed setting.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn set_typed<T: Serialize>(&self, key: &str, value: &T) -> Result<(), RepositoryError> {
        let json = serde_json::to_value(value).map_err(|e| {
            RepositoryError::DataCorruption(format!("unserializable setting {key}: {e}"))
        })?;
        self.set_setting(key, &json).await
    }
}
