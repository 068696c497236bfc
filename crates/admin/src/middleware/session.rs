//! Session middleware configuration for admin.
//!
//! Sets up `PostgreSQL`-backed sessions using tower-sessions with
//! strict cookie settings (SameSite=Strict, 24hr inactivity expiry).
//!
//! The session also backs the per-browser key-value storage used by the
//! sign-in lockout and the "remember me" email.

use sqlx::PgPool;
use tower_sessions::{Expiry, Session, SessionManagerLayer};
use tower_sessions_sqlx_store::PostgresStore;

use folio_core::KeyValueStore;

use crate::config::AdminConfig;
use crate::models::{CurrentAdmin, session_keys};

/// Session cookie name for admin.
pub const SESSION_COOKIE_NAME: &str = "folio_admin_session";

/// Session expiry time in seconds (24 hours).
const SESSION_EXPIRY_SECONDS: i64 = 24 * 60 * 60;

/// Create the session layer with `PostgreSQL` store.
///
/// # Panics
///
/// Panics if the schema name or table name is invalid (should never happen
/// with hardcoded "admin" and "session" values).
#[must_use]
pub fn create_session_layer(
    pool: &PgPool,
    config: &AdminConfig,
) -> SessionManagerLayer<PostgresStore> {
    // The session table is created by the admin schema migration.
    let store = PostgresStore::new(pool.clone())
        .with_schema_name("admin")
        .expect("valid schema name")
        .with_table_name("session")
        .expect("valid table name");

    SessionManagerLayer::new(store)
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(
            tower_sessions::cookie::time::Duration::seconds(SESSION_EXPIRY_SECONDS),
        ))
        .with_secure(config.is_secure())
        .with_same_site(tower_sessions::cookie::SameSite::Strict)
        .with_http_only(true)
        .with_path("/")
}

/// Browser-scoped string storage kept in the session record.
///
/// Survives sign-out (only the admin identity is removed) but not a
/// cleared cookie jar, like browser local storage.
#[derive(Debug, Clone)]
pub struct BrowserStorage {
    session: Session,
}

impl BrowserStorage {
    #[must_use]
    pub const fn new(session: Session) -> Self {
        Self { session }
    }
}

impl KeyValueStore for BrowserStorage {
    type Error = tower_sessions::session::Error;

    async fn get(&self, key: &str) -> Result<Option<String>, Self::Error> {
        self.session.get::<String>(key).await
    }

    async fn set(&self, key: &str, value: String) -> Result<(), Self::Error> {
        self.session.insert(key, value).await
    }

    async fn remove(&self, key: &str) -> Result<(), Self::Error> {
        self.session.remove::<String>(key).await?;
        Ok(())
    }
}

/// Helper to set the current admin in the session.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_current_admin(
    session: &Session,
    admin: &CurrentAdmin,
) -> Result<(), tower_sessions::session::Error> {
    session.insert(session_keys::CURRENT_ADMIN, admin).await
}

/// Helper to clear the current admin from the session (logout).
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn clear_current_admin(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session
        .remove::<CurrentAdmin>(session_keys::CURRENT_ADMIN)
        .await?;
    session
        .remove::<String>(session_keys::CONSOLE_SESSION_KEY)
        .await?;
    Ok(())
}
