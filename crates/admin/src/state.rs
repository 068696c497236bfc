//! Application state shared across handlers.

use std::sync::Arc;

use folio_core::LockoutPolicy;
use sqlx::PgPool;
use thiserror::Error;

use crate::config::AdminConfig;
use crate::services::identity::{AuthProviderError, FirebaseAuthClient};
use crate::services::media::{CloudinaryClient, MediaError};

/// Errors building the shared state.
#[derive(Debug, Error)]
pub enum StateError {
    #[error("identity client: {0}")]
    Identity(#[from] AuthProviderError),
    #[error("media client: {0}")]
    Media(#[from] MediaError),
}

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: AdminConfig,
    pool: PgPool,
    identity: FirebaseAuthClient,
    media: CloudinaryClient,
    policy: LockoutPolicy,
}

impl AppState {
    /// Build the state and its API clients from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if an HTTP client cannot be constructed.
    pub fn new(config: AdminConfig, pool: PgPool) -> Result<Self, StateError> {
        let identity = FirebaseAuthClient::new(&config.identity)?;
        let media = CloudinaryClient::new(&config.media)?;
        let policy = config.lockout.policy();

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                identity,
                media,
                policy,
            }),
        })
    }

    #[must_use]
    pub fn config(&self) -> &AdminConfig {
        &self.inner.config
    }

    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    #[must_use]
    pub fn identity(&self) -> &FirebaseAuthClient {
        &self.inner.identity
    }

    #[must_use]
    pub fn media(&self) -> &CloudinaryClient {
        &self.inner.media
    }

    /// Lockout thresholds for the sign-in gate.
    #[must_use]
    pub fn policy(&self) -> LockoutPolicy {
        self.inner.policy
    }
}

#[cfg(test)]
impl AppState {
    /// State over [`AdminConfig::for_tests`] with a pool that only connects
    /// when a handler queries it.
    pub(crate) fn for_tests() -> Self {
        let pool = sqlx::postgres::PgPoolOptions::new()
            .connect_lazy("postgres://localhost/folio_test")
            .expect("lazy pool");
        Self::new(AdminConfig::for_tests(), pool).expect("test state")
    }
}
