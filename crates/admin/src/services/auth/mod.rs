//! Admin authentication gate.
//!
//! Sign-in goes through three checks in order:
//!
//! 1. the browser's lockout record (no provider call while locked),
//! 2. the hosted identity provider (email/password),
//! 3. the admin directory (is this provider account an admin?).
//!
//! Credential failures and "not an admin" outcomes count toward the
//! lockout; provider outages and provider-side throttling do not. Lockout
//! storage is best-effort: if the session store cannot be read or written
//! the attempt proceeds as if no record existed.

mod error;

pub use error::LoginError;

use std::future::Future;

use chrono::{DateTime, Utc};
use folio_core::{
    AuthErrorKind, Email, KeyValueStore, LockoutDecision, LockoutPolicy, LockoutState,
    LockoutStore, PasswordStrength,
};
use secrecy::{ExposeSecret, SecretString};

use crate::db::{AdminUserRepository, RepositoryError};
use crate::models::AdminUser;
use crate::services::identity::{AuthProviderError, IdentityProvider};

/// Lookup of the "is this user an admin" record.
pub trait AdminDirectory: Send + Sync {
    fn find_admin(
        &self,
        uid: &str,
    ) -> impl Future<Output = Result<Option<AdminUser>, RepositoryError>> + Send;
}

impl AdminDirectory for AdminUserRepository<'_> {
    async fn find_admin(&self, uid: &str) -> Result<Option<AdminUser>, RepositoryError> {
        self.get_by_uid(uid).await
    }
}

/// Sign-in, password reset and password change for the console.
pub struct AuthGate<'a, P, D> {
    provider: &'a P,
    directory: &'a D,
    policy: LockoutPolicy,
}

impl<'a, P: IdentityProvider, D: AdminDirectory> AuthGate<'a, P, D> {
    #[must_use]
    pub const fn new(provider: &'a P, directory: &'a D, policy: LockoutPolicy) -> Self {
        Self {
            provider,
            directory,
            policy,
        }
    }

    /// Current lockout decision for this browser.
    ///
    /// Expired locks are cleared and stale records repaired as a side effect.
    pub async fn lockout_status<S: KeyValueStore>(
        &self,
        storage: &S,
        now: DateTime<Utc>,
    ) -> LockoutDecision {
        let store = LockoutStore::new(storage);
        let state = load_state(&store).await;
        let (decision, next) = self.policy.check(now, state);
        if next != state {
            save_state(&store, next).await;
        }
        decision
    }

    /// Authenticate an admin.
    ///
    /// # Errors
    ///
    /// - [`LoginError::LockedOut`] while the browser is locked (before and
    ///   after the failure that triggers the lock),
    /// - [`LoginError::InvalidCredentials`] / [`LoginError::NotAdmin`] for
    ///   counted failures,
    /// - [`LoginError::InvalidEmail`] for malformed input (not counted),
    /// - [`LoginError::Provider`] / [`LoginError::Repository`] for outages
    ///   (not counted).
    #[tracing::instrument(skip(self, storage, password))]
    pub async fn sign_in<S: KeyValueStore>(
        &self,
        storage: &S,
        email: &str,
        password: &SecretString,
        now: DateTime<Utc>,
    ) -> Result<AdminUser, LoginError> {
        let store = LockoutStore::new(storage);
        let stored = load_state(&store).await;
        let (decision, state) = self.policy.check(now, stored);
        if state != stored {
            save_state(&store, state).await;
        }
        if let LockoutDecision::Locked {
            locked_until,
            minutes_remaining,
        } = decision
        {
            tracing::info!(minutes_remaining, "Sign-in rejected by lockout");
            return Err(LoginError::LockedOut {
                minutes_remaining,
                locked_until,
            });
        }

        let email = Email::parse(email)?;

        let session = match self.provider.sign_in(&email, password).await {
            Ok(session) => session,
            Err(err) if err.kind().is_credential_failure() => {
                let kind = err.kind();
                return Err(self
                    .count_failure(&store, state, now, |attempts_remaining| {
                        LoginError::InvalidCredentials {
                            kind,
                            attempts_remaining,
                        }
                    })
                    .await);
            }
            Err(err) => {
                tracing::warn!(error = %err, "Identity provider unavailable");
                return Err(LoginError::Provider(err));
            }
        };

        let Some(admin) = self.directory.find_admin(&session.uid).await? else {
            tracing::warn!(uid = %session.uid, "Provider sign-in for non-admin account");
            // Dropping the tokens discards the provider session.
            drop(session);
            return Err(self
                .count_failure(&store, state, now, |attempts_remaining| {
                    LoginError::NotAdmin { attempts_remaining }
                })
                .await);
        };

        save_state(&store, self.policy.record_success()).await;
        tracing::info!(uid = %admin.uid, "Admin signed in");
        Ok(admin)
    }

    /// Ask the provider to send a password-reset email.
    ///
    /// Succeeds whether or not an account exists for the address.
    ///
    /// # Errors
    ///
    /// Returns [`LoginError::InvalidEmail`] for malformed input, or
    /// [`LoginError::Provider`] if the provider fails for another reason.
    #[tracing::instrument(skip(self))]
    pub async fn request_password_reset(&self, email: &str) -> Result<(), LoginError> {
        let email = Email::parse(email)?;
        match self.provider.send_password_reset(&email).await {
            Ok(()) => Ok(()),
            Err(AuthProviderError::Rejected(AuthErrorKind::UserNotFound)) => {
                tracing::debug!("Password reset requested for unknown account");
                Ok(())
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Change the signed-in admin's password.
    ///
    /// The current password is re-verified with the provider, which also
    /// yields the fresh token the update call needs.
    ///
    /// # Errors
    ///
    /// Returns [`LoginError::WeakPassword`] before any provider call if the
    /// new password fails the strength rules, [`LoginError::WrongCurrentPassword`]
    /// if re-authentication fails, or [`LoginError::Provider`] otherwise.
    #[tracing::instrument(skip(self, current_password, new_password), fields(email = %email))]
    pub async fn change_password(
        &self,
        email: &Email,
        current_password: &SecretString,
        new_password: &SecretString,
    ) -> Result<(), LoginError> {
        let strength = PasswordStrength::evaluate(new_password.expose_secret());
        if !strength.is_acceptable() {
            return Err(LoginError::WeakPassword(strength));
        }

        let session = self
            .provider
            .sign_in(email, current_password)
            .await
            .map_err(|err| {
                if err.kind().is_credential_failure() {
                    LoginError::WrongCurrentPassword
                } else {
                    LoginError::Provider(err)
                }
            })?;

        self.provider
            .update_password(&session.id_token, new_password)
            .await?;
        tracing::info!("Password changed");
        Ok(())
    }

    async fn count_failure<S: KeyValueStore>(
        &self,
        store: &LockoutStore<'_, S>,
        state: LockoutState,
        now: DateTime<Utc>,
        unlocked: impl FnOnce(u32) -> LoginError + Send,
    ) -> LoginError {
        let (decision, next) = self.policy.record_failure(now, state);
        save_state(store, next).await;

        match decision {
            LockoutDecision::Locked {
                locked_until,
                minutes_remaining,
            } => {
                tracing::warn!(
                    attempts = next.attempt_count,
                    minutes_remaining,
                    "Sign-in locked after repeated failures"
                );
                LoginError::LockedOut {
                    minutes_remaining,
                    locked_until,
                }
            }
            LockoutDecision::Allow { attempts_remaining } => unlocked(attempts_remaining),
        }
    }
}

async fn load_state<S: KeyValueStore>(store: &LockoutStore<'_, S>) -> LockoutState {
    store.load().await.unwrap_or_else(|err| {
        tracing::warn!(error = %err, "Could not read lockout record");
        LockoutState::default()
    })
}

async fn save_state<S: KeyValueStore>(store: &LockoutStore<'_, S>, state: LockoutState) {
    if let Err(err) = store.save(state).await {
        tracing::warn!(error = %err, "Could not write lockout record");
    }
}
