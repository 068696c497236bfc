//! Hosted identity provider.
//!
//! The console never sees password hashes: sign-in, password reset and
//! password change are delegated to the provider, and the provider's error
//! codes are folded into [`AuthErrorKind`].
//!
//! [`IdentityProvider`] is the seam the auth gate depends on; production
//! uses [`FirebaseAuthClient`], tests use an in-memory fake.

mod firebase;

pub use firebase::FirebaseAuthClient;

use std::future::Future;

use folio_core::{AuthErrorKind, Email};
use secrecy::SecretString;
use thiserror::Error;

/// Errors from the identity provider.
#[derive(Debug, Error)]
pub enum AuthProviderError {
    /// The provider answered with an error code.
    #[error("identity provider rejected the request: {0:?}")]
    Rejected(AuthErrorKind),

    /// The request never got an answer (DNS, TLS, timeout, connection reset).
    #[error("HTTP error: {0}")]
    Http(reqwest::Error),

    /// The provider answered with something we could not read.
    #[error("Parse error: {0}")]
    Parse(String),

    /// The configured base URL is unusable.
    #[error("Invalid provider URL: {0}")]
    InvalidUrl(String),
}

impl AuthProviderError {
    /// Classified failure kind, used for messages and lockout counting.
    #[must_use]
    pub const fn kind(&self) -> AuthErrorKind {
        match self {
            Self::Rejected(kind) => *kind,
            Self::Http(_) => AuthErrorKind::NetworkFailure,
            Self::Parse(_) => AuthErrorKind::Unknown,
            Self::InvalidUrl(_) => AuthErrorKind::Misconfigured,
        }
    }
}

/// A signed-in provider session.
///
/// Holding the tokens is what "being signed in" means for the REST API;
/// dropping them discards the session.
#[derive(Debug)]
pub struct ProviderSession {
    /// Provider user id.
    pub uid: String,
    /// Email as the provider knows it.
    pub email: String,
    /// Short-lived ID token, needed for account updates.
    pub id_token: SecretString,
    pub refresh_token: SecretString,
}

/// Operations the console needs from the hosted identity provider.
pub trait IdentityProvider: Send + Sync {
    /// Verify an email/password pair.
    fn sign_in(
        &self,
        email: &Email,
        password: &SecretString,
    ) -> impl Future<Output = Result<ProviderSession, AuthProviderError>> + Send;

    /// Ask the provider to email a password-reset link.
    fn send_password_reset(
        &self,
        email: &Email,
    ) -> impl Future<Output = Result<(), AuthProviderError>> + Send;

    /// Set a new password for the account behind `id_token`.
    fn update_password(
        &self,
        id_token: &SecretString,
        new_password: &SecretString,
    ) -> impl Future<Output = Result<(), AuthProviderError>> + Send;
}
