//! Admin authentication error types.

use axum::http::StatusCode;
use chrono::{DateTime, Utc};
use folio_core::{AuthErrorKind, PasswordStrength};
use serde_json::{Value, json};
use thiserror::Error;

use crate::db::RepositoryError;
use crate::services::identity::AuthProviderError;

/// Errors that can occur during sign-in and account security operations.
#[derive(Debug, Error)]
pub enum LoginError {
    /// The browser is locked out; the provider was not contacted.
    #[error("locked out for {minutes_remaining} more minute(s)")]
    LockedOut {
        minutes_remaining: i64,
        locked_until: DateTime<Utc>,
    },

    /// The provider rejected the email/password pair.
    #[error("invalid credentials ({kind:?}), {attempts_remaining} attempt(s) left")]
    InvalidCredentials {
        kind: AuthErrorKind,
        attempts_remaining: u32,
    },

    /// The provider accepted the credentials but the account is not an admin.
    #[error("not an admin, {attempts_remaining} attempt(s) left")]
    NotAdmin { attempts_remaining: u32 },

    /// The email is not syntactically valid.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] folio_core::EmailError),

    /// The current password given for a password change is wrong.
    #[error("current password is incorrect")]
    WrongCurrentPassword,

    /// The new password fails the strength rules.
    #[error("new password is too weak")]
    WeakPassword(PasswordStrength),

    /// The provider failed for a reason unrelated to the credentials.
    #[error("identity provider error: {0}")]
    Provider(#[from] AuthProviderError),

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

impl LoginError {
    pub(crate) fn status(&self) -> StatusCode {
        match self {
            Self::LockedOut { .. } => StatusCode::LOCKED,
            Self::InvalidCredentials { .. } => StatusCode::UNAUTHORIZED,
            Self::NotAdmin { .. } => StatusCode::FORBIDDEN,
            Self::InvalidEmail(_) | Self::WrongCurrentPassword => StatusCode::BAD_REQUEST,
            Self::WeakPassword(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Provider(err) => match err.kind() {
                AuthErrorKind::TooManyRequests => StatusCode::TOO_MANY_REQUESTS,
                AuthErrorKind::RequiresRecentLogin | AuthErrorKind::SessionExpired => {
                    StatusCode::UNAUTHORIZED
                }
                AuthErrorKind::InvalidEmail
                | AuthErrorKind::WeakPassword
                | AuthErrorKind::EmailInUse => StatusCode::BAD_REQUEST,
                AuthErrorKind::Misconfigured => StatusCode::INTERNAL_SERVER_ERROR,
                _ => StatusCode::BAD_GATEWAY,
            },
            Self::Repository(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub(crate) const fn kind(&self) -> &'static str {
        match self {
            Self::LockedOut { .. } => "locked_out",
            Self::InvalidCredentials { .. } => "invalid_credentials",
            Self::NotAdmin { .. } => "not_admin",
            Self::InvalidEmail(_) => "invalid_email",
            Self::WrongCurrentPassword => "wrong_current_password",
            Self::WeakPassword(_) => "weak_password",
            Self::Provider(_) => "identity_provider",
            Self::Repository(_) => "internal",
        }
    }

    /// Whether this is our fault (or our provider's) rather than the user's.
    pub(crate) fn is_server_error(&self) -> bool {
        match self {
            Self::Repository(_) => true,
            Self::Provider(err) => matches!(
                err.kind(),
                AuthErrorKind::Misconfigured | AuthErrorKind::Unknown
            ),
            _ => false,
        }
    }

    /// Message for the toast notification.
    pub(crate) fn user_message(&self) -> String {
        match self {
            Self::LockedOut {
                minutes_remaining, ..
            } => {
                let unit = if *minutes_remaining == 1 {
                    "minute"
                } else {
                    "minutes"
                };
                format!("Too many failed attempts. Try again in {minutes_remaining} {unit}.")
            }
            Self::InvalidCredentials { kind, .. } => kind.message().to_string(),
            Self::NotAdmin { .. } => "This account does not have admin access.".to_string(),
            Self::InvalidEmail(_) => AuthErrorKind::InvalidEmail.message().to_string(),
            Self::WrongCurrentPassword => "Your current password is incorrect.".to_string(),
            Self::WeakPassword(_) => AuthErrorKind::WeakPassword.message().to_string(),
            Self::Provider(err) => err.kind().message().to_string(),
            Self::Repository(_) => "Internal server error".to_string(),
        }
    }

    /// Extra fields merged into the JSON error body.
    pub(crate) fn details(&self) -> Option<Value> {
        match self {
            Self::LockedOut {
                minutes_remaining,
                locked_until,
            } => Some(json!({
                "minutes_remaining": minutes_remaining,
                "locked_until": locked_until.timestamp_millis(),
            })),
            Self::InvalidCredentials {
                attempts_remaining, ..
            }
            | Self::NotAdmin { attempts_remaining } => {
                Some(json!({ "attempts_remaining": attempts_remaining }))
            }
            Self::WeakPassword(strength) => Some(json!({
                "requirements": strength.messages(),
                "score": strength.score,
            })),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_minute_is_singular() {
        let err = LoginError::LockedOut {
            minutes_remaining: 1,
            locked_until: DateTime::<Utc>::UNIX_EPOCH,
        };
        assert_eq!(
            err.user_message(),
            "Too many failed attempts. Try again in 1 minute."
        );
    }

    #[test]
    fn provider_throttling_is_429_not_lockout() {
        let err = LoginError::Provider(AuthProviderError::Rejected(
            AuthErrorKind::TooManyRequests,
        ));
        assert_eq!(err.status(), StatusCode::TOO_MANY_REQUESTS);
        assert!(!err.is_server_error());
    }

    #[test]
    fn misconfiguration_is_a_server_error() {
        let err = LoginError::Provider(AuthProviderError::InvalidUrl("bad".to_string()));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(err.is_server_error());
    }

    #[test]
    fn weak_password_lists_requirements() {
        let err = LoginError::WeakPassword(PasswordStrength::evaluate("short"));
        let details = err.details().unwrap_or_default();
        assert!(
            details["requirements"]
                .as_array()
                .is_some_and(|reqs| !reqs.is_empty())
        );
    }
}
