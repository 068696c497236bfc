//! Identity-provider failure kinds and their user-facing messages.
//!
//! The hosted identity provider reports failures as string codes such as
//! `INVALID_PASSWORD` or `TOO_MANY_ATTEMPTS_TRY_LATER : Access disabled...`.
//! [`AuthErrorKind::from_provider_code`] folds those into a closed set of
//! kinds, and [`AuthErrorKind::message`] maps every kind to the text shown
//! in the console's toast.

use serde::Serialize;

/// A classified identity-provider failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthErrorKind {
    /// No account exists for the email.
    UserNotFound,
    /// The password did not match.
    WrongPassword,
    /// Email/password pair rejected without saying which part was wrong.
    InvalidCredential,
    /// The email is not syntactically valid for the provider.
    InvalidEmail,
    /// The account has been disabled by an administrator.
    UserDisabled,
    /// The provider is throttling this account or client.
    TooManyRequests,
    /// The new password does not meet the provider's rules.
    WeakPassword,
    /// A sensitive operation needs a fresh sign-in.
    RequiresRecentLogin,
    /// The provider token is expired or revoked.
    SessionExpired,
    /// The email is already used by another account.
    EmailInUse,
    /// The provider could not be reached.
    NetworkFailure,
    /// The provider rejected the console's API key or project setup.
    Misconfigured,
    /// Anything not covered above.
    Unknown,
}

impl AuthErrorKind {
    /// Classify a provider error code.
    ///
    /// Codes may carry a detail suffix after `" : "`, which is ignored.
    #[must_use]
    pub fn from_provider_code(code: &str) -> Self {
        let code = code.split(" : ").next().unwrap_or(code).trim();
        match code {
            "EMAIL_NOT_FOUND" | "USER_NOT_FOUND" => Self::UserNotFound,
            "INVALID_PASSWORD" => Self::WrongPassword,
            "INVALID_LOGIN_CREDENTIALS" | "INVALID_CREDENTIAL" => Self::InvalidCredential,
            "INVALID_EMAIL" | "MISSING_EMAIL" => Self::InvalidEmail,
            "USER_DISABLED" => Self::UserDisabled,
            "TOO_MANY_ATTEMPTS_TRY_LATER" | "QUOTA_EXCEEDED" => Self::TooManyRequests,
            "WEAK_PASSWORD" | "MISSING_PASSWORD" => Self::WeakPassword,
            "CREDENTIAL_TOO_OLD_LOGIN_AGAIN" => Self::RequiresRecentLogin,
            "TOKEN_EXPIRED" | "INVALID_ID_TOKEN" | "USER_TOKEN_EXPIRED" => Self::SessionExpired,
            "EMAIL_EXISTS" => Self::EmailInUse,
            "API_KEY_INVALID" | "INVALID_API_KEY" | "PROJECT_NOT_FOUND"
            | "OPERATION_NOT_ALLOWED" | "CONFIGURATION_NOT_FOUND" => Self::Misconfigured,
            _ if code.starts_with("WEAK_PASSWORD") => Self::WeakPassword,
            _ => Self::Unknown,
        }
    }

    /// Whether this failure counts toward the login lockout.
    ///
    /// Only outcomes that say "these credentials are not good" count;
    /// outages and provider-side throttling do not.
    #[must_use]
    pub const fn is_credential_failure(self) -> bool {
        matches!(
            self,
            Self::UserNotFound | Self::WrongPassword | Self::InvalidCredential | Self::UserDisabled
        )
    }

    /// Human-readable message for the toast notification.
    ///
    /// Unknown-account and wrong-password share one message so the login
    /// form does not reveal which admin emails exist.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::UserNotFound | Self::WrongPassword | Self::InvalidCredential => {
                "Invalid email or password."
            }
            Self::InvalidEmail => "Please enter a valid email address.",
            Self::UserDisabled => "This account has been disabled.",
            Self::TooManyRequests => {
                "Too many attempts. The sign-in service has temporarily blocked requests; try again later."
            }
            Self::WeakPassword => "The new password is too weak.",
            Self::RequiresRecentLogin => "Please sign in again before changing security settings.",
            Self::SessionExpired => "Your session has expired. Please sign in again.",
            Self::EmailInUse => "That email address is already in use.",
            Self::NetworkFailure => "Could not reach the sign-in service. Check your connection.",
            Self::Misconfigured => "Sign-in is not configured correctly. Contact the site owner.",
            Self::Unknown => "Something went wrong. Please try again.",
        }
    }
}

impl std::fmt::Display for AuthErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.message())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_with_detail_suffix_are_classified() {
        assert_eq!(
            AuthErrorKind::from_provider_code(
                "TOO_MANY_ATTEMPTS_TRY_LATER : Access to this account has been temporarily disabled"
            ),
            AuthErrorKind::TooManyRequests
        );
        assert_eq!(
            AuthErrorKind::from_provider_code(
                "WEAK_PASSWORD : Password should be at least 6 characters"
            ),
            AuthErrorKind::WeakPassword
        );
    }

    #[test]
    fn unknown_codes_fall_back() {
        assert_eq!(
            AuthErrorKind::from_provider_code("SOMETHING_NEW"),
            AuthErrorKind::Unknown
        );
    }

    #[test]
    fn credential_failures_share_a_message() {
        let kinds = [
            AuthErrorKind::UserNotFound,
            AuthErrorKind::WrongPassword,
            AuthErrorKind::InvalidCredential,
        ];
        for kind in kinds {
            assert!(kind.is_credential_failure());
            assert_eq!(kind.message(), "Invalid email or password.");
        }
    }

    #[test]
    fn outages_do_not_count_toward_lockout() {
        assert!(!AuthErrorKind::NetworkFailure.is_credential_failure());
        assert!(!AuthErrorKind::TooManyRequests.is_credential_failure());
        assert!(!AuthErrorKind::Misconfigured.is_credential_failure());
    }
}
