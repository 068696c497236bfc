//! Integration tests for the sign-in gate and browser lockout.
//!
//! The library-level tests drive `AuthGate` through its public seams with
//! an in-memory store and a scripted provider. The HTTP tests require a
//! running console (`cargo run -p folio-admin`) and are ignored by default.

use std::sync::atomic::{AtomicUsize, Ordering};

use chrono::{DateTime, TimeDelta, TimeZone, Utc};
use folio_admin::db::RepositoryError;
use folio_admin::models::{AdminRole, AdminUser};
use folio_admin::services::auth::{AdminDirectory, AuthGate, LoginError};
use folio_admin::services::identity::{AuthProviderError, IdentityProvider, ProviderSession};
use folio_core::{AuthErrorKind, Email, LockoutPolicy, MemoryStore};
use folio_integration_tests::{admin_base_url, browser, unknown_email};
use reqwest::StatusCode;
use secrecy::SecretString;
use serde_json::{Value, json};

// =============================================================================
// Doubles
// =============================================================================

/// Accepts exactly one password; counts every sign-in call.
struct OnePasswordProvider {
    password: &'static str,
    calls: AtomicUsize,
}

impl OnePasswordProvider {
    const fn new(password: &'static str) -> Self {
        Self {
            password,
            calls: AtomicUsize::new(0),
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl IdentityProvider for OnePasswordProvider {
    async fn sign_in(
        &self,
        email: &Email,
        password: &SecretString,
    ) -> Result<ProviderSession, AuthProviderError> {
        use secrecy::ExposeSecret;

        self.calls.fetch_add(1, Ordering::SeqCst);
        if password.expose_secret() != self.password {
            return Err(AuthProviderError::Rejected(AuthErrorKind::InvalidCredential));
        }
        Ok(ProviderSession {
            uid: "uid-ada".to_string(),
            email: email.to_string(),
            id_token: SecretString::from("id-token"),
            refresh_token: SecretString::from("refresh-token"),
        })
    }

    async fn send_password_reset(&self, _email: &Email) -> Result<(), AuthProviderError> {
        Ok(())
    }

    async fn update_password(
        &self,
        _id_token: &SecretString,
        _new_password: &SecretString,
    ) -> Result<(), AuthProviderError> {
        Ok(())
    }
}

/// Every provider account is an admin.
struct EveryoneIsAdmin;

impl AdminDirectory for EveryoneIsAdmin {
    async fn find_admin(&self, uid: &str) -> Result<Option<AdminUser>, RepositoryError> {
        let now = Utc::now();
        Ok(Some(AdminUser {
            uid: uid.to_string(),
            email: Email::parse("a@b.com").map_err(|e| RepositoryError::DataCorruption(e.to_string()))?,
            display_name: "Ada".to_string(),
            role: AdminRole::Owner,
            bio: String::new(),
            avatar_url: None,
            last_login_at: None,
            created_at: now,
            updated_at: now,
        }))
    }
}

fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0)
        .single()
        .unwrap_or(DateTime::<Utc>::UNIX_EPOCH)
}

fn wrong() -> SecretString {
    SecretString::from("wrong-password")
}

// =============================================================================
// Library-level tests
// =============================================================================

#[tokio::test]
async fn test_sixth_attempt_is_locked_without_provider_call() {
    let provider = OnePasswordProvider::new("correct horse");
    let directory = EveryoneIsAdmin;
    let gate = AuthGate::new(&provider, &directory, LockoutPolicy::default());
    let store = MemoryStore::new();

    for attempt in 1..=4 {
        let err = gate
            .sign_in(&store, "a@b.com", &wrong(), t0())
            .await
            .err();
        assert!(
            matches!(err, Some(LoginError::InvalidCredentials { attempts_remaining, .. }) if attempts_remaining == 5 - attempt),
            "attempt {attempt}: {err:?}"
        );
    }

    // Fifth failure triggers the lock.
    let err = gate.sign_in(&store, "a@b.com", &wrong(), t0()).await.err();
    assert!(matches!(
        err,
        Some(LoginError::LockedOut {
            minutes_remaining: 15,
            ..
        })
    ));
    assert_eq!(provider.calls(), 5);

    // Sixth attempt in the same minute, even with the right password.
    let right = SecretString::from("correct horse");
    let err = gate
        .sign_in(&store, "a@b.com", &right, t0() + TimeDelta::seconds(30))
        .await
        .err();
    assert!(matches!(
        err,
        Some(LoginError::LockedOut {
            minutes_remaining: 15,
            ..
        })
    ));
    assert_eq!(provider.calls(), 5, "locked attempt must not reach the provider");

    // Fifteen minutes later the attempt proceeds and succeeds.
    let admin = gate
        .sign_in(&store, "a@b.com", &right, t0() + TimeDelta::minutes(15))
        .await;
    assert!(admin.is_ok());
    assert_eq!(provider.calls(), 6);
}

#[tokio::test]
async fn test_success_resets_the_counter() {
    let provider = OnePasswordProvider::new("correct horse");
    let directory = EveryoneIsAdmin;
    let gate = AuthGate::new(&provider, &directory, LockoutPolicy::default());
    let store = MemoryStore::new();

    for _ in 0..4 {
        let _ = gate.sign_in(&store, "a@b.com", &wrong(), t0()).await;
    }
    let right = SecretString::from("correct horse");
    assert!(gate.sign_in(&store, "a@b.com", &right, t0()).await.is_ok());

    // A full allowance again: four more failures do not lock.
    for _ in 0..4 {
        let err = gate.sign_in(&store, "a@b.com", &wrong(), t0()).await.err();
        assert!(matches!(err, Some(LoginError::InvalidCredentials { .. })));
    }
}

#[tokio::test]
async fn test_lockout_status_counts_down_to_zero() {
    let provider = OnePasswordProvider::new("x");
    let directory = EveryoneIsAdmin;
    let gate = AuthGate::new(&provider, &directory, LockoutPolicy::default());
    let store = MemoryStore::new();

    for _ in 0..5 {
        let _ = gate.sign_in(&store, "a@b.com", &wrong(), t0()).await;
    }

    let at = |secs: i64| t0() + TimeDelta::seconds(secs);
    assert_eq!(gate.lockout_status(&store, at(0)).await.minutes_remaining(), 15);
    assert_eq!(gate.lockout_status(&store, at(61)).await.minutes_remaining(), 14);
    assert_eq!(gate.lockout_status(&store, at(899)).await.minutes_remaining(), 1);
    let cleared = gate.lockout_status(&store, at(900)).await;
    assert!(!cleared.is_locked());
    assert_eq!(cleared.minutes_remaining(), 0);
}

// =============================================================================
// HTTP tests (require a running console)
// =============================================================================

async fn post_login(client: &reqwest::Client, email: &str, password: &str) -> (StatusCode, Value) {
    let resp = client
        .post(format!("{}/api/auth/login", admin_base_url()))
        .json(&json!({ "email": email, "password": password, "remember": false }))
        .send()
        .await
        .expect("Failed to post login");
    let status = resp.status();
    let body = resp.json().await.unwrap_or(Value::Null);
    (status, body)
}

#[tokio::test]
#[ignore = "Requires running admin server and identity provider"]
async fn test_http_lockout_after_five_failures() {
    let client = browser();
    let email = unknown_email();

    for _ in 0..4 {
        let (status, body) = post_login(&client, &email, "wrong-password").await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert!(body["error"]["attempts_remaining"].is_number());
    }

    let (status, body) = post_login(&client, &email, "wrong-password").await;
    assert_eq!(status, StatusCode::LOCKED);
    assert_eq!(body["error"]["kind"], "locked_out");
    assert_eq!(body["error"]["minutes_remaining"], 15);

    let (status, body) = post_login(&client, &email, "wrong-password").await;
    assert_eq!(status, StatusCode::LOCKED);
    assert_eq!(
        body["error"]["message"],
        "Too many failed attempts. Try again in 15 minutes."
    );

    let lockout: Value = client
        .get(format!("{}/api/auth/lockout", admin_base_url()))
        .send()
        .await
        .expect("Failed to get lockout status")
        .json()
        .await
        .expect("Failed to parse lockout status");
    assert_eq!(lockout["locked"], true);
}

#[tokio::test]
#[ignore = "Requires running admin server"]
async fn test_http_lockout_is_per_browser() {
    let locked = browser();
    let email = unknown_email();
    for _ in 0..5 {
        let _ = post_login(&locked, &email, "wrong-password").await;
    }

    // A different cookie jar starts with a clean record.
    let fresh = browser();
    let status: Value = fresh
        .get(format!("{}/api/auth/lockout", admin_base_url()))
        .send()
        .await
        .expect("Failed to get lockout status")
        .json()
        .await
        .expect("Failed to parse lockout status");
    assert_eq!(status["locked"], false);
    assert_eq!(status["attempts_remaining"], 5);
}

#[tokio::test]
#[ignore = "Requires running admin server"]
async fn test_http_invalid_email_is_not_counted() {
    let client = browser();
    let (status, body) = post_login(&client, "not-an-email", "whatever").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["kind"], "invalid_email");

    let lockout: Value = client
        .get(format!("{}/api/auth/lockout", admin_base_url()))
        .send()
        .await
        .expect("Failed to get lockout status")
        .json()
        .await
        .expect("Failed to parse lockout status");
    assert_eq!(lockout["attempts_remaining"], 5);
}

#[tokio::test]
#[ignore = "Requires running admin server"]
async fn test_http_api_requires_session() {
    let resp = browser()
        .get(format!("{}/api/submissions", admin_base_url()))
        .send()
        .await
        .expect("Failed to get submissions");
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
#[ignore = "Requires running admin server"]
async fn test_http_password_reset_does_not_reveal_accounts() {
    let resp = browser()
        .post(format!("{}/api/auth/password-reset", admin_base_url()))
        .json(&json!({ "email": unknown_email() }))
        .send()
        .await
        .expect("Failed to request password reset");
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.expect("Failed to parse response");
    assert_eq!(body["success"], true);
}
