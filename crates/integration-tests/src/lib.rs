//! Integration tests for the Folio admin console.
//!
//! # Running Tests
//!
//! ```bash
//! # Library-level tests (no services needed)
//! cargo test -p folio-integration-tests
//!
//! # HTTP tests against a running console
//! cargo run -p folio-admin &
//! cargo test -p folio-integration-tests -- --ignored
//! ```
//!
//! # Test Categories
//!
//! - `admin_login_lockout` - Sign-in gate and browser lockout
//! - `admin_inbox` - Contact intake and inbox queries
//!
//! HTTP tests are `#[ignore]`d and read `ADMIN_BASE_URL`
//! (default `http://localhost:3001`).

use reqwest::Client;

/// Base URL for the admin console (configurable via environment).
#[must_use]
pub fn admin_base_url() -> String {
    std::env::var("ADMIN_BASE_URL").unwrap_or_else(|_| "http://localhost:3001".to_string())
}

/// A client with its own cookie jar, i.e. a fresh browser.
///
/// # Panics
///
/// Panics if the HTTP client cannot be built.
#[must_use]
pub fn browser() -> Client {
    Client::builder()
        .cookie_store(true)
        .build()
        .expect("Failed to create HTTP client")
}

/// An address no identity-provider account will have.
#[must_use]
pub fn unknown_email() -> String {
    format!("nobody-{}@example.invalid", uuid::Uuid::new_v4().simple())
}
