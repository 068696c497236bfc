//! Integration tests for contact intake and the submissions inbox.
//!
//! HTTP tests require a running console and database and are ignored by
//! default.

use folio_admin::models::NewSubmission;
use folio_integration_tests::{admin_base_url, browser};
use reqwest::StatusCode;
use serde_json::{Value, json};

// =============================================================================
// Library-level tests
// =============================================================================

#[test]
fn test_contact_form_reports_every_bad_field() {
    let form = NewSubmission {
        name: "   ".to_string(),
        email: "nope".to_string(),
        subject: String::new(),
        message: String::new(),
    };
    let fields: Vec<&str> = form
        .validate()
        .err()
        .unwrap_or_default()
        .iter()
        .map(|f| f.field)
        .collect();
    assert_eq!(fields, vec!["name", "email", "message"]);
}

#[test]
fn test_contact_form_trims_input() {
    let form = NewSubmission {
        name: "  Ada Lovelace ".to_string(),
        email: "ada@example.com".to_string(),
        subject: " Commission ".to_string(),
        message: "  Could you build an engine?  ".to_string(),
    };
    let valid = form.validate().ok();
    assert_eq!(valid.as_ref().map(|v| v.name.as_str()), Some("Ada Lovelace"));
    assert_eq!(valid.as_ref().map(|v| v.subject.as_str()), Some("Commission"));
}

// =============================================================================
// HTTP tests (require a running console)
// =============================================================================

#[tokio::test]
#[ignore = "Requires running admin server and database"]
async fn test_http_contact_intake_accepts_valid_form() {
    let resp = browser()
        .post(format!("{}/contact", admin_base_url()))
        .json(&json!({
            "name": "Integration Test",
            "email": "integration@example.com",
            "subject": "Hello",
            "message": "Posted by the integration test suite."
        }))
        .send()
        .await
        .expect("Failed to post contact form");

    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = resp.json().await.expect("Failed to parse response");
    assert_eq!(body["success"], true);
}

#[tokio::test]
#[ignore = "Requires running admin server"]
async fn test_http_contact_intake_rejects_invalid_form() {
    let resp = browser()
        .post(format!("{}/contact", admin_base_url()))
        .json(&json!({ "name": "", "email": "bad", "message": "" }))
        .send()
        .await
        .expect("Failed to post contact form");

    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = resp.json().await.expect("Failed to parse response");
    assert_eq!(body["error"]["kind"], "validation");
    assert_eq!(
        body["error"]["fields"]
            .as_array()
            .map(Vec::len),
        Some(3)
    );
}

#[tokio::test]
#[ignore = "Requires running admin server"]
async fn test_http_health() {
    let resp = browser()
        .get(format!("{}/health", admin_base_url()))
        .send()
        .await
        .expect("Failed to get health");
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.text().await.expect("Failed to read body"), "ok");
}
