//! Public contact form intake.
//!
//! The only unauthenticated write in the console; the portfolio site posts
//! its contact form here.

use axum::{Json, Router, extract::State, http::StatusCode, routing::post};
use serde::Serialize;
use tracing::instrument;

use crate::db::SubmissionRepository;
use crate::error::AppError;
use crate::models::NewSubmission;
use crate::state::AppState;

/// Response body for the contact form.
#[derive(Debug, Serialize)]
pub struct ContactResponse {
    pub success: bool,
    pub message: String,
}

/// Build the contact router.
pub fn router() -> Router<AppState> {
    Router::new().route("/contact", post(submit))
}

/// Store a contact-form submission.
///
/// POST /contact
#[instrument(skip_all)]
async fn submit(
    State(state): State<AppState>,
    Json(form): Json<NewSubmission>,
) -> Result<(StatusCode, Json<ContactResponse>), AppError> {
    let submission = form.validate().map_err(AppError::Validation)?;
    let stored = SubmissionRepository::new(state.pool())
        .create(&submission)
        .await?;

    tracing::info!(submission_id = %stored.id, "Contact submission received");

    Ok((
        StatusCode::CREATED,
        Json(ContactResponse {
            success: true,
            message: "Thanks for reaching out! I'll get back to you soon.".to_string(),
        }),
    ))
}
