//! Signed-in admin's own profile and password.

use axum::{
    Json, Router,
    extract::State,
    routing::{get, post},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tower_sessions::Session;
use tracing::instrument;

use crate::db::{AdminUserRepository, RepositoryError};
use crate::error::AppError;
use crate::middleware::{RequireAdminAuth, set_current_admin};
use crate::models::{ActivityAction, AdminUser, CurrentAdmin, ProfileUpdate};
use crate::services::AuthGate;
use crate::state::AppState;

use super::activity_log;

#[derive(Debug, Deserialize)]
struct PasswordChangeRequest {
    current_password: String,
    new_password: String,
}

#[derive(Debug, Serialize)]
struct PasswordChangeResponse {
    success: bool,
    message: &'static str,
}

/// Build the profile router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/profile", get(profile).put(update_profile))
        .route("/api/profile/password", post(change_password))
}

/// GET /api/profile
#[instrument(skip_all)]
async fn profile(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
) -> Result<Json<AdminUser>, AppError> {
    let user = AdminUserRepository::new(state.pool())
        .get_by_uid(&admin.uid)
        .await?
        .ok_or(RepositoryError::NotFound)?;
    Ok(Json(user))
}

/// PUT /api/profile
#[instrument(skip_all)]
async fn update_profile(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    session: Session,
    Json(update): Json<ProfileUpdate>,
) -> Result<Json<AdminUser>, AppError> {
    let update = update.validate().map_err(AppError::Validation)?;
    let user = AdminUserRepository::new(state.pool())
        .update_profile(&admin.uid, &update)
        .await?;

    // Keep the session copy in step with the new display name.
    let refreshed = CurrentAdmin::from_user(&user, admin.console_session_id.clone());
    set_current_admin(&session, &refreshed).await?;

    activity_log(&state)
        .record(
            Some(&admin),
            ActivityAction::ProfileUpdated,
            Some(format!("admin:{}", admin.uid)),
            json!({ "display_name": user.display_name }),
        )
        .await;

    Ok(Json(user))
}

/// POST /api/profile/password
#[instrument(skip_all)]
async fn change_password(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    Json(body): Json<PasswordChangeRequest>,
) -> Result<Json<PasswordChangeResponse>, AppError> {
    let directory = AdminUserRepository::new(state.pool());
    AuthGate::new(state.identity(), &directory, state.policy())
        .change_password(
            &admin.email,
            &SecretString::from(body.current_password),
            &SecretString::from(body.new_password),
        )
        .await?;

    activity_log(&state)
        .record(
            Some(&admin),
            ActivityAction::PasswordChanged,
            Some(format!("admin:{}", admin.uid)),
            Value::Null,
        )
        .await;

    Ok(Json(PasswordChangeResponse {
        success: true,
        message: "Password updated.",
    }))
}
