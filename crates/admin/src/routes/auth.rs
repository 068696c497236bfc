//! Authentication route handlers for admin.
//!
//! Email/password sign-in behind the browser lockout guard, sign-out,
//! password reset, and the lockout countdown stream used by the login page.

use std::convert::Infallible;
use std::time::Duration;

use askama::Template;
use axum::{
    Json, Router,
    extract::State,
    response::{
        Html, IntoResponse, Redirect, Response,
        sse::{Event, KeepAlive, Sse},
    },
    routing::{get, post},
};
use chrono::Utc;
use folio_core::{KeyValueStore, LockoutDecision};
use futures::Stream;
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tower_sessions::Session;
use tracing::instrument;

use crate::db::{ActivityRepository, AdminUserRepository};
use crate::error::{AppError, clear_sentry_user, set_sentry_user};
use crate::filters;
use crate::middleware::{
    BrowserStorage, OptionalAdminAuth, RequireAdminAuth, clear_current_admin, set_current_admin,
};
use crate::models::{ActivityAction, CurrentAdmin, session_keys};
use crate::services::{ActivityLogger, AuthGate};
use crate::state::AppState;

/// Login page template.
#[derive(Template)]
#[template(path = "auth/login.html")]
struct LoginPageTemplate {
    remembered_email: String,
    locked: bool,
    minutes_remaining: i64,
    /// Epoch milliseconds, 0 when not locked.
    locked_until_ms: i64,
}

#[derive(Debug, Deserialize)]
struct LoginRequest {
    email: String,
    password: String,
    #[serde(default)]
    remember: bool,
}

#[derive(Debug, Serialize)]
struct LoginResponse {
    admin: CurrentAdmin,
    redirect: &'static str,
}

#[derive(Debug, Deserialize)]
struct PasswordResetRequest {
    email: String,
}

#[derive(Debug, Serialize)]
struct MessageResponse {
    success: bool,
    message: &'static str,
}

/// Lockout status as seen by the login page.
#[derive(Debug, Serialize, PartialEq, Eq)]
struct LockoutStatus {
    locked: bool,
    minutes_remaining: i64,
    /// Epoch milliseconds.
    locked_until: Option<i64>,
    attempts_remaining: Option<u32>,
}

impl From<LockoutDecision> for LockoutStatus {
    fn from(decision: LockoutDecision) -> Self {
        match decision {
            LockoutDecision::Allow { attempts_remaining } => Self {
                locked: false,
                minutes_remaining: 0,
                locked_until: None,
                attempts_remaining: Some(attempts_remaining),
            },
            LockoutDecision::Locked {
                locked_until,
                minutes_remaining,
            } => Self {
                locked: true,
                minutes_remaining,
                locked_until: Some(locked_until.timestamp_millis()),
                attempts_remaining: None,
            },
        }
    }
}

/// Build the auth router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/auth/login", get(login_page))
        .route("/api/auth/login", post(login))
        .route("/api/auth/logout", post(logout))
        .route("/api/auth/me", get(me))
        .route("/api/auth/lockout", get(lockout))
        .route("/api/auth/lockout/stream", get(lockout_stream))
        .route("/api/auth/password-reset", post(password_reset))
}

/// Current lockout decision for this browser, persisting any repair.
async fn lockout_decision(state: &AppState, storage: &BrowserStorage) -> LockoutDecision {
    let directory = AdminUserRepository::new(state.pool());
    AuthGate::new(state.identity(), &directory, state.policy())
        .lockout_status(storage, Utc::now())
        .await
}

/// Render the login page.
///
/// GET /auth/login
#[instrument(skip_all)]
async fn login_page(
    State(state): State<AppState>,
    OptionalAdminAuth(admin): OptionalAdminAuth,
    session: Session,
) -> Response {
    if admin.is_some() {
        return Redirect::to("/").into_response();
    }

    let storage = BrowserStorage::new(session);
    let remembered_email = storage
        .get(session_keys::REMEMBERED_ADMIN_KEY)
        .await
        .ok()
        .flatten()
        .unwrap_or_default();
    let status = LockoutStatus::from(lockout_decision(&state, &storage).await);

    let template = LoginPageTemplate {
        remembered_email,
        locked: status.locked,
        minutes_remaining: status.minutes_remaining,
        locked_until_ms: status.locked_until.unwrap_or_default(),
    };

    Html(template.render().unwrap_or_else(|e| {
        tracing::error!("Template render error: {}", e);
        "Error rendering template".to_string()
    }))
    .into_response()
}

/// Sign in with email and password.
///
/// POST /api/auth/login
#[instrument(skip_all)]
async fn login(
    State(state): State<AppState>,
    session: Session,
    Json(body): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    let storage = BrowserStorage::new(session.clone());
    let directory = AdminUserRepository::new(state.pool());
    let gate = AuthGate::new(state.identity(), &directory, state.policy());

    let password = SecretString::from(body.password);
    let user = gate
        .sign_in(&storage, &body.email, &password, Utc::now())
        .await?;

    // New session id on privilege change.
    session.cycle_id().await?;

    let console_session_id = uuid::Uuid::new_v4().to_string();
    let admin = CurrentAdmin::from_user(&user, console_session_id.clone());
    set_current_admin(&session, &admin).await?;
    storage
        .set(session_keys::CONSOLE_SESSION_KEY, console_session_id)
        .await?;

    if body.remember {
        storage
            .set(session_keys::REMEMBERED_ADMIN_KEY, user.email.to_string())
            .await?;
    } else {
        storage.remove(session_keys::REMEMBERED_ADMIN_KEY).await?;
    }

    if let Err(e) = directory.touch_last_login(&user.uid).await {
        tracing::warn!(error = %e, "Failed to record last login");
    }

    set_sentry_user(&user.uid, Some(user.email.as_str()));
    ActivityLogger::new(ActivityRepository::new(state.pool()))
        .record(Some(&admin), ActivityAction::SignIn, None, Value::Null)
        .await;

    Ok(Json(LoginResponse { admin, redirect: "/" }))
}

/// Sign out and clear the admin from the session.
///
/// The lockout record and remembered email stay with the browser.
///
/// POST /api/auth/logout
#[instrument(skip_all)]
async fn logout(
    State(state): State<AppState>,
    OptionalAdminAuth(admin): OptionalAdminAuth,
    session: Session,
) -> Result<Json<MessageResponse>, AppError> {
    if let Some(admin) = &admin {
        ActivityLogger::new(ActivityRepository::new(state.pool()))
            .record(Some(admin), ActivityAction::SignOut, None, Value::Null)
            .await;
    }

    clear_current_admin(&session).await?;
    clear_sentry_user();

    Ok(Json(MessageResponse {
        success: true,
        message: "Signed out.",
    }))
}

/// The signed-in admin.
///
/// GET /api/auth/me
async fn me(RequireAdminAuth(admin): RequireAdminAuth) -> Json<CurrentAdmin> {
    Json(admin)
}

/// Current lockout status.
///
/// GET /api/auth/lockout
async fn lockout(State(state): State<AppState>, session: Session) -> Json<LockoutStatus> {
    let storage = BrowserStorage::new(session);
    Json(lockout_decision(&state, &storage).await.into())
}

/// Countdown stream for the login page.
///
/// Emits one `lockout` event per second. The stream ends after the first
/// unlocked event, which is sent as soon as the deadline passes.
///
/// GET /api/auth/lockout/stream
async fn lockout_stream(
    State(state): State<AppState>,
    session: Session,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let stream = async_stream::stream! {
        let storage = BrowserStorage::new(session.clone());
        let mut ticker = tokio::time::interval(Duration::from_secs(1));

        loop {
            ticker.tick().await;
            let decision = lockout_decision(&state, &storage).await;
            let locked = decision.is_locked();

            // The response head is already sent, so a cleared record has to
            // be persisted here. Untouched sessions are never saved.
            if !locked && session.is_modified() {
                if let Err(e) = session.save().await {
                    tracing::warn!(error = %e, "Could not persist cleared lockout");
                }
            }

            match Event::default()
                .event("lockout")
                .json_data(LockoutStatus::from(decision))
            {
                Ok(event) => yield Ok(event),
                Err(e) => {
                    tracing::warn!(error = %e, "Failed to encode lockout event");
                    break;
                }
            }

            if !locked {
                break;
            }
        }
    };

    Sse::new(stream).keep_alive(KeepAlive::default())
}

/// Request a password-reset email.
///
/// Responds identically whether or not the account exists.
///
/// POST /api/auth/password-reset
#[instrument(skip_all)]
async fn password_reset(
    State(state): State<AppState>,
    Json(body): Json<PasswordResetRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    let directory = AdminUserRepository::new(state.pool());
    AuthGate::new(state.identity(), &directory, state.policy())
        .request_password_reset(&body.email)
        .await?;

    Ok(Json(MessageResponse {
        success: true,
        message: "If an account exists for that address, a reset link is on its way.",
    }))
}
