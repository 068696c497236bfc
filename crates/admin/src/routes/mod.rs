//! HTTP route handlers for admin.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health, /health/ready            - Health checks (main.rs)
//!
//! # Auth
//! GET  /auth/login                       - Login page
//! POST /api/auth/login                   - Email/password sign-in
//! POST /api/auth/logout                  - Sign out
//! GET  /api/auth/me                      - Signed-in admin
//! GET  /api/auth/lockout                 - Lockout status
//! GET  /api/auth/lockout/stream          - Lockout countdown (SSE)
//! POST /api/auth/password-reset          - Send password-reset email
//!
//! # Public
//! POST /contact                          - Contact form intake
//!
//! # Inbox
//! GET  /api/submissions                  - Filtered list
//! GET  /api/submissions/stats            - Analytics
//! GET  /api/submissions/{id}             - Detail (marks read)
//! PUT  /api/submissions/{id}/status      - Set status
//! DELETE /api/submissions/{id}           - Delete
//! POST /api/submissions/bulk             - Bulk action
//!
//! # Content
//! GET/POST /api/projects
//! GET/PUT/DELETE /api/projects/{id}
//! GET/PUT /api/settings/site             - Site configuration (PUT: owner)
//! GET/PUT /api/profile
//! POST /api/profile/password
//!
//! # Media
//! GET  /api/media                        - Library listing
//! POST /api/media                        - Multipart upload
//! DELETE /api/media/{type}/{public_id}   - Delete
//! GET  /api/media/transform              - Transformation URL
//!
//! # Overview
//! GET  /api/activity
//! GET  /api/dashboard
//! ```

use axum::{Router, response::Redirect, routing::get};

use crate::db::ActivityRepository;
use crate::middleware::RequireAdminAuth;
use crate::services::ActivityLogger;
use crate::state::AppState;

pub mod activity;
pub mod auth;
pub mod contact;
pub mod dashboard;
pub mod media;
pub mod profile;
pub mod projects;
pub mod settings;
pub mod submissions;

/// Build the complete router for the admin console.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(index))
        .merge(auth::router())
        .merge(contact::router())
        .merge(submissions::router())
        .merge(projects::router())
        .merge(settings::router())
        .merge(profile::router())
        .merge(media::router())
        .merge(activity::router())
        .merge(dashboard::router())
}

/// The console front-end is served from `/static`; `/` only gates entry.
async fn index(RequireAdminAuth(_admin): RequireAdminAuth) -> Redirect {
    Redirect::to("/static/console.html")
}

/// Activity logger bound to the request's pool.
pub(crate) fn activity_log(state: &AppState) -> ActivityLogger<ActivityRepository<'_>> {
    ActivityLogger::new(ActivityRepository::new(state.pool()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode, header};
    use serde_json::Value;
    use tower::ServiceExt;
    use tower_sessions::{MemoryStore, SessionManagerLayer};

    use super::*;

    /// Full router over an in-memory session store.
    fn app() -> Router {
        routes()
            .layer(SessionManagerLayer::new(MemoryStore::default()))
            .with_state(AppState::for_tests())
    }

    async fn json_body(response: axum::response::Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn console_entry_redirects_to_login() {
        let response = app()
            .oneshot(Request::get("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert!(response.status().is_redirection());
        assert_eq!(
            response.headers().get(header::LOCATION).unwrap(),
            "/auth/login"
        );
    }

    #[tokio::test]
    async fn api_without_session_is_unauthorized() {
        let response = app()
            .oneshot(Request::get("/api/auth/me").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn fresh_browser_is_not_locked() {
        let response = app()
            .oneshot(
                Request::get("/api/auth/lockout")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["locked"], false);
        assert_eq!(body["attempts_remaining"], 5);
        assert!(body["locked_until"].is_null());
    }
}
