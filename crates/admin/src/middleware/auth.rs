//! Authentication extractors for admin.
//!
//! Handlers declare their access level through the extractor they take:
//! [`RequireAdminAuth`] for any signed-in admin, [`RequireOwner`] for
//! site-owner-only operations, [`OptionalAdminAuth`] for pages that render
//! either way.

use axum::{
    Json,
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Redirect, Response},
};
use serde_json::json;
use tower_sessions::Session;

use folio_core::AdminRole;

use crate::models::{CurrentAdmin, session_keys};

/// Extractor that requires admin authentication.
///
/// If the admin is not logged in, returns a redirect to the login page
/// for HTML requests, or 401 Unauthorized for API requests.
pub struct RequireAdminAuth(pub CurrentAdmin);

/// Rejection for the admin extractors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdminAuthRejection {
    /// Redirect to login page (for HTML requests).
    RedirectToLogin,
    /// Unauthorized response (for API requests).
    Unauthorized,
    /// Signed in, but the role does not allow this.
    Forbidden,
}

impl IntoResponse for AdminAuthRejection {
    fn into_response(self) -> Response {
        match self {
            Self::RedirectToLogin => Redirect::to("/auth/login").into_response(),
            Self::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                Json(json!({
                    "error": { "kind": "unauthorized", "message": "Please sign in to continue." }
                })),
            )
                .into_response(),
            Self::Forbidden => (
                StatusCode::FORBIDDEN,
                Json(json!({
                    "error": {
                        "kind": "forbidden",
                        "message": "Only the site owner can do that."
                    }
                })),
            )
                .into_response(),
        }
    }
}

/// Read the session admin, choosing the rejection by request path.
async fn current_admin(parts: &Parts) -> Result<CurrentAdmin, AdminAuthRejection> {
    let session = parts
        .extensions
        .get::<Session>()
        .ok_or(AdminAuthRejection::Unauthorized)?;

    session
        .get::<CurrentAdmin>(session_keys::CURRENT_ADMIN)
        .await
        .ok()
        .flatten()
        .ok_or_else(|| {
            if parts.uri.path().starts_with("/api/") {
                AdminAuthRejection::Unauthorized
            } else {
                AdminAuthRejection::RedirectToLogin
            }
        })
}

impl<S> FromRequestParts<S> for RequireAdminAuth
where
    S: Send + Sync,
{
    type Rejection = AdminAuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let admin = current_admin(parts).await?;
        sentry::configure_scope(|scope| {
            scope.set_tag("console_session", &admin.console_session_id);
        });
        Ok(Self(admin))
    }
}

/// Extractor that optionally gets the current admin.
///
/// Unlike `RequireAdminAuth`, this does not reject the request if the admin is not logged in.
pub struct OptionalAdminAuth(pub Option<CurrentAdmin>);

impl<S> FromRequestParts<S> for OptionalAdminAuth
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(current_admin(parts).await.ok()))
    }
}

/// Extractor that requires the site owner.
///
/// Not logged in behaves like [`RequireAdminAuth`]; a signed-in editor
/// gets 403 Forbidden.
pub struct RequireOwner(pub CurrentAdmin);

impl<S> FromRequestParts<S> for RequireOwner
where
    S: Send + Sync,
{
    type Rejection = AdminAuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let admin = current_admin(parts).await?;
        if admin.role != AdminRole::Owner {
            tracing::info!(uid = %admin.uid, "Owner-only request by editor");
            return Err(AdminAuthRejection::Forbidden);
        }
        Ok(Self(admin))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use axum::http::Request;
    use folio_core::Email;
    use tower_sessions::MemoryStore;

    use super::*;
    use crate::middleware::session::set_current_admin;

    async fn parts_for(path: &str, role: Option<AdminRole>) -> Parts {
        let session = Session::new(None, Arc::new(MemoryStore::default()), None);
        if let Some(role) = role {
            let admin = CurrentAdmin {
                uid: "uid-1".to_string(),
                email: Email::parse("owner@example.com").unwrap(),
                display_name: "Owner".to_string(),
                role,
                console_session_id: "c-1".to_string(),
            };
            set_current_admin(&session, &admin).await.unwrap();
        }
        let (mut parts, ()) = Request::builder()
            .uri(path)
            .body(())
            .unwrap()
            .into_parts();
        parts.extensions.insert(session);
        parts
    }

    #[tokio::test]
    async fn api_requests_get_401_pages_get_redirect() {
        let mut api = parts_for("/api/projects", None).await;
        let rejection = RequireAdminAuth::from_request_parts(&mut api, &())
            .await
            .err()
            .unwrap();
        assert_eq!(rejection, AdminAuthRejection::Unauthorized);

        let mut page = parts_for("/", None).await;
        let rejection = RequireAdminAuth::from_request_parts(&mut page, &())
            .await
            .err()
            .unwrap();
        assert_eq!(rejection, AdminAuthRejection::RedirectToLogin);
    }

    #[tokio::test]
    async fn editor_is_forbidden_from_owner_routes() {
        let mut parts = parts_for("/api/settings/site", Some(AdminRole::Editor)).await;
        let rejection = RequireOwner::from_request_parts(&mut parts, &())
            .await
            .err()
            .unwrap();
        assert_eq!(rejection, AdminAuthRejection::Forbidden);

        let mut parts = parts_for("/api/settings/site", Some(AdminRole::Owner)).await;
        assert!(RequireOwner::from_request_parts(&mut parts, &()).await.is_ok());
    }

    #[tokio::test]
    async fn optional_auth_never_rejects() {
        let mut parts = parts_for("/auth/login", None).await;
        let OptionalAdminAuth(admin) = OptionalAdminAuth::from_request_parts(&mut parts, &())
            .await
            .unwrap();
        assert!(admin.is_none());
    }
}
