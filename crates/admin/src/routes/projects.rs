//! Portfolio project route handlers.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::get,
};
use serde_json::json;
use tracing::instrument;

use folio_core::ProjectId;

use crate::db::ProjectRepository;
use crate::error::AppError;
use crate::middleware::RequireAdminAuth;
use crate::models::{ActivityAction, Project, ProjectInput};
use crate::state::AppState;

use super::activity_log;

/// Build the projects router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/projects", get(list).post(create))
        .route("/api/projects/{id}", get(show).put(update).delete(remove))
}

/// All projects in display order.
///
/// GET /api/projects
#[instrument(skip_all)]
async fn list(
    RequireAdminAuth(_admin): RequireAdminAuth,
    State(state): State<AppState>,
) -> Result<Json<Vec<Project>>, AppError> {
    Ok(Json(ProjectRepository::new(state.pool()).list().await?))
}

/// GET /api/projects/{id}
#[instrument(skip(_admin, state))]
async fn show(
    RequireAdminAuth(_admin): RequireAdminAuth,
    State(state): State<AppState>,
    Path(id): Path<ProjectId>,
) -> Result<Json<Project>, AppError> {
    Ok(Json(ProjectRepository::new(state.pool()).get(id).await?))
}

/// POST /api/projects
#[instrument(skip_all)]
async fn create(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    Json(input): Json<ProjectInput>,
) -> Result<(StatusCode, Json<Project>), AppError> {
    let project = input.validate().map_err(AppError::Validation)?;
    let created = ProjectRepository::new(state.pool()).create(&project).await?;

    activity_log(&state)
        .record(
            Some(&admin),
            ActivityAction::ProjectCreated,
            Some(format!("project:{}", created.id)),
            json!({ "slug": created.slug, "title": created.title }),
        )
        .await;

    Ok((StatusCode::CREATED, Json(created)))
}

/// PUT /api/projects/{id}
#[instrument(skip(admin, state, input))]
async fn update(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    Path(id): Path<ProjectId>,
    Json(input): Json<ProjectInput>,
) -> Result<Json<Project>, AppError> {
    let project = input.validate().map_err(AppError::Validation)?;
    let updated = ProjectRepository::new(state.pool())
        .update(id, &project)
        .await?;

    activity_log(&state)
        .record(
            Some(&admin),
            ActivityAction::ProjectUpdated,
            Some(format!("project:{id}")),
            json!({ "slug": updated.slug, "published": updated.published }),
        )
        .await;

    Ok(Json(updated))
}

/// DELETE /api/projects/{id}
#[instrument(skip(admin, state))]
async fn remove(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    Path(id): Path<ProjectId>,
) -> Result<StatusCode, AppError> {
    ProjectRepository::new(state.pool()).delete(id).await?;

    activity_log(&state)
        .record(
            Some(&admin),
            ActivityAction::ProjectDeleted,
            Some(format!("project:{id}")),
            serde_json::Value::Null,
        )
        .await;

    Ok(StatusCode::NO_CONTENT)
}
