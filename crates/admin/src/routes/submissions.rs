//! Contact submission inbox route handlers.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, post, put},
};
use chrono::Utc;
use serde::Serialize;
use serde_json::json;
use tracing::instrument;

use folio_core::SubmissionId;

use crate::db::SubmissionRepository;
use crate::error::AppError;
use crate::middleware::RequireAdminAuth;
use crate::models::{
    ActivityAction, BulkRequest, Page, StatusUpdate, Submission, SubmissionQuery, SubmissionStats,
};
use crate::state::AppState;

use super::activity_log;

/// Result of a bulk operation.
#[derive(Debug, Serialize)]
struct BulkResponse {
    affected: u64,
}

/// Build the submissions router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/submissions", get(list))
        .route("/api/submissions/stats", get(stats))
        .route("/api/submissions/bulk", post(bulk))
        .route("/api/submissions/{id}", get(show).delete(remove))
        .route("/api/submissions/{id}/status", put(set_status))
}

/// Filtered, sorted, paginated inbox.
///
/// GET /api/submissions
#[instrument(skip(_admin, state))]
async fn list(
    RequireAdminAuth(_admin): RequireAdminAuth,
    State(state): State<AppState>,
    Query(query): Query<SubmissionQuery>,
) -> Result<Json<Page<Submission>>, AppError> {
    let all = SubmissionRepository::new(state.pool()).list_all().await?;
    Ok(Json(query.apply(all)))
}

/// Inbox analytics.
///
/// GET /api/submissions/stats
#[instrument(skip_all)]
async fn stats(
    RequireAdminAuth(_admin): RequireAdminAuth,
    State(state): State<AppState>,
) -> Result<Json<SubmissionStats>, AppError> {
    let all = SubmissionRepository::new(state.pool()).list_all().await?;
    Ok(Json(SubmissionStats::compute(&all, Utc::now())))
}

/// Submission detail; opening a new submission marks it read.
///
/// GET /api/submissions/{id}
#[instrument(skip(_admin, state))]
async fn show(
    RequireAdminAuth(_admin): RequireAdminAuth,
    State(state): State<AppState>,
    Path(id): Path<SubmissionId>,
) -> Result<Json<Submission>, AppError> {
    let repo = SubmissionRepository::new(state.pool());
    if repo.mark_read_if_new(id).await? {
        tracing::debug!(submission_id = %id, "Marked submission read");
    }
    Ok(Json(repo.get(id).await?))
}

/// Set the triage status.
///
/// PUT /api/submissions/{id}/status
#[instrument(skip(admin, state))]
async fn set_status(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    Path(id): Path<SubmissionId>,
    Json(update): Json<StatusUpdate>,
) -> Result<Json<Submission>, AppError> {
    let submission = SubmissionRepository::new(state.pool())
        .set_status(id, update.status)
        .await?;

    activity_log(&state)
        .record(
            Some(&admin),
            ActivityAction::SubmissionStatusChanged,
            Some(format!("submission:{id}")),
            json!({ "status": update.status }),
        )
        .await;

    Ok(Json(submission))
}

/// Delete one submission.
///
/// DELETE /api/submissions/{id}
#[instrument(skip(admin, state))]
async fn remove(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    Path(id): Path<SubmissionId>,
) -> Result<Json<BulkResponse>, AppError> {
    SubmissionRepository::new(state.pool()).delete(id).await?;

    activity_log(&state)
        .record(
            Some(&admin),
            ActivityAction::SubmissionDeleted,
            Some(format!("submission:{id}")),
            serde_json::Value::Null,
        )
        .await;

    Ok(Json(BulkResponse { affected: 1 }))
}

/// Apply one action to many submissions.
///
/// POST /api/submissions/bulk
#[instrument(skip_all)]
async fn bulk(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    Json(request): Json<BulkRequest>,
) -> Result<Json<BulkResponse>, AppError> {
    let ids = request
        .ids()
        .map_err(|field| AppError::Validation(vec![field]))?;
    let repo = SubmissionRepository::new(state.pool());

    let affected = match request.action.target_status() {
        Some(status) => repo.set_status_many(&ids, status).await?,
        None => repo.delete_many(&ids).await?,
    };

    tracing::info!(action = ?request.action, requested = ids.len(), affected, "Bulk submission update");
    activity_log(&state)
        .record(
            Some(&admin),
            ActivityAction::SubmissionsBulkUpdated,
            None,
            json!({ "action": request.action, "ids": ids, "affected": affected }),
        )
        .await;

    Ok(Json(BulkResponse { affected }))
}
