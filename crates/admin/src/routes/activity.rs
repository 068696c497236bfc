//! Activity log listing.

use axum::{
    Json, Router,
    extract::{Query, State},
    routing::get,
};
use serde::Deserialize;
use tracing::instrument;

use crate::db::ActivityRepository;
use crate::error::AppError;
use crate::middleware::RequireAdminAuth;
use crate::models::ActivityEntry;
use crate::state::AppState;

const DEFAULT_LIMIT: i64 = 50;

#[derive(Debug, Deserialize)]
struct ActivityQuery {
    limit: Option<i64>,
}

/// Build the activity router.
pub fn router() -> Router<AppState> {
    Router::new().route("/api/activity", get(recent))
}

/// Newest entries first.
///
/// GET /api/activity
#[instrument(skip(_admin, state))]
async fn recent(
    RequireAdminAuth(_admin): RequireAdminAuth,
    State(state): State<AppState>,
    Query(query): Query<ActivityQuery>,
) -> Result<Json<Vec<ActivityEntry>>, AppError> {
    let entries = ActivityRepository::new(state.pool())
        .recent(query.limit.unwrap_or(DEFAULT_LIMIT))
        .await?;
    Ok(Json(entries))
}
