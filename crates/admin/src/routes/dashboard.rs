//! Dashboard overview.

use axum::{Json, Router, extract::State, routing::get};
use chrono::Utc;
use serde::Serialize;
use tracing::instrument;

use folio_core::AdminRole;

use crate::db::{ActivityRepository, ProjectRepository, SubmissionRepository};
use crate::error::AppError;
use crate::middleware::RequireAdminAuth;
use crate::models::{ActivityEntry, CurrentAdmin, Project, SubmissionStats};
use crate::state::AppState;

/// Entries shown in the "recent activity" panel.
const RECENT_ACTIVITY: i64 = 10;

/// Signed-in admin as shown in the console header.
#[derive(Debug, Clone, Serialize)]
pub struct AdminView {
    pub display_name: String,
    pub email: String,
    pub is_owner: bool,
}

impl From<&CurrentAdmin> for AdminView {
    fn from(admin: &CurrentAdmin) -> Self {
        Self {
            display_name: admin.display_name.clone(),
            email: admin.email.to_string(),
            is_owner: admin.role == AdminRole::Owner,
        }
    }
}

/// Project counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ProjectCounts {
    pub total: usize,
    pub published: usize,
    pub featured: usize,
}

impl ProjectCounts {
    fn from_projects(projects: &[Project]) -> Self {
        Self {
            total: projects.len(),
            published: projects.iter().filter(|p| p.published).count(),
            featured: projects.iter().filter(|p| p.featured).count(),
        }
    }
}

#[derive(Debug, Serialize)]
struct Dashboard {
    admin: AdminView,
    submissions: SubmissionStats,
    projects: ProjectCounts,
    recent_activity: Vec<ActivityEntry>,
}

/// Build the dashboard router.
pub fn router() -> Router<AppState> {
    Router::new().route("/api/dashboard", get(dashboard))
}

/// GET /api/dashboard
#[instrument(skip_all)]
async fn dashboard(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
) -> Result<Json<Dashboard>, AppError> {
    let submissions = SubmissionRepository::new(state.pool());
    let projects = ProjectRepository::new(state.pool());
    let activity = ActivityRepository::new(state.pool());

    let (all_submissions, all_projects, recent_activity) = tokio::try_join!(
        submissions.list_all(),
        projects.list(),
        activity.recent(RECENT_ACTIVITY),
    )?;

    Ok(Json(Dashboard {
        admin: AdminView::from(&admin),
        submissions: SubmissionStats::compute(&all_submissions, Utc::now()),
        projects: ProjectCounts::from_projects(&all_projects),
        recent_activity,
    }))
}
