//! Site configuration routes.
//!
//! Any admin can read the `site.config` document; only the owner can
//! change it.

use axum::{Json, Router, extract::State, routing::get};
use serde_json::json;
use tracing::instrument;

use crate::db::SettingsRepository;
use crate::error::AppError;
use crate::middleware::{RequireAdminAuth, RequireOwner};
use crate::models::{ActivityAction, SITE_CONFIG_KEY, SiteConfig};
use crate::state::AppState;

use super::activity_log;

/// Build the settings router.
pub fn router() -> Router<AppState> {
    Router::new().route("/api/settings/site", get(site_config).put(update_site_config))
}

/// GET /api/settings/site
#[instrument(skip_all)]
async fn site_config(
    RequireAdminAuth(_admin): RequireAdminAuth,
    State(state): State<AppState>,
) -> Result<Json<SiteConfig>, AppError> {
    let config = SettingsRepository::new(state.pool())
        .get_typed::<SiteConfig>(SITE_CONFIG_KEY)
        .await?;
    Ok(Json(config))
}

/// PUT /api/settings/site
#[instrument(skip_all)]
async fn update_site_config(
    RequireOwner(admin): RequireOwner,
    State(state): State<AppState>,
    Json(config): Json<SiteConfig>,
) -> Result<Json<SiteConfig>, AppError> {
    let config = config.validate().map_err(AppError::Validation)?;
    SettingsRepository::new(state.pool())
        .set_typed(SITE_CONFIG_KEY, &config)
        .await?;

    activity_log(&state)
        .record(
            Some(&admin),
            ActivityAction::SiteConfigUpdated,
            Some(SITE_CONFIG_KEY.to_string()),
            json!({ "site_title": config.site_title }),
        )
        .await;

    Ok(Json(config))
}
