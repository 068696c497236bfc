//! Media library route handlers.
//!
//! Files go straight through to the CDN; nothing is stored locally.

use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, Multipart, Path, Query, State},
    http::StatusCode,
    routing::{delete, get},
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::instrument;

use folio_core::MediaKind;
use folio_core::media::MAX_VIDEO_BYTES;

use crate::error::AppError;
use crate::middleware::RequireAdminAuth;
use crate::models::ActivityAction;
use crate::services::media::{Crop, Gravity, MediaAsset, MediaPage, Transformation};
use crate::state::AppState;

use super::activity_log;

/// Room for multipart framing on top of the largest allowed file.
const MULTIPART_OVERHEAD_BYTES: u64 = 1024 * 1024;

#[derive(Debug, Deserialize)]
struct ListQuery {
    resource_type: Option<MediaKind>,
    cursor: Option<String>,
}

/// Transformation request: an optional preset plus overrides.
#[derive(Debug, Deserialize)]
struct TransformQuery {
    public_id: String,
    resource_type: Option<MediaKind>,
    /// `thumbnail` or `hero`.
    preset: Option<String>,
    width: Option<u32>,
    height: Option<u32>,
    crop: Option<Crop>,
    gravity: Option<Gravity>,
    quality: Option<String>,
    format: Option<String>,
}

impl TransformQuery {
    fn transformation(&self) -> Result<Transformation, AppError> {
        let mut t = match self.preset.as_deref() {
            None | Some("") => Transformation::default(),
            Some("thumbnail") => Transformation::thumbnail(),
            Some("hero") => Transformation::hero(),
            Some(other) => {
                return Err(AppError::invalid(
                    "preset",
                    format!("Unknown preset \"{other}\". Use thumbnail or hero."),
                ));
            }
        };
        t.width = self.width.or(t.width);
        t.height = self.height.or(t.height);
        t.crop = self.crop.or(t.crop);
        t.gravity = self.gravity.or(t.gravity);
        if self.quality.is_some() {
            t.quality.clone_from(&self.quality);
        }
        if self.format.is_some() {
            t.format.clone_from(&self.format);
        }
        Ok(t)
    }
}

#[derive(Debug, Serialize)]
struct TransformResponse {
    url: String,
}

/// Build the media router.
pub fn router() -> Router<AppState> {
    let upload_limit = usize::try_from(MAX_VIDEO_BYTES + MULTIPART_OVERHEAD_BYTES)
        .unwrap_or(usize::MAX);

    Router::new()
        .route(
            "/api/media",
            get(list)
                .post(upload)
                .layer(DefaultBodyLimit::max(upload_limit)),
        )
        .route("/api/media/transform", get(transform))
        .route("/api/media/{resource_type}/{*public_id}", delete(remove))
}

/// One page of the library.
///
/// GET /api/media
#[instrument(skip(_admin, state))]
async fn list(
    RequireAdminAuth(_admin): RequireAdminAuth,
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<MediaPage>, AppError> {
    let kind = query.resource_type.unwrap_or(MediaKind::Image);
    let page = state.media().list(kind, query.cursor.as_deref()).await?;
    Ok(Json(page))
}

/// Upload the `file` field of a multipart form.
///
/// POST /api/media
#[instrument(skip_all)]
async fn upload(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<MediaAsset>), AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("Malformed upload: {e}")))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let file_name = field.file_name().unwrap_or_default().to_string();
        let content_type = field.content_type().unwrap_or_default().to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::BadRequest(format!("Upload interrupted: {e}")))?;

        let asset = state
            .media()
            .upload(&file_name, &content_type, bytes.to_vec())
            .await?;

        activity_log(&state)
            .record(
                Some(&admin),
                ActivityAction::MediaUploaded,
                Some(asset.public_id.clone()),
                json!({
                    "resource_type": asset.resource_type,
                    "bytes": asset.bytes,
                    "file_name": file_name,
                }),
            )
            .await;

        return Ok((StatusCode::CREATED, Json(asset)));
    }

    Err(AppError::invalid("file", "Choose a file to upload."))
}

/// Delete an asset from the CDN.
///
/// DELETE /api/media/{resource_type}/{public_id}
#[instrument(skip(admin, state))]
async fn remove(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    Path((resource_type, public_id)): Path<(String, String)>,
) -> Result<StatusCode, AppError> {
    let kind: MediaKind = resource_type.parse().map_err(AppError::BadRequest)?;
    state.media().destroy(kind, &public_id).await?;

    activity_log(&state)
        .record(
            Some(&admin),
            ActivityAction::MediaDeleted,
            Some(public_id),
            json!({ "resource_type": kind }),
        )
        .await;

    Ok(StatusCode::NO_CONTENT)
}

/// Delivery URL with a transformation applied.
///
/// GET /api/media/transform
#[instrument(skip(_admin, state))]
async fn transform(
    RequireAdminAuth(_admin): RequireAdminAuth,
    State(state): State<AppState>,
    Query(query): Query<TransformQuery>,
) -> Result<Json<TransformResponse>, AppError> {
    if query.public_id.trim().is_empty() {
        return Err(AppError::invalid("public_id", "public_id is required."));
    }
    let transformation = query.transformation()?;
    let kind = query.resource_type.unwrap_or(MediaKind::Image);
    let url = state
        .media()
        .transformed_url(kind, query.public_id.trim(), &transformation);
    Ok(Json(TransformResponse { url }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(preset: Option<&str>) -> TransformQuery {
        TransformQuery {
            public_id: "portfolio/cover".to_string(),
            resource_type: None,
            preset: preset.map(String::from),
            width: None,
            height: None,
            crop: None,
            gravity: None,
            quality: None,
            format: None,
        }
    }

    #[test]
    fn overrides_apply_on_top_of_preset() {
        let mut q = query(Some("thumbnail"));
        q.width = Some(120);
        q.format = Some("webp".to_string());
        let t = q.transformation().unwrap_or_default();
        assert_eq!(t.to_segment(), "w_120,h_300,c_fill,g_auto,q_auto,f_webp");
    }

    #[test]
    fn unknown_preset_is_a_validation_error() {
        let err = query(Some("banner")).transformation().err();
        assert!(matches!(err, Some(AppError::Validation(_))));
    }

    #[test]
    fn no_preset_means_untouched_original() {
        let t = query(None).transformation().unwrap_or_default();
        assert_eq!(t.to_segment(), "");
    }
}
