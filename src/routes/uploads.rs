//! Form endpoints used by the asset editor: bulk upload and thumbnail upload.
//! Both answer with `303 See Other` back to a same-site page.

use axum::Router;
use axum::extract::{DefaultBodyLimit, Multipart, Query, State};
use axum::response::Redirect;
use axum::routing::post;
use serde::Deserialize;

use crate::auth::middleware::AuthUser;
use crate::error::AppError;
use crate::ingest::{IngestPolicy, ReferenceMap, Upload, ingest_batch, resolve};
use crate::services::ServiceError;
use crate::services::thumbnail_service::{ThumbnailImage, ThumbnailService, ThumbnailTarget};
use crate::state::AppState;
use crate::utils::safe_redirect_target;

// ─────────────────────────────────────────────────────────────────────────────
// Router
// ─────────────────────────────────────────────────────────────────────────────

/// Upload routes with the multipart body limit applied.
pub fn router(max_upload_bytes: usize) -> Router<AppState> {
    Router::new()
        .route("/upload-assets", post(upload_assets))
        .route("/set-thumbnail", post(set_thumbnail))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
}

// ─────────────────────────────────────────────────────────────────────────────
// DTOs
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct RedirectQuery {
    redirect: Option<String>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Helpers
// ─────────────────────────────────────────────────────────────────────────────

fn parse_id(field: &str, text: &str) -> Result<i32, AppError> {
    text.trim()
        .parse()
        .map_err(|_| AppError::from(ServiceError::Validation(format!("{field} must be an integer id"))))
}

// ─────────────────────────────────────────────────────────────────────────────
// Handlers
// ─────────────────────────────────────────────────────────────────────────────

/// `POST /upload-assets`: multipart `files[]` parts plus an optional `referenceMap`
/// JSON text part. The batch is stored atomically or not at all.
async fn upload_assets(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<RedirectQuery>,
    mut multipart: Multipart,
) -> Result<Redirect, AppError> {
    let owner = user.owner();
    let mut uploads = Vec::new();
    let mut references = ReferenceMap::default();

    while let Some(field) = multipart.next_field().await? {
        match field.name() {
            Some("files[]" | "files") => {
                let filename = field.file_name().unwrap_or_default().to_string();
                let content_type = field.content_type().unwrap_or_default().to_string();
                let data = field.bytes().await?;
                uploads.push(Upload::new(&filename, &content_type, data.to_vec())?);
            }
            Some("referenceMap") => {
                references = ReferenceMap::from_json(&field.text().await?)?;
            }
            _ => {}
        }
    }

    let batch = resolve(uploads)?;
    let policy = IngestPolicy {
        require_tilemap: state.config.require_tilemap_in_batch,
    };
    let report = ingest_batch(&state.db, owner, batch, &references, policy).await?;
    tracing::debug!(
        %owner,
        images = ?report.images,
        spritesheets = ?report.spritesheets,
        tilemaps = ?report.tilemaps,
        "Upload stored"
    );

    Ok(Redirect::to(safe_redirect_target(query.redirect.as_deref())))
}

/// `POST /set-thumbnail`: multipart `tilemapID` or `spritesheetID` and a `thumbnail`
/// file part.
async fn set_thumbnail(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<RedirectQuery>,
    mut multipart: Multipart,
) -> Result<Redirect, AppError> {
    let mut target = None;
    let mut image = None;

    while let Some(field) = multipart.next_field().await? {
        match field.name() {
            Some("tilemapID") => {
                target = Some(ThumbnailTarget::Tilemap(parse_id("tilemapID", &field.text().await?)?));
            }
            Some("spritesheetID") => {
                target = Some(ThumbnailTarget::Spritesheet(parse_id(
                    "spritesheetID",
                    &field.text().await?,
                )?));
            }
            Some("thumbnail") => {
                let content_type = field.content_type().unwrap_or_default().to_string();
                let data = field.bytes().await?;
                image = Some(ThumbnailImage::from_upload(&content_type, data.to_vec())?);
            }
            _ => {}
        }
    }

    let target = target.ok_or_else(|| {
        ServiceError::Validation("tilemapID or spritesheetID is required".to_string())
    })?;
    let image =
        image.ok_or_else(|| ServiceError::Validation("thumbnail file is required".to_string()))?;

    ThumbnailService::set(&state.db, user.owner(), target, image).await?;

    Ok(Redirect::to(safe_redirect_target(query.redirect.as_deref())))
}
