use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;

use crate::auth::middleware::AuthUser;
use crate::entities::{image, spritesheet, thumbnail, tilemap};
use crate::error::AppError;
use crate::ingest::upload::CONTENT_TYPE_JSON;
use crate::routes::content::{bytes_response, content_url, sniff_image_type};
use crate::services::AssetService;
use crate::state::AppState;

// ─────────────────────────────────────────────────────────────────────────────
// Router
// ─────────────────────────────────────────────────────────────────────────────

/// Asset routes: `/images`, `/spritesheets`, `/tilemaps`.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/images", get(list_images))
        .route("/images/{id}", get(get_image).delete(delete_image))
        .route("/spritesheets", get(list_spritesheets))
        .route("/spritesheets/recent", get(recent_spritesheets))
        .route(
            "/spritesheets/{id}",
            get(get_spritesheet).delete(delete_spritesheet),
        )
        .route("/spritesheets/{id}/image", get(get_spritesheet_image))
        .route("/spritesheets/{id}/images", get(spritesheet_images))
        .route("/tilemaps", get(list_tilemaps))
        .route("/tilemaps/recent", get(recent_tilemaps))
        .route("/tilemaps/{id}", get(get_tilemap).delete(delete_tilemap))
        .route("/tilemaps/{id}/spritesheets", get(tilemap_spritesheets))
}

// ─────────────────────────────────────────────────────────────────────────────
// DTOs
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageResponse {
    pub id: i32,
    pub filename: String,
    pub content_type: String,
    pub url: Option<String>,
    pub created_at: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SpritesheetResponse {
    pub id: i32,
    pub name: String,
    pub url: Option<String>,
    pub image_url: Option<String>,
    pub thumbnail_url: Option<String>,
    pub created_at: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TilemapResponse {
    pub id: i32,
    pub name: String,
    pub url: Option<String>,
    pub thumbnail_url: Option<String>,
    pub created_at: String,
}

impl From<image::Model> for ImageResponse {
    fn from(m: image::Model) -> Self {
        Self {
            id: m.id,
            url: content_url("image", &m.hash),
            filename: m.filename,
            content_type: m.content_type,
            created_at: m.created_at.to_rfc3339(),
        }
    }
}

impl SpritesheetResponse {
    fn new(m: spritesheet::Model, thumb: Option<&thumbnail::Model>) -> Self {
        Self {
            id: m.id,
            url: content_url("spritesheet", &m.hash),
            image_url: content_url("spritesheet/image", &m.hash),
            thumbnail_url: thumb.and_then(|t| content_url("thumbnail", &t.hash)),
            name: m.name,
            created_at: m.created_at.to_rfc3339(),
        }
    }
}

impl TilemapResponse {
    pub(crate) fn new(m: tilemap::Model, thumb: Option<&thumbnail::Model>) -> Self {
        Self {
            id: m.id,
            url: content_url("tilemap", &m.hash),
            thumbnail_url: thumb.and_then(|t| content_url("thumbnail", &t.hash)),
            name: m.name,
            created_at: m.created_at.to_rfc3339(),
        }
    }
}

fn spritesheet_list(rows: Vec<(spritesheet::Model, Option<thumbnail::Model>)>) -> Vec<SpritesheetResponse> {
    rows.into_iter()
        .map(|(m, t)| SpritesheetResponse::new(m, t.as_ref()))
        .collect()
}

fn tilemap_list(rows: Vec<(tilemap::Model, Option<thumbnail::Model>)>) -> Vec<TilemapResponse> {
    rows.into_iter()
        .map(|(m, t)| TilemapResponse::new(m, t.as_ref()))
        .collect()
}

// ─────────────────────────────────────────────────────────────────────────────
// Images
// ─────────────────────────────────────────────────────────────────────────────

/// `GET /images`: the caller's images.
async fn list_images(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<Vec<ImageResponse>>, AppError> {
    let images = AssetService::list_images(&state.db, user.owner()).await?;
    Ok(Json(images.into_iter().map(ImageResponse::from).collect()))
}

/// `GET /images/{id}`: raw image bytes.
async fn get_image(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Response, AppError> {
    let model = AssetService::get_image(&state.db, id).await?;
    Ok(bytes_response(&model.content_type, model.filedata))
}

/// `DELETE /images/{id}`: 204 whether or not anything was removed.
async fn delete_image(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i32>,
) -> Result<StatusCode, AppError> {
    let removed = AssetService::delete_image(&state.db, user.owner(), id).await?;
    tracing::info!(owner = %user.owner(), image_id = id, removed, "Image delete");
    Ok(StatusCode::NO_CONTENT)
}

// ─────────────────────────────────────────────────────────────────────────────
// Spritesheets
// ─────────────────────────────────────────────────────────────────────────────

async fn list_spritesheets(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<Vec<SpritesheetResponse>>, AppError> {
    let rows = AssetService::list_spritesheets(&state.db, user.owner()).await?;
    Ok(Json(spritesheet_list(rows)))
}

async fn recent_spritesheets(
    State(state): State<AppState>,
) -> Result<Json<Vec<SpritesheetResponse>>, AppError> {
    let rows = AssetService::recent_spritesheets(&state.db).await?;
    Ok(Json(spritesheet_list(rows)))
}

/// `GET /spritesheets/{id}`: the JSON definition as uploaded.
async fn get_spritesheet(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Response, AppError> {
    let model = AssetService::get_spritesheet(&state.db, id).await?;
    Ok(bytes_response(CONTENT_TYPE_JSON, model.definition.into_bytes()))
}

async fn get_spritesheet_image(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Response, AppError> {
    let model = AssetService::get_spritesheet(&state.db, id).await?;
    Ok(bytes_response(sniff_image_type(&model.image), model.image))
}

/// `GET /spritesheets/{id}/images`: the images the spritesheet references.
async fn spritesheet_images(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<Vec<ImageResponse>>, AppError> {
    let images = AssetService::spritesheet_images(&state.db, id).await?;
    Ok(Json(images.into_iter().map(ImageResponse::from).collect()))
}

async fn delete_spritesheet(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i32>,
) -> Result<StatusCode, AppError> {
    let removed = AssetService::delete_spritesheet(&state.db, user.owner(), id).await?;
    tracing::info!(owner = %user.owner(), spritesheet_id = id, removed, "Spritesheet delete");
    Ok(StatusCode::NO_CONTENT)
}

// ─────────────────────────────────────────────────────────────────────────────
// Tilemaps
// ─────────────────────────────────────────────────────────────────────────────

async fn list_tilemaps(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<Vec<TilemapResponse>>, AppError> {
    let rows = AssetService::list_tilemaps(&state.db, user.owner()).await?;
    Ok(Json(tilemap_list(rows)))
}

async fn recent_tilemaps(
    State(state): State<AppState>,
) -> Result<Json<Vec<TilemapResponse>>, AppError> {
    let rows = AssetService::recent_tilemaps(&state.db).await?;
    Ok(Json(tilemap_list(rows)))
}

async fn get_tilemap(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    let model = AssetService::get_tilemap(&state.db, id).await?;
    Ok(bytes_response(CONTENT_TYPE_JSON, model.definition.into_bytes()))
}

/// `GET /tilemaps/{id}/spritesheets`: spritesheets the tilemap draws from.
async fn tilemap_spritesheets(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<Vec<SpritesheetResponse>>, AppError> {
    let sheets = AssetService::tilemap_spritesheets(&state.db, id).await?;
    Ok(Json(
        sheets
            .into_iter()
            .map(|m| SpritesheetResponse::new(m, None))
            .collect(),
    ))
}

async fn delete_tilemap(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i32>,
) -> Result<StatusCode, AppError> {
    let removed = AssetService::delete_tilemap(&state.db, user.owner(), id).await?;
    tracing::info!(owner = %user.owner(), tilemap_id = id, removed, "Tilemap delete");
    Ok(StatusCode::NO_CONTENT)
}
