//! Public content-addressed reads: `/{kind}/{hash}` where `hash` is the URL-safe base64
//! of the stored SHA-256 digest.

use axum::Router;
use axum::extract::{Path, State};
use axum::http::{HeaderValue, header};
use axum::response::{IntoResponse, Response};
use axum::routing::get;

use crate::error::AppError;
use crate::ingest::upload::CONTENT_TYPE_JSON;
use crate::services::AssetService;
use crate::state::AppState;
use crate::utils::content_hash::{from_url_segment, to_url_segment};

const OCTET_STREAM: &str = "application/octet-stream";

/// Content is addressed by digest, so a response never changes for a given URL.
const IMMUTABLE: &str = "public, max-age=31536000, immutable";

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/image/{hash}", get(image_by_hash))
        .route("/spritesheet/{hash}", get(spritesheet_by_hash))
        .route("/spritesheet/image/{hash}", get(spritesheet_image_by_hash))
        .route("/tilemap/{hash}", get(tilemap_by_hash))
        .route("/thumbnail/{hash}", get(thumbnail_by_hash))
}

/// The public URL of a stored asset, e.g. `/tilemap/<segment>`.
pub(crate) fn content_url(kind: &str, hex: &str) -> Option<String> {
    to_url_segment(hex).map(|segment| format!("/{kind}/{segment}"))
}

/// Serve bytes with the given content type.
pub(crate) fn bytes_response(content_type: &str, body: Vec<u8>) -> Response {
    let content_type =
        HeaderValue::from_str(content_type).unwrap_or_else(|_| HeaderValue::from_static(OCTET_STREAM));
    ([(header::CONTENT_TYPE, content_type)], body).into_response()
}

/// Like [`bytes_response`], marked cacheable forever.
fn immutable_response(content_type: &str, body: Vec<u8>) -> Response {
    let mut response = bytes_response(content_type, body);
    response
        .headers_mut()
        .insert(header::CACHE_CONTROL, HeaderValue::from_static(IMMUTABLE));
    response
}

/// Content type of raw image bytes, sniffed from their magic number.
pub(crate) fn sniff_image_type(bytes: &[u8]) -> &'static str {
    image::guess_format(bytes).map_or(OCTET_STREAM, |format| format.to_mime_type())
}

fn parse_hash(segment: &str) -> Result<String, AppError> {
    from_url_segment(segment)
        .ok_or_else(|| AppError::BadRequest("Malformed content hash.".to_string()))
}

/// `GET /image/{hash}`
async fn image_by_hash(
    State(state): State<AppState>,
    Path(hash): Path<String>,
) -> Result<Response, AppError> {
    let model = AssetService::image_by_hash(&state.db, &parse_hash(&hash)?).await?;
    Ok(immutable_response(&model.content_type, model.filedata))
}

/// `GET /spritesheet/{hash}`: the JSON definition.
async fn spritesheet_by_hash(
    State(state): State<AppState>,
    Path(hash): Path<String>,
) -> Result<Response, AppError> {
    let model = AssetService::spritesheet_by_hash(&state.db, &parse_hash(&hash)?).await?;
    Ok(immutable_response(CONTENT_TYPE_JSON, model.definition.into_bytes()))
}

/// `GET /spritesheet/image/{hash}`: the image copied into the spritesheet.
async fn spritesheet_image_by_hash(
    State(state): State<AppState>,
    Path(hash): Path<String>,
) -> Result<Response, AppError> {
    let model = AssetService::spritesheet_by_hash(&state.db, &parse_hash(&hash)?).await?;
    Ok(immutable_response(sniff_image_type(&model.image), model.image))
}

/// `GET /tilemap/{hash}`
async fn tilemap_by_hash(
    State(state): State<AppState>,
    Path(hash): Path<String>,
) -> Result<Response, AppError> {
    let model = AssetService::tilemap_by_hash(&state.db, &parse_hash(&hash)?).await?;
    Ok(immutable_response(CONTENT_TYPE_JSON, model.definition.into_bytes()))
}

/// `GET /thumbnail/{hash}`
async fn thumbnail_by_hash(
    State(state): State<AppState>,
    Path(hash): Path<String>,
) -> Result<Response, AppError> {
    let model = AssetService::thumbnail_by_hash(&state.db, &parse_hash(&hash)?).await?;
    Ok(immutable_response(&model.content_type, model.image))
}
