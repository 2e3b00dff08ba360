mod assets;
mod auth;
mod campaigns;
mod characters;
mod content;
mod encounters;
mod health;
mod signaling;
mod uploads;

use axum::Router;

use crate::config::Config;
use crate::state::AppState;

/// Build the complete application router.
///
/// Structure:
/// - `GET /health`: lightweight liveness check
/// - `POST /upload-assets`, `POST /set-thumbnail`: multipart forms, answered with `303`
/// - `GET /{image,spritesheet,spritesheet/image,tilemap,thumbnail}/{hash}`: public content
/// - `GET /session/{code}`: `WebSocket` signaling relay
/// - `/api/v1/...`: JSON API (health, auth, assets, campaigns, characters, encounters)
pub fn router(config: &Config) -> Router<AppState> {
    let api_v1 = Router::new()
        .merge(health::api_router())
        .nest("/auth", auth::router())
        .merge(assets::router())
        .merge(campaigns::router())
        .merge(characters::router())
        .merge(encounters::router());

    Router::new()
        .merge(health::root_router())
        .merge(content::router())
        .merge(uploads::router(config.max_upload_bytes))
        .merge(signaling::router())
        .nest("/api/v1", api_v1)
}
