use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, patch};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::auth::middleware::AuthUser;
use crate::entities::character;
use crate::error::AppError;
use crate::services::CharacterService;
use crate::services::character_service::{CharacterChanges, NewCharacter};
use crate::state::AppState;

// ─────────────────────────────────────────────────────────────────────────────
// Router
// ─────────────────────────────────────────────────────────────────────────────

/// Build the character route group: `/characters/...`
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/characters", get(list_characters).post(create_character))
        .route("/characters/search", get(search_characters))
        .route(
            "/characters/{id}",
            patch(update_character).delete(delete_character),
        )
}

// ─────────────────────────────────────────────────────────────────────────────
// DTOs
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct CreateCharacterRequest {
    pub name: String,
    #[serde(default = "empty_definition")]
    pub definition: Value,
    pub sprite: Option<String>,
}

#[derive(Deserialize)]
pub struct UpdateCharacterRequest {
    pub name: Option<String>,
    pub definition: Option<Value>,
    pub sprite: Option<String>,
}

#[derive(Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub name: String,
}

#[derive(Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct CharacterResponse {
    pub id: i32,
    pub name: String,
    pub definition: Value,
    pub sprite: Option<String>,
    pub created_at: String,
}

impl From<character::Model> for CharacterResponse {
    fn from(m: character::Model) -> Self {
        Self {
            id: m.id,
            name: m.name,
            definition: m.definition,
            sprite: m.sprite,
            created_at: m.created_at.to_rfc3339(),
        }
    }
}

fn empty_definition() -> Value {
    Value::Object(serde_json::Map::new())
}

// ─────────────────────────────────────────────────────────────────────────────
// Handlers
// ─────────────────────────────────────────────────────────────────────────────

/// `GET /api/v1/characters`
async fn list_characters(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<Vec<CharacterResponse>>, AppError> {
    let characters = CharacterService::list(&state.db, user.owner()).await?;
    Ok(Json(characters.into_iter().map(CharacterResponse::from).collect()))
}

/// `POST /api/v1/characters`
async fn create_character(
    State(state): State<AppState>,
    user: AuthUser,
    Json(body): Json<CreateCharacterRequest>,
) -> Result<(StatusCode, Json<CharacterResponse>), AppError> {
    let model = CharacterService::create(
        &state.db,
        user.owner(),
        NewCharacter {
            name: body.name,
            definition: body.definition,
            sprite: body.sprite,
        },
    )
    .await?;
    Ok((StatusCode::CREATED, Json(model.into())))
}

/// `GET /api/v1/characters/search?name=`: public case-insensitive substring match.
async fn search_characters(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<Vec<CharacterResponse>>, AppError> {
    let characters = CharacterService::search(&state.db, &query.name).await?;
    Ok(Json(characters.into_iter().map(CharacterResponse::from).collect()))
}

/// `PATCH /api/v1/characters/{id}`
async fn update_character(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i32>,
    Json(body): Json<UpdateCharacterRequest>,
) -> Result<Json<CharacterResponse>, AppError> {
    let model = CharacterService::update(
        &state.db,
        user.owner(),
        id,
        CharacterChanges {
            name: body.name,
            definition: body.definition,
            sprite: body.sprite,
        },
    )
    .await?;
    Ok(Json(model.into()))
}

/// `DELETE /api/v1/characters/{id}`
async fn delete_character(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i32>,
) -> Result<StatusCode, AppError> {
    let removed = CharacterService::delete(&state.db, user.owner(), id).await?;
    tracing::info!(owner = %user.owner(), character_id = id, removed, "Character delete");
    Ok(StatusCode::NO_CONTENT)
}
