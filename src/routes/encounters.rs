use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, patch, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

use crate::auth::middleware::AuthUser;
use crate::entities::encounter;
use crate::error::AppError;
use crate::routes::assets::TilemapResponse;
use crate::routes::characters::CharacterResponse;
use crate::services::EncounterService;
use crate::services::campaign_service::FilledEncounter;
use crate::services::encounter_service::{EncounterChanges, NewEncounter};
use crate::state::AppState;

// ─────────────────────────────────────────────────────────────────────────────
// Router
// ─────────────────────────────────────────────────────────────────────────────

/// Build the encounter route group: `/encounters/...`
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/encounters", post(create_encounter))
        .route(
            "/encounters/{id}",
            patch(update_encounter).delete(delete_encounter),
        )
        .route(
            "/encounters/{id}/characters",
            get(list_encounter_characters).post(add_character),
        )
        .route(
            "/encounters/{id}/characters/{character_id}",
            get(encounter_for_character).delete(remove_character),
        )
}

// ─────────────────────────────────────────────────────────────────────────────
// DTOs
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateEncounterRequest {
    pub campaign_id: i32,
    pub name: String,
    pub description: Option<String>,
    pub tilemap_id: Option<i32>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateEncounterRequest {
    pub name: String,
    pub description: Option<String>,
    pub tilemap_id: Option<i32>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddCharacterRequest {
    pub character_id: i32,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EncounterResponse {
    pub id: i32,
    pub campaign_id: i32,
    pub name: String,
    pub description: Option<String>,
    pub tilemap_id: Option<i32>,
    pub created_at: String,
}

/// An encounter with its map and cast, as shown in campaign overviews.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FilledEncounterResponse {
    #[serde(flatten)]
    pub encounter: EncounterResponse,
    pub tilemap: Option<TilemapResponse>,
    pub characters: Vec<CharacterResponse>,
}

impl From<encounter::Model> for EncounterResponse {
    fn from(m: encounter::Model) -> Self {
        Self {
            id: m.id,
            campaign_id: m.campaign_id,
            name: m.name,
            description: m.description,
            tilemap_id: m.tilemap_id,
            created_at: m.created_at.to_rfc3339(),
        }
    }
}

impl From<FilledEncounter> for FilledEncounterResponse {
    fn from(filled: FilledEncounter) -> Self {
        Self {
            encounter: filled.encounter.into(),
            tilemap: filled.tilemap.map(|t| TilemapResponse::new(t, None)),
            characters: filled
                .characters
                .into_iter()
                .map(CharacterResponse::from)
                .collect(),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Handlers
// ─────────────────────────────────────────────────────────────────────────────

/// `POST /api/v1/encounters`
async fn create_encounter(
    State(state): State<AppState>,
    user: AuthUser,
    Json(body): Json<CreateEncounterRequest>,
) -> Result<(StatusCode, Json<EncounterResponse>), AppError> {
    let model = EncounterService::create(
        &state.db,
        user.owner(),
        NewEncounter {
            campaign_id: body.campaign_id,
            name: body.name,
            description: body.description,
            tilemap_id: body.tilemap_id,
        },
    )
    .await?;
    Ok((StatusCode::CREATED, Json(model.into())))
}

/// `PATCH /api/v1/encounters/{id}`: description and tilemap are kept when omitted.
async fn update_encounter(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i32>,
    Json(body): Json<UpdateEncounterRequest>,
) -> Result<Json<EncounterResponse>, AppError> {
    let model = EncounterService::update(
        &state.db,
        user.owner(),
        id,
        EncounterChanges {
            name: body.name,
            description: body.description,
            tilemap_id: body.tilemap_id,
        },
    )
    .await?;
    Ok(Json(model.into()))
}

/// `DELETE /api/v1/encounters/{id}`
async fn delete_encounter(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i32>,
) -> Result<StatusCode, AppError> {
    let removed = EncounterService::delete(&state.db, user.owner(), id).await?;
    tracing::info!(owner = %user.owner(), encounter_id = id, removed, "Encounter delete");
    Ok(StatusCode::NO_CONTENT)
}

/// `GET /api/v1/encounters/{id}/characters`
async fn list_encounter_characters(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i32>,
) -> Result<Json<Vec<CharacterResponse>>, AppError> {
    let characters = EncounterService::list_characters(&state.db, user.owner(), id).await?;
    Ok(Json(characters.into_iter().map(CharacterResponse::from).collect()))
}

/// `POST /api/v1/encounters/{id}/characters`
async fn add_character(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i32>,
    Json(body): Json<AddCharacterRequest>,
) -> Result<StatusCode, AppError> {
    EncounterService::add_character(&state.db, user.owner(), id, body.character_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `DELETE /api/v1/encounters/{id}/characters/{characterId}`
async fn remove_character(
    State(state): State<AppState>,
    user: AuthUser,
    Path((id, character_id)): Path<(i32, i32)>,
) -> Result<StatusCode, AppError> {
    let removed =
        EncounterService::remove_character(&state.db, user.owner(), id, character_id).await?;
    tracing::info!(owner = %user.owner(), encounter_id = id, character_id, removed, "Character left encounter");
    Ok(StatusCode::NO_CONTENT)
}

/// `GET /api/v1/encounters/{id}/characters/{characterId}`: the encounter as seen by one
/// of the caller's characters.
async fn encounter_for_character(
    State(state): State<AppState>,
    user: AuthUser,
    Path((id, character_id)): Path<(i32, i32)>,
) -> Result<Json<FilledEncounterResponse>, AppError> {
    let filled =
        EncounterService::get_for_character(&state.db, user.owner(), id, character_id).await?;
    Ok(Json(filled.into()))
}
