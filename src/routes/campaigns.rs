use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

use crate::auth::middleware::AuthUser;
use crate::entities::campaign;
use crate::error::AppError;
use crate::routes::characters::CharacterResponse;
use crate::routes::encounters::FilledEncounterResponse;
use crate::services::CampaignService;
use crate::services::campaign_service::{CampaignChanges, FilledCampaign};
use crate::state::AppState;

// ─────────────────────────────────────────────────────────────────────────────
// Router
// ─────────────────────────────────────────────────────────────────────────────

/// Build the campaign route group: `/campaigns/...`
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/campaigns", get(list_campaigns).post(create_campaign))
        .route(
            "/campaigns/{id}",
            get(get_campaign)
                .patch(update_campaign)
                .delete(delete_campaign),
        )
}

// ─────────────────────────────────────────────────────────────────────────────
// DTOs
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct CreateCampaignRequest {
    pub name: String,
    pub description: Option<String>,
}

#[derive(Deserialize)]
pub struct UpdateCampaignRequest {
    pub name: Option<String>,
    pub description: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CampaignResponse {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    pub created_at: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FilledCampaignResponse {
    #[serde(flatten)]
    pub campaign: CampaignResponse,
    pub encounters: Vec<FilledEncounterResponse>,
    pub characters: Vec<CharacterResponse>,
}

impl From<campaign::Model> for CampaignResponse {
    fn from(m: campaign::Model) -> Self {
        Self {
            id: m.id,
            name: m.name,
            description: m.description,
            created_at: m.created_at.to_rfc3339(),
        }
    }
}

impl From<FilledCampaign> for FilledCampaignResponse {
    fn from(filled: FilledCampaign) -> Self {
        Self {
            campaign: filled.campaign.into(),
            encounters: filled
                .encounters
                .into_iter()
                .map(FilledEncounterResponse::from)
                .collect(),
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

/// `GET /api/v1/campaigns`: the caller's campaigns with encounters and characters.
async fn list_campaigns(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<Vec<FilledCampaignResponse>>, AppError> {
    let campaigns = CampaignService::list_filled(&state.db, user.owner()).await?;
    Ok(Json(
        campaigns
            .into_iter()
            .map(FilledCampaignResponse::from)
            .collect(),
    ))
}

/// `POST /api/v1/campaigns`
async fn create_campaign(
    State(state): State<AppState>,
    user: AuthUser,
    Json(body): Json<CreateCampaignRequest>,
) -> Result<(StatusCode, Json<CampaignResponse>), AppError> {
    let model =
        CampaignService::create(&state.db, user.owner(), body.name, body.description).await?;
    Ok((StatusCode::CREATED, Json(model.into())))
}

/// `GET /api/v1/campaigns/{id}`
async fn get_campaign(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i32>,
) -> Result<Json<CampaignResponse>, AppError> {
    let model = CampaignService::get_owned(&state.db, user.owner(), id).await?;
    Ok(Json(model.into()))
}

/// `PATCH /api/v1/campaigns/{id}`
async fn update_campaign(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i32>,
    Json(body): Json<UpdateCampaignRequest>,
) -> Result<Json<CampaignResponse>, AppError> {
    let model = CampaignService::update(
        &state.db,
        user.owner(),
        id,
        CampaignChanges {
            name: body.name,
            description: body.description,
        },
    )
    .await?;
    Ok(Json(model.into()))
}

/// `DELETE /api/v1/campaigns/{id}`
async fn delete_campaign(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i32>,
) -> Result<StatusCode, AppError> {
    let removed = CampaignService::delete(&state.db, user.owner(), id).await?;
    tracing::info!(owner = %user.owner(), campaign_id = id, removed, "Campaign delete");
    Ok(StatusCode::NO_CONTENT)
}
