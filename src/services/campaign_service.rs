use std::collections::{BTreeMap, HashMap};

use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};

use crate::auth::owner::OwnerId;
use crate::entities::{campaign, character, encounter, encounter_character, tilemap};
use crate::services::error::{ServiceError, ServiceResult};

/// An encounter with the map it is played on and the characters taking part.
#[derive(Debug, Clone)]
pub struct FilledEncounter {
    pub encounter: encounter::Model,
    pub tilemap: Option<tilemap::Model>,
    pub characters: Vec<character::Model>,
}

/// A campaign with everything the campaign overview screen shows.
#[derive(Debug, Clone)]
pub struct FilledCampaign {
    pub campaign: campaign::Model,
    pub encounters: Vec<FilledEncounter>,
    /// Distinct characters across all encounters of the campaign.
    pub characters: Vec<character::Model>,
}

/// Fields a campaign update may replace. `None` keeps the stored value.
#[derive(Debug, Clone, Default)]
pub struct CampaignChanges {
    pub name: Option<String>,
    pub description: Option<String>,
}

pub struct CampaignService;

impl CampaignService {
    pub async fn create(
        db: &DatabaseConnection,
        owner: OwnerId,
        name: String,
        description: Option<String>,
    ) -> ServiceResult<campaign::Model> {
        let name = validate_name(name)?;
        let model = campaign::ActiveModel {
            owner_id: Set(owner.get()),
            name: Set(name),
            description: Set(description),
            created_at: Set(Utc::now().fixed_offset()),
            ..Default::default()
        }
        .insert(db)
        .await?;

        tracing::info!(%owner, campaign_id = model.id, "Campaign created");
        Ok(model)
    }

    /// Fetch a campaign the owner holds.
    pub async fn get_owned(
        db: &DatabaseConnection,
        owner: OwnerId,
        id: i32,
    ) -> ServiceResult<campaign::Model> {
        campaign::Entity::find_by_id(id)
            .filter(campaign::Column::OwnerId.eq(owner.get()))
            .one(db)
            .await?
            .ok_or(ServiceError::NotFound("campaign"))
    }

    /// Replace the supplied fields of an owned campaign.
    ///
    /// # Errors
    ///
    /// [`ServiceError::NotFound`] when the campaign is missing or not owned,
    /// [`ServiceError::Validation`] when no field is supplied or the name is blank.
    pub async fn update(
        db: &DatabaseConnection,
        owner: OwnerId,
        id: i32,
        changes: CampaignChanges,
    ) -> ServiceResult<campaign::Model> {
        if changes.name.is_none() && changes.description.is_none() {
            return Err(ServiceError::Validation("nothing to update".to_string()));
        }

        let mut update = campaign::Entity::update_many();
        if let Some(name) = changes.name {
            update = update.col_expr(campaign::Column::Name, Expr::value(validate_name(name)?));
        }
        if let Some(description) = changes.description {
            update = update.col_expr(campaign::Column::Description, Expr::value(description));
        }

        let result = update
            .filter(campaign::Column::Id.eq(id))
            .filter(campaign::Column::OwnerId.eq(owner.get()))
            .exec(db)
            .await?;
        if result.rows_affected == 0 {
            return Err(ServiceError::NotFound("campaign"));
        }

        Self::get_owned(db, owner, id).await
    }

    /// Returns the number of rows removed. Encounters go with the campaign.
    pub async fn delete(db: &DatabaseConnection, owner: OwnerId, id: i32) -> ServiceResult<u64> {
        let result = campaign::Entity::delete_many()
            .filter(campaign::Column::Id.eq(id))
            .filter(campaign::Column::OwnerId.eq(owner.get()))
            .exec(db)
            .await?;
        Ok(result.rows_affected)
    }

    /// All of the owner's campaigns, filled with encounters, maps and characters.
    ///
    /// Runs a fixed number of queries regardless of campaign count.
    pub async fn list_filled(
        db: &DatabaseConnection,
        owner: OwnerId,
    ) -> ServiceResult<Vec<FilledCampaign>> {
        let campaigns = campaign::Entity::find()
            .filter(campaign::Column::OwnerId.eq(owner.get()))
            .order_by_asc(campaign::Column::Id)
            .all(db)
            .await?;
        if campaigns.is_empty() {
            return Ok(Vec::new());
        }

        let campaign_ids: Vec<i32> = campaigns.iter().map(|c| c.id).collect();
        let encounters = encounter::Entity::find()
            .find_also_related(tilemap::Entity)
            .filter(encounter::Column::CampaignId.is_in(campaign_ids))
            .order_by_asc(encounter::Column::Id)
            .all(db)
            .await?;

        let encounter_ids: Vec<i32> = encounters.iter().map(|(e, _)| e.id).collect();
        let links = encounter_character::Entity::find()
            .filter(encounter_character::Column::EncounterId.is_in(encounter_ids))
            .all(db)
            .await?;

        let character_ids: Vec<i32> = links.iter().map(|l| l.character_id).collect();
        let characters: HashMap<i32, character::Model> = character::Entity::find()
            .filter(character::Column::Id.is_in(character_ids))
            .all(db)
            .await?
            .into_iter()
            .map(|c| (c.id, c))
            .collect();

        let mut cast: HashMap<i32, Vec<character::Model>> = HashMap::new();
        for link in links {
            if let Some(c) = characters.get(&link.character_id) {
                cast.entry(link.encounter_id).or_default().push(c.clone());
            }
        }

        let mut by_campaign: HashMap<i32, Vec<FilledEncounter>> = HashMap::new();
        for (encounter, tilemap) in encounters {
            let mut characters = cast.remove(&encounter.id).unwrap_or_default();
            characters.sort_by_key(|c| c.id);
            by_campaign
                .entry(encounter.campaign_id)
                .or_default()
                .push(FilledEncounter {
                    encounter,
                    tilemap,
                    characters,
                });
        }

        Ok(campaigns
            .into_iter()
            .map(|campaign| {
                let encounters = by_campaign.remove(&campaign.id).unwrap_or_default();
                let characters: BTreeMap<i32, character::Model> = encounters
                    .iter()
                    .flat_map(|e| e.characters.iter())
                    .map(|c| (c.id, c.clone()))
                    .collect();
                FilledCampaign {
                    campaign,
                    encounters,
                    characters: characters.into_values().collect(),
                }
            })
            .collect())
    }
}

pub(crate) fn validate_name(name: String) -> ServiceResult<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(ServiceError::Validation("name must not be empty".to_string()));
    }
    if trimmed.len() == name.len() {
        Ok(name)
    } else {
        Ok(trimmed.to_string())
    }
}
