//! Encounters belong to a campaign and inherit its owner, so every owner check here
//! goes through `campaign_id IN (SELECT id FROM campaign WHERE owner_id = ?)`.

use chrono::Utc;
use sea_orm::sea_query::{Expr, OnConflict, Query, SelectStatement};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, ModelTrait,
    QueryFilter, QueryOrder, Set, TransactionTrait,
};

use crate::auth::owner::OwnerId;
use crate::entities::{campaign, character, encounter, encounter_character, tilemap};
use crate::services::campaign_service::{FilledEncounter, validate_name};
use crate::services::error::{ServiceError, ServiceResult};

#[derive(Debug, Clone)]
pub struct NewEncounter {
    pub campaign_id: i32,
    pub name: String,
    pub description: Option<String>,
    pub tilemap_id: Option<i32>,
}

/// An encounter update. The name is always replaced; description and tilemap only
/// when supplied.
#[derive(Debug, Clone)]
pub struct EncounterChanges {
    pub name: String,
    pub description: Option<String>,
    pub tilemap_id: Option<i32>,
}

pub struct EncounterService;

impl EncounterService {
    /// # Errors
    ///
    /// [`ServiceError::NotFound`] when the campaign, or the tilemap if one is given,
    /// is not owned by `owner`.
    pub async fn create(
        db: &DatabaseConnection,
        owner: OwnerId,
        new: NewEncounter,
    ) -> ServiceResult<encounter::Model> {
        let name = validate_name(new.name)?;
        let txn = db.begin().await?;

        let campaign_owned = campaign::Entity::find_by_id(new.campaign_id)
            .filter(campaign::Column::OwnerId.eq(owner.get()))
            .one(&txn)
            .await?
            .is_some();
        if !campaign_owned {
            return Err(ServiceError::NotFound("campaign"));
        }
        if let Some(tilemap_id) = new.tilemap_id {
            ensure_tilemap_owned(&txn, owner, tilemap_id).await?;
        }

        let model = encounter::ActiveModel {
            campaign_id: Set(new.campaign_id),
            name: Set(name),
            description: Set(new.description),
            tilemap_id: Set(new.tilemap_id),
            created_at: Set(Utc::now().fixed_offset()),
            ..Default::default()
        }
        .insert(&txn)
        .await?;
        txn.commit().await?;

        tracing::info!(%owner, encounter_id = model.id, campaign_id = model.campaign_id, "Encounter created");
        Ok(model)
    }

    pub async fn update(
        db: &DatabaseConnection,
        owner: OwnerId,
        id: i32,
        changes: EncounterChanges,
    ) -> ServiceResult<encounter::Model> {
        let name = validate_name(changes.name)?;
        let txn = db.begin().await?;

        let mut update = encounter::Entity::update_many()
            .col_expr(encounter::Column::Name, Expr::value(name));
        if let Some(description) = changes.description {
            update = update.col_expr(encounter::Column::Description, Expr::value(description));
        }
        if let Some(tilemap_id) = changes.tilemap_id {
            ensure_tilemap_owned(&txn, owner, tilemap_id).await?;
            update = update.col_expr(encounter::Column::TilemapId, Expr::value(tilemap_id));
        }

        let result = update
            .filter(encounter::Column::Id.eq(id))
            .filter(encounter::Column::CampaignId.in_subquery(owned_campaigns(owner)))
            .exec(&txn)
            .await?;
        if result.rows_affected == 0 {
            return Err(ServiceError::NotFound("encounter"));
        }

        let model = find_owned(&txn, owner, id).await?;
        txn.commit().await?;
        Ok(model)
    }

    pub async fn delete(db: &DatabaseConnection, owner: OwnerId, id: i32) -> ServiceResult<u64> {
        let result = encounter::Entity::delete_many()
            .filter(encounter::Column::Id.eq(id))
            .filter(encounter::Column::CampaignId.in_subquery(owned_campaigns(owner)))
            .exec(db)
            .await?;
        Ok(result.rows_affected)
    }

    /// Put an owned character into an owned encounter. Adding twice is a no-op.
    pub async fn add_character(
        db: &DatabaseConnection,
        owner: OwnerId,
        encounter_id: i32,
        character_id: i32,
    ) -> ServiceResult<()> {
        let txn = db.begin().await?;
        find_owned(&txn, owner, encounter_id).await?;

        let character_owned = character::Entity::find_by_id(character_id)
            .filter(character::Column::OwnerId.eq(owner.get()))
            .one(&txn)
            .await?
            .is_some();
        if !character_owned {
            return Err(ServiceError::NotFound("character"));
        }

        encounter_character::Entity::insert(encounter_character::ActiveModel {
            encounter_id: Set(encounter_id),
            character_id: Set(character_id),
        })
        .on_conflict(
            OnConflict::columns([
                encounter_character::Column::EncounterId,
                encounter_character::Column::CharacterId,
            ])
            .do_nothing()
            .to_owned(),
        )
        .do_nothing()
        .exec(&txn)
        .await?;

        txn.commit().await?;
        tracing::info!(%owner, encounter_id, character_id, "Character joined encounter");
        Ok(())
    }

    pub async fn remove_character(
        db: &DatabaseConnection,
        owner: OwnerId,
        encounter_id: i32,
        character_id: i32,
    ) -> ServiceResult<u64> {
        let owned_encounters = Query::select()
            .column(encounter::Column::Id)
            .from(encounter::Entity)
            .and_where(encounter::Column::CampaignId.in_subquery(owned_campaigns(owner)))
            .to_owned();

        let result = encounter_character::Entity::delete_many()
            .filter(encounter_character::Column::EncounterId.eq(encounter_id))
            .filter(encounter_character::Column::CharacterId.eq(character_id))
            .filter(encounter_character::Column::EncounterId.in_subquery(owned_encounters))
            .exec(db)
            .await?;
        Ok(result.rows_affected)
    }

    pub async fn list_characters(
        db: &DatabaseConnection,
        owner: OwnerId,
        encounter_id: i32,
    ) -> ServiceResult<Vec<character::Model>> {
        let encounter = find_owned(db, owner, encounter_id).await?;
        Ok(encounter
            .find_related(character::Entity)
            .order_by_asc(character::Column::Id)
            .all(db)
            .await?)
    }

    /// The encounter as seen by one of its characters.
    ///
    /// # Errors
    ///
    /// [`ServiceError::NotFound`] unless `character_id` is owned by `owner` and takes
    /// part in the encounter.
    pub async fn get_for_character(
        db: &DatabaseConnection,
        owner: OwnerId,
        encounter_id: i32,
        character_id: i32,
    ) -> ServiceResult<FilledEncounter> {
        let linked = encounter_character::Entity::find_by_id((encounter_id, character_id))
            .one(db)
            .await?
            .is_some();
        let character_owned = character::Entity::find_by_id(character_id)
            .filter(character::Column::OwnerId.eq(owner.get()))
            .one(db)
            .await?
            .is_some();
        if !(linked && character_owned) {
            return Err(ServiceError::NotFound("encounter"));
        }

        let (encounter, tilemap) = encounter::Entity::find_by_id(encounter_id)
            .find_also_related(tilemap::Entity)
            .one(db)
            .await?
            .ok_or(ServiceError::NotFound("encounter"))?;
        let characters = encounter
            .find_related(character::Entity)
            .order_by_asc(character::Column::Id)
            .all(db)
            .await?;

        Ok(FilledEncounter {
            encounter,
            tilemap,
            characters,
        })
    }
}

/// `SELECT id FROM campaign WHERE owner_id = ?`
fn owned_campaigns(owner: OwnerId) -> SelectStatement {
    Query::select()
        .column(campaign::Column::Id)
        .from(campaign::Entity)
        .and_where(campaign::Column::OwnerId.eq(owner.get()))
        .to_owned()
}

async fn find_owned<C: ConnectionTrait>(
    conn: &C,
    owner: OwnerId,
    id: i32,
) -> ServiceResult<encounter::Model> {
    encounter::Entity::find_by_id(id)
        .filter(encounter::Column::CampaignId.in_subquery(owned_campaigns(owner)))
        .one(conn)
        .await?
        .ok_or(ServiceError::NotFound("encounter"))
}

async fn ensure_tilemap_owned<C: ConnectionTrait>(
    conn: &C,
    owner: OwnerId,
    tilemap_id: i32,
) -> ServiceResult<()> {
    tilemap::Entity::find_by_id(tilemap_id)
        .filter(tilemap::Column::OwnerId.eq(owner.get()))
        .one(conn)
        .await?
        .map(|_| ())
        .ok_or(ServiceError::NotFound("tilemap"))
}
