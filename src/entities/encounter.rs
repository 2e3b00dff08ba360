use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// An encounter inside a campaign. Ownership is inherited from the campaign.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "encounter")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub campaign_id: i32,
    pub name: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,
    pub tilemap_id: Option<i32>,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::campaign::Entity",
        from = "Column::CampaignId",
        to = "super::campaign::Column::Id",
        on_delete = "Cascade"
    )]
    Campaign,
    #[sea_orm(
        belongs_to = "super::tilemap::Entity",
        from = "Column::TilemapId",
        to = "super::tilemap::Column::Id",
        on_delete = "SetNull"
    )]
    Tilemap,
    #[sea_orm(has_many = "super::encounter_character::Entity")]
    EncounterCharacter,
}

impl Related<super::campaign::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Campaign.def()
    }
}

impl Related<super::tilemap::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Tilemap.def()
    }
}

impl Related<super::encounter_character::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::EncounterCharacter.def()
    }
}

impl Related<super::character::Entity> for Entity {
    fn to() -> RelationDef {
        super::encounter_character::Relation::Character.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::encounter_character::Relation::Encounter.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}
