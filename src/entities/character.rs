use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// A player or non-player character. `definition` holds the free-form rules sheet.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "character")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub owner_id: i32,
    pub name: String,
    pub definition: Json,
    pub sprite: Option<String>,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::OwnerId",
        to = "super::user::Column::Id"
    )]
    Owner,
    #[sea_orm(has_many = "super::encounter_character::Entity")]
    EncounterCharacter,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Owner.def()
    }
}

impl Related<super::encounter_character::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::EncounterCharacter.def()
    }
}

impl Related<super::encounter::Entity> for Entity {
    fn to() -> RelationDef {
        super::encounter_character::Relation::Encounter.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::encounter_character::Relation::Character.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}
