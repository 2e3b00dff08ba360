use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "tilemap")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub owner_id: i32,
    pub name: String,
    #[sea_orm(column_type = "Text")]
    pub definition: String,
    pub hash: String,
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
    #[sea_orm(has_many = "super::tilemap_reference::Entity")]
    TilemapReference,
    #[sea_orm(has_many = "super::thumbnail::Entity")]
    Thumbnail,
    #[sea_orm(has_many = "super::encounter::Entity")]
    Encounter,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Owner.def()
    }
}

impl Related<super::tilemap_reference::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::TilemapReference.def()
    }
}

impl Related<super::thumbnail::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Thumbnail.def()
    }
}

impl Related<super::encounter::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Encounter.def()
    }
}

/// Spritesheets referenced by a tilemap, through `tilemap_reference`.
impl Related<super::spritesheet::Entity> for Entity {
    fn to() -> RelationDef {
        super::tilemap_reference::Relation::Spritesheet.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::tilemap_reference::Relation::Tilemap.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}
