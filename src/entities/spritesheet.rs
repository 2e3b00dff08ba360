use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// A spritesheet definition plus a copy of the image it slices.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "spritesheet")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub owner_id: i32,
    pub name: String,
    #[sea_orm(column_type = "Text")]
    pub definition: String,
    #[serde(skip)]
    pub image: Vec<u8>,
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
    #[sea_orm(has_many = "super::spritesheet_reference::Entity")]
    SpritesheetReference,
    #[sea_orm(has_many = "super::tilemap_reference::Entity")]
    TilemapReference,
    #[sea_orm(has_many = "super::thumbnail::Entity")]
    Thumbnail,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Owner.def()
    }
}

impl Related<super::spritesheet_reference::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SpritesheetReference.def()
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

impl ActiveModelBehavior for ActiveModel {}
