use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Preview image for exactly one tilemap or spritesheet.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "thumbnail")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub tilemap_id: Option<i32>,
    #[sea_orm(unique)]
    pub spritesheet_id: Option<i32>,
    pub content_type: String,
    #[serde(skip)]
    pub image: Vec<u8>,
    pub width: i32,
    pub height: i32,
    pub hash: String,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::tilemap::Entity",
        from = "Column::TilemapId",
        to = "super::tilemap::Column::Id",
        on_delete = "Cascade"
    )]
    Tilemap,
    #[sea_orm(
        belongs_to = "super::spritesheet::Entity",
        from = "Column::SpritesheetId",
        to = "super::spritesheet::Column::Id",
        on_delete = "Cascade"
    )]
    Spritesheet,
}

impl Related<super::tilemap::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Tilemap.def()
    }
}

impl Related<super::spritesheet::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Spritesheet.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
