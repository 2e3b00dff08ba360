use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Edge from a tilemap to one spritesheet it draws tiles from.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "tilemap_reference")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub tilemap_id: i32,
    #[sea_orm(primary_key, auto_increment = false)]
    pub spritesheet_id: i32,
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
