use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Edge from a spritesheet to the image it was built from.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "spritesheet_reference")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub spritesheet_id: i32,
    #[sea_orm(primary_key, auto_increment = false)]
    pub image_id: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::spritesheet::Entity",
        from = "Column::SpritesheetId",
        to = "super::spritesheet::Column::Id",
        on_delete = "Cascade"
    )]
    Spritesheet,
    #[sea_orm(
        belongs_to = "super::image::Entity",
        from = "Column::ImageId",
        to = "super::image::Column::Id",
        on_delete = "Cascade"
    )]
    Image,
}

impl Related<super::spritesheet::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Spritesheet.def()
    }
}

impl Related<super::image::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Image.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
