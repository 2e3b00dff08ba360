pub use sea_orm_migration::prelude::*;

mod m20261001_000001_create_user_table;
mod m20261001_000002_create_auth_provider_table;
mod m20261001_000003_create_image_table;
mod m20261001_000004_create_spritesheet_table;
mod m20261001_000005_create_tilemap_table;
mod m20261001_000006_create_thumbnail_table;
mod m20261001_000007_create_campaign_table;
mod m20261001_000008_create_character_table;
mod m20261001_000009_create_encounter_table;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20261001_000001_create_user_table::Migration),
            Box::new(m20261001_000002_create_auth_provider_table::Migration),
            Box::new(m20261001_000003_create_image_table::Migration),
            Box::new(m20261001_000004_create_spritesheet_table::Migration),
            Box::new(m20261001_000005_create_tilemap_table::Migration),
            Box::new(m20261001_000006_create_thumbnail_table::Migration),
            Box::new(m20261001_000007_create_campaign_table::Migration),
            Box::new(m20261001_000008_create_character_table::Migration),
            Box::new(m20261001_000009_create_encounter_table::Migration),
        ]
    }
}
