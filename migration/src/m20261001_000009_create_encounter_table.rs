use sea_orm_migration::prelude::*;

/// Creates `encounter` (owned through its campaign) and the `encounter_character` join table.
#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(DeriveIden)]
enum Encounter {
    Table,
    Id,
    CampaignId,
    Name,
    Description,
    TilemapId,
    CreatedAt,
}

#[derive(DeriveIden)]
enum EncounterCharacter {
    Table,
    EncounterId,
    CharacterId,
}

#[derive(DeriveIden)]
enum Campaign {
    Table,
    Id,
}

#[derive(DeriveIden)]
enum Tilemap {
    Table,
    Id,
}

#[derive(DeriveIden)]
enum Character {
    Table,
    Id,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Encounter::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Encounter::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Encounter::CampaignId).integer().not_null())
                    .col(ColumnDef::new(Encounter::Name).string_len(255).not_null())
                    .col(ColumnDef::new(Encounter::Description).text().null())
                    .col(ColumnDef::new(Encounter::TilemapId).integer().null())
                    .col(
                        ColumnDef::new(Encounter::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_encounter_campaign_id")
                            .from(Encounter::Table, Encounter::CampaignId)
                            .to(Campaign::Table, Campaign::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_encounter_tilemap_id")
                            .from(Encounter::Table, Encounter::TilemapId)
                            .to(Tilemap::Table, Tilemap::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_encounter_campaign_id")
                    .table(Encounter::Table)
                    .col(Encounter::CampaignId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(EncounterCharacter::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(EncounterCharacter::EncounterId)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(EncounterCharacter::CharacterId)
                            .integer()
                            .not_null(),
                    )
                    .primary_key(
                        Index::create()
                            .col(EncounterCharacter::EncounterId)
                            .col(EncounterCharacter::CharacterId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_encounter_character_encounter_id")
                            .from(EncounterCharacter::Table, EncounterCharacter::EncounterId)
                            .to(Encounter::Table, Encounter::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_encounter_character_character_id")
                            .from(EncounterCharacter::Table, EncounterCharacter::CharacterId)
                            .to(Character::Table, Character::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(EncounterCharacter::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Encounter::Table).to_owned())
            .await
    }
}
