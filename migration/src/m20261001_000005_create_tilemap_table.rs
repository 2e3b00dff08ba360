use sea_orm_migration::prelude::*;

/// Creates `tilemap` and its `tilemap_reference` edge table (tilemap → spritesheet).
#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(DeriveIden)]
enum Tilemap {
    Table,
    Id,
    OwnerId,
    Name,
    Definition,
    Hash,
    CreatedAt,
}

#[derive(DeriveIden)]
enum TilemapReference {
    Table,
    TilemapId,
    SpritesheetId,
}

#[derive(DeriveIden)]
enum Spritesheet {
    Table,
    Id,
}

#[derive(DeriveIden)]
enum User {
    Table,
    Id,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Tilemap::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Tilemap::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Tilemap::OwnerId).integer().not_null())
                    .col(ColumnDef::new(Tilemap::Name).string_len(255).not_null())
                    .col(ColumnDef::new(Tilemap::Definition).text().not_null())
                    .col(ColumnDef::new(Tilemap::Hash).string_len(64).not_null())
                    .col(
                        ColumnDef::new(Tilemap::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_tilemap_owner_id")
                            .from(Tilemap::Table, Tilemap::OwnerId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_tilemap_owner_id")
                    .table(Tilemap::Table)
                    .col(Tilemap::OwnerId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_tilemap_hash")
                    .table(Tilemap::Table)
                    .col(Tilemap::Hash)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(TilemapReference::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(TilemapReference::TilemapId)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(TilemapReference::SpritesheetId)
                            .integer()
                            .not_null(),
                    )
                    .primary_key(
                        Index::create()
                            .col(TilemapReference::TilemapId)
                            .col(TilemapReference::SpritesheetId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_tilemap_reference_tilemap_id")
                            .from(TilemapReference::Table, TilemapReference::TilemapId)
                            .to(Tilemap::Table, Tilemap::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_tilemap_reference_spritesheet_id")
                            .from(TilemapReference::Table, TilemapReference::SpritesheetId)
                            .to(Spritesheet::Table, Spritesheet::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(TilemapReference::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Tilemap::Table).to_owned())
            .await
    }
}
