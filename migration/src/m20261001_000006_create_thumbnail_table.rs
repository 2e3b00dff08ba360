use sea_orm_migration::prelude::*;

/// Creates the `thumbnail` table. A thumbnail belongs to exactly one tilemap or spritesheet,
/// and each target has at most one thumbnail (enforced by the unique indexes below).
#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(DeriveIden)]
enum Thumbnail {
    Table,
    Id,
    TilemapId,
    SpritesheetId,
    ContentType,
    Image,
    Width,
    Height,
    Hash,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Tilemap {
    Table,
    Id,
}

#[derive(DeriveIden)]
enum Spritesheet {
    Table,
    Id,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Thumbnail::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Thumbnail::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Thumbnail::TilemapId).integer().null())
                    .col(ColumnDef::new(Thumbnail::SpritesheetId).integer().null())
                    .col(
                        ColumnDef::new(Thumbnail::ContentType)
                            .string_len(100)
                            .not_null(),
                    )
                    .col(ColumnDef::new(Thumbnail::Image).blob().not_null())
                    .col(ColumnDef::new(Thumbnail::Width).integer().not_null())
                    .col(ColumnDef::new(Thumbnail::Height).integer().not_null())
                    .col(ColumnDef::new(Thumbnail::Hash).string_len(64).not_null())
                    .col(
                        ColumnDef::new(Thumbnail::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_thumbnail_tilemap_id")
                            .from(Thumbnail::Table, Thumbnail::TilemapId)
                            .to(Tilemap::Table, Tilemap::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_thumbnail_spritesheet_id")
                            .from(Thumbnail::Table, Thumbnail::SpritesheetId)
                            .to(Spritesheet::Table, Spritesheet::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_thumbnail_tilemap_id")
                    .table(Thumbnail::Table)
                    .col(Thumbnail::TilemapId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_thumbnail_spritesheet_id")
                    .table(Thumbnail::Table)
                    .col(Thumbnail::SpritesheetId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_thumbnail_hash")
                    .table(Thumbnail::Table)
                    .col(Thumbnail::Hash)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Thumbnail::Table).to_owned())
            .await
    }
}
