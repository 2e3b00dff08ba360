use sea_orm_migration::prelude::*;

/// Creates `spritesheet` and its `spritesheet_reference` edge table (spritesheet → image).
#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(DeriveIden)]
enum Spritesheet {
    Table,
    Id,
    OwnerId,
    Name,
    Definition,
    Image,
    Hash,
    CreatedAt,
}

#[derive(DeriveIden)]
enum SpritesheetReference {
    Table,
    SpritesheetId,
    ImageId,
}

#[derive(DeriveIden)]
enum Image {
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
                    .table(Spritesheet::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Spritesheet::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Spritesheet::OwnerId).integer().not_null())
                    .col(ColumnDef::new(Spritesheet::Name).string_len(255).not_null())
                    .col(ColumnDef::new(Spritesheet::Definition).text().not_null())
                    .col(ColumnDef::new(Spritesheet::Image).blob().not_null())
                    .col(ColumnDef::new(Spritesheet::Hash).string_len(64).not_null())
                    .col(
                        ColumnDef::new(Spritesheet::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_spritesheet_owner_id")
                            .from(Spritesheet::Table, Spritesheet::OwnerId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_spritesheet_owner_id")
                    .table(Spritesheet::Table)
                    .col(Spritesheet::OwnerId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_spritesheet_hash")
                    .table(Spritesheet::Table)
                    .col(Spritesheet::Hash)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(SpritesheetReference::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(SpritesheetReference::SpritesheetId)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(SpritesheetReference::ImageId)
                            .integer()
                            .not_null(),
                    )
                    .primary_key(
                        Index::create()
                            .col(SpritesheetReference::SpritesheetId)
                            .col(SpritesheetReference::ImageId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_spritesheet_reference_spritesheet_id")
                            .from(SpritesheetReference::Table, SpritesheetReference::SpritesheetId)
                            .to(Spritesheet::Table, Spritesheet::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_spritesheet_reference_image_id")
                            .from(SpritesheetReference::Table, SpritesheetReference::ImageId)
                            .to(Image::Table, Image::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(SpritesheetReference::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Spritesheet::Table).to_owned())
            .await
    }
}
