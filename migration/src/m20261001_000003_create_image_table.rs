use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Image::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Image::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Image::OwnerId).integer().not_null())
                    .col(ColumnDef::new(Image::Filename).string_len(255).not_null())
                    .col(ColumnDef::new(Image::ContentType).string_len(100).not_null())
                    .col(ColumnDef::new(Image::Filedata).blob().not_null())
                    .col(ColumnDef::new(Image::Hash).string_len(64).not_null())
                    .col(
                        ColumnDef::new(Image::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_image_owner_id")
                            .from(Image::Table, Image::OwnerId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_image_owner_id")
                    .table(Image::Table)
                    .col(Image::OwnerId)
                    .to_owned(),
            )
            .await?;

        // Hashes are not unique: identical uploads produce distinct rows
        manager
            .create_index(
                Index::create()
                    .name("idx_image_hash")
                    .table(Image::Table)
                    .col(Image::Hash)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Image::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Image {
    Table,
    Id,
    OwnerId,
    Filename,
    ContentType,
    Filedata,
    Hash,
    CreatedAt,
}

#[derive(DeriveIden)]
enum User {
    Table,
    Id,
}
