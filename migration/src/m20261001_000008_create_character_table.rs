use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Character::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Character::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Character::OwnerId).integer().not_null())
                    .col(ColumnDef::new(Character::Name).string_len(255).not_null())
                    .col(ColumnDef::new(Character::Definition).json().not_null())
                    .col(ColumnDef::new(Character::Sprite).string_len(500).null())
                    .col(
                        ColumnDef::new(Character::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_character_owner_id")
                            .from(Character::Table, Character::OwnerId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_character_owner_id")
                    .table(Character::Table)
                    .col(Character::OwnerId)
                    .to_owned(),
            )
            .await?;

        // Character search filters by name
        manager
            .create_index(
                Index::create()
                    .name("idx_character_name")
                    .table(Character::Table)
                    .col(Character::Name)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Character::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Character {
    Table,
    Id,
    OwnerId,
    Name,
    Definition,
    Sprite,
    CreatedAt,
}

#[derive(DeriveIden)]
enum User {
    Table,
    Id,
}
