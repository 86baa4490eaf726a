//! Create `hogwarts_user` table storing accounts and password hashes.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(HogwartsUser::Table)
                    .if_not_exists()
                    .col(pk_auto(HogwartsUser::Id))
                    .col(string_len(HogwartsUser::Username, 64).unique_key().not_null())
                    .col(string_len(HogwartsUser::PasswordHash, 255).not_null())
                    .col(boolean(HogwartsUser::Enabled).not_null())
                    .col(string_len(HogwartsUser::Role, 64).not_null())
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(HogwartsUser::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum HogwartsUser { Table, Id, Username, PasswordHash, Enabled, Role }
