use sea_orm_migration::prelude::*;

use super::m20240501_000001_create_users::Users;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .alter_table(
                Table::alter()
                    .table(Users::Table)
                    .add_column(ColumnDef::new(Handle::Handle).string_len(32).null())
                    .to_owned(),
            )
            .await?;

        // NULLs do not collide, so accounts without a handle are fine.
        manager
            .create_index(
                Index::create()
                    .name("idx_users_handle")
                    .table(Users::Table)
                    .col(Handle::Handle)
                    .unique()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_users_handle").table(Users::Table).to_owned())
            .await?;

        manager
            .alter_table(
                Table::alter()
                    .table(Users::Table)
                    .drop_column(Handle::Handle)
                    .to_owned(),
            )
            .await
    }
}

#[derive(DeriveIden)]
enum Handle {
    Handle,
}
