//! Create `planos` table.
//!
//! Uniqueness of `nome` and `codigo_registro_ans` is added by the index
//! migration under stable constraint names.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Planos::Table)
                    .if_not_exists()
                    .col(uuid(Planos::Id).primary_key())
                    .col(string_len(Planos::Nome, 255).not_null())
                    .col(string_len(Planos::CodigoRegistroAns, 64).not_null())
                    .col(timestamp_with_time_zone(Planos::CreatedAt).not_null())
                    .col(timestamp_with_time_zone(Planos::UpdatedAt).not_null())
                    .col(
                        ColumnDef::new(Planos::DeletedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Planos::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Planos { Table, Id, Nome, CodigoRegistroAns, CreatedAt, UpdatedAt, DeletedAt }
