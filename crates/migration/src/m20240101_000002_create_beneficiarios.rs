//! Create `beneficiarios` table with FK to `planos`.
//!
//! The FK restricts deletes so a plan row cannot disappear from under a
//! beneficiary, soft-deleted or not.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Beneficiarios::Table)
                    .if_not_exists()
                    .col(uuid(Beneficiarios::Id).primary_key())
                    .col(string_len(Beneficiarios::NomeCompleto, 255).not_null())
                    .col(string_len(Beneficiarios::Cpf, 11).not_null())
                    .col(date(Beneficiarios::DataNascimento).not_null())
                    .col(string(Beneficiarios::Status).not_null().default("ATIVO"))
                    .col(uuid(Beneficiarios::PlanoId).not_null())
                    .col(timestamp_with_time_zone(Beneficiarios::CreatedAt).not_null())
                    .col(timestamp_with_time_zone(Beneficiarios::UpdatedAt).not_null())
                    .col(
                        ColumnDef::new(Beneficiarios::DeletedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_beneficiarios_plano")
                            .from(Beneficiarios::Table, Beneficiarios::PlanoId)
                            .to(Planos::Table, Planos::Id)
                            .on_delete(ForeignKeyAction::Restrict)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Beneficiarios::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Beneficiarios {
    Table,
    Id,
    NomeCompleto,
    Cpf,
    DataNascimento,
    Status,
    PlanoId,
    CreatedAt,
    UpdatedAt,
    DeletedAt,
}

#[derive(DeriveIden)]
enum Planos { Table, Id }
