use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

// Unique index names are matched by `models::constraints`; keep them in sync.
#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_index(
                Index::create()
                    .name("uq_planos_nome")
                    .table(Planos::Table)
                    .col(Planos::Nome)
                    .unique()
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("uq_planos_codigo_registro_ans")
                    .table(Planos::Table)
                    .col(Planos::CodigoRegistroAns)
                    .unique()
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("uq_beneficiarios_cpf")
                    .table(Beneficiarios::Table)
                    .col(Beneficiarios::Cpf)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Beneficiarios: FK lookups and list filters
        manager
            .create_index(
                Index::create()
                    .name("idx_beneficiarios_plano")
                    .table(Beneficiarios::Table)
                    .col(Beneficiarios::PlanoId)
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("idx_beneficiarios_status")
                    .table(Beneficiarios::Table)
                    .col(Beneficiarios::Status)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_beneficiarios_status").table(Beneficiarios::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_beneficiarios_plano").table(Beneficiarios::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("uq_beneficiarios_cpf").table(Beneficiarios::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("uq_planos_codigo_registro_ans").table(Planos::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("uq_planos_nome").table(Planos::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Planos { Table, Nome, CodigoRegistroAns }

#[derive(DeriveIden)]
enum Beneficiarios { Table, Cpf, PlanoId, Status }
