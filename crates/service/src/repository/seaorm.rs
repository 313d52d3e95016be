use async_trait::async_trait;
use chrono::Utc;
use sea_orm::entity::prelude::DateTimeWithTimeZone;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Set, TransactionTrait,
};
use tracing::debug;
use uuid::Uuid;

use models::{beneficiario, plano};

use super::{
    BeneficiarioChanges, BeneficiarioFilter, BeneficiarioRepository, DeleteOutcome, NewBeneficiario, NewPlano,
    PlanoChanges, PlanoRepository, RepoError,
};
use crate::domain::DeleteMode;
use crate::pagination::Pagination;

fn now() -> DateTimeWithTimeZone { Utc::now().into() }

/// PostgreSQL-backed plan repository.
pub struct SeaOrmPlanoRepository {
    pub db: DatabaseConnection,
}

#[async_trait]
impl PlanoRepository for SeaOrmPlanoRepository {
    async fn create(&self, new: NewPlano) -> Result<plano::Model, RepoError> {
        let ts = now();
        let am = plano::ActiveModel {
            id: Set(Uuid::new_v4()),
            nome: Set(new.nome),
            codigo_registro_ans: Set(new.codigo_registro_ans),
            created_at: Set(ts),
            updated_at: Set(ts),
            deleted_at: Set(None),
        };
        Ok(am.insert(&self.db).await?)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<plano::Model>, RepoError> {
        Ok(plano::Entity::find_by_id(id).one(&self.db).await?)
    }

    async fn find_active_by_id(&self, id: Uuid) -> Result<Option<plano::Model>, RepoError> {
        Ok(plano::Entity::find_by_id(id)
            .filter(plano::Column::DeletedAt.is_null())
            .one(&self.db)
            .await?)
    }

    async fn list_active(&self) -> Result<Vec<plano::Model>, RepoError> {
        Ok(plano::Entity::find()
            .filter(plano::Column::DeletedAt.is_null())
            .order_by_asc(plano::Column::Nome)
            .all(&self.db)
            .await?)
    }

    async fn update(&self, id: Uuid, changes: PlanoChanges) -> Result<Option<plano::Model>, RepoError> {
        let Some(existing) = self.find_active_by_id(id).await? else { return Ok(None) };
        let mut am: plano::ActiveModel = existing.into();
        if let Some(nome) = changes.nome { am.nome = Set(nome); }
        if let Some(codigo) = changes.codigo_registro_ans { am.codigo_registro_ans = Set(codigo); }
        am.updated_at = Set(now());
        Ok(Some(am.update(&self.db).await?))
    }

    async fn delete_guarded(&self, id: Uuid, mode: DeleteMode) -> Result<DeleteOutcome, RepoError> {
        let txn = self.db.begin().await?;
        // FOR UPDATE serialises against beneficiary writes holding FOR SHARE on the same plan
        let Some(row) = plano::Entity::find_by_id(id)
            .filter(plano::Column::DeletedAt.is_null())
            .lock_exclusive()
            .one(&txn)
            .await?
        else {
            return Ok(DeleteOutcome::NotFound);
        };

        let active = beneficiario::Entity::find()
            .filter(beneficiario::Column::PlanoId.eq(id))
            .filter(beneficiario::Column::DeletedAt.is_null())
            .count(&txn)
            .await?;
        if active > 0 {
            debug!(plano_id = %id, active, "plano delete blocked");
            return Ok(DeleteOutcome::Blocked { active });
        }

        match mode {
            DeleteMode::Soft => {
                let ts = now();
                let mut am: plano::ActiveModel = row.into();
                am.deleted_at = Set(Some(ts));
                am.updated_at = Set(ts);
                am.update(&txn).await?;
            }
            DeleteMode::Hard => {
                plano::Entity::delete_by_id(id).exec(&txn).await?;
            }
        }
        txn.commit().await?;
        Ok(DeleteOutcome::Deleted)
    }
}

/// PostgreSQL-backed beneficiary repository.
pub struct SeaOrmBeneficiarioRepository {
    pub db: DatabaseConnection,
}

/// Holds FOR SHARE on the plan row until the surrounding transaction ends.
async fn lock_plano<C: sea_orm::ConnectionTrait>(conn: &C, plano_id: Uuid) -> Result<(), RepoError> {
    plano::Entity::find_by_id(plano_id)
        .lock_shared()
        .one(conn)
        .await?
        .map(|_| ())
        .ok_or(RepoError::MissingReference { field: "planoId" })
}

#[async_trait]
impl BeneficiarioRepository for SeaOrmBeneficiarioRepository {
    async fn create(&self, new: NewBeneficiario) -> Result<beneficiario::Model, RepoError> {
        let txn = self.db.begin().await?;
        lock_plano(&txn, new.plano_id).await?;
        let ts = now();
        let am = beneficiario::ActiveModel {
            id: Set(Uuid::new_v4()),
            nome_completo: Set(new.nome_completo),
            cpf: Set(new.cpf),
            data_nascimento: Set(new.data_nascimento),
            status: Set(new.status),
            plano_id: Set(new.plano_id),
            created_at: Set(ts),
            updated_at: Set(ts),
            deleted_at: Set(None),
        };
        let model = am.insert(&txn).await?;
        txn.commit().await?;
        Ok(model)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<beneficiario::Model>, RepoError> {
        Ok(beneficiario::Entity::find_by_id(id).one(&self.db).await?)
    }

    async fn find_active_by_id(&self, id: Uuid) -> Result<Option<beneficiario::Model>, RepoError> {
        Ok(beneficiario::Entity::find_by_id(id)
            .filter(beneficiario::Column::DeletedAt.is_null())
            .one(&self.db)
            .await?)
    }

    async fn list(&self, filter: BeneficiarioFilter, page: Pagination) -> Result<Vec<beneficiario::Model>, RepoError> {
        let (page_idx, per_page) = page.normalize();
        let mut query = beneficiario::Entity::find().filter(beneficiario::Column::DeletedAt.is_null());
        if let Some(status) = filter.status {
            query = query.filter(beneficiario::Column::Status.eq(status));
        }
        if let Some(plano_id) = filter.plano_id {
            query = query.filter(beneficiario::Column::PlanoId.eq(plano_id));
        }
        let rows = query
            .order_by_asc(beneficiario::Column::NomeCompleto)
            .order_by_asc(beneficiario::Column::Id)
            .paginate(&self.db, per_page)
            .fetch_page(page_idx)
            .await?;
        Ok(rows)
    }

    async fn update(&self, id: Uuid, changes: BeneficiarioChanges) -> Result<Option<beneficiario::Model>, RepoError> {
        let txn = self.db.begin().await?;
        let Some(existing) = beneficiario::Entity::find_by_id(id)
            .filter(beneficiario::Column::DeletedAt.is_null())
            .one(&txn)
            .await?
        else {
            return Ok(None);
        };
        if let Some(plano_id) = changes.plano_id {
            lock_plano(&txn, plano_id).await?;
        }
        let mut am: beneficiario::ActiveModel = existing.into();
        if let Some(v) = changes.nome_completo { am.nome_completo = Set(v); }
        if let Some(v) = changes.cpf { am.cpf = Set(v); }
        if let Some(v) = changes.data_nascimento { am.data_nascimento = Set(v); }
        if let Some(v) = changes.status { am.status = Set(v); }
        if let Some(v) = changes.plano_id { am.plano_id = Set(v); }
        am.updated_at = Set(now());
        let model = am.update(&txn).await?;
        txn.commit().await?;
        Ok(Some(model))
    }

    async fn soft_delete(&self, id: Uuid) -> Result<bool, RepoError> {
        let Some(existing) = self.find_active_by_id(id).await? else { return Ok(false) };
        let ts = now();
        let mut am: beneficiario::ActiveModel = existing.into();
        am.deleted_at = Set(Some(ts));
        am.updated_at = Set(ts);
        am.update(&self.db).await?;
        Ok(true)
    }

    async fn hard_delete(&self, id: Uuid) -> Result<bool, RepoError> {
        let res = beneficiario::Entity::delete_by_id(id).exec(&self.db).await?;
        Ok(res.rows_affected > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use crate::test_support::get_db;

    fn unique(prefix: &str) -> String { format!("{prefix}-{}", Uuid::new_v4().simple()) }

    // 11 digits derived from a fresh uuid, unique enough across test runs
    fn cpf() -> String {
        let n = Uuid::new_v4().as_u128() % 100_000_000_000;
        format!("{n:011}")
    }

    #[tokio::test]
    async fn plano_unique_violations_are_typed() -> Result<(), anyhow::Error> {
        let Some(db) = get_db().await? else { return Ok(()) };
        let repo = SeaOrmPlanoRepository { db };
        let nome = unique("Plano");
        let codigo = unique("ANS");
        let p = repo.create(NewPlano { nome: nome.clone(), codigo_registro_ans: codigo.clone() }).await?;

        let err = repo.create(NewPlano { nome: unique("Plano"), codigo_registro_ans: codigo }).await.unwrap_err();
        assert!(matches!(err, RepoError::UniqueViolation { ref field } if field == "codigoRegistroAns"), "{err:?}");
        let err = repo.create(NewPlano { nome, codigo_registro_ans: unique("ANS") }).await.unwrap_err();
        assert!(matches!(err, RepoError::UniqueViolation { ref field } if field == "nome"), "{err:?}");

        assert_eq!(repo.delete_guarded(p.id, DeleteMode::Hard).await?, DeleteOutcome::Deleted);
        assert!(repo.find_by_id(p.id).await?.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn plano_delete_guard_and_beneficiary_lifecycle() -> Result<(), anyhow::Error> {
        let Some(db) = get_db().await? else { return Ok(()) };
        let planos = SeaOrmPlanoRepository { db: db.clone() };
        let beneficiarios = SeaOrmBeneficiarioRepository { db };

        let p = planos.create(NewPlano { nome: unique("Plano"), codigo_registro_ans: unique("ANS") }).await?;
        let b = beneficiarios
            .create(NewBeneficiario {
                nome_completo: unique("Maria"),
                cpf: cpf(),
                data_nascimento: NaiveDate::from_ymd_opt(1990, 3, 15).unwrap(),
                status: "ATIVO".into(),
                plano_id: p.id,
            })
            .await?;

        let listed = beneficiarios
            .list(BeneficiarioFilter { plano_id: Some(p.id), ..Default::default() }, Pagination::default())
            .await?;
        assert_eq!(listed.len(), 1);

        assert_eq!(planos.delete_guarded(p.id, DeleteMode::Soft).await?, DeleteOutcome::Blocked { active: 1 });

        assert!(beneficiarios.soft_delete(b.id).await?);
        assert!(beneficiarios.find_active_by_id(b.id).await?.is_none());
        assert!(beneficiarios.find_by_id(b.id).await?.is_some());

        let err = planos.delete_guarded(p.id, DeleteMode::Hard).await.unwrap_err();
        assert!(matches!(err, RepoError::ForeignKeyViolation), "{err:?}");

        assert!(beneficiarios.hard_delete(b.id).await?);
        assert_eq!(planos.delete_guarded(p.id, DeleteMode::Soft).await?, DeleteOutcome::Deleted);
        assert!(planos.find_active_by_id(p.id).await?.is_none());
        assert_eq!(planos.delete_guarded(p.id, DeleteMode::Soft).await?, DeleteOutcome::NotFound);
        plano::Entity::delete_by_id(p.id).exec(&planos.db).await?;
        Ok(())
    }

    #[tokio::test]
    async fn beneficiary_create_requires_plan_row() -> Result<(), anyhow::Error> {
        let Some(db) = get_db().await? else { return Ok(()) };
        let repo = SeaOrmBeneficiarioRepository { db };
        let err = repo
            .create(NewBeneficiario {
                nome_completo: "Sem Plano".into(),
                cpf: cpf(),
                data_nascimento: NaiveDate::from_ymd_opt(1988, 1, 10).unwrap(),
                status: "ATIVO".into(),
                plano_id: Uuid::new_v4(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, RepoError::MissingReference { field: "planoId" }));
        Ok(())
    }
}
