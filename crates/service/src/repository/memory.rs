//! In-memory gateway with the same unique and foreign-key rules as the
//! PostgreSQL schema. Used by unit tests and the HTTP integration tests.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::entity::prelude::DateTimeWithTimeZone;
use uuid::Uuid;

use models::{beneficiario, plano};

use super::{
    BeneficiarioChanges, BeneficiarioFilter, BeneficiarioRepository, DeleteOutcome, NewBeneficiario, NewPlano,
    PlanoChanges, PlanoRepository, RepoError,
};
use crate::domain::DeleteMode;
use crate::pagination::Pagination;

#[derive(Default)]
struct Tables {
    planos: HashMap<Uuid, plano::Model>,
    beneficiarios: HashMap<Uuid, beneficiario::Model>,
}

impl Tables {
    // Unique values stay taken by soft-deleted rows, as in the database.
    fn check_plano_unique(&self, id: Uuid, nome: &str, codigo: &str) -> Result<(), RepoError> {
        for p in self.planos.values().filter(|p| p.id != id) {
            if p.nome == nome {
                return Err(RepoError::UniqueViolation { field: "nome".into() });
            }
            if p.codigo_registro_ans == codigo {
                return Err(RepoError::UniqueViolation { field: "codigoRegistroAns".into() });
            }
        }
        Ok(())
    }

    fn check_cpf_unique(&self, id: Uuid, cpf: &str) -> Result<(), RepoError> {
        if self.beneficiarios.values().any(|b| b.id != id && b.cpf == cpf) {
            return Err(RepoError::UniqueViolation { field: "cpf".into() });
        }
        Ok(())
    }

    fn check_plano_exists(&self, plano_id: Uuid) -> Result<(), RepoError> {
        if self.planos.contains_key(&plano_id) {
            Ok(())
        } else {
            Err(RepoError::MissingReference { field: "planoId" })
        }
    }
}

#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self { Self::default() }

    fn tables(&self) -> Result<MutexGuard<'_, Tables>, RepoError> {
        self.tables.lock().map_err(|_| RepoError::Db("memory store lock poisoned".into()))
    }
}

fn now() -> DateTimeWithTimeZone { Utc::now().into() }

#[async_trait]
impl PlanoRepository for MemoryStore {
    async fn create(&self, new: NewPlano) -> Result<plano::Model, RepoError> {
        let mut t = self.tables()?;
        let id = Uuid::new_v4();
        t.check_plano_unique(id, &new.nome, &new.codigo_registro_ans)?;
        let ts = now();
        let model = plano::Model {
            id,
            nome: new.nome,
            codigo_registro_ans: new.codigo_registro_ans,
            created_at: ts,
            updated_at: ts,
            deleted_at: None,
        };
        t.planos.insert(id, model.clone());
        Ok(model)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<plano::Model>, RepoError> {
        Ok(self.tables()?.planos.get(&id).cloned())
    }

    async fn find_active_by_id(&self, id: Uuid) -> Result<Option<plano::Model>, RepoError> {
        Ok(self.tables()?.planos.get(&id).filter(|p| p.is_active()).cloned())
    }

    async fn list_active(&self) -> Result<Vec<plano::Model>, RepoError> {
        let t = self.tables()?;
        let mut rows: Vec<_> = t.planos.values().filter(|p| p.is_active()).cloned().collect();
        rows.sort_by(|a, b| a.nome.cmp(&b.nome));
        Ok(rows)
    }

    async fn update(&self, id: Uuid, changes: PlanoChanges) -> Result<Option<plano::Model>, RepoError> {
        let mut t = self.tables()?;
        let Some(mut row) = t.planos.get(&id).filter(|p| p.is_active()).cloned() else { return Ok(None) };
        if let Some(nome) = changes.nome { row.nome = nome; }
        if let Some(codigo) = changes.codigo_registro_ans { row.codigo_registro_ans = codigo; }
        t.check_plano_unique(id, &row.nome, &row.codigo_registro_ans)?;
        row.updated_at = now();
        t.planos.insert(id, row.clone());
        Ok(Some(row))
    }

    async fn delete_guarded(&self, id: Uuid, mode: DeleteMode) -> Result<DeleteOutcome, RepoError> {
        let mut t = self.tables()?;
        if !t.planos.get(&id).is_some_and(|p| p.is_active()) {
            return Ok(DeleteOutcome::NotFound);
        }
        let active = t.beneficiarios.values().filter(|b| b.plano_id == id && b.is_active()).count() as u64;
        if active > 0 {
            return Ok(DeleteOutcome::Blocked { active });
        }
        match mode {
            DeleteMode::Soft => {
                let ts = now();
                if let Some(row) = t.planos.get_mut(&id) {
                    row.deleted_at = Some(ts);
                    row.updated_at = ts;
                }
            }
            DeleteMode::Hard => {
                // ON DELETE RESTRICT also counts soft-deleted beneficiaries
                if t.beneficiarios.values().any(|b| b.plano_id == id) {
                    return Err(RepoError::ForeignKeyViolation);
                }
                t.planos.remove(&id);
            }
        }
        Ok(DeleteOutcome::Deleted)
    }
}

#[async_trait]
impl BeneficiarioRepository for MemoryStore {
    async fn create(&self, new: NewBeneficiario) -> Result<beneficiario::Model, RepoError> {
        let mut t = self.tables()?;
        let id = Uuid::new_v4();
        t.check_plano_exists(new.plano_id)?;
        t.check_cpf_unique(id, &new.cpf)?;
        let ts = now();
        let model = beneficiario::Model {
            id,
            nome_completo: new.nome_completo,
            cpf: new.cpf,
            data_nascimento: new.data_nascimento,
            status: new.status,
            plano_id: new.plano_id,
            created_at: ts,
            updated_at: ts,
            deleted_at: None,
        };
        t.beneficiarios.insert(id, model.clone());
        Ok(model)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<beneficiario::Model>, RepoError> {
        Ok(self.tables()?.beneficiarios.get(&id).cloned())
    }

    async fn find_active_by_id(&self, id: Uuid) -> Result<Option<beneficiario::Model>, RepoError> {
        Ok(self.tables()?.beneficiarios.get(&id).filter(|b| b.is_active()).cloned())
    }

    async fn list(&self, filter: BeneficiarioFilter, page: Pagination) -> Result<Vec<beneficiario::Model>, RepoError> {
        let t = self.tables()?;
        let mut rows: Vec<_> = t
            .beneficiarios
            .values()
            .filter(|b| b.is_active())
            .filter(|b| filter.status.as_ref().map_or(true, |s| &b.status == s))
            .filter(|b| filter.plano_id.map_or(true, |p| b.plano_id == p))
            .cloned()
            .collect();
        rows.sort_by(|a, b| a.nome_completo.cmp(&b.nome_completo).then(a.id.cmp(&b.id)));
        let (_, per_page) = page.normalize();
        Ok(rows.into_iter().skip(page.offset() as usize).take(per_page as usize).collect())
    }

    async fn update(&self, id: Uuid, changes: BeneficiarioChanges) -> Result<Option<beneficiario::Model>, RepoError> {
        let mut t = self.tables()?;
        let Some(mut row) = t.beneficiarios.get(&id).filter(|b| b.is_active()).cloned() else { return Ok(None) };
        if let Some(plano_id) = changes.plano_id {
            t.check_plano_exists(plano_id)?;
            row.plano_id = plano_id;
        }
        if let Some(cpf) = changes.cpf {
            t.check_cpf_unique(id, &cpf)?;
            row.cpf = cpf;
        }
        if let Some(v) = changes.nome_completo { row.nome_completo = v; }
        if let Some(v) = changes.data_nascimento { row.data_nascimento = v; }
        if let Some(v) = changes.status { row.status = v; }
        row.updated_at = now();
        t.beneficiarios.insert(id, row.clone());
        Ok(Some(row))
    }

    async fn soft_delete(&self, id: Uuid) -> Result<bool, RepoError> {
        let mut t = self.tables()?;
        match t.beneficiarios.get_mut(&id).filter(|b| b.is_active()) {
            Some(row) => {
                let ts = now();
                row.deleted_at = Some(ts);
                row.updated_at = ts;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn hard_delete(&self, id: Uuid) -> Result<bool, RepoError> {
        Ok(self.tables()?.beneficiarios.remove(&id).is_some())
    }
}
