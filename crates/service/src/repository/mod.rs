//! Persistence gateway for plans and beneficiaries.
//!
//! The lifecycle managers only talk to these traits. Storage-level rule
//! violations come back as typed [`RepoError`] variants so callers never
//! inspect driver messages.

use async_trait::async_trait;
use chrono::NaiveDate;
use sea_orm::{sqlx, DbErr, RuntimeErr, SqlErr};
use thiserror::Error;
use uuid::Uuid;

use models::{beneficiario, constraints, plano};

use crate::domain::DeleteMode;
use crate::pagination::Pagination;

pub mod memory;
pub mod seaorm;

pub use memory::MemoryStore;
pub use seaorm::{SeaOrmBeneficiarioRepository, SeaOrmPlanoRepository};

#[derive(Debug, Error)]
pub enum RepoError {
    /// A unique constraint rejected the write; `field` is the wire name of
    /// the duplicated field, empty when the constraint is not mapped.
    #[error("unique violation on {field}")]
    UniqueViolation { field: String },
    #[error("referenced record does not exist: {field}")]
    MissingReference { field: &'static str },
    #[error("record is still referenced")]
    ForeignKeyViolation,
    #[error("{0}")]
    Db(String),
}

/// Constraint name reported by PostgreSQL, when the error carries one.
fn violated_constraint(err: &DbErr) -> Option<&str> {
    match err {
        DbErr::Query(RuntimeErr::SqlxError(sqlx::Error::Database(e)))
        | DbErr::Exec(RuntimeErr::SqlxError(sqlx::Error::Database(e))) => e.constraint(),
        _ => None,
    }
}

impl From<DbErr> for RepoError {
    fn from(err: DbErr) -> Self {
        match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(_)) => RepoError::UniqueViolation {
                field: violated_constraint(&err)
                    .and_then(constraints::unique_field)
                    .map(str::to_string)
                    .unwrap_or_default(),
            },
            Some(SqlErr::ForeignKeyConstraintViolation(_)) => RepoError::ForeignKeyViolation,
            _ => RepoError::Db(err.to_string()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewPlano {
    pub nome: String,
    pub codigo_registro_ans: String,
}

#[derive(Debug, Clone, Default)]
pub struct PlanoChanges {
    pub nome: Option<String>,
    pub codigo_registro_ans: Option<String>,
}

impl PlanoChanges {
    pub fn is_empty(&self) -> bool { self.nome.is_none() && self.codigo_registro_ans.is_none() }
}

#[derive(Debug, Clone)]
pub struct NewBeneficiario {
    pub nome_completo: String,
    pub cpf: String,
    pub data_nascimento: NaiveDate,
    pub status: String,
    pub plano_id: Uuid,
}

#[derive(Debug, Clone, Default)]
pub struct BeneficiarioChanges {
    pub nome_completo: Option<String>,
    pub cpf: Option<String>,
    pub data_nascimento: Option<NaiveDate>,
    pub status: Option<String>,
    pub plano_id: Option<Uuid>,
}

impl BeneficiarioChanges {
    pub fn is_empty(&self) -> bool {
        self.nome_completo.is_none()
            && self.cpf.is_none()
            && self.data_nascimento.is_none()
            && self.status.is_none()
            && self.plano_id.is_none()
    }
}

#[derive(Debug, Clone, Default)]
pub struct BeneficiarioFilter {
    pub status: Option<String>,
    pub plano_id: Option<Uuid>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    NotFound,
    /// Active beneficiaries still reference the plan.
    Blocked { active: u64 },
}

#[async_trait]
pub trait PlanoRepository: Send + Sync {
    async fn create(&self, new: NewPlano) -> Result<plano::Model, RepoError>;
    /// Includes soft-deleted rows.
    async fn find_by_id(&self, id: Uuid) -> Result<Option<plano::Model>, RepoError>;
    async fn find_active_by_id(&self, id: Uuid) -> Result<Option<plano::Model>, RepoError>;
    /// Active plans ordered by `nome`.
    async fn list_active(&self) -> Result<Vec<plano::Model>, RepoError>;
    /// `None` when the plan is missing or soft-deleted.
    async fn update(&self, id: Uuid, changes: PlanoChanges) -> Result<Option<plano::Model>, RepoError>;
    /// Count active beneficiaries and delete in one atomic step.
    async fn delete_guarded(&self, id: Uuid, mode: DeleteMode) -> Result<DeleteOutcome, RepoError>;
}

#[async_trait]
pub trait BeneficiarioRepository: Send + Sync {
    /// Fails with `MissingReference { field: "planoId" }` when the plan row does not exist.
    async fn create(&self, new: NewBeneficiario) -> Result<beneficiario::Model, RepoError>;
    /// Includes soft-deleted rows.
    async fn find_by_id(&self, id: Uuid) -> Result<Option<beneficiario::Model>, RepoError>;
    async fn find_active_by_id(&self, id: Uuid) -> Result<Option<beneficiario::Model>, RepoError>;
    /// Active rows ordered by `nome_completo`, then `id`.
    async fn list(&self, filter: BeneficiarioFilter, page: Pagination) -> Result<Vec<beneficiario::Model>, RepoError>;
    async fn update(&self, id: Uuid, changes: BeneficiarioChanges) -> Result<Option<beneficiario::Model>, RepoError>;
    /// `false` when the row is missing or already soft-deleted.
    async fn soft_delete(&self, id: Uuid) -> Result<bool, RepoError>;
    /// `false` only when the row does not exist at all.
    async fn hard_delete(&self, id: Uuid) -> Result<bool, RepoError>;
}
