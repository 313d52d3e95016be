//! Beneficiary lifecycle: every field is checked in one pass, then the
//! owning plan is confirmed at write time.

use std::sync::Arc;

use tracing::{info, instrument};
use uuid::Uuid;

use models::beneficiario::{self, DEFAULT_STATUS};

use crate::domain::{BeneficiarioInput, BeneficiarioListQuery, DeleteMode};
use crate::errors::{Conflict, FieldViolation, ServiceError};
use crate::pagination::Pagination;
use crate::repository::{BeneficiarioChanges, BeneficiarioFilter, BeneficiarioRepository, NewBeneficiario, RepoError};
use crate::validation::{Violations, EXISTS};

pub const ENTITY: &str = "Beneficiário";
const INVALID_PAYLOAD: &str = "Payload inválido";
const PLANO_INEXISTENTE: &str = "Plano inexistente";

const UNIQUE_FIELDS: &[(&str, Conflict)] = &[("cpf", Conflict::BeneficiarioCpf)];

fn map_repo(err: RepoError) -> ServiceError {
    match err {
        RepoError::MissingReference { field } => {
            ServiceError::validation(PLANO_INEXISTENTE, vec![FieldViolation::new(field, EXISTS)])
        }
        other => ServiceError::from_repo(other, UNIQUE_FIELDS),
    }
}

pub struct BeneficiarioService<R: BeneficiarioRepository + ?Sized> {
    repo: Arc<R>,
}

impl<R: BeneficiarioRepository + ?Sized> BeneficiarioService<R> {
    pub fn new(repo: Arc<R>) -> Self { Self { repo } }

    #[instrument(skip(self, input))]
    pub async fn create(&self, input: BeneficiarioInput) -> Result<beneficiario::Model, ServiceError> {
        let mut v = Violations::new();
        let nome_completo = v.required_text("nomeCompleto", input.nome_completo.as_deref());
        let cpf = v.required_cpf("cpf", input.cpf.as_deref());
        let data_nascimento = v.required_date("dataNascimento", input.data_nascimento.as_deref());
        let status = v.optional_text("status", input.status.as_deref());
        let plano_id = v.required_uuid("planoId", input.plano_id.as_deref());

        let clean = v.is_empty();
        let (true, Some(nome_completo), Some(cpf), Some(data_nascimento), Some(plano_id)) =
            (clean, nome_completo, cpf, data_nascimento, plano_id)
        else {
            return Err(v.into_error(INVALID_PAYLOAD));
        };

        let created = self
            .repo
            .create(NewBeneficiario {
                nome_completo,
                cpf,
                data_nascimento,
                status: status.unwrap_or_else(|| DEFAULT_STATUS.to_string()),
                plano_id,
            })
            .await
            .map_err(map_repo)?;
        info!(beneficiario_id = %created.id, plano_id = %created.plano_id, "beneficiario_created");
        Ok(created)
    }

    pub async fn get_by_id(&self, id: Uuid) -> Result<beneficiario::Model, ServiceError> {
        self.repo
            .find_active_by_id(id)
            .await
            .map_err(map_repo)?
            .ok_or_else(|| ServiceError::not_found(ENTITY))
    }

    /// Empty `status`/`plano_id` values are treated as absent.
    pub async fn list(&self, query: BeneficiarioListQuery) -> Result<Vec<beneficiario::Model>, ServiceError> {
        let mut v = Violations::new();
        let status = query.status.map(|s| s.trim().to_string()).filter(|s| !s.is_empty());
        let plano_id = match query.plano_id.as_deref().map(str::trim) {
            Some(raw) if !raw.is_empty() => v.uuid("planoId", raw),
            _ => None,
        };
        v.finish(INVALID_PAYLOAD)?;

        let page = Pagination::from_query(query.page, query.limit);
        if page.per_page == 0 {
            return Ok(Vec::new());
        }
        self.repo.list(BeneficiarioFilter { status, plano_id }, page).await.map_err(map_repo)
    }

    /// Same rules as create, applied to provided fields only.
    #[instrument(skip(self, input), fields(beneficiario_id = %id))]
    pub async fn update(&self, id: Uuid, input: BeneficiarioInput) -> Result<beneficiario::Model, ServiceError> {
        let existing = self.get_by_id(id).await?;

        let mut v = Violations::new();
        let changes = BeneficiarioChanges {
            nome_completo: v.optional_text("nomeCompleto", input.nome_completo.as_deref()),
            cpf: input.cpf.as_deref().and_then(|cpf| v.cpf("cpf", cpf)),
            data_nascimento: input.data_nascimento.as_deref().and_then(|d| v.date("dataNascimento", d)),
            status: v.optional_text("status", input.status.as_deref()),
            plano_id: input.plano_id.as_deref().and_then(|p| v.uuid("planoId", p)),
        };
        v.finish(INVALID_PAYLOAD)?;
        if changes.is_empty() {
            return Ok(existing);
        }

        let updated = self
            .repo
            .update(id, changes)
            .await
            .map_err(map_repo)?
            .ok_or_else(|| ServiceError::not_found(ENTITY))?;
        info!("beneficiario_updated");
        Ok(updated)
    }

    /// Soft delete needs an active row; hard delete accepts soft-deleted rows.
    #[instrument(skip(self), fields(beneficiario_id = %id))]
    pub async fn delete(&self, id: Uuid, mode: DeleteMode) -> Result<(), ServiceError> {
        let removed = match mode {
            DeleteMode::Soft => self.repo.soft_delete(id).await,
            DeleteMode::Hard => self.repo.hard_delete(id).await,
        }
        .map_err(map_repo)?;
        if !removed {
            return Err(ServiceError::not_found(ENTITY));
        }
        info!(?mode, "beneficiario_deleted");
        Ok(())
    }
}
