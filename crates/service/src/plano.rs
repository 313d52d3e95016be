//! Plan lifecycle: validated create, partial update, soft or hard delete
//! guarded by active beneficiaries.

use std::sync::Arc;

use tracing::{info, instrument, warn};
use uuid::Uuid;

use models::plano;

use crate::domain::{DeleteMode, PlanoInput};
use crate::errors::{Conflict, ServiceError};
use crate::repository::{DeleteOutcome, NewPlano, PlanoChanges, PlanoRepository};
use crate::validation::Violations;

pub const ENTITY: &str = "Plano";
const INVALID_PAYLOAD: &str = "Payload inválido";

const UNIQUE_FIELDS: &[(&str, Conflict)] = &[
    ("nome", Conflict::PlanoNome),
    ("codigoRegistroAns", Conflict::PlanoCodigoRegistroAns),
];

pub struct PlanoService<R: PlanoRepository + ?Sized> {
    repo: Arc<R>,
}

impl<R: PlanoRepository + ?Sized> PlanoService<R> {
    pub fn new(repo: Arc<R>) -> Self { Self { repo } }

    /// Create a plan from trimmed `nome` and `codigoRegistroAns`.
    #[instrument(skip(self, input))]
    pub async fn create(&self, input: PlanoInput) -> Result<plano::Model, ServiceError> {
        let mut v = Violations::new();
        let nome = v.required_text("nome", input.nome.as_deref());
        let codigo = v.required_text("codigoRegistroAns", input.codigo_registro_ans.as_deref());
        let (Some(nome), Some(codigo_registro_ans)) = (nome, codigo) else {
            return Err(v.into_error(INVALID_PAYLOAD));
        };

        let created = self
            .repo
            .create(NewPlano { nome, codigo_registro_ans })
            .await
            .map_err(|e| ServiceError::from_repo(e, UNIQUE_FIELDS))?;
        info!(plano_id = %created.id, nome = %created.nome, "plano_created");
        Ok(created)
    }

    pub async fn get_by_id(&self, id: Uuid) -> Result<plano::Model, ServiceError> {
        self.repo
            .find_active_by_id(id)
            .await
            .map_err(|e| ServiceError::from_repo(e, UNIQUE_FIELDS))?
            .ok_or_else(|| ServiceError::not_found(ENTITY))
    }

    pub async fn list(&self) -> Result<Vec<plano::Model>, ServiceError> {
        self.repo.list_active().await.map_err(|e| ServiceError::from_repo(e, UNIQUE_FIELDS))
    }

    /// Apply the provided fields only. An empty payload returns the plan as is.
    #[instrument(skip(self, input), fields(plano_id = %id))]
    pub async fn update(&self, id: Uuid, input: PlanoInput) -> Result<plano::Model, ServiceError> {
        let existing = self.get_by_id(id).await?;

        let mut v = Violations::new();
        let changes = PlanoChanges {
            nome: v.optional_text("nome", input.nome.as_deref()),
            codigo_registro_ans: v.optional_text("codigoRegistroAns", input.codigo_registro_ans.as_deref()),
        };
        v.finish(INVALID_PAYLOAD)?;
        if changes.is_empty() {
            return Ok(existing);
        }

        let updated = self
            .repo
            .update(id, changes)
            .await
            .map_err(|e| ServiceError::from_repo(e, UNIQUE_FIELDS))?
            .ok_or_else(|| ServiceError::not_found(ENTITY))?;
        info!("plano_updated");
        Ok(updated)
    }

    /// Refused while any active beneficiary references the plan, in both modes.
    #[instrument(skip(self), fields(plano_id = %id))]
    pub async fn delete(&self, id: Uuid, mode: DeleteMode) -> Result<(), ServiceError> {
        let outcome = self
            .repo
            .delete_guarded(id, mode)
            .await
            .map_err(|e| ServiceError::from_repo(e, UNIQUE_FIELDS))?;
        match outcome {
            DeleteOutcome::Deleted => {
                info!(?mode, "plano_deleted");
                Ok(())
            }
            DeleteOutcome::NotFound => Err(ServiceError::not_found(ENTITY)),
            DeleteOutcome::Blocked { active } => {
                warn!(active, "plano_delete_blocked");
                Err(ServiceError::Conflict(Conflict::PlanoComBeneficiarios))
            }
        }
    }
}
