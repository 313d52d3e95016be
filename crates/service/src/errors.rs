use axum::http::StatusCode;
use serde::Serialize;
use thiserror::Error;

use crate::repository::RepoError;

/// One violated rule on one payload field, reported by wire name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldViolation {
    pub field: &'static str,
    pub rule: &'static str,
}

impl FieldViolation {
    pub fn new(field: &'static str, rule: &'static str) -> Self { Self { field, rule } }
}

/// Why a write was refused with 409.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Conflict {
    #[error("Nome do plano já existe")]
    PlanoNome,
    #[error("Código de registro ANS já cadastrado")]
    PlanoCodigoRegistroAns,
    #[error("CPF já cadastrado")]
    BeneficiarioCpf,
    #[error("Violação de unicidade")]
    Unique,
    #[error("Não é possível remover plano com beneficiários vinculados")]
    PlanoComBeneficiarios,
    #[error("Registro ainda referenciado por outros registros")]
    PlanoReferenciado,
}

impl Conflict {
    /// Wire name of the duplicated field, for uniqueness conflicts.
    pub fn field(&self) -> Option<&'static str> {
        match self {
            Conflict::PlanoNome => Some("nome"),
            Conflict::PlanoCodigoRegistroAns => Some("codigoRegistroAns"),
            Conflict::BeneficiarioCpf => Some("cpf"),
            _ => None,
        }
    }
}

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{message}")]
    Validation { message: String, details: Vec<FieldViolation> },
    #[error(transparent)]
    Conflict(Conflict),
    #[error("{0}")]
    NotFound(String),
    #[error("database error: {0}")]
    Db(String),
}

impl ServiceError {
    pub fn not_found(entity: &str) -> Self { Self::NotFound(format!("{} não encontrado", entity)) }

    pub fn validation(message: impl Into<String>, details: Vec<FieldViolation>) -> Self {
        Self::Validation { message: message.into(), details }
    }

    /// HTTP status the boundary layer should answer with.
    pub fn status(&self) -> StatusCode {
        match self {
            ServiceError::Validation { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            ServiceError::Conflict(_) => StatusCode::CONFLICT,
            ServiceError::NotFound(_) => StatusCode::NOT_FOUND,
            ServiceError::Db(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ServiceError::Validation { .. } => "ValidationError",
            ServiceError::Conflict(_) => "ConflictError",
            ServiceError::NotFound(_) => "NotFoundError",
            ServiceError::Db(_) => "InternalServerError",
        }
    }

    pub fn details(&self) -> Option<&[FieldViolation]> {
        match self {
            ServiceError::Validation { details, .. } => Some(details),
            _ => None,
        }
    }

    /// Classify a gateway failure. `unique` maps the violated field to the
    /// caller's specific conflict; unlisted fields become `Conflict::Unique`.
    pub fn from_repo(err: RepoError, unique: &[(&str, Conflict)]) -> Self {
        match err {
            RepoError::UniqueViolation { field } => {
                let conflict = unique
                    .iter()
                    .find(|(f, _)| *f == field)
                    .map(|(_, c)| *c)
                    .unwrap_or(Conflict::Unique);
                ServiceError::Conflict(conflict)
            }
            RepoError::MissingReference { field } => {
                ServiceError::validation("Referência inexistente", vec![FieldViolation::new(field, "exists")])
            }
            RepoError::ForeignKeyViolation => ServiceError::Conflict(Conflict::PlanoReferenciado),
            RepoError::Db(msg) => ServiceError::Db(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TABLE: &[(&str, Conflict)] = &[("nome", Conflict::PlanoNome)];

    #[test]
    fn unique_violation_uses_table_then_falls_back() {
        let e = ServiceError::from_repo(RepoError::UniqueViolation { field: "nome".into() }, TABLE);
        assert!(matches!(e, ServiceError::Conflict(Conflict::PlanoNome)));
        let e = ServiceError::from_repo(RepoError::UniqueViolation { field: "unknown".into() }, TABLE);
        assert!(matches!(e, ServiceError::Conflict(Conflict::Unique)));
    }

    #[test]
    fn statuses_follow_taxonomy() {
        assert_eq!(ServiceError::validation("x", vec![]).status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(ServiceError::Conflict(Conflict::Unique).status(), StatusCode::CONFLICT);
        assert_eq!(ServiceError::not_found("Plano").status(), StatusCode::NOT_FOUND);
        assert_eq!(ServiceError::Db("boom".into()).status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn missing_reference_is_a_validation_error_on_that_field() {
        let e = ServiceError::from_repo(RepoError::MissingReference { field: "planoId" }, TABLE);
        assert_eq!(e.details(), Some(&[FieldViolation::new("planoId", "exists")][..]));
    }
}
