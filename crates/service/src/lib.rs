//! Service layer for health plans and beneficiaries.
//! - Lifecycle managers hold the validation, conflict and soft-delete rules.
//! - Storage sits behind the gateway traits in [`repository`].
//! - Errors carry the HTTP status they should surface as.

pub mod errors;
pub mod pagination;
pub mod validation;
pub mod domain;
pub mod repository;
pub mod plano;
pub mod beneficiario;
#[cfg(test)]
pub mod test_support;

pub use beneficiario::BeneficiarioService;
pub use plano::PlanoService;
