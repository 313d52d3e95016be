//! SeaORM entities for health plans (`planos`) and their beneficiaries
//! (`beneficiarios`), plus connection helpers and the field-level rules
//! shared by the service layer.

pub mod db;
pub mod constraints;
pub mod plano;
pub mod beneficiario;
