//! Unique constraint names created by the migrations, keyed to the wire
//! name of the field they protect.

pub const UNIQUE_CONSTRAINTS: &[(&str, &str)] = &[
    ("uq_planos_nome", "nome"),
    ("uq_planos_codigo_registro_ans", "codigoRegistroAns"),
    ("uq_beneficiarios_cpf", "cpf"),
];

/// Field protected by the named constraint, as reported by the driver.
pub fn unique_field(constraint: &str) -> Option<&'static str> {
    UNIQUE_CONSTRAINTS
        .iter()
        .find(|(name, _)| *name == constraint)
        .map(|(_, field)| *field)
}
