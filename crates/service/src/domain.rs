//! Payloads accepted by the lifecycle managers, in wire shape. Every field is
//! optional here; presence rules are enforced by validation so that all
//! violations can be reported together.

use serde::Deserialize;
use uuid::Uuid;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanoInput {
    pub nome: Option<String>,
    pub codigo_registro_ans: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BeneficiarioInput {
    pub nome_completo: Option<String>,
    pub cpf: Option<String>,
    pub data_nascimento: Option<String>,
    pub status: Option<String>,
    pub plano_id: Option<String>,
}

/// Query string of the beneficiary listing (`?status=&plano_id=&page=&limit=`).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BeneficiarioListQuery {
    pub status: Option<String>,
    pub plano_id: Option<String>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DeleteMode {
    /// Mark `deleted_at`; the row keeps its unique values.
    #[default]
    Soft,
    Hard,
}

impl DeleteMode {
    /// Only the literal `true` asks for a hard delete.
    pub fn from_hard_flag(hard: Option<&str>) -> Self {
        match hard {
            Some("true") => DeleteMode::Hard,
            _ => DeleteMode::Soft,
        }
    }
}

/// Path ids that are not UUIDs cannot name a record.
pub fn parse_id(raw: &str) -> Option<Uuid> {
    Uuid::parse_str(raw).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hard_flag_must_be_literal_true() {
        assert_eq!(DeleteMode::from_hard_flag(Some("true")), DeleteMode::Hard);
        assert_eq!(DeleteMode::from_hard_flag(Some("1")), DeleteMode::Soft);
        assert_eq!(DeleteMode::from_hard_flag(None), DeleteMode::Soft);
    }

    #[test]
    fn inputs_use_camel_case() {
        let input: BeneficiarioInput = serde_json::from_str(
            r#"{"nomeCompleto":"Maria","cpf":"22233344456","dataNascimento":"1990-03-15","planoId":"x"}"#,
        )
        .unwrap();
        assert_eq!(input.nome_completo.as_deref(), Some("Maria"));
        assert!(input.status.is_none());
        let plano: PlanoInput = serde_json::from_str(r#"{"codigoRegistroAns":"ANS-1"}"#).unwrap();
        assert!(plano.nome.is_none());
    }

    #[test]
    fn parse_id_rejects_non_uuid() {
        assert!(parse_id("42").is_none());
        assert!(parse_id(&Uuid::new_v4().to_string()).is_some());
    }
}
