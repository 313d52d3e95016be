use chrono::{DateTime, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::plano;

/// Status assigned when a payload leaves it out.
pub const DEFAULT_STATUS: &str = "ATIVO";

static CPF_FORMAT: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[0-9]{11}$").expect("valid cpf regex"));

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "beneficiarios")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub nome_completo: String,
    pub cpf: String,
    pub data_nascimento: Date,
    pub status: String,
    pub plano_id: Uuid,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
    pub deleted_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation { Plano }

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self { Relation::Plano => Entity::belongs_to(plano::Entity).from(Column::PlanoId).to(plano::Column::Id).into() }
    }
}

impl Related<plano::Entity> for Entity {
    fn to() -> RelationDef { Relation::Plano.def() }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn is_active(&self) -> bool { self.deleted_at.is_none() }
}

/// CPF format check only (11 ASCII digits); check digits are not verified.
pub fn is_valid_cpf(cpf: &str) -> bool {
    CPF_FORMAT.is_match(cpf)
}

/// Accepts a plain `YYYY-MM-DD` date or an RFC 3339 timestamp.
pub fn parse_data_nascimento(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(raw).ok().map(|dt| dt.date_naive()))
}
