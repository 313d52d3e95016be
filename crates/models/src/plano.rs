use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::beneficiario;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "planos")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub nome: String,
    pub codigo_registro_ans: String,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
    pub deleted_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation { Beneficiarios }

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self { Relation::Beneficiarios => Entity::has_many(beneficiario::Entity).into() }
    }
}

impl Related<beneficiario::Entity> for Entity {
    fn to() -> RelationDef { Relation::Beneficiarios.def() }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Not soft-deleted.
    pub fn is_active(&self) -> bool { self.deleted_at.is_none() }
}
