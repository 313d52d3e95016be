use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    Json,
};

use models::beneficiario;
use service::beneficiario::ENTITY;
use service::domain::{BeneficiarioInput, BeneficiarioListQuery};

use super::{path_id, planos::DeleteQuery, ServerState};
use crate::errors::JsonApiError;

pub async fn create(
    State(state): State<ServerState>,
    payload: Result<Json<BeneficiarioInput>, JsonRejection>,
) -> Result<(StatusCode, Json<beneficiario::Model>), JsonApiError> {
    let Json(input) = payload?;
    let created = state.beneficiarios.create(input).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// `GET /api/beneficiarios?status=&plano_id=&page=&limit=`
pub async fn list(
    State(state): State<ServerState>,
    query: Result<Query<BeneficiarioListQuery>, QueryRejection>,
) -> Result<Json<Vec<beneficiario::Model>>, JsonApiError> {
    let Query(q) = query?;
    Ok(Json(state.beneficiarios.list(q).await?))
}

pub async fn get(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> Result<Json<beneficiario::Model>, JsonApiError> {
    let id = path_id(&id, ENTITY)?;
    Ok(Json(state.beneficiarios.get_by_id(id).await?))
}

pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    payload: Result<Json<BeneficiarioInput>, JsonRejection>,
) -> Result<Json<beneficiario::Model>, JsonApiError> {
    let id = path_id(&id, ENTITY)?;
    let Json(input) = payload?;
    Ok(Json(state.beneficiarios.update(id, input).await?))
}

pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    query: Result<Query<DeleteQuery>, QueryRejection>,
) -> Result<StatusCode, JsonApiError> {
    let id = path_id(&id, ENTITY)?;
    let Query(q) = query?;
    state.beneficiarios.delete(id, q.mode()).await?;
    Ok(StatusCode::NO_CONTENT)
}
