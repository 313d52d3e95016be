use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    Json,
};
use serde::Deserialize;

use models::plano;
use service::domain::{DeleteMode, PlanoInput};
use service::plano::ENTITY;

use super::{path_id, ServerState};
use crate::errors::JsonApiError;

#[derive(Debug, Default, Deserialize)]
pub struct DeleteQuery {
    pub hard: Option<String>,
}

impl DeleteQuery {
    pub fn mode(&self) -> DeleteMode { DeleteMode::from_hard_flag(self.hard.as_deref()) }
}

pub async fn create(
    State(state): State<ServerState>,
    payload: Result<Json<PlanoInput>, JsonRejection>,
) -> Result<(StatusCode, Json<plano::Model>), JsonApiError> {
    let Json(input) = payload?;
    let created = state.planos.create(input).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn list(State(state): State<ServerState>) -> Result<Json<Vec<plano::Model>>, JsonApiError> {
    Ok(Json(state.planos.list().await?))
}

pub async fn get(State(state): State<ServerState>, Path(id): Path<String>) -> Result<Json<plano::Model>, JsonApiError> {
    let id = path_id(&id, ENTITY)?;
    Ok(Json(state.planos.get_by_id(id).await?))
}

pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    payload: Result<Json<PlanoInput>, JsonRejection>,
) -> Result<Json<plano::Model>, JsonApiError> {
    let id = path_id(&id, ENTITY)?;
    let Json(input) = payload?;
    Ok(Json(state.planos.update(id, input).await?))
}

pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    query: Result<Query<DeleteQuery>, QueryRejection>,
) -> Result<StatusCode, JsonApiError> {
    let id = path_id(&id, ENTITY)?;
    let Query(q) = query?;
    state.planos.delete(id, q.mode()).await?;
    Ok(StatusCode::NO_CONTENT)
}
