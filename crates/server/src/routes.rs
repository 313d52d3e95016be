use std::sync::Arc;

use axum::{routing::get, Json, Router};
use sea_orm::DatabaseConnection;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;
use uuid::Uuid;

use common::types::Health;
use service::domain::parse_id;
use service::errors::ServiceError;
use service::repository::{
    BeneficiarioRepository, MemoryStore, PlanoRepository, SeaOrmBeneficiarioRepository, SeaOrmPlanoRepository,
};
use service::{BeneficiarioService, PlanoService};

use crate::errors::JsonApiError;

pub mod beneficiarios;
pub mod planos;

#[derive(Clone)]
pub struct ServerState {
    pub planos: Arc<PlanoService<dyn PlanoRepository>>,
    pub beneficiarios: Arc<BeneficiarioService<dyn BeneficiarioRepository>>,
}

impl ServerState {
    pub fn new(planos: Arc<dyn PlanoRepository>, beneficiarios: Arc<dyn BeneficiarioRepository>) -> Self {
        Self {
            planos: Arc::new(PlanoService::new(planos)),
            beneficiarios: Arc::new(BeneficiarioService::new(beneficiarios)),
        }
    }

    pub fn with_database(db: DatabaseConnection) -> Self {
        Self::new(
            Arc::new(SeaOrmPlanoRepository { db: db.clone() }),
            Arc::new(SeaOrmBeneficiarioRepository { db }),
        )
    }

    /// Both managers share one store so plan/beneficiary rules see each other.
    pub fn in_memory() -> Self {
        let store = Arc::new(MemoryStore::new());
        Self::new(store.clone(), store)
    }
}

pub async fn health() -> Json<Health> {
    Json(Health { status: "ok" })
}

/// A path segment that is not a UUID names no record.
pub(crate) fn path_id(raw: &str, entity: &str) -> Result<Uuid, JsonApiError> {
    parse_id(raw).ok_or_else(|| ServiceError::not_found(entity).into())
}

/// Build the application router
pub fn build_router(state: ServerState, cors: CorsLayer) -> Router {
    let api = Router::new()
        .route("/api/planos", get(planos::list).post(planos::create))
        .route("/api/planos/:id", get(planos::get).put(planos::update).delete(planos::delete))
        .route("/api/beneficiarios", get(beneficiarios::list).post(beneficiarios::create))
        .route(
            "/api/beneficiarios/:id",
            get(beneficiarios::get).put(beneficiarios::update).delete(beneficiarios::delete),
        );

    Router::new()
        .route("/health", get(health))
        .merge(api)
        .with_state(state)
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO).include_headers(false))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO).include_headers(false))
                .on_failure(DefaultOnFailure::new().level(Level::ERROR)),
        )
}
