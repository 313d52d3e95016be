use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use tracing::{error, warn};

use service::errors::{FieldViolation, ServiceError};

const INTERNAL_MESSAGE: &str = "Erro interno do servidor";

/// Error body shared by every endpoint: `{error, message, details}`.
#[derive(Debug)]
pub struct JsonApiError {
    pub status: StatusCode,
    pub error: &'static str,
    pub message: String,
    pub details: Option<Vec<FieldViolation>>,
}

impl JsonApiError {
    pub fn new(status: StatusCode, error: &'static str, message: impl Into<String>, details: Option<Vec<FieldViolation>>) -> Self {
        Self { status, error, message: message.into(), details }
    }

    fn unreadable(rule: &'static str) -> Self {
        Self::new(
            StatusCode::UNPROCESSABLE_ENTITY,
            "ValidationError",
            "Payload inválido",
            Some(vec![FieldViolation::new("_", rule)]),
        )
    }
}

impl From<ServiceError> for JsonApiError {
    fn from(err: ServiceError) -> Self {
        let status = err.status();
        if status.is_server_error() {
            // cause stays in the log, the client gets a generic message
            error!(error = %err, "request failed");
            return Self::new(status, err.name(), INTERNAL_MESSAGE, None);
        }
        let details = err.details().map(<[FieldViolation]>::to_vec);
        Self::new(status, err.name(), err.to_string(), details)
    }
}

impl From<JsonRejection> for JsonApiError {
    fn from(rejection: JsonRejection) -> Self {
        warn!(reason = %rejection.body_text(), "rejected json body");
        Self::unreadable("invalid_json")
    }
}

impl From<QueryRejection> for JsonApiError {
    fn from(rejection: QueryRejection) -> Self {
        warn!(reason = %rejection.body_text(), "rejected query string");
        Self::unreadable("invalid_query")
    }
}

impl IntoResponse for JsonApiError {
    fn into_response(self) -> Response {
        let body = serde_json::json!({
            "error": self.error,
            "message": self.message,
            "details": self.details,
        });
        (self.status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use service::errors::Conflict;

    #[test]
    fn db_errors_hide_their_cause() {
        let e = JsonApiError::from(ServiceError::Db("connection refused".into()));
        assert_eq!(e.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(e.error, "InternalServerError");
        assert_eq!(e.message, INTERNAL_MESSAGE);
    }

    #[test]
    fn conflicts_keep_their_message() {
        let e = JsonApiError::from(ServiceError::Conflict(Conflict::BeneficiarioCpf));
        assert_eq!(e.status, StatusCode::CONFLICT);
        assert_eq!(e.message, "CPF já cadastrado");
        assert!(e.details.is_none());
    }
}
