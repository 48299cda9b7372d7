use thiserror::Error;
use crate::domain::error::DomainError;
use crate::infrastructure::error::InfrastructureError;

#[derive(Error, Debug)]
pub enum ApplicationError {
    #[error("Batch processing failed: {0}")]
    BatchFailed(String),

    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Domain error occurred: {0}")]
    DomainError(#[from] DomainError),

    #[error("Infrastructure error occurred: {0}")]
    InfrastructureError(#[from] InfrastructureError),
}

use axum::response::{IntoResponse, Response};
use axum::http::StatusCode;
use axum::Json;
use serde_json::json;
use tracing::error;

impl IntoResponse for ApplicationError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            ApplicationError::BatchFailed(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
            ApplicationError::ConfigurationError(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
            ApplicationError::InvalidRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApplicationError::DomainError(domain_err) => {
                (StatusCode::BAD_REQUEST, domain_err.to_string())
            }
            ApplicationError::InfrastructureError(infra_err) => {
                error!("InfrastructureError: {:?}", infra_err);
                match infra_err {
                    InfrastructureError::DecodeError(_) => (StatusCode::UNPROCESSABLE_ENTITY, infra_err.to_string()),
                    InfrastructureError::ImageLibError(_) => (StatusCode::UNPROCESSABLE_ENTITY, infra_err.to_string()),
                    InfrastructureError::RenderError(_) | InfrastructureError::DomainErrorWrapper(_) => {
                        (StatusCode::UNPROCESSABLE_ENTITY, infra_err.to_string())
                    }
                    _ => (StatusCode::INTERNAL_SERVER_ERROR, infra_err.to_string()),
                }
            }
        };
        let body = Json(json!({ "error": error_message }));
        (status, body).into_response()
    }
}
