use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use std::fmt;

#[derive(Debug)]
pub enum AppError {
    /// Bad or missing input. Caller's fault, surfaced verbatim, never retried.
    Validation(String),
    /// A uniqueness constraint was violated.
    Conflict(String),
    NotFound(String),
    Unauthorized(String),
    Config(String),
    Internal(String),
    /// Engine-level storage failure, tagged with the entity and operation
    /// that hit it. Never retried automatically.
    Persistence {
        entity: &'static str,
        operation: &'static str,
        source: sqlx::Error,
    },
}

impl AppError {
    pub fn persistence(entity: &'static str, operation: &'static str, source: sqlx::Error) -> Self {
        AppError::Persistence {
            entity,
            operation,
            source,
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Validation(msg) => write!(f, "validation failed: {}", msg),
            AppError::Conflict(msg) => write!(f, "conflict: {}", msg),
            AppError::NotFound(msg) => write!(f, "not found: {}", msg),
            AppError::Unauthorized(msg) => write!(f, "unauthorized: {}", msg),
            AppError::Config(msg) => write!(f, "configuration error: {}", msg),
            AppError::Internal(msg) => write!(f, "internal error: {}", msg),
            AppError::Persistence {
                entity,
                operation,
                source,
            } => write!(f, "storage failure during {} {}: {}", entity, operation, source),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Persistence { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<std::env::VarError> for AppError {
    fn from(err: std::env::VarError) -> Self {
        AppError::Config(err.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::Validation(ref msg) => (StatusCode::BAD_REQUEST, msg.as_str()),
            AppError::Conflict(ref msg) => (StatusCode::CONFLICT, msg.as_str()),
            AppError::NotFound(ref msg) => (StatusCode::NOT_FOUND, msg.as_str()),
            AppError::Unauthorized(ref msg) => (StatusCode::UNAUTHORIZED, msg.as_str()),
            AppError::Config(ref msg) => {
                tracing::error!("Configuration error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Server configuration error")
            }
            AppError::Internal(ref msg) => {
                tracing::error!("Internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
            }
            AppError::Persistence {
                entity,
                operation,
                ref source,
            } => {
                tracing::error!("Storage error during {} {}: {:?}", entity, operation, source);
                (StatusCode::INTERNAL_SERVER_ERROR, "Storage error")
            }
        };

        let body = Json(json!({
            "message": error_message,
        }));

        (status, body).into_response()
    }
}
