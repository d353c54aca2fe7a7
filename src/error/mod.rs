// Error types for the issi-swcache worker host
// Author: kelexine (https://github.com/kelexine)

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum WorkerError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Precache failed for {path}: {reason}")]
    Precache { path: String, reason: String },

    #[error("Invalid lifecycle transition: {0}")]
    Lifecycle(String),

    #[error("No active worker controls this scope")]
    NoActiveWorker,

    #[error("Invalid push payload: {0}")]
    InvalidPush(String),

    #[error("Notification not found: {0}")]
    NotificationNotFound(String),

    #[error("Background sync failed: {0}")]
    Sync(String),

    #[error("Platform error: {0}")]
    Platform(String),

    #[error("Upstream unreachable: {0}")]
    Upstream(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Config parsing error: {0}")]
    ConfigParsing(#[from] config::ConfigError),

    #[error("Internal error: {0}")]
    Internal(String),
}

// Convert WorkerError to HTTP responses for Axum
impl IntoResponse for WorkerError {
    fn into_response(self) -> Response {
        let (status, error_type) = match &self {
            WorkerError::InvalidPush(_) | WorkerError::InvalidRequest(_) | WorkerError::Json(_) => {
                (StatusCode::BAD_REQUEST, "invalid_request_error")
            }
            WorkerError::NotificationNotFound(_) => (StatusCode::NOT_FOUND, "not_found_error"),
            WorkerError::NoActiveWorker => (StatusCode::SERVICE_UNAVAILABLE, "no_active_worker"),
            WorkerError::Precache { .. } => (StatusCode::BAD_GATEWAY, "precache_error"),
            WorkerError::Upstream(_) => (StatusCode::BAD_GATEWAY, "upstream_error"),
            WorkerError::Lifecycle(_) => (StatusCode::CONFLICT, "lifecycle_error"),
            WorkerError::Config(_) | WorkerError::ConfigParsing(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "configuration_error")
            }
            _ => (StatusCode::INTERNAL_SERVER_ERROR, "worker_error"),
        };

        let body = json!({
            "type": "error",
            "error": {
                "type": error_type,
                "message": self.to_string(),
            }
        });

        (status, axum::Json(body)).into_response()
    }
}

pub type Result<T> = std::result::Result<T, WorkerError>;
