use axum::{Json, http::StatusCode, response::{IntoResponse, Response}};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Canvas rejected the credential: {0}")]
    Authentication(String),

    #[error("Could not reach Canvas: {0}")]
    Transport(String),

    #[error("Unexpected data from Canvas: {0}")]
    MalformedRemoteData(String),

    #[error("Store file is corrupt: {0}")]
    StoreCorrupt(String),

    #[error("Store I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Not found")]
    NotFound,

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Not configured: {0}")]
    Config(String),
}

impl AppError {
    /// Stable machine-readable name, used by the API and the sync status.
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::Authentication(_) => "authentication_failure",
            AppError::Transport(_) => "transport_failure",
            AppError::MalformedRemoteData(_) => "malformed_remote_data",
            AppError::StoreCorrupt(_) => "store_corrupt",
            AppError::Io(_) => "io",
            AppError::NotFound => "not_found",
            AppError::BadRequest(_) => "bad_request",
            AppError::Conflict(_) => "conflict",
            AppError::Config(_) => "config",
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            AppError::Authentication(_) => StatusCode::UNAUTHORIZED,
            AppError::Transport(_) | AppError::MalformedRemoteData(_) => StatusCode::BAD_GATEWAY,
            AppError::StoreCorrupt(_) | AppError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Config(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub kind: String,
    pub message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!("request failed: {}", self);
        }

        let message = match &self {
            AppError::NotFound => "Not Found".to_string(),
            AppError::Io(_) => "Store error occurred".to_string(),
            other => other.to_string(),
        };

        let body = Json(ErrorResponse {
            error: status.to_string(),
            kind: self.kind().to_string(),
            message,
        });

        (status, body).into_response()
    }
}
