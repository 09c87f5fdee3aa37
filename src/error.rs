use crate::ingest::IngestError;

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("storage contains invalid json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("storage lock poisoned")]
    Poisoned,
}

/// Startup or listener failure; the process exits on it.
#[derive(Debug, Error)]
pub enum ServeError {
    #[error("failed to open storage: {0}")]
    Storage(#[from] StorageError),

    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: std::net::SocketAddr,
        source: std::io::Error,
    },

    #[error("server error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("unauthorized")]
    Unauthorized,

    #[error("invalid payload")]
    InvalidPayload,

    #[error("{0}")]
    InvalidSubscription(&'static str),

    #[error("Push notifications are not configured.")]
    PushUnavailable,

    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl From<IngestError> for ApiError {
    fn from(err: IngestError) -> Self {
        match err {
            IngestError::Validation(_) => ApiError::InvalidPayload,
            IngestError::Storage(err) => ApiError::Storage(err),
        }
    }
}

#[derive(Serialize)]
pub(crate) struct ErrorResponse {
    pub(crate) error: String,
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::InvalidPayload | ApiError::InvalidSubscription(_) => StatusCode::BAD_REQUEST,
            ApiError::PushUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if let ApiError::Storage(err) = &self {
            tracing::error!(error = %err, "request failed on storage");
        }
        (
            status,
            Json(ErrorResponse {
                error: self.to_string(),
            }),
        )
            .into_response()
    }
}
