use std::path::PathBuf;

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

pub type Result<T, E = FlagError> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum FlagError {
    #[error("flag '{0}' not found")]
    NotFound(String),
    #[error("invalid flag name: {0}")]
    InvalidName(String),
    #[error("validation failed: {0}")]
    ValidationFailed(String),
    #[error("failed to read seed file {path}: {source}")]
    SeedRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("seed file {path} is not a list of flags: {source}")]
    SeedFormat {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl FlagError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, FlagError::NotFound(_))
    }
}

/// Boundary error. Extractor rejections become `ValidationFailed`.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Flag(#[from] FlagError),
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::Flag(FlagError::ValidationFailed(rejection.body_text()))
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::Flag(FlagError::ValidationFailed(rejection.body_text()))
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: &'static str,
    pub message: String,
}

impl ApiError {
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            ApiError::Flag(FlagError::NotFound(_)) => (StatusCode::NOT_FOUND, "not_found"),
            ApiError::Flag(FlagError::InvalidName(_)) => (StatusCode::BAD_REQUEST, "invalid_name"),
            ApiError::Flag(FlagError::ValidationFailed(_)) => (StatusCode::BAD_REQUEST, "validation_failed"),
            ApiError::Flag(FlagError::SeedRead { .. } | FlagError::SeedFormat { .. }) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "internal")
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        let message = match &self {
            ApiError::Flag(FlagError::NotFound(_)) => "flag not found".to_string(),
            ApiError::Flag(FlagError::ValidationFailed(detail)) => detail.clone(),
            ApiError::Flag(e) => e.to_string(),
        };

        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }

        (status, Json(ErrorBody { error: code, message })).into_response()
    }
}
