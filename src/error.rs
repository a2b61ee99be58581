use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use compute::ForecastError;
use thiserror::Error;
use tracing::{error, warn};

use crate::schemas::ErrorResponse;
use crate::storage::StorageError;

/// Everything a request can fail with.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("{0}")]
    BadRequest(String),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Forecast(#[from] ForecastError),

    #[error("Failed to render page: {0}")]
    Template(#[from] handlebars::RenderError),

    #[error("Background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Storage(StorageError::InvalidFilename(_)) => StatusCode::BAD_REQUEST,
            AppError::Storage(StorageError::NotFound(_)) => StatusCode::NOT_FOUND,
            AppError::Storage(StorageError::Io(_)) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Forecast(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Template(_) | AppError::Task(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Stable machine-readable error code.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::BadRequest(_) => "BAD_REQUEST",
            AppError::Storage(StorageError::InvalidFilename(_)) => "INVALID_FILENAME",
            AppError::Storage(StorageError::NotFound(_)) => "NOT_FOUND",
            AppError::Storage(StorageError::Io(_)) => "STORAGE_ERROR",
            AppError::Forecast(e) => e.code(),
            AppError::Template(_) => "TEMPLATE_ERROR",
            AppError::Task(_) => "INTERNAL_ERROR",
        }
    }

    pub fn to_error_response(&self) -> ErrorResponse {
        ErrorResponse {
            error: self.to_string(),
            code: self.code().to_string(),
            success: false,
        }
    }

    pub(crate) fn log(&self) {
        let status = self.status();
        if status.is_server_error() {
            error!("Request failed with {}: {}", status, self);
        } else {
            warn!("Request rejected with {}: {}", status, self);
        }
    }
}

/// JSON rendering, used by the `/api/v1` routes.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        self.log();
        (self.status(), Json(self.to_error_response())).into_response()
    }
}
