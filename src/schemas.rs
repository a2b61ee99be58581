use common::{ApiResponse, SeriesPoint};
use compute::ForecastEngine;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::{OpenApi, ToSchema};
use validator::Validate;

use crate::storage::DatasetStore;
use crate::views::Views;

/// Application state shared across handlers
#[derive(Clone, Debug)]
pub struct AppState {
    /// Uploaded dataset storage
    pub store: DatasetStore,
    /// Forecast engine (seasonal period is configurable)
    pub engine: ForecastEngine,
    /// Compiled page templates
    pub views: Arc<Views>,
    /// Largest accepted request body, in bytes
    pub max_upload_bytes: usize,
}

/// Error response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,
    /// Error code
    pub code: String,
    /// Success status (always false for errors)
    pub success: bool,
}

/// Health check response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    /// Service status
    pub status: String,
    /// Service version
    pub version: String,
    /// Seasonal period used by the forecast engine, in days
    pub seasonal_period: usize,
}

/// Numeric columns of an uploaded dataset
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DatasetColumnsResponse {
    pub filename: String,
    /// Every numeric column, in file order
    pub columns: Vec<String>,
    /// Whether the "overall" selector can be used
    pub overall_available: bool,
}

/// Fitted smoothing parameters
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SmoothingParamsResponse {
    pub alpha: f64,
    pub beta: f64,
    pub gamma: f64,
}

/// A forecast together with the daily history it was fitted on
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ForecastResponse {
    /// "Overall" or the column name
    pub label: String,
    /// Horizon token as given in the request
    pub horizon: String,
    /// Number of forecast days
    pub steps: usize,
    /// Chart title
    pub title: String,
    pub params: SmoothingParamsResponse,
    /// Days in the history with no readings (filled with 0)
    pub empty_days: usize,
    pub history: Vec<SeriesPoint>,
    pub forecast: Vec<SeriesPoint>,
}

/// Options form posted from the column picker
#[derive(Debug, Deserialize, Serialize, Validate)]
pub struct ForecastOptionsForm {
    #[validate(length(min = 1, message = "Please choose a forecast horizon."))]
    pub horizon: String,
    #[validate(length(min = 1, message = "Please choose a variable to forecast."))]
    pub variable: String,
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::health::health_check,
        crate::handlers::api::get_dataset_columns,
        crate::handlers::api::get_forecast,
    ),
    components(
        schemas(
            ErrorResponse,
            HealthResponse,
            DatasetColumnsResponse,
            SmoothingParamsResponse,
            ForecastResponse,
            SeriesPoint,
            ApiResponse<DatasetColumnsResponse>,
            ApiResponse<ForecastResponse>,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "datasets", description = "Uploaded dataset inspection"),
        (name = "forecasts", description = "Holt-Winters forecasts as JSON"),
    ),
    info(
        title = "Loadcast API",
        version = "0.1.0",
        description = "Energy load forecasting service: upload a CSV time series and forecast any numeric column."
    )
)]
pub struct ApiDoc;
