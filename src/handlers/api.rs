use axum::{
    extract::{Path, State},
    response::Json,
};
use common::{ApiResponse, ColumnSelector, Horizon};
use tracing::{info, instrument};

use crate::chart::chart_title;
use crate::error::AppError;
use crate::helpers::pipeline::{load_dataset, run_forecast};
use crate::schemas::{AppState, DatasetColumnsResponse, ForecastResponse, SmoothingParamsResponse};

/// Numeric columns of an uploaded dataset
#[utoipa::path(
    get,
    path = "/api/v1/datasets/{filename}/columns",
    tag = "datasets",
    params(
        ("filename" = String, Path, description = "Name the dataset was uploaded under")
    ),
    responses(
        (status = 200, description = "Dataset validated", body = ApiResponse<DatasetColumnsResponse>),
        (status = 400, description = "Invalid filename", body = ErrorResponse),
        (status = 404, description = "Dataset not found", body = ErrorResponse),
        (status = 422, description = "Dataset failed validation", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_dataset_columns(
    State(state): State<AppState>,
    Path(filename): Path<String>,
) -> Result<Json<ApiResponse<DatasetColumnsResponse>>, AppError> {
    let dataset = load_dataset(&state, &filename).await?;
    let overall_available = dataset.overall_available();

    Ok(Json(ApiResponse::ok(
        DatasetColumnsResponse {
            filename,
            columns: dataset.columns,
            overall_available,
        },
        "Dataset validated successfully",
    )))
}

/// Forecast a column of an uploaded dataset
#[utoipa::path(
    get,
    path = "/api/v1/forecast/{filename}/{horizon}/{variable}",
    tag = "forecasts",
    params(
        ("filename" = String, Path, description = "Name the dataset was uploaded under"),
        ("horizon" = String, Path, description = "`6_months` for 180 days, anything else for 1825 days"),
        ("variable" = String, Path, description = "`overall` or a numeric column name")
    ),
    responses(
        (status = 200, description = "Forecast computed", body = ApiResponse<ForecastResponse>),
        (status = 400, description = "Invalid filename", body = ErrorResponse),
        (status = 404, description = "Dataset not found", body = ErrorResponse),
        (status = 422, description = "Dataset or model error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_forecast(
    State(state): State<AppState>,
    Path((filename, horizon, variable)): Path<(String, String, String)>,
) -> Result<Json<ApiResponse<ForecastResponse>>, AppError> {
    let run = run_forecast(
        &state,
        &filename,
        ColumnSelector::from_token(&variable),
        Horizon::from_token(&horizon),
    )
    .await?;
    info!("Forecast {} points for '{}'", run.forecast.len(), run.label());

    let response = ForecastResponse {
        label: run.label().to_string(),
        horizon: run.horizon.token().to_string(),
        steps: run.horizon.steps(),
        title: chart_title(run.label(), &run.horizon),
        params: SmoothingParamsResponse {
            alpha: run.params.alpha,
            beta: run.params.beta,
            gamma: run.params.gamma,
        },
        empty_days: run.history.empty_days(),
        history: run.history.points().to_vec(),
        forecast: run.forecast.points,
    };
    Ok(Json(ApiResponse::ok(response, "Forecast computed successfully")))
}
