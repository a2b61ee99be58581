use crate::handlers::{
    api::{get_dataset_columns, get_forecast},
    forecast::{forecast_options, forecast_result, submit_forecast_options},
    health::health_check,
    upload::{upload_dataset, upload_form},
};
use crate::schemas::{ApiDoc, AppState};
use axum::{extract::DefaultBodyLimit, routing::get, Router};
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::{compression::CompressionLayer, timeout::TimeoutLayer, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// Fitting a yearly season on long histories takes a while.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// Create application router with all routes and middleware
pub fn create_router(state: AppState) -> Router {
    let body_limit = state.max_upload_bytes;

    Router::new()
        // Health check
        .route("/health", get(health_check))
        // HTML workflow
        .route("/", get(upload_form).post(upload_dataset))
        .route(
            "/forecast/:filename",
            get(forecast_options).post(submit_forecast_options),
        )
        .route(
            "/forecast/result/:filename/:horizon/:variable",
            get(forecast_result),
        )
        // JSON API
        .route("/api/v1/datasets/:filename/columns", get(get_dataset_columns))
        .route(
            "/api/v1/forecast/:filename/:horizon/:variable",
            get(get_forecast),
        )
        // Swagger UI
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        // Add middleware
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CompressionLayer::new())
                .layer(TimeoutLayer::new(REQUEST_TIMEOUT))
                .layer(DefaultBodyLimit::max(body_limit)),
        )
        .with_state(state)
}
