use axum::{
    extract::{Form, Path, State},
    response::{Html, IntoResponse, Redirect, Response},
};
use axum_valid::Valid;
use common::{ColumnSelector, Horizon};
use tracing::{debug, instrument};

use crate::chart;
use crate::error::AppError;
use crate::helpers::pipeline::{load_dataset, run_forecast};
use crate::schemas::{AppState, ForecastOptionsForm};

/// Column and horizon picker for an uploaded dataset
#[instrument(skip(state))]
pub async fn forecast_options(
    State(state): State<AppState>,
    Path(filename): Path<String>,
) -> Response {
    match options_page(&state, &filename).await {
        Ok(html) => Html(html).into_response(),
        Err(e) => state.views.error_page(&e).into_response(),
    }
}

async fn options_page(state: &AppState, filename: &str) -> Result<String, AppError> {
    let dataset = load_dataset(state, filename).await?;
    debug!("'{}' has numeric columns {:?}", filename, dataset.columns);
    Ok(state.views.options_page(
        filename,
        &dataset.selectable_columns(),
        dataset.overall_available(),
    )?)
}

/// Turns the submitted choices into a result URL.
#[instrument]
pub async fn submit_forecast_options(
    Path(filename): Path<String>,
    Valid(Form(form)): Valid<Form<ForecastOptionsForm>>,
) -> Redirect {
    Redirect::to(&result_url(&filename, &form.horizon, &form.variable))
}

pub fn result_url(filename: &str, horizon: &str, variable: &str) -> String {
    format!(
        "/forecast/result/{}/{}/{}",
        urlencoding::encode(filename),
        urlencoding::encode(horizon),
        urlencoding::encode(variable)
    )
}

/// Runs the forecast and shows the chart
#[instrument(skip(state))]
pub async fn forecast_result(
    State(state): State<AppState>,
    Path((filename, horizon, variable)): Path<(String, String, String)>,
) -> Response {
    match result_page(&state, &filename, &horizon, &variable).await {
        Ok(html) => Html(html).into_response(),
        Err(e) => state.views.error_page(&e).into_response(),
    }
}

async fn result_page(
    state: &AppState,
    filename: &str,
    horizon: &str,
    variable: &str,
) -> Result<String, AppError> {
    let selector = ColumnSelector::from_token(variable);
    let horizon = Horizon::from_token(horizon);
    let run = run_forecast(state, filename, selector, horizon).await?;

    let chart = chart::render(run.history.points(), &run.forecast, run.label(), &run.horizon);
    Ok(state.views.result_page(filename, &run, &chart)?)
}
