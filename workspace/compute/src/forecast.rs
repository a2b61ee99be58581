use common::{ColumnSelector, ForecastResult, Horizon, OVERALL_COLUMN};
use tracing::{debug, info, instrument, warn};

use crate::dataset::RawTable;
use crate::error::{ForecastError, Result};
use crate::holt_winters::{HoltWinters, SmoothingParams};
use crate::resample::{ResampledSeries, resample_daily};

/// Seasonal period of the daily model: one year.
pub const DEFAULT_SEASONAL_PERIOD: usize = 365;

/// Everything a forecast request produces: the daily history the model was
/// fitted on, the forecast itself and the estimated smoothing parameters.
#[derive(Debug, Clone)]
pub struct ForecastRun {
    pub selector: ColumnSelector,
    pub horizon: Horizon,
    pub history: ResampledSeries,
    pub forecast: ForecastResult,
    pub params: SmoothingParams,
}

impl ForecastRun {
    /// Label for titles: `Overall` for the sentinel selector, otherwise the column name.
    pub fn label(&self) -> &str {
        self.selector.label()
    }
}

/// Resamples a column to daily totals and forecasts it with Holt-Winters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ForecastEngine {
    seasonal_period: usize,
}

impl Default for ForecastEngine {
    fn default() -> Self {
        Self {
            seasonal_period: DEFAULT_SEASONAL_PERIOD,
        }
    }
}

impl ForecastEngine {
    pub fn new(seasonal_period: usize) -> Self {
        Self { seasonal_period }
    }

    pub fn seasonal_period(&self) -> usize {
        self.seasonal_period
    }

    /// Maps a selector to the column it reads and checks the table has it as
    /// a numeric column.
    pub fn resolve_column<'a>(table: &RawTable, selector: &'a ColumnSelector) -> Result<&'a str> {
        let column = selector.column_name();
        match selector {
            ColumnSelector::Overall if !table.has_column(OVERALL_COLUMN) => {
                Err(ForecastError::Schema(format!(
                    "The dataset does not contain a '{}' column for overall forecasting.",
                    OVERALL_COLUMN
                )))
            }
            _ if !table.has_column(column) => Err(ForecastError::Schema(format!(
                "Column '{}' was not found in the dataset.",
                column
            ))),
            _ if !table.is_numeric(column) => Err(ForecastError::Schema(format!(
                "Column '{}' is not numeric and cannot be forecast.",
                column
            ))),
            _ => Ok(column),
        }
    }

    /// Forecasts the selected column and returns only the forecast points.
    pub fn forecast(
        &self,
        table: &RawTable,
        selector: &ColumnSelector,
        horizon: &Horizon,
    ) -> Result<ForecastResult> {
        Ok(self.run(table, selector, horizon)?.forecast)
    }

    /// Runs the whole pipeline for one request: resolve the column, resample
    /// to daily totals, fit the model and forecast `horizon.steps()` days.
    #[instrument(skip(self, table), fields(rows = table.height(), period = self.seasonal_period))]
    pub fn run(
        &self,
        table: &RawTable,
        selector: &ColumnSelector,
        horizon: &Horizon,
    ) -> Result<ForecastRun> {
        let column = Self::resolve_column(table, selector)?;
        let series = table.numeric_series(column)?;
        let history = resample_daily(&series);
        debug!("Resampled '{}' to {} daily points", column, history.len());

        let model = HoltWinters::new(self.seasonal_period)?;
        let fitted = model.fit(&history.values()).inspect_err(|e| {
            warn!(column, error = %e, "Model fit failed");
        })?;

        let Some(last_date) = history.last_date() else {
            return Err(ForecastError::ModelFit(
                "Cannot forecast an empty series.".to_string(),
            ));
        };
        let forecast = ForecastResult::from_values(last_date, &fitted.forecast(horizon.steps()));

        info!(
            "Forecast {} days of '{}' from {} (horizon {})",
            forecast.len(),
            column,
            last_date,
            horizon
        );

        Ok(ForecastRun {
            selector: selector.clone(),
            horizon: horizon.clone(),
            history,
            forecast,
            params: fitted.params(),
        })
    }
}
