//! Glue between the handlers and the compute crate.
//!
//! Validation and model fitting are CPU-bound, so both run on the blocking
//! pool. Handlers only see `AppError`.

use common::{ColumnSelector, Horizon, OVERALL_COLUMN};
use compute::ForecastRun;
use tracing::{debug, instrument};

use crate::error::AppError;
use crate::schemas::AppState;

/// Numeric columns of a dataset that passed validation, in file order.
pub struct LoadedDataset {
    pub columns: Vec<String>,
}

impl LoadedDataset {
    pub fn overall_available(&self) -> bool {
        self.columns.iter().any(|c| c == OVERALL_COLUMN)
    }

    /// Columns offered individually; the overall column is only reachable
    /// through the "Overall" choice.
    pub fn selectable_columns(&self) -> Vec<String> {
        self.columns
            .iter()
            .filter(|c| c.as_str() != OVERALL_COLUMN)
            .cloned()
            .collect()
    }
}

/// Reads a stored upload and validates it. The parsed table is dropped; a
/// forecast re-reads the file.
#[instrument(skip(state))]
pub async fn load_dataset(state: &AppState, filename: &str) -> Result<LoadedDataset, AppError> {
    let bytes = state.store.read(filename).await?;
    debug!("Read {} bytes from '{}'", bytes.len(), filename);

    let columns = tokio::task::spawn_blocking(move || {
        compute::validate_bytes(&bytes).map(|(_, columns)| columns)
    })
    .await??;
    Ok(LoadedDataset { columns })
}

/// Reads, validates and forecasts a stored upload.
#[instrument(skip(state))]
pub async fn run_forecast(
    state: &AppState,
    filename: &str,
    selector: ColumnSelector,
    horizon: Horizon,
) -> Result<ForecastRun, AppError> {
    let bytes = state.store.read(filename).await?;
    let engine = state.engine;

    let run = tokio::task::spawn_blocking(move || {
        let (table, _) = compute::validate_bytes(&bytes)?;
        engine.run(&table, &selector, &horizon)
    })
    .await??;
    Ok(run)
}
