use anyhow::{Context, Result};
use common::{ColumnSelector, Horizon};
use compute::ForecastEngine;
use std::fs::File;
use std::path::Path;
use tracing::{debug, info, trace};

use crate::chart;

/// Runs the whole pipeline on a local file and writes a standalone chart page.
pub fn forecast_file(
    file: &Path,
    variable: &str,
    horizon: &str,
    output: &Path,
    seasonal_period: usize,
) -> Result<()> {
    trace!("Entering forecast_file function");
    info!("Forecasting '{}' from {}", variable, file.display());

    let reader = File::open(file).with_context(|| format!("Failed to open {}", file.display()))?;
    let (table, columns) = compute::validate(reader)?;
    debug!("Numeric columns: {:?}", columns);

    let engine = ForecastEngine::new(seasonal_period);
    let run = engine.run(
        &table,
        &ColumnSelector::from_token(variable),
        &Horizon::from_token(horizon),
    )?;

    let chart = chart::render(run.history.points(), &run.forecast, run.label(), &run.horizon);
    std::fs::write(output, chart.to_standalone_html())
        .with_context(|| format!("Failed to write {}", output.display()))?;

    info!(
        "Wrote {} ({} forecast days, alpha={:.4} beta={:.4} gamma={:.4})",
        output.display(),
        run.forecast.len(),
        run.params.alpha,
        run.params.beta,
        run.params.gamma
    );
    Ok(())
}
