pub mod dataset;
pub mod error;
pub mod forecast;
pub mod holt_winters;
pub mod resample;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use dataset::{RawTable, validate, validate_bytes};
pub use error::{ForecastError, Result};
pub use forecast::{DEFAULT_SEASONAL_PERIOD, ForecastEngine, ForecastRun};
pub use holt_winters::{MAX_SEASONAL_PERIOD, MIN_SEASONAL_PERIOD, SmoothingParams};
pub use resample::{NumericSeries, ResampledSeries};

/// Returns the engine used by the web layer unless configured otherwise:
/// additive Holt-Winters with a yearly (365-day) season.
pub fn default_engine() -> ForecastEngine {
    ForecastEngine::default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use common::{ColumnSelector, Horizon};
    use testing::daily_energy_csv;

    /// Validate then forecast, the same path a request takes.
    #[test]
    fn test_default_engine_end_to_end() {
        let start = NaiveDate::from_ymd_opt(2016, 1, 1).unwrap();
        let csv = daily_energy_csv(start, 3 * 365 + 1);

        let (table, columns) = validate_bytes(csv.as_bytes()).unwrap();
        assert_eq!(columns, vec!["total load actual", "temperature"]);

        let engine = default_engine();
        assert_eq!(engine.seasonal_period(), 365);

        let run = engine
            .run(&table, &ColumnSelector::from_token("overall"), &Horizon::from_token("6_months"))
            .unwrap();
        assert_eq!(run.forecast.len(), 180);
        assert_eq!(run.history.len(), 3 * 365 + 1);
        assert_eq!(run.history.empty_days(), 0);
    }
}
