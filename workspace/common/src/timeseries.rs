use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A single daily observation or prediction.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct SeriesPoint {
    /// Calendar day
    pub date: NaiveDate,
    /// Value for that day
    pub value: f64,
}

impl SeriesPoint {
    pub fn new(date: NaiveDate, value: f64) -> Self {
        Self { date, value }
    }
}

/// Forecast output: one point per day, starting the day after the last
/// historical date.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct ForecastResult {
    /// Predicted points in chronological order
    pub points: Vec<SeriesPoint>,
}

impl ForecastResult {
    /// Pairs `values` with the consecutive days following `last_observed`.
    pub fn from_values(last_observed: NaiveDate, values: &[f64]) -> Self {
        let points = values
            .iter()
            .enumerate()
            .map(|(i, value)| SeriesPoint::new(last_observed + Duration::days(i as i64 + 1), *value))
            .collect();
        Self { points }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.points.first().map(|p| p.date)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.points.last().map(|p| p.date)
    }

    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.points.iter().map(|p| p.date)
    }

    pub fn values(&self) -> impl Iterator<Item = f64> + '_ {
        self.points.iter().map(|p| p.value)
    }
}
