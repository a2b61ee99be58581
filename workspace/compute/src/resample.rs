use std::collections::{BTreeMap, BTreeSet};

use chrono::{Duration, NaiveDate, NaiveDateTime};
use common::SeriesPoint;
use tracing::{debug, warn};

/// A single numeric column paired with the table's row timestamps.
#[derive(Debug, Clone, PartialEq)]
pub struct NumericSeries {
    name: String,
    observations: Vec<(NaiveDateTime, Option<f64>)>,
}

impl NumericSeries {
    pub fn new(name: impl Into<String>, observations: Vec<(NaiveDateTime, Option<f64>)>) -> Self {
        Self {
            name: name.into(),
            observations,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn observations(&self) -> &[(NaiveDateTime, Option<f64>)] {
        &self.observations
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }
}

/// Daily totals of a [`NumericSeries`].
#[derive(Debug, Clone, PartialEq)]
pub struct ResampledSeries {
    name: String,
    points: Vec<SeriesPoint>,
    empty_days: usize,
}

impl ResampledSeries {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// One point per calendar day from the first to the last observed day.
    pub fn points(&self) -> &[SeriesPoint] {
        &self.points
    }

    pub fn values(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.value).collect()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.points.last().map(|p| p.date)
    }

    /// Days inside the range that had no non-empty reading. Their total is zero.
    pub fn empty_days(&self) -> usize {
        self.empty_days
    }
}

/// Sums a series into calendar-day buckets.
///
/// Sub-daily readings are added up per day and empty cells are skipped. Days
/// between the first and last observation that received no reading produce a
/// zero total, the same as an empty sum, and are counted in
/// [`ResampledSeries::empty_days`]. No interpolation is done.
pub fn resample_daily(series: &NumericSeries) -> ResampledSeries {
    let mut buckets: BTreeMap<NaiveDate, f64> = BTreeMap::new();
    for (timestamp, value) in series.observations() {
        let total = buckets.entry(timestamp.date()).or_insert(0.0);
        if let Some(value) = value {
            *total += value;
        }
    }

    let filled: BTreeSet<NaiveDate> = series
        .observations()
        .iter()
        .filter(|(_, value)| value.is_some())
        .map(|(timestamp, _)| timestamp.date())
        .collect();

    let (Some(first), Some(last)) = (
        buckets.keys().next().copied(),
        buckets.keys().next_back().copied(),
    ) else {
        return ResampledSeries {
            name: series.name().to_string(),
            points: Vec::new(),
            empty_days: 0,
        };
    };

    let mut points = Vec::with_capacity((last - first).num_days() as usize + 1);
    let mut empty_days = 0;
    let mut day = first;
    while day <= last {
        if !filled.contains(&day) {
            empty_days += 1;
        }
        points.push(SeriesPoint::new(day, buckets.get(&day).copied().unwrap_or(0.0)));
        day += Duration::days(1);
    }

    if empty_days > 0 {
        warn!(
            column = series.name(),
            empty_days, "Daily resampling left days without readings; their totals are zero"
        );
    }
    debug!(
        "Resampled {} readings of '{}' into {} days ({} to {})",
        series.len(),
        series.name(),
        points.len(),
        first,
        last
    );

    ResampledSeries {
        name: series.name().to_string(),
        points,
        empty_days,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;

    fn at(y: i32, m: u32, d: u32, hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_time(NaiveTime::from_hms_opt(hour, 0, 0).unwrap())
    }

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_sub_daily_readings_are_summed_per_day() {
        let series = NumericSeries::new(
            "load",
            vec![
                (at(2020, 1, 1, 0), Some(1.0)),
                (at(2020, 1, 1, 12), Some(2.0)),
                (at(2020, 1, 1, 23), Some(3.0)),
                (at(2020, 1, 2, 6), Some(10.0)),
            ],
        );

        let daily = resample_daily(&series);

        assert_eq!(daily.name(), "load");
        assert_eq!(
            daily.points(),
            &[SeriesPoint::new(day(2020, 1, 1), 6.0), SeriesPoint::new(day(2020, 1, 2), 10.0)]
        );
        assert_eq!(daily.empty_days(), 0);
    }

    #[test]
    fn test_missing_days_are_zero_and_counted() {
        let series = NumericSeries::new(
            "load",
            vec![(at(2020, 1, 1, 0), Some(5.0)), (at(2020, 1, 4, 0), Some(7.0))],
        );

        let daily = resample_daily(&series);

        assert_eq!(daily.values(), vec![5.0, 0.0, 0.0, 7.0]);
        assert_eq!(daily.empty_days(), 2);
        assert_eq!(daily.last_date(), Some(day(2020, 1, 4)));
    }

    #[test]
    fn test_empty_cells_are_skipped() {
        let series = NumericSeries::new(
            "load",
            vec![
                (at(2020, 1, 1, 0), Some(5.0)),
                (at(2020, 1, 1, 1), None),
                (at(2020, 1, 2, 0), None),
                (at(2020, 1, 3, 0), Some(1.5)),
            ],
        );

        let daily = resample_daily(&series);

        assert_eq!(daily.values(), vec![5.0, 0.0, 1.5]);
        assert_eq!(daily.empty_days(), 1);
    }

    #[test]
    fn test_dates_are_contiguous_across_month_and_leap_day() {
        let series = NumericSeries::new(
            "load",
            vec![(at(2020, 2, 27, 0), Some(1.0)), (at(2020, 3, 2, 0), Some(1.0))],
        );

        let daily = resample_daily(&series);
        let dates: Vec<NaiveDate> = daily.points().iter().map(|p| p.date).collect();

        assert_eq!(
            dates,
            vec![day(2020, 2, 27), day(2020, 2, 28), day(2020, 2, 29), day(2020, 3, 1), day(2020, 3, 2)]
        );
    }

    #[test]
    fn test_empty_series_resamples_to_nothing() {
        let daily = resample_daily(&NumericSeries::new("load", Vec::new()));
        assert!(daily.is_empty());
        assert_eq!(daily.last_date(), None);
    }
}
