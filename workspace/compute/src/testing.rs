//! Synthetic datasets shared by the unit tests.

use std::f64::consts::PI;
use std::fmt::Write;

use chrono::{Duration, NaiveDate};

/// Builds a CSV with `time, total load actual, temperature` and one row per
/// day, with a yearly and a weekly cycle on top of a slow upward trend.
/// Timestamps carry a `+01:00` offset like the public energy datasets.
pub fn daily_energy_csv(start: NaiveDate, days: usize) -> String {
    let mut csv = String::from("time,total load actual,temperature\n");
    for t in 0..days {
        let date = start + Duration::days(t as i64);
        let x = t as f64;
        let load = 25_000.0
            + 2.0 * x
            + 3_000.0 * (2.0 * PI * x / 365.0).sin()
            + 500.0 * (2.0 * PI * x / 7.0).sin();
        let temperature = 15.0 + 10.0 * (2.0 * PI * (x - 100.0) / 365.0).sin();
        writeln!(csv, "{} 00:00:00+01:00,{:.1},{:.2}", date.format("%Y-%m-%d"), load, temperature)
            .expect("writing to a String cannot fail");
    }
    csv
}
