//! Dataset validation.
//!
//! Reads an uploaded CSV into a [`RawTable`]: the `time` column becomes a
//! sorted row index and the remaining columns are kept in a polars
//! `DataFrame`. Numeric columns are the ones polars infers as integer or
//! float over the whole file.

use std::io::{Cursor, Read};

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use polars::prelude::*;
use tracing::{debug, instrument, trace, warn};

use crate::error::{ForecastError, Result};
use crate::resample::NumericSeries;

/// Name of the column that holds the row timestamps.
pub const TIME_COLUMN: &str = "time";

/// Date-time layouts that carry a UTC offset. The local wall-clock time is kept.
const OFFSET_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f%:z",
    "%Y-%m-%d %H:%M:%S%.f%z",
    "%Y-%m-%dT%H:%M:%S%.f%z",
];

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y"];

/// Cell values read as missing, in addition to empty cells. A column that
/// uses them for gaps is still inferred as numeric.
pub const NULL_MARKERS: &[&str] = &[
    "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

/// A validated, time-indexed table.
#[derive(Debug, Clone)]
pub struct RawTable {
    /// Row timestamps in ascending order
    index: Vec<NaiveDateTime>,
    /// Value columns, rows aligned with `index`
    frame: DataFrame,
    /// Numeric value columns in file order
    numeric_columns: Vec<String>,
}

impl RawTable {
    /// Row timestamps in ascending order.
    pub fn index(&self) -> &[NaiveDateTime] {
        &self.index
    }

    /// The value columns. The `time` column is not among them.
    pub fn frame(&self) -> &DataFrame {
        &self.frame
    }

    pub fn height(&self) -> usize {
        self.index.len()
    }

    /// All value column names in file order.
    pub fn column_names(&self) -> Vec<String> {
        self.frame
            .get_columns()
            .iter()
            .map(|c| c.name().to_string())
            .collect()
    }

    /// Numeric value column names in file order.
    pub fn numeric_columns(&self) -> &[String] {
        &self.numeric_columns
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.frame.get_columns().iter().any(|c| c.name().as_str() == name)
    }

    pub fn is_numeric(&self, name: &str) -> bool {
        self.numeric_columns.iter().any(|c| c == name)
    }

    /// Extracts a numeric column paired with the row index. Empty cells are
    /// kept as `None`.
    pub fn numeric_series(&self, name: &str) -> Result<NumericSeries> {
        if !self.is_numeric(name) {
            return Err(ForecastError::Schema(format!(
                "Column '{}' is not a numeric column of the dataset.",
                name
            )));
        }

        let values = self
            .frame
            .column(name)?
            .as_materialized_series()
            .cast(&DataType::Float64)?;
        let observations = self
            .index
            .iter()
            .copied()
            .zip(values.f64()?.into_iter())
            .collect();

        Ok(NumericSeries::new(name, observations))
    }
}

/// Validates a CSV stream. See [`validate_bytes`].
pub fn validate<R: Read>(mut reader: R) -> Result<(RawTable, Vec<String>)> {
    let mut bytes = Vec::new();
    reader
        .read_to_end(&mut bytes)
        .map_err(|e| ForecastError::Parse(format!("Could not read the uploaded file: {}", e)))?;
    validate_bytes(&bytes)
}

/// Parses CSV bytes into a [`RawTable`] and returns it together with the
/// numeric column names in file order.
///
/// Fails with [`ForecastError::Schema`] when there is no `time` column or no
/// numeric column, and with [`ForecastError::Parse`] when the file or any
/// timestamp cannot be parsed.
#[instrument(skip(bytes), fields(len = bytes.len()))]
pub fn validate_bytes(bytes: &[u8]) -> Result<(RawTable, Vec<String>)> {
    let null_values = NULL_MARKERS.iter().map(|m| PlSmallStr::from_static(m)).collect();
    let df = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(None)
        .with_parse_options(
            CsvParseOptions::default().with_null_values(Some(NullValues::AllColumns(null_values))),
        )
        .into_reader_with_file_handle(Cursor::new(bytes.to_vec()))
        .finish()?;
    debug!("Read CSV with {} rows and {} columns", df.height(), df.width());

    if !df.get_columns().iter().any(|c| c.name().as_str() == TIME_COLUMN) {
        return Err(ForecastError::Schema(
            "Uploaded file must contain a 'time' column.".to_string(),
        ));
    }

    let timestamps = parse_time_column(df.column(TIME_COLUMN)?)?;

    let mut order: Vec<IdxSize> = (0..timestamps.len() as IdxSize).collect();
    order.sort_by_key(|&i| timestamps[i as usize]);
    let index: Vec<NaiveDateTime> = order.iter().map(|&i| timestamps[i as usize]).collect();

    let frame = df
        .drop(TIME_COLUMN)?
        .take(&IdxCa::from_vec("row_order".into(), order))?;

    let numeric_columns: Vec<String> = frame
        .get_columns()
        .iter()
        .filter(|c| is_numeric_dtype(c.dtype()))
        .map(|c| c.name().to_string())
        .collect();
    trace!(?numeric_columns, "Detected numeric columns");

    if numeric_columns.is_empty() {
        return Err(ForecastError::Schema(
            "No numeric columns found for forecasting.".to_string(),
        ));
    }

    let table = RawTable {
        index,
        frame,
        numeric_columns: numeric_columns.clone(),
    };
    Ok((table, numeric_columns))
}

fn parse_time_column(column: &Column) -> Result<Vec<NaiveDateTime>> {
    let as_text = column.as_materialized_series().cast(&DataType::String)?;
    as_text
        .str()?
        .into_iter()
        .enumerate()
        .map(|(row, raw)| {
            let raw = raw.ok_or_else(|| {
                ForecastError::Parse(format!("Missing 'time' value in row {}.", row + 1))
            })?;
            parse_timestamp(raw).ok_or_else(|| {
                warn!(row, raw, "Unparseable timestamp");
                ForecastError::Parse(format!(
                    "Unknown datetime format in row {}: '{}'.",
                    row + 1,
                    raw
                ))
            })
        })
        .collect()
}

/// Parses a single timestamp. Values with a UTC offset keep the wall-clock
/// time they were written with, so daily buckets follow the file's calendar.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let value = raw.trim();
    if value.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.naive_local());
    }
    if let Some(dt) = OFFSET_FORMATS
        .iter()
        .find_map(|fmt| DateTime::parse_from_str(value, fmt).ok())
    {
        return Some(dt.naive_local());
    }
    if let Some(dt) = DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
    {
        return Some(dt);
    }
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(value, fmt).ok())
        .map(|date| date.and_time(NaiveTime::MIN))
}

fn is_numeric_dtype(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
            | DataType::Float32
            | DataType::Float64
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    #[test]
    fn test_validate_returns_numeric_columns_in_file_order() {
        let csv = "time,total load actual,city,temperature\n\
                   2020-01-02,20,Madrid,5.5\n\
                   2020-01-01,10,Madrid,4.0\n\
                   2020-01-03,30,Madrid,6.25\n";

        let (table, columns) = validate_bytes(csv.as_bytes()).unwrap();

        assert_eq!(columns, vec!["total load actual", "temperature"]);
        assert_eq!(table.numeric_columns(), columns.as_slice());
        assert_eq!(table.column_names(), vec!["total load actual", "city", "temperature"]);
        assert!(!table.has_column("time"));
        assert_eq!(table.height(), 3);
    }

    #[test]
    fn test_validate_sorts_rows_by_time() {
        let csv = "time,load\n2020-01-03,3\n2020-01-01,1\n2020-01-02,2\n";

        let (table, _) = validate_bytes(csv.as_bytes()).unwrap();

        let days: Vec<NaiveDate> = table.index().iter().map(|t| t.date()).collect();
        assert_eq!(
            days,
            vec![
                NaiveDate::from_ymd_opt(2020, 1, 1).unwrap(),
                NaiveDate::from_ymd_opt(2020, 1, 2).unwrap(),
                NaiveDate::from_ymd_opt(2020, 1, 3).unwrap(),
            ]
        );

        let series = table.numeric_series("load").unwrap();
        let values: Vec<Option<f64>> = series.observations().iter().map(|(_, v)| *v).collect();
        assert_eq!(values, vec![Some(1.0), Some(2.0), Some(3.0)]);
    }

    #[test]
    fn test_validate_without_time_column_is_schema_error() {
        let csv = "date,load\n2020-01-01,1\n";

        let err = validate_bytes(csv.as_bytes()).unwrap_err();

        assert_eq!(
            err,
            ForecastError::Schema("Uploaded file must contain a 'time' column.".to_string())
        );
    }

    #[test]
    fn test_time_column_match_is_case_sensitive() {
        let csv = "Time,load\n2020-01-01,1\n";
        let err = validate_bytes(csv.as_bytes()).unwrap_err();
        assert!(matches!(err, ForecastError::Schema(_)));
    }

    #[test]
    fn test_validate_without_numeric_columns_is_schema_error() {
        let csv = "time,city\n2020-01-01,Madrid\n2020-01-02,Bilbao\n";

        let err = validate_bytes(csv.as_bytes()).unwrap_err();

        assert_eq!(
            err,
            ForecastError::Schema("No numeric columns found for forecasting.".to_string())
        );
    }

    #[test]
    fn test_mixed_column_is_not_numeric() {
        let csv = "time,load,notes\n2020-01-01,1,3\n2020-01-02,2,pending\n";

        let (_, columns) = validate_bytes(csv.as_bytes()).unwrap();

        assert_eq!(columns, vec!["load"]);
    }

    #[test]
    fn test_unparseable_time_is_parse_error() {
        let csv = "time,load\n2020-01-01,1\nyesterday,2\n";

        let err = validate_bytes(csv.as_bytes()).unwrap_err();

        match err {
            ForecastError::Parse(message) => assert!(message.contains("yesterday")),
            other => panic!("Expected parse error, got {:?}", other),
        }
    }

    #[test]
    fn test_null_markers_keep_column_numeric() {
        let csv = "time,load,temperature\n\
                   2020-01-01 00:00:00,NA,4.0\n\
                   2020-01-01 12:00:00,5,N/A\n\
                   2020-01-02 00:00:00,N/A,nan\n\
                   2020-01-02 12:00:00,7,5.5\n\
                   2020-01-03 00:00:00,,6.0\n";

        let (table, columns) = validate_bytes(csv.as_bytes()).unwrap();
        assert_eq!(columns, vec!["load", "temperature"]);

        let series = table.numeric_series("load").unwrap();
        let values: Vec<Option<f64>> = series.observations().iter().map(|(_, v)| *v).collect();
        assert_eq!(values, vec![None, Some(5.0), None, Some(7.0), None]);

        let daily = crate::resample::resample_daily(&series);
        assert_eq!(daily.values(), vec![5.0, 7.0, 0.0]);
        assert_eq!(daily.empty_days(), 1);
    }

    #[test]
    fn test_missing_time_value_is_parse_error() {
        let csv = "time,load\n2020-01-01,1\n,2\n2020-01-03,3\n";

        let err = validate_bytes(csv.as_bytes()).unwrap_err();

        assert_eq!(err, ForecastError::Parse("Missing 'time' value in row 2.".to_string()));
    }

    #[test]
    fn test_malformed_csv_is_parse_error() {
        let err = validate_bytes(b"").unwrap_err();
        assert!(matches!(err, ForecastError::Parse(_)), "empty input gave {:?}", err);

        let ragged = "time,load\n2020-01-01,1\n2020-01-02,2,3,4\n";
        let err = validate_bytes(ragged.as_bytes()).unwrap_err();
        assert!(matches!(err, ForecastError::Parse(_)), "ragged input gave {:?}", err);
    }

    #[test]
    fn test_validate_reads_from_any_reader() {
        let csv = "time,load\n2020-01-01 10:00:00,1\n";
        let (table, columns) = validate(csv.as_bytes()).unwrap();
        assert_eq!(columns, vec!["load"]);
        assert_eq!(table.index()[0].hour(), 10);
    }

    #[test]
    fn test_numeric_series_rejects_text_columns() {
        let csv = "time,load,city\n2020-01-01,1,Madrid\n";
        let (table, _) = validate_bytes(csv.as_bytes()).unwrap();

        assert!(matches!(table.numeric_series("city"), Err(ForecastError::Schema(_))));
        assert!(matches!(table.numeric_series("missing"), Err(ForecastError::Schema(_))));
    }

    #[test]
    fn test_parse_timestamp_formats() {
        let midnight = |y, m, d| NaiveDate::from_ymd_opt(y, m, d).unwrap().and_time(NaiveTime::MIN);

        assert_eq!(parse_timestamp("2015-01-01"), Some(midnight(2015, 1, 1)));
        assert_eq!(parse_timestamp("2015/01/01"), Some(midnight(2015, 1, 1)));
        assert_eq!(parse_timestamp("01/31/2015"), Some(midnight(2015, 1, 31)));
        assert_eq!(parse_timestamp(" 2015-01-01 00:00:00 "), Some(midnight(2015, 1, 1)));
        assert_eq!(parse_timestamp("2015-01-01T00:00:00Z"), Some(midnight(2015, 1, 1)));

        // Offsets keep the local calendar day.
        let local = parse_timestamp("2015-01-01 00:00:00+01:00").unwrap();
        assert_eq!(local, midnight(2015, 1, 1));
        let late = parse_timestamp("2015-01-01 23:30:00-05:00").unwrap();
        assert_eq!(late.date(), NaiveDate::from_ymd_opt(2015, 1, 1).unwrap());

        assert_eq!(parse_timestamp("2015-13-01"), None);
        assert_eq!(parse_timestamp(""), None);
        assert_eq!(parse_timestamp("not a date"), None);
    }
}
