//! Forecast chart rendering.
//!
//! Builds a plotly figure with the daily history as a solid line and the
//! forecast as a dashed line in a contrasting colour.

use common::{ForecastResult, Horizon, SeriesPoint};
use plotly::common::{DashType, Line, Mode, Title};
use plotly::layout::Axis;
use plotly::{Layout, Plot, Scatter};
#[cfg(test)]
use {chrono::NaiveDate, serde_json::Value, thiserror::Error};

pub const HISTORY_TRACE: &str = "Historical Data";
pub const FORECAST_TRACE: &str = "Forecast";

const HISTORY_COLOR: &str = "blue";
const FORECAST_COLOR: &str = "red";
const DATE_FORMAT: &str = "%Y-%m-%d";

/// Failure to read a trace back out of the figure JSON.
#[cfg(test)]
#[derive(Error, Debug)]
pub enum ChartError {
    #[error("Chart JSON is invalid: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Chart has no '{0}' trace")]
    MissingTrace(String),

    #[error("Chart trace is malformed: {0}")]
    Malformed(String),
}

/// A rendered chart: a plotly figure plus its title.
pub struct ChartDocument {
    plot: Plot,
    title: String,
}

impl std::fmt::Debug for ChartDocument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChartDocument").field("title", &self.title).finish()
    }
}

/// Title shown above the chart, e.g. `Forecast for Overall (6_months)`.
pub fn chart_title(label: &str, horizon: &Horizon) -> String {
    format!("Forecast for {} ({})", label, horizon.token())
}

/// Combines the history and forecast into one chart.
pub fn render(
    history: &[SeriesPoint],
    forecast: &ForecastResult,
    label: &str,
    horizon: &Horizon,
) -> ChartDocument {
    let title = chart_title(label, horizon);

    let history_trace = Scatter::new(dates(history), values(history))
        .mode(Mode::Lines)
        .name(HISTORY_TRACE)
        .line(Line::new().color(HISTORY_COLOR));

    let forecast_trace = Scatter::new(dates(&forecast.points), values(&forecast.points))
        .mode(Mode::Lines)
        .name(FORECAST_TRACE)
        .line(Line::new().color(FORECAST_COLOR).dash(DashType::Dash));

    let layout = Layout::new()
        .title(Title::with_text(title.clone()))
        .x_axis(Axis::new().title(Title::with_text("Date")))
        .y_axis(Axis::new().title(Title::with_text("Values")));

    let mut plot = Plot::new();
    plot.add_trace(history_trace);
    plot.add_trace(forecast_trace);
    plot.set_layout(layout);

    ChartDocument { plot, title }
}

fn dates(points: &[SeriesPoint]) -> Vec<String> {
    points.iter().map(|p| p.date.format(DATE_FORMAT).to_string()).collect()
}

fn values(points: &[SeriesPoint]) -> Vec<f64> {
    points.iter().map(|p| p.value).collect()
}

impl ChartDocument {
    pub fn title(&self) -> &str {
        &self.title
    }

    /// An embeddable `<div>` plus script fragment. The host page must load plotly.js.
    pub fn to_inline_html(&self, div_id: &str) -> String {
        self.plot.to_inline_html(Some(div_id))
    }

    /// A standalone HTML page containing the chart.
    pub fn to_standalone_html(&self) -> String {
        self.plot.to_html()
    }
}

#[cfg(test)]
impl ChartDocument {
    /// The figure as plotly JSON (`data`, `layout`, `config`).
    pub fn to_json(&self) -> String {
        self.plot.to_json()
    }

    /// Reads the forecast trace back out of the figure JSON.
    pub fn forecast_points(&self) -> Result<Vec<SeriesPoint>, ChartError> {
        self.trace_points(FORECAST_TRACE)
    }

    /// Reads a named trace back out of the figure JSON.
    pub fn trace_points(&self, name: &str) -> Result<Vec<SeriesPoint>, ChartError> {
        let figure: Value = serde_json::from_str(&self.to_json())?;
        let trace = figure["data"]
            .as_array()
            .and_then(|traces| traces.iter().find(|t| t["name"] == name))
            .ok_or_else(|| ChartError::MissingTrace(name.to_string()))?;

        let xs = trace["x"]
            .as_array()
            .ok_or_else(|| ChartError::Malformed("missing x values".to_string()))?;
        let ys = trace["y"]
            .as_array()
            .ok_or_else(|| ChartError::Malformed("missing y values".to_string()))?;
        if xs.len() != ys.len() {
            return Err(ChartError::Malformed(format!(
                "{} x values but {} y values",
                xs.len(),
                ys.len()
            )));
        }

        xs.iter()
            .zip(ys)
            .map(|(x, y)| {
                let date = x
                    .as_str()
                    .and_then(|s| NaiveDate::parse_from_str(s, DATE_FORMAT).ok())
                    .ok_or_else(|| ChartError::Malformed(format!("bad date {}", x)))?;
                let value = y
                    .as_f64()
                    .ok_or_else(|| ChartError::Malformed(format!("bad value {}", y)))?;
                Ok(SeriesPoint::new(date, value))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn history() -> Vec<SeriesPoint> {
        let start = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
        (0..10)
            .map(|i| SeriesPoint::new(start + Duration::days(i), 100.0 + i as f64))
            .collect()
    }

    fn forecast() -> ForecastResult {
        let last = NaiveDate::from_ymd_opt(2020, 1, 10).unwrap();
        ForecastResult::from_values(last, &[110.25, -3.5, 1.0 / 3.0, 2.0e9])
    }

    #[test]
    fn test_forecast_trace_round_trips() {
        let forecast = forecast();
        let chart = render(&history(), &forecast, "Overall", &Horizon::six_months());

        assert_eq!(chart.forecast_points().unwrap(), forecast.points);
        assert_eq!(chart.trace_points(HISTORY_TRACE).unwrap(), history());
    }

    #[test]
    fn test_title_uses_label_and_horizon_token() {
        let chart = render(&history(), &forecast(), "Overall", &Horizon::six_months());
        assert_eq!(chart.title(), "Forecast for Overall (6_months)");

        let chart = render(&history(), &forecast(), "temperature", &Horizon::from_token("5_years"));
        assert_eq!(chart.title(), "Forecast for temperature (5_years)");
        assert!(chart.to_json().contains("Forecast for temperature (5_years)"));
    }

    #[test]
    fn test_traces_are_styled_apart() {
        let chart = render(&history(), &forecast(), "Overall", &Horizon::six_months());
        let figure: Value = serde_json::from_str(&chart.to_json()).unwrap();
        let traces = figure["data"].as_array().unwrap();

        assert_eq!(traces.len(), 2);
        assert_eq!(traces[0]["name"], HISTORY_TRACE);
        assert_eq!(traces[0]["mode"], "lines");
        assert_eq!(traces[0]["line"]["color"], "blue");
        assert!(traces[0]["line"].get("dash").is_none());
        assert_eq!(traces[1]["name"], FORECAST_TRACE);
        assert_eq!(traces[1]["line"]["color"], "red");
        assert_eq!(traces[1]["line"]["dash"], "dash");
    }

    #[test]
    fn test_inline_html_is_a_fragment() {
        let chart = render(&history(), &forecast(), "Overall", &Horizon::six_months());
        let html = chart.to_inline_html("forecast-chart");

        assert!(html.contains("forecast-chart"));
        assert!(!html.to_lowercase().contains("<html"));
    }

    #[test]
    fn test_missing_trace_is_reported() {
        let chart = render(&history(), &forecast(), "Overall", &Horizon::six_months());
        assert!(matches!(chart.trace_points("Nope"), Err(ChartError::MissingTrace(_))));
    }
}
