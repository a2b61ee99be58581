//! HTML pages.
//!
//! Templates are compiled into the binary and registered once at startup.
//! Every page is wrapped in the `layout` partial.

use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use compute::ForecastRun;
use handlebars::{Handlebars, RenderError, TemplateError};
use serde::Serialize;
use serde_json::json;
use tracing::error;

use crate::chart::ChartDocument;
use crate::error::AppError;

const LAYOUT: &str = include_str!("../templates/layout.hbs");
const INDEX: &str = include_str!("../templates/index.hbs");
const FORECAST_OPTIONS: &str = include_str!("../templates/forecast_options.hbs");
const RESULT: &str = include_str!("../templates/result.hbs");
const ERROR: &str = include_str!("../templates/error.hbs");

pub const CHART_DIV_ID: &str = "forecast-chart";

pub struct Views {
    registry: Handlebars<'static>,
}

impl std::fmt::Debug for Views {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Views")
            .field("templates", &self.registry.get_templates().len())
            .finish()
    }
}

/// A rendered error page with the status it should be served under.
#[derive(Debug)]
pub struct ErrorPage {
    pub status: StatusCode,
    pub html: String,
}

impl IntoResponse for ErrorPage {
    fn into_response(self) -> Response {
        (self.status, Html(self.html)).into_response()
    }
}

#[derive(Serialize)]
struct OptionsContext<'a> {
    title: &'a str,
    filename: &'a str,
    action: String,
    columns: &'a [String],
    overall_available: bool,
}

impl Views {
    pub fn new() -> Result<Self, TemplateError> {
        let mut registry = Handlebars::new();
        registry.set_strict_mode(true);
        registry.register_partial("layout", LAYOUT)?;
        registry.register_template_string("index", INDEX)?;
        registry.register_template_string("forecast_options", FORECAST_OPTIONS)?;
        registry.register_template_string("result", RESULT)?;
        registry.register_template_string("error", ERROR)?;
        Ok(Self { registry })
    }

    pub fn render<T: Serialize>(&self, name: &str, data: &T) -> Result<String, RenderError> {
        self.registry.render(name, data)
    }

    pub fn index_page(&self) -> Result<String, RenderError> {
        self.render("index", &json!({ "title": "Energy load forecasting" }))
    }

    /// Column picker for an uploaded dataset. `columns` must already exclude
    /// the overall column; `overall_available` adds the "Overall" choice.
    pub fn options_page(
        &self,
        filename: &str,
        columns: &[String],
        overall_available: bool,
    ) -> Result<String, RenderError> {
        let context = OptionsContext {
            title: "Choose what to forecast",
            filename,
            action: format!("/forecast/{}", urlencoding::encode(filename)),
            columns,
            overall_available,
        };
        self.render("forecast_options", &context)
    }

    pub fn result_page(
        &self,
        filename: &str,
        run: &ForecastRun,
        chart: &ChartDocument,
    ) -> Result<String, RenderError> {
        let context = json!({
            "title": chart.title(),
            "filename": filename,
            "steps": run.horizon.steps(),
            "chart": chart.to_inline_html(CHART_DIV_ID),
            "alpha": format!("{:.4}", run.params.alpha),
            "beta": format!("{:.4}", run.params.beta),
            "gamma": format!("{:.4}", run.params.gamma),
            "empty_days": run.history.empty_days(),
            "options_url": format!("/forecast/{}", urlencoding::encode(filename)),
        });
        self.render("result", &context)
    }

    /// Renders `err` for a browser. Falls back to a bare page if the error
    /// template itself fails.
    pub fn error_page(&self, err: &AppError) -> ErrorPage {
        err.log();
        let status = err.status();
        let message = err.to_string();
        let html = self
            .render("error", &json!({ "title": "Something went wrong", "message": message }))
            .unwrap_or_else(|render_err| {
                error!("Failed to render error page: {}", render_err);
                format!(
                    "<!DOCTYPE html><html><body><p>{}</p></body></html>",
                    handlebars::html_escape(&message)
                )
            });
        ErrorPage { status, html }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use compute::ForecastError;

    #[test]
    fn test_index_page_has_upload_form() {
        let views = Views::new().unwrap();
        let html = views.index_page().unwrap();

        assert!(html.contains("enctype=\"multipart/form-data\""));
        assert!(html.contains("name=\"file\""));
        assert!(html.contains("<!DOCTYPE html>"));
    }

    #[test]
    fn test_options_page_lists_columns() {
        let views = Views::new().unwrap();
        let columns = vec!["temperature".to_string(), "price & tax".to_string()];

        let html = views.options_page("energy data.csv", &columns, true).unwrap();
        assert!(html.contains("<option value=\"overall\">Overall</option>"));
        assert!(html.contains("<option value=\"temperature\">temperature</option>"));
        assert!(html.contains("price &amp; tax"));
        assert!(html.contains("action=\"/forecast/energy%20data.csv\""));

        let html = views.options_page("energy.csv", &columns, false).unwrap();
        assert!(!html.contains("value=\"overall\""));
    }

    #[test]
    fn test_error_page_escapes_message() {
        let views = Views::new().unwrap();
        let err = AppError::Forecast(ForecastError::Parse("bad <row>".into()));

        let page = views.error_page(&err);
        assert_eq!(page.status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(page.html.contains("bad &lt;row&gt;"));
    }
}
