use thiserror::Error;
use tracing::warn;

/// Error types for the forecast pipeline.
///
/// The display text of each variant is the message shown to the user, so it
/// carries no prefix.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ForecastError {
    /// A required column is missing, there are no numeric columns, or the
    /// requested column is unknown or not numeric.
    #[error("{0}")]
    Schema(String),

    /// The uploaded file or one of its timestamps could not be parsed.
    #[error("{0}")]
    Parse(String),

    /// The series is too short or degenerate for the seasonal model.
    #[error("{0}")]
    ModelFit(String),
}

impl ForecastError {
    /// Stable machine-readable code for API responses.
    pub fn code(&self) -> &'static str {
        match self {
            ForecastError::Schema(_) => "SCHEMA_ERROR",
            ForecastError::Parse(_) => "PARSE_ERROR",
            ForecastError::ModelFit(_) => "MODEL_FIT_ERROR",
        }
    }
}

// Polars only fails on the read path, so every error it raises is a parse failure.
impl From<polars::error::PolarsError> for ForecastError {
    fn from(error: polars::error::PolarsError) -> Self {
        let err = match error {
            polars::error::PolarsError::NoData(_) => {
                ForecastError::Parse(format!("The uploaded file contains no data: {}", error))
            }
            polars::error::PolarsError::ComputeError(_) => {
                ForecastError::Parse(format!("Could not parse the uploaded file: {}", error))
            }
            _ => ForecastError::Parse(format!("Could not read the uploaded file: {}", error)),
        };
        warn!(?err, "DataFrame error");
        err
    }
}

/// Type alias for Result with ForecastError
pub type Result<T> = std::result::Result<T, ForecastError>;
