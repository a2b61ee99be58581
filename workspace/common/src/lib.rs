//! Common transport-layer types shared between the compute crate and the web layer.
//! The forecast pipeline produces these and the HTTP handlers serialize them
//! directly, so both sides agree on one shape.

mod selection;
mod timeseries;

pub use selection::{ColumnSelector, Horizon, HorizonKind, OVERALL_COLUMN, OVERALL_TOKEN};
pub use timeseries::{ForecastResult, SeriesPoint};

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Generic API response wrapper used by the JSON endpoints.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ApiResponse<T> {
    /// Response data
    pub data: T,
    /// Response message
    pub message: String,
    /// Success flag
    pub success: bool,
}

impl<T> ApiResponse<T> {
    /// Wraps successful data with a message.
    pub fn ok(data: T, message: impl Into<String>) -> Self {
        Self {
            data,
            message: message.into(),
            success: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_response_ok_sets_success() {
        let response = ApiResponse::ok(vec![1, 2, 3], "done");
        assert!(response.success);
        assert_eq!(response.message, "done");

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["data"], serde_json::json!([1, 2, 3]));
    }
}
