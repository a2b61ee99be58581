use anyhow::Result;
use compute::{DEFAULT_SEASONAL_PERIOD, ForecastEngine, MAX_SEASONAL_PERIOD, MIN_SEASONAL_PERIOD};
use std::path::PathBuf;
use std::sync::Arc;

use crate::schemas::AppState;
use crate::storage::DatasetStore;
use crate::views::Views;

pub const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0:3000";
pub const DEFAULT_UPLOAD_DIR: &str = "./uploaded";
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 50 * 1024 * 1024;

/// Where uploaded datasets are kept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageConfig {
    /// Directory holding uploaded files, keyed by filename
    pub upload_dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            upload_dir: PathBuf::from(DEFAULT_UPLOAD_DIR),
        }
    }
}

/// Server configuration gathered from the command line and environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub bind_address: String,
    pub storage: StorageConfig,
    /// Largest accepted request body, in bytes
    pub max_upload_bytes: usize,
    /// Seasonal period of the forecast model, in days
    pub seasonal_period: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: DEFAULT_BIND_ADDRESS.to_string(),
            storage: StorageConfig::default(),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            seasonal_period: DEFAULT_SEASONAL_PERIOD,
        }
    }
}

/// Initialize application state: open (and create) the upload directory,
/// compile the page templates and configure the forecast engine.
pub fn initialize_app_state(config: &ServerConfig) -> Result<AppState> {
    anyhow::ensure!(
        (MIN_SEASONAL_PERIOD..=MAX_SEASONAL_PERIOD).contains(&config.seasonal_period),
        "Seasonal period must be between {} and {} days, got {}",
        MIN_SEASONAL_PERIOD,
        MAX_SEASONAL_PERIOD,
        config.seasonal_period
    );
    tracing::info!("Using upload directory: {}", config.storage.upload_dir.display());
    let store = DatasetStore::open(&config.storage)?;

    let views = Views::new()?;

    Ok(AppState {
        store,
        engine: ForecastEngine::new(config.seasonal_period),
        views: Arc::new(views),
        max_upload_bytes: config.max_upload_bytes,
    })
}
