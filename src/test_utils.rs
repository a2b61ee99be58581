#[cfg(test)]
pub mod test_utils {
    use crate::config::{initialize_app_state, ServerConfig, StorageConfig};
    use crate::router::create_router;
    use crate::schemas::AppState;

    pub use compute::testing::daily_energy_csv;
    use axum::Router;
    use tempfile::TempDir;
    use tracing::Level;
    use tracing_subscriber::FmtSubscriber;

    /// Create AppState for testing over a fresh temporary upload directory.
    ///
    /// The directory is removed when the returned guard is dropped, so keep
    /// it alive for the duration of the test.
    pub fn setup_test_app_state() -> (AppState, TempDir) {
        let dir = tempfile::tempdir().expect("Failed to create temporary upload directory");
        let config = ServerConfig {
            storage: StorageConfig {
                upload_dir: dir.path().to_path_buf(),
            },
            ..ServerConfig::default()
        };
        let state = initialize_app_state(&config).expect("Failed to initialize app state");
        (state, dir)
    }

    /// Initialize tracing for tests with output to STDERR.
    ///
    /// The log level is read from RUST_LOG and defaults to WARN.
    fn init_test_tracing() -> tracing::subscriber::DefaultGuard {
        let log_level = std::env::var("RUST_LOG")
            .ok()
            .and_then(|level| level.parse::<Level>().ok())
            .unwrap_or(Level::WARN);

        let subscriber = FmtSubscriber::builder()
            .with_max_level(log_level)
            .with_writer(std::io::stderr)
            .finish();
        tracing::subscriber::set_default(subscriber)
    }

    /// Create axum app for testing
    pub fn setup_test_app() -> (Router, TempDir) {
        let _guard = init_test_tracing();

        let (state, dir) = setup_test_app_state();
        (create_router(state), dir)
    }
}
