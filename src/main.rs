use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod chart;
mod cli;
mod config;
mod error;
mod handlers;
mod helpers;
mod router;
mod schemas;
mod storage;
mod views;

#[cfg(test)]
mod test_utils;

use cli::Cli;

/// Main entry point for the Loadcast application.
#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "loadcast=debug,compute=debug,tower_http=debug,axum::rejection=trace".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    dotenvy::dotenv().ok();

    Cli::parse().run().await
}
