use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

pub mod commands;

use commands::{forecast_file, serve};

use crate::config::{ServerConfig, StorageConfig};

#[derive(Parser)]
#[command(name = "loadcast")]
#[command(about = "Energy load forecasting web application and CLI")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the web server
    Serve {
        /// Bind address for the web server
        ///
        /// Format: IP:PORT (e.g., 0.0.0.0:3000, 127.0.0.1:8080)
        #[arg(short, long, env = "BIND_ADDRESS", default_value = "0.0.0.0:3000")]
        bind_address: String,

        /// Directory uploaded datasets are stored in. Created if missing.
        #[arg(short, long, env = "UPLOAD_DIR", default_value = "./uploaded")]
        upload_dir: PathBuf,

        /// Largest accepted upload, in bytes
        #[arg(long, env = "MAX_UPLOAD_BYTES", default_value_t = 50 * 1024 * 1024)]
        max_upload_bytes: usize,

        /// Seasonal period of the model, in days
        #[arg(
            long,
            env = "SEASONAL_PERIOD",
            default_value_t = compute::DEFAULT_SEASONAL_PERIOD,
            value_parser = parse_seasonal_period
        )]
        seasonal_period: usize,
    },
    /// Forecast a column of a local CSV file and write the chart as HTML
    ///
    /// Examples:
    ///   loadcast forecast -f energy_dataset.csv
    ///   loadcast forecast -f energy_dataset.csv -v temperature -H 5_years -o temp.html
    Forecast {
        /// CSV file with a `time` column
        #[arg(short, long)]
        file: PathBuf,

        /// `overall` or the name of a numeric column
        #[arg(short, long, default_value = "overall")]
        variable: String,

        /// `6_months` for 180 days; any other value forecasts 1825 days
        #[arg(short = 'H', long, default_value = "6_months")]
        horizon: String,

        /// Where to write the chart
        #[arg(short, long, default_value = "forecast.html")]
        output: PathBuf,

        /// Seasonal period of the model, in days
        #[arg(
            long,
            env = "SEASONAL_PERIOD",
            default_value_t = compute::DEFAULT_SEASONAL_PERIOD,
            value_parser = parse_seasonal_period
        )]
        seasonal_period: usize,
    },
}

fn parse_seasonal_period(raw: &str) -> Result<usize, String> {
    let period: usize = raw.parse().map_err(|e| format!("{}", e))?;
    if !(compute::MIN_SEASONAL_PERIOD..=compute::MAX_SEASONAL_PERIOD).contains(&period) {
        return Err(format!(
            "must be between {} and {}",
            compute::MIN_SEASONAL_PERIOD,
            compute::MAX_SEASONAL_PERIOD
        ));
    }
    Ok(period)
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        match self.command {
            Commands::Serve {
                bind_address,
                upload_dir,
                max_upload_bytes,
                seasonal_period,
            } => {
                let config = ServerConfig {
                    bind_address,
                    storage: StorageConfig { upload_dir },
                    max_upload_bytes,
                    seasonal_period,
                };
                serve(&config).await?;
            }
            Commands::Forecast {
                file,
                variable,
                horizon,
                output,
                seasonal_period,
            } => {
                forecast_file(&file, &variable, &horizon, &output, seasonal_period)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serve_defaults() {
        let cli = Cli::try_parse_from(["loadcast", "serve"]).unwrap();
        match cli.command {
            Commands::Serve {
                upload_dir,
                max_upload_bytes,
                ..
            } => {
                assert_eq!(upload_dir, PathBuf::from("./uploaded"));
                assert_eq!(max_upload_bytes, crate::config::DEFAULT_MAX_UPLOAD_BYTES);
            }
            Commands::Forecast { .. } => panic!("expected serve"),
        }
    }

    #[test]
    fn test_seasonal_period_is_bounded() {
        for bad in ["0", "1", "3651", "-7", "weekly"] {
            assert!(
                Cli::try_parse_from(["loadcast", "serve", "--seasonal-period", bad]).is_err(),
                "{} should be rejected",
                bad
            );
        }

        let cli = Cli::try_parse_from(["loadcast", "forecast", "-f", "a.csv", "--seasonal-period", "7"])
            .unwrap();
        match cli.command {
            Commands::Forecast { seasonal_period, .. } => assert_eq!(seasonal_period, 7),
            Commands::Serve { .. } => panic!("expected forecast"),
        }
    }

    #[test]
    fn test_forecast_arguments() {
        let cli = Cli::try_parse_from([
            "loadcast", "forecast", "-f", "data.csv", "-v", "temperature", "-H", "5_years",
        ])
        .unwrap();
        match cli.command {
            Commands::Forecast {
                file,
                variable,
                horizon,
                output,
                ..
            } => {
                assert_eq!(file, PathBuf::from("data.csv"));
                assert_eq!(variable, "temperature");
                assert_eq!(horizon, "5_years");
                assert_eq!(output, PathBuf::from("forecast.html"));
            }
            Commands::Serve { .. } => panic!("expected forecast"),
        }
    }
}
