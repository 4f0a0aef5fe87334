//! Cohort Pulse CLI
//!
//! Command-line interface for Cohort Pulse operations:
//! - Fetch the sheet once and print derived data
//! - Generate a default config file

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use cohort_pulse::api::dto::MemberList;
use cohort_pulse::cache::CacheManager;
use cohort_pulse::config::{generate_default_config, Config};
use cohort_pulse::metrics::{build_correlation_data, calculate_overview};
use cohort_pulse::sheet::{Credentials, SheetsClient};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "cohort-pulse")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Cohort engagement metrics from a member spreadsheet")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file (default: COHORT_PULSE_CONFIG or the standard locations)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Fetch the sheet once and print the result as JSON
    Fetch {
        /// What to print
        #[arg(short, long, value_enum, default_value_t = Output::Overview)]
        output: Output,
    },

    /// Generate default config file
    Config {
        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum Output {
    Overview,
    Members,
    Correlations,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Diagnostics go to stderr so stdout stays valid JSON
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cohort_pulse=warn".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Fetch { output } => {
            let config = Config::load_default(cli.config.as_deref())?;
            config.validate()?;

            let credentials = Credentials::load(&config.sheet.credentials_file)
                .context("loading Google credentials")?;
            let client = SheetsClient::new(config.sheet.clone(), credentials)?;
            let cache = CacheManager::new(Arc::new(client))
                .with_fetch_timeout(config.refresh.fetch_timeout());

            // Unlike the server, a one-shot fetch reports failures instead of
            // falling back to empty data
            let snapshot = cache.try_refresh().await.context("fetching the sheet")?;

            let json = match output {
                Output::Overview => {
                    serde_json::to_string_pretty(&calculate_overview(snapshot.records()))?
                }
                Output::Members => serde_json::to_string_pretty(&MemberList(snapshot))?,
                Output::Correlations => {
                    serde_json::to_string_pretty(&build_correlation_data(snapshot.records()))?
                }
            };

            println!("{}", json);
        }

        Commands::Config { output } => {
            let config = generate_default_config();

            match output {
                Some(path) => {
                    // Create parent directory if needed
                    if let Some(parent) = path.parent() {
                        std::fs::create_dir_all(parent)?;
                    }
                    std::fs::write(&path, &config)
                        .with_context(|| format!("writing {:?}", path))?;
                    println!("Config written to {:?}", path);
                }
                None => {
                    print!("{}", config);
                }
            }
        }
    }

    Ok(())
}
