//! Holiday Feed CLI
//!
//! Local execution entry point for ingestion and read-side queries.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};
use holiday_feed::{
    error::{AppError, Result},
    models::Config,
    pipeline,
    services::AlertService,
    storage::{HolidayReader, LocalStorage},
    utils::http,
};
use serde::Serialize;

/// Holiday Feed - office calendar ingestion and closure alerts
#[derive(Parser, Debug)]
#[command(
    name = "holiday-feed",
    version,
    about = "Office calendar ingestion and typhoon closure alerts"
)]
struct Cli {
    /// Path to storage directory containing config.toml
    #[arg(short, long, default_value = "storage")]
    storage_dir: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Download the calendar CSV and rebuild the year documents
    Fetch,

    /// Re-annotate year documents already on disk
    Process,

    /// Print the holidays of one year
    Show {
        /// Four digit year, e.g. 2025
        #[arg(long)]
        year: String,
    },

    /// Print the year index
    Years,

    /// Print current full-city closure alerts
    Realtime,

    /// Validate configuration
    Validate,
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

/// Pretty-print a value as JSON on stdout.
fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config_path = cli.storage_dir.join("config.toml");
    let config = Config::load_or_default(&config_path);
    let output_dir = config.output_dir(&cli.storage_dir);
    log::debug!("Output directory: {}", output_dir.display());

    let storage = LocalStorage::new(&output_dir);

    match cli.command {
        Command::Fetch => {
            if !config_path.exists() {
                log::error!(
                    "Config not found at {}. The source URL must be configured.",
                    config_path.display()
                );
                return Err(AppError::config("config.toml not found"));
            }
            if let Err(e) = config.validate() {
                log::error!("Config validation failed: {}", e);
                return Err(e);
            }

            let client = http::create_download_client(&config.source)?;
            let report = pipeline::run_fetch(&config.source, &storage, &client).await?;

            for (year, error) in &report.years_failed {
                log::warn!("Year {} was not written: {}", year, error);
            }
            if report.index_years.is_none() {
                log::warn!("Year index was not updated");
            }
            log::info!(
                "Fetch complete in {}s",
                (report.finished_at - report.started_at).num_seconds()
            );
        }

        Command::Process => {
            let report = pipeline::run_process(&storage).await?;
            log::info!(
                "Process complete: {} updated, {} skipped",
                report.files_updated.len(),
                report.files_failed.len()
            );
        }

        Command::Show { year } => {
            let reader = HolidayReader::new(
                storage,
                Duration::from_secs(config.reader.cache_ttl_secs),
            );
            let records = reader.holidays_for_year(&year).await?;
            print_json(records.as_slice())?;
        }

        Command::Years => {
            let reader = HolidayReader::new(
                storage,
                Duration::from_secs(config.reader.cache_ttl_secs),
            );
            print_json(&reader.years().await?)?;
        }

        Command::Realtime => {
            let service = AlertService::new(&config.realtime)?;
            let alerts = service.current_alerts().await;
            log::info!("{} full-city alert(s)", alerts.len());
            print_json(&alerts)?;
        }

        Command::Validate => {
            log::info!("Validating configuration...");

            if let Err(e) = config.validate() {
                log::error!("Config validation failed: {}", e);
                return Err(e);
            }
            log::info!("✓ Source: {}", config.source.url);
            log::info!(
                "✓ Timeouts: connect {}s, read {}s",
                config.source.connect_timeout_secs,
                config.source.read_timeout_secs
            );
            log::info!("✓ Output: {}", output_dir.display());
            log::info!("✓ Cities: {}", config.realtime.city_names.join(", "));

            log::info!("All validations passed!");
        }
    }

    Ok(())
}
