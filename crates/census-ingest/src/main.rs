//! census-ingest - one-shot CSV load without the HTTP server

use anyhow::{Context, Result};
use census_common::logging::{init_logging, LogConfig, LogLevel};
use census_ingest::{store::PgUserStore, IngestPipeline, ReportGenerator, DEFAULT_BATCH_SIZE};
use clap::{Parser, Subcommand};
use sqlx::postgres::PgPoolOptions;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "census-ingest")]
#[command(author, version, about = "Load a people CSV into PostgreSQL and report age distribution")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// PostgreSQL connection string
    #[arg(long, env = "DATABASE_URL", global = true, hide_env_values = true)]
    database_url: Option<String>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Load a CSV file, then print the report
    Load {
        /// CSV file to load
        #[arg(short, long, env = "CSV_FILE_PATH")]
        file: PathBuf,

        /// Records per transaction
        #[arg(short, long, env = "INGEST_BATCH_SIZE", default_value_t = DEFAULT_BATCH_SIZE)]
        batch_size: usize,
    },

    /// Print the age distribution report for what is already loaded
    Report,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let level = if cli.verbose { LogLevel::Debug } else { LogLevel::Info };
    let log_config = LogConfig::builder()
        .level(level)
        .log_file_prefix("census-ingest")
        .filter_directives("sqlx=warn")
        .build()
        .merge_env()?;
    let _guard = init_logging(&log_config)?;

    let database_url = cli
        .database_url
        .context("DATABASE_URL must be set or passed with --database-url")?;
    let pool = PgPoolOptions::new()
        .max_connections(2)
        .connect(&database_url)
        .await
        .context("Failed to connect to database")?;
    let store = Arc::new(PgUserStore::new(pool));

    match cli.command {
        Command::Load { file, batch_size } => {
            info!(path = %file.display(), "Loading CSV");
            let pipeline = IngestPipeline::new(store).with_batch_size(batch_size);
            let summary = pipeline
                .run_file(&file)
                .await
                .with_context(|| format!("Ingestion of {} failed", file.display()))?;
            info!(
                records = summary.records_processed,
                batches = summary.batches,
                "Load complete"
            );
        }
        Command::Report => {
            ReportGenerator::new(store)
                .generate()
                .await
                .context("Report generation failed")?;
        }
    }

    Ok(())
}
