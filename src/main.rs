//! POS Sales CLI
//!
//! Command-line front end for the POS API client.
//!
//! # Architecture Overview
//!
//! ```text
//!                     ┌───────────────────────────────────────────────────┐
//!                     │                    PosClient                       │
//!   pos-sales <cmd>   │  ┌──────────┐   ┌────────────┐   ┌─────────────┐  │
//!   ──────────────────┼─▶│  config  │──▶│ dispatcher │──▶│  strategy   │──┼──▶ POS API
//!                     │  │  loader  │   │ (fallback) │   │  headers    │  │
//!                     │  └──────────┘   └─────┬──────┘   └─────────────┘  │
//!                     │                       │  BearerToken only          │
//!                     │                       ▼                            │
//!                     │                 ┌────────────┐                     │
//!                     │                 │   token    │─────────────────────┼──▶ auth URL
//!                     │                 │  manager   │                     │
//!                     │                 └────────────┘                     │
//!   stdout (JSON)     │  ┌──────────┐   ┌────────────┐                     │
//!   ◀─────────────────┼──│ progress │◀──│ normalizer │◀── RawResponse      │
//!   stderr (message)  │  └──────────┘   └────────────┘                     │
//!                     └───────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use serde_json::json;

use pos_sales_client::config::load_config;
use pos_sales_client::observability::logging::init_logging;
use pos_sales_client::progress::{month_label, remaining_days, ProgressPercent};
use pos_sales_client::{ApiError, PosClient, SalesQuery};

#[derive(Parser)]
#[command(name = "pos-sales")]
#[command(about = "Monthly sales from the POS API", long_about = None)]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(short, long, default_value = "pos-sales.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Probe the health endpoint
    Health,
    /// Probe the sales endpoint without a date range
    Probe,
    /// Sales for an explicit date range
    Sales {
        /// First day, YYYY-MM-DD
        #[arg(long)]
        from: NaiveDate,
        /// Last day, YYYY-MM-DD
        #[arg(long)]
        to: NaiveDate,
    },
    /// Sales for a calendar month (defaults to the current one)
    Month {
        #[arg(long, requires = "month")]
        year: Option<i32>,
        #[arg(long, requires = "year")]
        month: Option<u32>,
    },
    /// Current month's progress towards the configured target
    Progress,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match load_config(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: failed to load {}: {}", cli.config.display(), e);
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = init_logging(&config.observability) {
        eprintln!("Error: failed to initialize logging: {}", e);
        return ExitCode::FAILURE;
    }

    tracing::info!("pos-sales v{} starting", env!("CARGO_PKG_VERSION"));

    let client = match PosClient::new(&config) {
        Ok(client) => client,
        Err(e) => {
            eprintln!("{}", e.user_message());
            return ExitCode::FAILURE;
        }
    };

    match run(cli.command, &client, config.dashboard.monthly_target).await {
        Ok(output) => {
            match serde_json::to_string_pretty(&output) {
                Ok(text) => println!("{}", text),
                Err(e) => {
                    eprintln!("Error: {}", e);
                    return ExitCode::FAILURE;
                }
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!(error = %e, "Command failed");
            eprintln!("{}", e.user_message());
            ExitCode::FAILURE
        }
    }
}

async fn run(
    command: Commands,
    client: &PosClient,
    monthly_target: f64,
) -> Result<serde_json::Value, ApiError> {
    let output = match command {
        Commands::Health => {
            let report = client.test_connection().await?;
            json!({ "message": "API connection successful!", "report": report })
        }
        Commands::Probe => {
            let report = client.probe_sales_endpoint().await?;
            json!({ "report": report })
        }
        Commands::Sales { from, to } => {
            let query = SalesQuery::new(from, to)?;
            let sales = client.sales_for_range(&query).await?;
            json!(sales)
        }
        Commands::Month { year, month } => {
            let sales = match (year, month) {
                (Some(year), Some(month)) => client.sales_for_month(year, month).await?,
                _ => client.current_month_sales().await?,
            };
            json!(sales)
        }
        Commands::Progress => {
            let today = chrono::Local::now().date_naive();
            let sales = client.current_month_sales().await?;
            let progress = ProgressPercent::from_sales(&sales, monthly_target).ok_or_else(|| {
                ApiError::InvalidRequest("dashboard.monthly_target is not configured".into())
            })?;
            json!({
                "month": month_label(today),
                "progress": progress,
                "tier": progress.tier(),
                "remaining_days": remaining_days(today),
                "sales": sales,
            })
        }
    };
    Ok(output)
}
