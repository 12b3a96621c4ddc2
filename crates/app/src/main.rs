use std::path::PathBuf;

use clap::Parser;
use rust_decimal::Decimal;
use tracing_subscriber::EnvFilter;

mod commands;
mod render;
mod settings;

use commands::ReconcileRequest;
use render::RenderOptions;
use settings::{Overrides, Settings};

#[derive(Parser, Debug)]
#[command(
    name = "concord",
    version,
    about = "Reconcile an internal ledger export against a bank statement."
)]
struct Cli {
    /// Internal accounting export (CSV)
    #[arg(long)]
    internal: PathBuf,
    /// Bank statement export (CSV)
    #[arg(long)]
    bank: PathBuf,
    /// Settings file with [matching], [internal] and [bank] sections
    #[arg(long)]
    config: Option<PathBuf>,
    /// Maximum date distance in days
    #[arg(long)]
    date_tolerance: Option<i64>,
    /// Minimum vendor similarity, 0.0 to 1.0
    #[arg(long)]
    threshold: Option<f64>,
    /// Amount bucket width
    #[arg(long)]
    bucket_width: Option<Decimal>,
    /// Score candidates on this many blocking workers
    #[arg(long, default_value_t = 1)]
    workers: usize,
    /// Write the full report as JSON
    #[arg(long)]
    json: Option<PathBuf>,
    /// List unmatched records on both sides
    #[arg(long)]
    show_unmatched: bool,
    /// Show the N most frequent unmatched internal vendors
    #[arg(long, default_value_t = 10)]
    top_vendors: usize,
    /// Print per-date amount totals of both ledgers
    #[arg(long)]
    daily: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let settings = Settings::load(cli.config.as_deref())?.with_overrides(&Overrides {
        date_tolerance_days: cli.date_tolerance,
        similarity_threshold: cli.threshold,
        amount_bucket_width: cli.bucket_width,
    });

    commands::reconcile(ReconcileRequest {
        internal: cli.internal,
        bank: cli.bank,
        settings,
        workers: cli.workers,
        json: cli.json,
        render: RenderOptions {
            show_unmatched: cli.show_unmatched,
            top_vendors: cli.top_vendors,
            daily: cli.daily,
        },
    })
    .await?;

    Ok(())
}
