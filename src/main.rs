//! Main entry point for the tx-history-exporter CLI

use clap::Parser;
use tracing::error;
use tracing_subscriber::EnvFilter;
use tx_history_exporter::cli::{Cli, Commands};
use tx_history_exporter::metrics;

/// Initialize tracing subscriber with optional JSON formatting
///
/// Logs go to stderr so `--output-format json` keeps stdout machine-readable.
fn init_tracing() {
    let json_format = std::env::var("LOG_FORMAT")
        .map(|v| v.to_lowercase() == "json")
        .unwrap_or(false);

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("tx_history_exporter=info"));

    if json_format {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    if let Some(addr) = cli.metrics_addr {
        metrics::init_metrics(addr)?;
    }

    match cli.command {
        Commands::Export(ref args) => args.execute(&cli).await?,
        Commands::Networks(ref networks_cmd) => networks_cmd.execute()?,
        Commands::Validate(ref validate_cmd) => validate_cmd.execute()?,
    }
    Ok(())
}

#[tokio::main]
async fn main() {
    init_tracing();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        error!("Command failed: {:#}", e);
        std::process::exit(1);
    }
}
