//! Export command implementation

use crate::address::{BlockNumber, WalletAddress};
use crate::downloader::config::{FetchSettings, CALLS_PER_SECOND_LIMIT};
use crate::downloader::executor::DEFAULT_OUTPUT_DIR;
use crate::downloader::{ExportConfig, ExportReport, HistoryExecutor};
use crate::registry::{NetworkEntry, NetworkRegistry, TokenContract};
use clap::{Parser, Subcommand};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use tracing::{info, warn};

use super::CliError;

/// Parse a `SYMBOL=0xCONTRACT` token argument
pub fn parse_token_arg(s: &str) -> Result<TokenContract, String> {
    let (symbol, contract) = s
        .split_once('=')
        .ok_or_else(|| format!("'{s}' is not in SYMBOL=0xCONTRACT form"))?;

    let symbol = symbol.trim();
    if symbol.is_empty() {
        return Err(format!("'{s}' has an empty symbol"));
    }

    let contract = WalletAddress::parse(contract).map_err(|e| e.to_string())?;
    Ok(TokenContract::new(symbol.to_uppercase(), contract.as_str()))
}

/// Transaction History Exporter CLI
#[derive(Parser, Debug)]
#[command(name = "tx-history-exporter")]
#[command(about = "Export the transaction history of an address from an Etherscan-compatible explorer", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Output format (json or human)
    #[arg(long, global = true, default_value = "human")]
    pub output_format: OutputFormat,

    /// Maximum number of transport retries per page (default: 5, range: 1-20)
    #[arg(long, global = true, default_value = "5", value_parser = clap::value_parser!(u32).range(1..=20))]
    pub max_retries: u32,

    /// Explorer calls per second (default: 5)
    #[arg(long, global = true, default_value_t = CALLS_PER_SECOND_LIMIT, value_parser = clap::value_parser!(u32).range(1..=100))]
    pub calls_per_second: u32,

    /// Serve Prometheus metrics on this address (e.g., 127.0.0.1:9090)
    #[arg(long, global = true)]
    pub metrics_addr: Option<SocketAddr>,
}

/// CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Export transaction history to CSV
    Export(ExportArgs),

    /// List supported networks and tokens
    Networks(super::NetworksCommand),

    /// Validate addresses and block numbers
    Validate(super::ValidateCommand),
}

/// Export command arguments
#[derive(Parser, Debug)]
pub struct ExportArgs {
    /// Address to export (0x followed by 40 hex digits)
    #[arg(long)]
    pub address: WalletAddress,

    /// Network name from the registry (see `networks list`)
    #[arg(long, default_value = "ethereum")]
    pub network: String,

    /// First block to include
    #[arg(long, default_value = "0")]
    pub start_block: BlockNumber,

    /// Last block to include (number or "latest")
    #[arg(long, default_value = "latest")]
    pub end_block: BlockNumber,

    /// Explorer API key
    #[arg(long, env = "EXPLORER_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Registry token symbols to export, comma separated
    #[arg(long, value_delimiter = ',', default_value = "USDC,USDT")]
    pub tokens: Vec<String>,

    /// Additional token as SYMBOL=0xCONTRACT (repeatable)
    #[arg(long = "token", value_parser = parse_token_arg)]
    pub custom_tokens: Vec<TokenContract>,

    /// Skip native-asset transactions
    #[arg(long, default_value_t = false)]
    pub no_native: bool,

    /// Output directory
    #[arg(long, default_value = DEFAULT_OUTPUT_DIR)]
    pub output_dir: PathBuf,

    /// Override the network's explorer API endpoint
    #[arg(long)]
    pub base_url: Option<String>,
}

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// Human-readable output
    Human,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(OutputFormat::Json),
            "human" => Ok(OutputFormat::Human),
            _ => Err(format!("Invalid output format: {s}")),
        }
    }
}

impl ExportArgs {
    /// Token list: registry symbols first, then custom tokens
    ///
    /// A custom token replaces a registry token of the same symbol. Symbols the
    /// registry does not know come back without a contract and are skipped by
    /// the executor.
    pub fn resolve_tokens(&self, network: &NetworkEntry) -> Vec<TokenContract> {
        let mut tokens: Vec<TokenContract> = self
            .tokens
            .iter()
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .map(|symbol| {
                network
                    .token(symbol)
                    .cloned()
                    .unwrap_or_else(|| TokenContract::new(symbol.to_uppercase(), ""))
            })
            .collect();

        for custom in &self.custom_tokens {
            match tokens
                .iter_mut()
                .find(|t| t.symbol.eq_ignore_ascii_case(&custom.symbol))
            {
                Some(existing) => *existing = custom.clone(),
                None => tokens.push(custom.clone()),
            }
        }

        tokens
    }

    /// Build the export configuration
    pub fn to_config(&self, cli: &Cli, registry: &NetworkRegistry) -> Result<ExportConfig, CliError> {
        let network = registry.network(&self.network)?;
        let base_url = self
            .base_url
            .clone()
            .unwrap_or_else(|| network.base_url.clone());

        let api_key = self.api_key.clone().unwrap_or_default();
        if api_key.is_empty() {
            warn!("No explorer API key given (--api-key or EXPLORER_API_KEY); requests may be rejected");
        }

        let settings = FetchSettings::default().with_max_transport_retries(cli.max_retries);

        Ok(ExportConfig::new(self.address.clone(), base_url, api_key)
            .with_block_range(self.start_block, self.end_block)
            .with_native(!self.no_native)
            .with_native_symbol(network.native_symbol.clone())
            .with_native_decimals(network.native_decimals)
            .with_tokens(self.resolve_tokens(network))
            .with_output_dir(self.output_dir.clone())
            .with_calls_per_second(cli.calls_per_second)
            .with_settings(settings)
            .with_progress(cli.output_format == OutputFormat::Human))
    }

    /// Execute the export
    pub async fn execute(&self, cli: &Cli) -> Result<(), CliError> {
        let registry = NetworkRegistry::load_embedded()?;
        let config = self.to_config(cli, &registry)?;

        info!(
            address = %config.address,
            network = %self.network,
            base_url = %config.base_url,
            "Export requested"
        );

        let report = HistoryExecutor::new(config).run().await?;

        match cli.output_format {
            OutputFormat::Json => output_json(&report)?,
            OutputFormat::Human => output_human(&report),
        }
        Ok(())
    }
}

/// Output report as JSON
fn output_json(report: &ExportReport) -> Result<(), CliError> {
    let mut output = serde_json::to_value(report)?;
    output["success"] = serde_json::Value::Bool(true);
    output["complete"] = serde_json::Value::Bool(report.is_complete());
    output["total_records"] = serde_json::Value::from(report.total_records());
    println!("{}", serde_json::to_string(&output)?);
    Ok(())
}

/// Output report in human-readable format
fn output_human(report: &ExportReport) {
    println!("\nExport finished for {}", report.address);
    for asset in &report.assets {
        let target = asset
            .output_path
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "no file written".to_string());
        println!(
            "  {}: {} records, {} ({})",
            asset.symbol, asset.records, asset.stop_detail, target
        );
        if asset.stats.transport_retries > 0 || asset.stats.rate_limit_retries > 0 {
            println!(
                "    Retries: {} transport, {} rate limit",
                asset.stats.transport_retries, asset.stats.rate_limit_retries
            );
        }
    }

    if let Some(path) = &report.combined_file {
        println!("Combined: {}", path.display());
    }
    if !report.skipped_tokens.is_empty() {
        println!("Skipped (no contract address): {}", report.skipped_tokens.join(", "));
    }
    println!("Total records: {}", report.total_records());

    if !report.is_complete() {
        eprintln!("\nWarning: some assets stopped early; their files may be incomplete.");
    }
}
