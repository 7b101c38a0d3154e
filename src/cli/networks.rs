//! CLI command for listing supported networks

use crate::registry::{NetworkEntry, NetworkRegistry};
use anyhow::{Context, Result};
use clap::Args;
use serde_json::json;

/// Networks subcommand
#[derive(Debug, Args)]
pub struct NetworksCommand {
    #[command(subcommand)]
    action: NetworksAction,
}

/// Networks actions
#[derive(Debug, clap::Subcommand)]
enum NetworksAction {
    /// List registered networks with their explorer endpoint and tokens
    List {
        /// Optional network name filter (case-insensitive substring)
        pattern: Option<String>,

        /// Output format
        #[arg(long, default_value = "human")]
        format: OutputFormat,
    },
}

/// Output format for networks command
#[derive(Debug, Clone, clap::ValueEnum)]
enum OutputFormat {
    /// Human-readable output
    Human,
    /// JSON output
    Json,
}

impl NetworksCommand {
    /// Execute the networks command
    pub fn execute(&self) -> Result<()> {
        match &self.action {
            NetworksAction::List { pattern, format } => self.execute_list(pattern.as_deref(), format),
        }
    }

    fn execute_list(&self, pattern: Option<&str>, format: &OutputFormat) -> Result<()> {
        let registry = NetworkRegistry::load_embedded().context("Failed to load network registry")?;
        let networks = filter_networks(&registry, pattern);

        match format {
            OutputFormat::Json => {
                let entries: Vec<_> = networks
                    .iter()
                    .map(|n| {
                        json!({
                            "name": n.name,
                            "base_url": n.base_url,
                            "native_symbol": n.native_symbol,
                            "native_decimals": n.native_decimals,
                            "tokens": n.tokens,
                        })
                    })
                    .collect();
                println!(
                    "{}",
                    serde_json::to_string_pretty(&entries).context("Failed to serialize networks to JSON")?
                );
            }
            OutputFormat::Human => {
                println!("Found {} networks:\n", networks.len());
                for network in networks {
                    println!(
                        "{} | {} | native={}",
                        network.name, network.base_url, network.native_symbol
                    );
                    for token in &network.tokens {
                        println!("    {} {}", token.symbol, token.contract);
                    }
                }
            }
        }

        Ok(())
    }
}

/// Networks whose name contains `pattern` (all when `None`)
fn filter_networks<'a>(registry: &'a NetworkRegistry, pattern: Option<&str>) -> Vec<&'a NetworkEntry> {
    let pattern = pattern.map(|p| p.trim().to_lowercase());
    registry
        .networks()
        .filter(|n| match &pattern {
            Some(p) => n.name.to_lowercase().contains(p.as_str()),
            None => true,
        })
        .collect()
}
