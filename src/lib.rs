//! # Transaction History Exporter Library
//!
//! Retrieves the complete transaction history of a single address from an
//! Etherscan-compatible block explorer API and writes it out as CSV files.
//!
//! ## Features
//!
//! - **Paged retrieval**: walks `page`/`offset` pagination until the explorer runs out of data
//! - **Ambiguous error handling**: tells benign `status: "0"` answers ("No transactions found")
//!   apart from rate limiting and real API errors
//! - **Duplicate page detection**: stops when the explorer repeats the last page instead of ending
//! - **Rate limiting**: fixed-delay pacing under the explorer's calls-per-second ceiling
//! - **Export**: one CSV per asset plus a combined, normalized transfer log
//!
//! ## Quick Start
//!
//! ```no_run
//! use tx_history_exporter::address::{BlockNumber, WalletAddress};
//! use tx_history_exporter::downloader::{ExportConfig, HistoryExecutor};
//! use tx_history_exporter::registry::NetworkRegistry;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let registry = NetworkRegistry::load_embedded()?;
//! let network = registry.network("ethereum")?;
//!
//! let config = ExportConfig::new(
//!     WalletAddress::parse("0xe11a3c6d20B464c77ca7dBe8cF9E83c91Dd337Be")?,
//!     network.base_url.clone(),
//!     "YOUR_API_KEY",
//! )
//! .with_block_range(BlockNumber::Number(14_978_379), BlockNumber::Latest)
//! .with_tokens(network.resolve_tokens(&["USDC", "USDT"])?);
//!
//! let report = HistoryExecutor::new(config).run().await?;
//! println!("{} records exported", report.total_records());
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! - [`address`] - Wallet address and block number parsing
//! - [`registry`] - Supported networks and well-known token contracts
//! - [`fetcher`] - Explorer HTTP client, response policy and the paged fetcher
//! - [`downloader`] - Export orchestration, rate limiting and retry settings
//! - [`output`] - CSV writers for per-asset and combined files
//! - [`metrics`] - Request and retry counters with an optional Prometheus exporter

#![warn(missing_docs)]
#![warn(clippy::all)]

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// CLI command implementations
pub mod cli;

/// Export orchestration
pub mod downloader;

/// Explorer API access and pagination
pub mod fetcher;

/// Address and block number parsing
pub mod address;

/// Observability counters
pub mod metrics;

/// CSV output writers
pub mod output;

/// Supported networks and token contracts
pub mod registry;

pub use address::{BlockNumber, WalletAddress};

/// One transaction or token-transfer event as returned by the explorer.
///
/// Field order is preserved exactly as received so the per-asset CSV export can
/// reproduce the explorer's column layout.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record(Map<String, Value>);

impl Record {
    /// Build a record from an already decoded JSON object
    pub fn from_map(fields: Map<String, Value>) -> Self {
        Self(fields)
    }

    /// Raw field value
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    /// Field rendered as text; numbers are formatted, strings returned verbatim.
    ///
    /// Returns `None` for missing or null fields.
    pub fn text(&self, field: &str) -> Option<String> {
        match self.0.get(field)? {
            Value::Null => None,
            Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Transaction hash, the identity used for duplicate page detection
    pub fn hash(&self) -> Option<&str> {
        self.0.get("hash").and_then(Value::as_str)
    }

    /// Unix timestamp in seconds (`timeStamp`)
    pub fn timestamp(&self) -> Option<i64> {
        self.text("timeStamp")?.trim().parse().ok()
    }

    /// Sender address
    pub fn from_address(&self) -> Option<&str> {
        self.0.get("from").and_then(Value::as_str)
    }

    /// Recipient address
    pub fn to_address(&self) -> Option<&str> {
        self.0.get("to").and_then(Value::as_str)
    }

    /// Raw integer value in the asset's smallest unit
    pub fn raw_value(&self) -> Option<String> {
        self.text("value")
    }

    /// Token decimals for transfer events; `None` for native transactions
    pub fn token_decimals(&self) -> Option<u32> {
        self.text("tokenDecimal")?.trim().parse().ok()
    }

    /// Field names in explorer order
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Number of fields
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the record has no fields at all
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
