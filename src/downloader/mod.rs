//! Export orchestration and rate limiting
//!
//! # Overview
//!
//! 1. **Configuration**: describe the export with [`executor::ExportConfig`]
//! 2. **Execution**: [`executor::HistoryExecutor`] fetches each asset in turn
//!    through the paged fetcher and writes the CSV files
//! 3. **Rate Limiting**: explorer calls are paced by [`rate_limit::RateLimiter`]
//! 4. **Reporting**: every asset ends with an [`job::AssetReport`]
//!
//! # Quick Start
//!
//! ```no_run
//! use tx_history_exporter::downloader::{ExportConfig, HistoryExecutor};
//! use tx_history_exporter::registry::TokenContract;
//! use tx_history_exporter::WalletAddress;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let address = WalletAddress::parse("0xe11a3c6d20B464c77ca7dBe8cF9E83c91Dd337Be")?;
//! let config = ExportConfig::new(address, "https://api.etherscan.io/api", "YOUR_API_KEY")
//!     .with_tokens(vec![TokenContract::new(
//!         "USDC",
//!         "0xA0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48",
//!     )])
//!     .with_output_dir("./exports");
//!
//! let report = HistoryExecutor::new(config).run().await?;
//! for asset in &report.assets {
//!     println!("{}: {} records ({})", asset.symbol, asset.records, asset.stop_detail);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Error Handling
//!
//! Fetch problems (API errors, exhausted retries) never fail the run; they end
//! the affected asset and are recorded in its report. [`DownloadError`] covers
//! invalid configuration and output failures.

pub mod config;
pub mod executor;
pub mod job;
pub mod progress;
pub mod rate_limit;

pub use config::FetchSettings;
pub use executor::{ExportConfig, ExportReport, HistoryExecutor};
pub use job::{AssetJob, AssetReport, JobStatus};
pub use rate_limit::{CallPermit, RateLimiter};

use crate::output::OutputError;

/// Download errors
#[derive(Debug, thiserror::Error)]
pub enum DownloadError {
    /// Validation error
    #[error("validation error: {0}")]
    ValidationError(String),

    /// Output error
    #[error("output error: {0}")]
    OutputError(#[from] OutputError),
}
