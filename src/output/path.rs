//! Output file naming
//!
//! All files for one address land flat in the output directory:
//!
//! - `eth_transactions_<last 6 hex chars, lowercase>.csv`
//! - `erc20_transfers_<SYMBOL>_<first 6 hex chars>.csv`
//! - `combined_transfers_<first 6 hex chars>.csv`
//!
//! ```rust
//! use tx_history_exporter::output::ExportPaths;
//! use tx_history_exporter::WalletAddress;
//! use std::path::PathBuf;
//!
//! let address = WalletAddress::parse("0xe11a3c6d20B464c77ca7dBe8cF9E83c91Dd337Be").unwrap();
//! let paths = ExportPaths::new("temp", &address);
//!
//! assert_eq!(paths.native_file(), PathBuf::from("temp/eth_transactions_d337be.csv"));
//! assert_eq!(paths.token_file("USDC"), PathBuf::from("temp/erc20_transfers_USDC_e11a3c.csv"));
//! assert_eq!(paths.combined_file(), PathBuf::from("temp/combined_transfers_e11a3c.csv"));
//! ```

use crate::address::WalletAddress;
use std::path::{Path, PathBuf};

/// Output file locations for one tracked address
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportPaths {
    dir: PathBuf,
    suffix: String,
    prefix: String,
}

impl ExportPaths {
    /// Paths under `dir` for `address`
    pub fn new(dir: impl Into<PathBuf>, address: &WalletAddress) -> Self {
        Self {
            dir: dir.into(),
            suffix: address.short_suffix(),
            prefix: address.short_prefix(),
        }
    }

    /// Output directory
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Native transaction file
    pub fn native_file(&self) -> PathBuf {
        self.dir.join(format!("eth_transactions_{}.csv", self.suffix))
    }

    /// Token transfer file for `symbol`
    pub fn token_file(&self, symbol: &str) -> PathBuf {
        self.dir
            .join(format!("erc20_transfers_{}_{}.csv", sanitize(symbol), self.prefix))
    }

    /// Combined transfer file
    pub fn combined_file(&self) -> PathBuf {
        self.dir.join(format!("combined_transfers_{}.csv", self.prefix))
    }
}

/// Keep user-supplied symbols from escaping the output directory
fn sanitize(symbol: &str) -> String {
    symbol
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect()
}
