//! Wallet address and block number parsing
//!
//! Addresses use the EVM hex format `0x` followed by 40 hex digits. Block bounds
//! are either a decimal block height or `latest`.

use std::fmt;
use std::str::FromStr;

/// Block height used by the explorer when `latest` is requested
pub const LATEST_BLOCK_SENTINEL: u64 = 99_999_999;

/// Tracked wallet address
///
/// The original casing is kept for display and queries; comparisons against
/// transaction fields are case-insensitive.
///
/// # Examples
///
/// ```
/// use tx_history_exporter::address::WalletAddress;
///
/// let addr = WalletAddress::parse("0xe11a3c6d20B464c77ca7dBe8cF9E83c91Dd337Be").unwrap();
/// assert_eq!(addr.short_suffix(), "d337be");
/// assert_eq!(addr.short_prefix(), "e11a3c");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct WalletAddress {
    raw: String,
}

impl WalletAddress {
    /// Parse and validate an address string
    ///
    /// # Errors
    ///
    /// Returns an error if the input is not `0x` followed by exactly 40 hex digits.
    pub fn parse(s: &str) -> Result<Self, AddressError> {
        let s = s.trim();
        let hex = s
            .strip_prefix("0x")
            .or_else(|| s.strip_prefix("0X"))
            .ok_or_else(|| AddressError::InvalidAddress(format!("{s}: missing 0x prefix")))?;

        if hex.len() != 40 {
            return Err(AddressError::InvalidAddress(format!(
                "{s}: expected 40 hex digits, found {}",
                hex.len()
            )));
        }

        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(AddressError::InvalidAddress(format!(
                "{s}: contains non-hex characters"
            )));
        }

        Ok(Self { raw: format!("0x{hex}") })
    }

    /// Address as given (with `0x` prefix)
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Case-insensitive comparison against an address taken from a record
    pub fn matches(&self, other: &str) -> bool {
        self.raw.eq_ignore_ascii_case(other.trim())
    }

    /// Last six characters, lowercase (native transaction file naming)
    pub fn short_suffix(&self) -> String {
        self.raw[self.raw.len() - 6..].to_lowercase()
    }

    /// First six hex digits after `0x` (token and combined file naming)
    pub fn short_prefix(&self) -> String {
        self.raw[2..8].to_string()
    }
}

impl fmt::Display for WalletAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl FromStr for WalletAddress {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Block range bound
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockNumber {
    /// Explicit block height
    Number(u64),
    /// Chain head
    Latest,
}

impl BlockNumber {
    /// Value sent in the `startblock`/`endblock` query parameter
    pub fn to_query_value(&self) -> String {
        match self {
            Self::Number(n) => n.to_string(),
            Self::Latest => LATEST_BLOCK_SENTINEL.to_string(),
        }
    }
}

impl fmt::Display for BlockNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Latest => f.write_str("latest"),
        }
    }
}

impl FromStr for BlockNumber {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("latest") {
            return Ok(Self::Latest);
        }
        if s.is_empty() || !s.chars().all(|c| c.is_ascii_digit()) {
            return Err(AddressError::InvalidBlock(s.to_string()));
        }
        s.parse::<u64>()
            .map(Self::Number)
            .map_err(|_| AddressError::InvalidBlock(s.to_string()))
    }
}

/// Errors that can occur while parsing addresses or block numbers
#[derive(Debug, thiserror::Error)]
pub enum AddressError {
    /// Invalid wallet or contract address
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    /// Invalid block number
    #[error("invalid block number: {0} (expected digits or 'latest')")]
    InvalidBlock(String),
}
