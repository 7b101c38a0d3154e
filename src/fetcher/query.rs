//! Query context for one paged explorer fetch

use crate::address::{BlockNumber, WalletAddress};
use crate::downloader::config::PAGE_OFFSET;
use crate::registry::TokenContract;
use std::fmt;

/// Which asset stream a fetch covers
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssetSelector {
    /// Native-asset transactions (`action=txlist`)
    Native {
        /// Display symbol (e.g., "ETH")
        symbol: String,
    },
    /// Token transfer events of one contract (`action=tokentx`)
    Token(TokenContract),
}

impl AssetSelector {
    /// Native asset with the given display symbol
    pub fn native(symbol: impl Into<String>) -> Self {
        Self::Native {
            symbol: symbol.into(),
        }
    }

    /// Display symbol of the asset
    pub fn symbol(&self) -> &str {
        match self {
            Self::Native { symbol } => symbol,
            Self::Token(token) => &token.symbol,
        }
    }

    /// Explorer `action` parameter
    pub fn action(&self) -> &'static str {
        match self {
            Self::Native { .. } => "txlist",
            Self::Token(_) => "tokentx",
        }
    }

    /// Whether this is the native asset
    pub fn is_native(&self) -> bool {
        matches!(self, Self::Native { .. })
    }
}

impl fmt::Display for AssetSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Native { symbol } => write!(f, "{symbol} (native)"),
            Self::Token(token) => write!(f, "{} ({})", token.symbol, token.contract),
        }
    }
}

/// Paging state and fixed parameters of one asset fetch
///
/// The page number starts at 1 and only moves forward through [`QueryContext::advance`].
#[derive(Debug, Clone)]
pub struct QueryContext {
    address: WalletAddress,
    start_block: BlockNumber,
    end_block: BlockNumber,
    asset: AssetSelector,
    offset: usize,
    page: u32,
}

impl QueryContext {
    /// Create a context positioned at page 1
    pub fn new(
        address: WalletAddress,
        start_block: BlockNumber,
        end_block: BlockNumber,
        asset: AssetSelector,
    ) -> Self {
        Self {
            address,
            start_block,
            end_block,
            asset,
            offset: PAGE_OFFSET,
            page: 1,
        }
    }

    /// Override the page size
    pub fn with_offset(mut self, offset: usize) -> Self {
        self.offset = offset.max(1);
        self
    }

    /// Move to the next page
    pub fn advance(&mut self) {
        self.page += 1;
    }

    /// Current page number (1-based)
    pub fn page(&self) -> u32 {
        self.page
    }

    /// Records requested per page
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Tracked address
    pub fn address(&self) -> &WalletAddress {
        &self.address
    }

    /// Asset being fetched
    pub fn asset(&self) -> &AssetSelector {
        &self.asset
    }

    /// Block range (inclusive)
    pub fn block_range(&self) -> (BlockNumber, BlockNumber) {
        (self.start_block, self.end_block)
    }

    /// Query parameters for the current page, without the API key
    pub fn query_params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("module", "account".to_string()),
            ("action", self.asset.action().to_string()),
        ];

        if let AssetSelector::Token(token) = &self.asset {
            params.push(("contractaddress", token.contract.clone()));
        }

        params.extend([
            ("address", self.address.to_string()),
            ("page", self.page.to_string()),
            ("offset", self.offset.to_string()),
            ("startblock", self.start_block.to_query_value()),
            ("endblock", self.end_block.to_query_value()),
            ("sort", "asc".to_string()),
        ]);

        params
    }
}
