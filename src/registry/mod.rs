//! Registry of supported explorer networks
//!
//! The registry holds, per network, the explorer API base URL, the native asset
//! symbol and the contracts of well-known tokens. It is embedded at compile time.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Embedded registry data
const REGISTRY_JSON: &str = include_str!("networks.json");

/// Registry of supported networks
#[derive(Debug, Clone)]
pub struct NetworkRegistry {
    networks: BTreeMap<String, NetworkEntry>,
}

impl NetworkRegistry {
    /// Parse the registry embedded in the binary
    pub fn load_embedded() -> Result<Self, RegistryError> {
        Self::from_json(REGISTRY_JSON)
    }

    /// Parse registry from JSON string
    fn from_json(json: &str) -> Result<Self, RegistryError> {
        let raw: RawRegistry = serde_json::from_str(json)
            .map_err(|e| RegistryError::ParseError(format!("Failed to parse registry: {e}")))?;

        let networks = raw
            .networks
            .into_iter()
            .map(|entry| (entry.name.to_lowercase(), entry))
            .collect();

        Ok(Self { networks })
    }

    /// All networks, ordered by name
    pub fn networks(&self) -> impl Iterator<Item = &NetworkEntry> {
        self.networks.values()
    }

    /// Look up a network by name (case-insensitive)
    pub fn network(&self, name: &str) -> Result<&NetworkEntry, RegistryError> {
        self.networks
            .get(&name.trim().to_lowercase())
            .ok_or_else(|| {
                RegistryError::NotFound(format!(
                    "network '{}' (known: {})",
                    name,
                    self.networks.keys().cloned().collect::<Vec<_>>().join(", ")
                ))
            })
    }
}

/// A single network entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkEntry {
    /// Network name (e.g., "ethereum")
    pub name: String,
    /// Explorer API endpoint
    pub base_url: String,
    /// Native asset symbol (e.g., "ETH")
    pub native_symbol: String,
    /// Decimals of the native asset
    #[serde(default = "default_native_decimals")]
    pub native_decimals: u32,
    /// Well-known token contracts
    #[serde(default)]
    pub tokens: Vec<TokenContract>,
}

fn default_native_decimals() -> u32 {
    18
}

impl NetworkEntry {
    /// Find a token by symbol (case-insensitive)
    pub fn token(&self, symbol: &str) -> Option<&TokenContract> {
        self.tokens
            .iter()
            .find(|t| t.symbol.eq_ignore_ascii_case(symbol.trim()))
    }

    /// Resolve a list of token symbols against this network
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::NotFound`] for the first unknown symbol.
    pub fn resolve_tokens<S: AsRef<str>>(
        &self,
        symbols: &[S],
    ) -> Result<Vec<TokenContract>, RegistryError> {
        symbols
            .iter()
            .map(|s| {
                self.token(s.as_ref()).cloned().ok_or_else(|| {
                    RegistryError::NotFound(format!(
                        "token '{}' on network {}",
                        s.as_ref(),
                        self.name
                    ))
                })
            })
            .collect()
    }
}

/// Token contract of an ERC-20 style asset
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenContract {
    /// Display symbol (e.g., "USDC")
    pub symbol: String,
    /// Contract address; empty when unknown
    pub contract: String,
}

impl TokenContract {
    /// Create a token contract entry
    pub fn new(symbol: impl Into<String>, contract: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            contract: contract.into(),
        }
    }

    /// Whether a contract address is known for this token
    pub fn has_contract(&self) -> bool {
        !self.contract.trim().is_empty()
    }
}

/// Raw registry structure for deserialization
#[derive(Debug, Deserialize)]
struct RawRegistry {
    networks: Vec<NetworkEntry>,
}

/// Errors that can occur when working with the registry
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    /// Failed to parse registry JSON
    #[error("registry parse error: {0}")]
    ParseError(String),

    /// Network or token not found in registry
    #[error("not found in registry: {0}")]
    NotFound(String),
}
