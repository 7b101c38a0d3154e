//! CLI error types and conversions

use crate::address::AddressError;
use crate::downloader::DownloadError;
use crate::metrics::MetricsError;
use crate::registry::RegistryError;

/// CLI errors
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Address or block error
    #[error("address error: {0}")]
    AddressError(#[from] AddressError),

    /// Registry error
    #[error("registry error: {0}")]
    RegistryError(#[from] RegistryError),

    /// Download error
    #[error("export error: {0}")]
    DownloadError(#[from] DownloadError),

    /// Metrics exporter error
    #[error("metrics error: {0}")]
    MetricsError(#[from] MetricsError),

    /// Report serialization error
    #[error("serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}
