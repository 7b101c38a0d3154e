//! Explorer fetching: page source, response policy and pagination

use async_trait::async_trait;

pub mod explorer_http;
pub mod pagination;
pub mod policy;
pub mod query;
pub mod response;
pub mod shared_resources;

pub use explorer_http::ExplorerHttpClient;
pub use pagination::{FetchOutcome, FetchStats, PagedFetcher, StopReason};
pub use policy::{
    ApiFailure, DuplicatePageDetector, HashSequenceDetector, NoDuplicateDetection, Outcome,
    PolicyError, ResponsePolicy,
};
pub use query::{AssetSelector, QueryContext};
pub use response::{ApiResponse, ApiResult, ResponseStatus};
pub use shared_resources::global_http_client;

/// Fetcher errors
///
/// These cover the transport layer only. Explorer-level errors arrive as a
/// decoded [`ApiResponse`] and are judged by [`ResponsePolicy`].
#[derive(Debug, thiserror::Error)]
pub enum FetcherError {
    /// Non-success HTTP status
    #[error("HTTP error: {0}")]
    HttpError(String),

    /// Response body was not valid JSON
    #[error("parse error: {0}")]
    ParseError(String),

    /// Connection, timeout or other network failure
    #[error("network error: {0}")]
    NetworkError(String),

    /// Request could not be built (bad base URL, ...)
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

/// Result type for fetcher operations
pub type FetcherResult<T> = Result<T, FetcherError>;

/// One page request against an explorer
///
/// Implementations perform a single attempt: pacing happens inside, retries
/// are decided by [`PagedFetcher`].
#[async_trait]
pub trait PageSource: Send + Sync {
    /// Request the page described by `ctx`
    async fn fetch_page(&self, ctx: &QueryContext) -> FetcherResult<ApiResponse>;
}
