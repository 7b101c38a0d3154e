//! Explorer HTTP client
//!
//! Production [`PageSource`]: builds the account query for a [`QueryContext`],
//! waits on the rate limiter and decodes the JSON envelope. Each call is a
//! single attempt; retry decisions belong to the paged fetcher.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::downloader::rate_limit::RateLimiter;
use crate::fetcher::query::QueryContext;
use crate::fetcher::response::ApiResponse;
use crate::fetcher::shared_resources::global_http_client;
use crate::fetcher::{FetcherError, FetcherResult, PageSource};
use crate::metrics;

/// HTTP client for one Etherscan-compatible explorer
pub struct ExplorerHttpClient {
    client: Arc<Client>,
    base_url: String,
    api_key: String,
    rate_limiter: Arc<RateLimiter>,
}

impl ExplorerHttpClient {
    /// Create a client
    ///
    /// # Arguments
    /// * `client` - Shared HTTP client
    /// * `base_url` - Explorer API endpoint (e.g., "<https://api.etherscan.io/api>")
    /// * `api_key` - Explorer API key, sent as `apikey`
    /// * `rate_limiter` - Pacing gate for this stream of calls
    pub fn new(
        client: Arc<Client>,
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        rate_limiter: Arc<RateLimiter>,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            api_key: api_key.into(),
            rate_limiter,
        }
    }

    /// Create a client on the shared HTTP client with its own rate limiter
    pub fn with_calls_per_second(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        calls_per_second: u32,
    ) -> Self {
        Self::new(
            global_http_client(),
            base_url,
            api_key,
            Arc::new(RateLimiter::per_second(calls_per_second)),
        )
    }

    /// Explorer API endpoint
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Full query for `ctx`, including the API key when one is configured
    pub fn request_params(&self, ctx: &QueryContext) -> Vec<(&'static str, String)> {
        let mut params = ctx.query_params();
        if !self.api_key.is_empty() {
            params.push(("apikey", self.api_key.clone()));
        }
        params
    }

    async fn get_json(&self, params: &[(&'static str, String)], asset: &str) -> FetcherResult<Value> {
        let _permit = self.rate_limiter.acquire().await;

        let response = self
            .client
            .get(&self.base_url)
            .query(params)
            .send()
            .await
            .map_err(|e| {
                metrics::record_request(asset, "network_error");
                if e.is_builder() {
                    FetcherError::InvalidRequest(e.to_string())
                } else {
                    FetcherError::NetworkError(e.to_string())
                }
            })?;

        let status = response.status();
        metrics::record_request(asset, status.as_str());

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(status = %status, "Explorer returned non-success HTTP status");
            return Err(FetcherError::HttpError(format!(
                "status {}: {}",
                status,
                body.chars().take(200).collect::<String>()
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| FetcherError::NetworkError(format!("failed to read body: {e}")))?;

        serde_json::from_str(&body)
            .map_err(|e| FetcherError::ParseError(format!("response is not valid JSON: {e}")))
    }
}

impl fmt::Debug for ExplorerHttpClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExplorerHttpClient")
            .field("base_url", &self.base_url)
            .field("api_key", &if self.api_key.is_empty() { "<none>" } else { "<redacted>" })
            .field("min_interval", &self.rate_limiter.min_interval())
            .finish()
    }
}

#[async_trait]
impl PageSource for ExplorerHttpClient {
    async fn fetch_page(&self, ctx: &QueryContext) -> FetcherResult<ApiResponse> {
        debug!(
            asset = %ctx.asset(),
            page = ctx.page(),
            offset = ctx.offset(),
            "Requesting explorer page"
        );

        let params = self.request_params(ctx);
        let body = self.get_json(&params, ctx.asset().symbol()).await?;
        Ok(ApiResponse::from_value(body))
    }
}
