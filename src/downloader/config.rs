//! Fetch configuration constants and retry settings

use std::time::Duration;

/// Explorer free-tier ceiling on calls per second.
pub const CALLS_PER_SECOND_LIMIT: u32 = 5;

/// Records requested per page (`offset` query parameter).
pub const PAGE_OFFSET: usize = 100;

/// Wait applied when the explorer answers "Max rate limit reached".
pub const RATE_LIMIT_COOLDOWN: Duration = Duration::from_secs(10);

/// Maximum consecutive rate-limit retries of one page before giving up on the asset.
pub const MAX_RATE_LIMIT_RETRIES: u32 = 30;

/// Maximum number of retries for transport failures on one page.
pub const MAX_RETRIES: u32 = 5;

/// Initial transport backoff delay in milliseconds.
pub const INITIAL_BACKOFF_MS: u64 = 5000; // 5 seconds

/// Maximum transport backoff delay in milliseconds.
pub const MAX_BACKOFF_MS: u64 = 60000; // 60 seconds

/// Maximum number of pages fetched for one asset.
pub const MAX_PAGES: u32 = 10_000;

/// Flush interval for output writers (flush every N records)
pub const FLUSH_INTERVAL: usize = 1_000;

/// Calculate exponential backoff delay
pub fn calculate_backoff(retry_count: u32) -> Duration {
    let delay_ms = INITIAL_BACKOFF_MS.saturating_mul(2u64.saturating_pow(retry_count));
    let delay_ms = delay_ms.min(MAX_BACKOFF_MS);
    Duration::from_millis(delay_ms)
}

/// Retry and paging limits for one paged fetch
#[derive(Debug, Clone)]
pub struct FetchSettings {
    /// Records requested per page
    pub offset: usize,
    /// Transport retries per page before the asset is stopped
    pub max_transport_retries: u32,
    /// Consecutive rate-limit retries per page before the asset is stopped
    pub max_rate_limit_retries: u32,
    /// Hard ceiling on pages per asset
    pub max_pages: u32,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            offset: PAGE_OFFSET,
            max_transport_retries: MAX_RETRIES,
            max_rate_limit_retries: MAX_RATE_LIMIT_RETRIES,
            max_pages: MAX_PAGES,
        }
    }
}

impl FetchSettings {
    /// Override the transport retry budget
    pub fn with_max_transport_retries(mut self, retries: u32) -> Self {
        self.max_transport_retries = retries;
        self
    }

    /// Override the rate-limit retry budget
    pub fn with_max_rate_limit_retries(mut self, retries: u32) -> Self {
        self.max_rate_limit_retries = retries;
        self
    }

    /// Override the page size
    pub fn with_offset(mut self, offset: usize) -> Self {
        self.offset = offset;
        self
    }

    /// Override the page ceiling
    pub fn with_max_pages(mut self, max_pages: u32) -> Self {
        self.max_pages = max_pages;
        self
    }
}
