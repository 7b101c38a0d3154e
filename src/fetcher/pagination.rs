//! Paged fetching of one asset stream
//!
//! [`PagedFetcher`] drives request, evaluation and decision for a single
//! [`QueryContext`] until a terminal outcome:
//!
//! - transport failures retry the same page with exponential backoff, bounded
//!   by [`FetchSettings::max_transport_retries`]
//! - rate-limit responses wait the policy's cooldown and retry the same page,
//!   bounded by [`FetchSettings::max_rate_limit_retries`] consecutive hits
//! - accepted pages are appended in page order; a duplicate page is dropped
//! - [`FetchSettings::max_pages`] caps the number of accepted pages
//!
//! `fetch` never fails. Every terminal condition becomes a [`StopReason`] and
//! whatever was accumulated so far is returned with it.

use crate::downloader::config::{calculate_backoff, FetchSettings};
use crate::fetcher::policy::{ApiFailure, Outcome, PageContext, PolicyError, ResponsePolicy};
use crate::fetcher::query::QueryContext;
use crate::fetcher::response::ResponseStatus;
use crate::fetcher::PageSource;
use crate::metrics;
use crate::Record;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Why a paged fetch ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StopReason {
    /// Empty page, short page or "no transactions found"
    EndOfData,
    /// Explorer repeated the previous page
    DuplicatePage,
    /// Explorer reported an unrecognized error
    ApiError(ApiFailure),
    /// Response could not be interpreted
    MalformedResponse(String),
    /// Transport retries exhausted
    TransportError(String),
    /// Rate-limit retries exhausted
    RateLimitExhausted,
    /// Page ceiling reached
    PageLimitReached,
}

impl StopReason {
    /// Whether the fetch ended because the data ran out
    pub fn is_complete(&self) -> bool {
        matches!(self, Self::EndOfData | Self::DuplicatePage)
    }

    /// Short machine-friendly label
    pub fn label(&self) -> &'static str {
        match self {
            Self::EndOfData => "end_of_data",
            Self::DuplicatePage => "duplicate_page",
            Self::ApiError(_) => "api_error",
            Self::MalformedResponse(_) => "malformed_response",
            Self::TransportError(_) => "transport_error",
            Self::RateLimitExhausted => "rate_limit_exhausted",
            Self::PageLimitReached => "page_limit_reached",
        }
    }
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EndOfData => write!(f, "end of data"),
            Self::DuplicatePage => write!(f, "duplicate page detected"),
            Self::ApiError(failure) => write!(f, "API error ({failure})"),
            Self::MalformedResponse(detail) => write!(f, "malformed response: {detail}"),
            Self::TransportError(detail) => write!(f, "transport error: {detail}"),
            Self::RateLimitExhausted => write!(f, "rate limit retries exhausted"),
            Self::PageLimitReached => write!(f, "page limit reached"),
        }
    }
}

impl From<PolicyError> for StopReason {
    fn from(err: PolicyError) -> Self {
        match err {
            PolicyError::Api(failure) => Self::ApiError(failure),
            PolicyError::MalformedResponse(detail) => Self::MalformedResponse(detail),
        }
    }
}

/// Counters for one paged fetch
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FetchStats {
    /// Page requests issued, retries included
    pub requests: u32,
    /// Pages accepted into the result
    pub pages: u32,
    /// Transport failures that were retried
    pub transport_retries: u32,
    /// Rate-limit responses that were retried
    pub rate_limit_retries: u32,
}

/// Result of one paged fetch
#[derive(Debug, Clone)]
pub struct FetchOutcome {
    /// Accumulated records in page order
    pub records: Vec<Record>,
    /// Terminal reason
    pub reason: StopReason,
    /// Request counters
    pub stats: FetchStats,
}

/// Drives the page loop for one asset
pub struct PagedFetcher {
    source: Arc<dyn PageSource>,
    policy: ResponsePolicy,
    settings: FetchSettings,
}

impl PagedFetcher {
    /// Create a fetcher with the default policy and settings
    pub fn new(source: Arc<dyn PageSource>) -> Self {
        Self {
            source,
            policy: ResponsePolicy::default(),
            settings: FetchSettings::default(),
        }
    }

    /// Replace the response policy
    pub fn with_policy(mut self, policy: ResponsePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Replace the retry and paging limits
    pub fn with_settings(mut self, settings: FetchSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Retry and paging limits in effect
    pub fn settings(&self) -> &FetchSettings {
        &self.settings
    }

    /// Fetch every page for `ctx`
    pub async fn fetch(&self, mut ctx: QueryContext) -> FetchOutcome {
        let asset = ctx.asset().symbol().to_string();

        let mut records: Vec<Record> = Vec::new();
        let mut previous: Vec<Record> = Vec::new();
        let mut stats = FetchStats::default();
        let mut transport_failures = 0u32;
        let mut rate_limit_hits = 0u32;

        let reason = loop {
            if stats.pages >= self.settings.max_pages {
                warn!(
                    asset = %asset,
                    max_pages = self.settings.max_pages,
                    "Page ceiling reached, stopping"
                );
                break StopReason::PageLimitReached;
            }

            stats.requests += 1;
            let response = match self.source.fetch_page(&ctx).await {
                Ok(response) => {
                    transport_failures = 0;
                    response
                }
                Err(e) => {
                    metrics::record_transport_error(&asset);
                    if transport_failures >= self.settings.max_transport_retries {
                        warn!(
                            asset = %asset,
                            page = ctx.page(),
                            attempts = transport_failures + 1,
                            error = %e,
                            "Transport retries exhausted"
                        );
                        break StopReason::TransportError(e.to_string());
                    }

                    let backoff = calculate_backoff(transport_failures);
                    transport_failures += 1;
                    stats.transport_retries += 1;
                    warn!(
                        asset = %asset,
                        page = ctx.page(),
                        attempt = transport_failures,
                        max_retries = self.settings.max_transport_retries,
                        backoff_ms = backoff.as_millis() as u64,
                        error = %e,
                        "Transport failure, retrying page"
                    );
                    tokio::time::sleep(backoff).await;
                    continue;
                }
            };

            let outcome = self.policy.evaluate(
                &response,
                PageContext {
                    page: ctx.page(),
                    offset: ctx.offset(),
                    previous: &previous,
                },
            );

            if let Outcome::RetryCurrentPage { cooldown } = outcome {
                if rate_limit_hits >= self.settings.max_rate_limit_retries {
                    warn!(
                        asset = %asset,
                        page = ctx.page(),
                        retries = rate_limit_hits,
                        "Rate limit retries exhausted"
                    );
                    break StopReason::RateLimitExhausted;
                }

                rate_limit_hits += 1;
                stats.rate_limit_retries += 1;
                metrics::record_rate_limit_retry(&asset);
                warn!(
                    asset = %asset,
                    page = ctx.page(),
                    cooldown_secs = cooldown.as_secs(),
                    "Rate limit reached, waiting before retrying page"
                );
                tokio::time::sleep(cooldown).await;
                continue;
            }
            rate_limit_hits = 0;

            let from_success = response.status == ResponseStatus::Success;
            match outcome {
                Outcome::Continue => {
                    accept_page(response.into_records(), &mut records, &mut previous, &mut stats);
                    info!(
                        asset = %asset,
                        page = ctx.page(),
                        fetched = previous.len(),
                        total = records.len(),
                        "Fetched page"
                    );
                    ctx.advance();
                }
                Outcome::StopEndOfData => {
                    if from_success {
                        accept_page(response.into_records(), &mut records, &mut previous, &mut stats);
                        info!(
                            asset = %asset,
                            page = ctx.page(),
                            fetched = previous.len(),
                            total = records.len(),
                            "Fetched last page"
                        );
                    } else {
                        debug!(asset = %asset, page = ctx.page(), message = %response.message, "No further records");
                    }
                    break StopReason::EndOfData;
                }
                Outcome::StopDuplicate => {
                    info!(
                        asset = %asset,
                        page = ctx.page(),
                        "Duplicate page detected, stopping"
                    );
                    break StopReason::DuplicatePage;
                }
                Outcome::StopError(err) => {
                    warn!(asset = %asset, page = ctx.page(), error = %err, "Stopping on explorer error");
                    break err.into();
                }
                Outcome::RetryCurrentPage { .. } => continue,
            }
        };

        metrics::record_records(&asset, records.len());
        info!(
            asset = %asset,
            records = records.len(),
            pages = stats.pages,
            requests = stats.requests,
            reason = %reason,
            "Fetch finished"
        );

        FetchOutcome {
            records,
            reason,
            stats,
        }
    }
}

fn accept_page(
    page: Vec<Record>,
    records: &mut Vec<Record>,
    previous: &mut Vec<Record>,
    stats: &mut FetchStats,
) {
    stats.pages += 1;
    records.extend(page.iter().cloned());
    *previous = page;
}
