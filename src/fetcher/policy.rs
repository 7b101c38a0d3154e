//! Response policy: maps one explorer response to a paging decision
//!
//! The explorer reports three different situations with `status: "0"`:
//! an empty result set ("No transactions found"), throttling
//! ("Max rate limit reached") and genuine errors. On success it may also keep
//! returning the final page forever instead of an empty one. [`ResponsePolicy`]
//! sorts all of that into an [`Outcome`].
//!
//! The policy is a pure function of its inputs: evaluating the same response
//! against the same context always yields the same outcome. Waiting and
//! accumulating are left to the caller.

use crate::downloader::config::RATE_LIMIT_COOLDOWN;
use crate::fetcher::response::{ApiResponse, ApiResult, ResponseStatus};
use crate::Record;
use std::fmt;
use std::time::Duration;
use tracing::debug;

/// Failure text the explorer uses for an empty result set
pub const NO_TRANSACTIONS_FOUND: &str = "no transactions found";

/// Failure text the explorer uses when throttling
pub const MAX_RATE_LIMIT_REACHED: &str = "max rate limit reached";

/// Diagnostic content of an explorer-reported error
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiFailure {
    /// `message` field
    pub message: String,
    /// `result` field rendered as text
    pub result: String,
}

impl fmt::Display for ApiFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "message: {} - result: {}", self.message, self.result)
    }
}

/// Why the policy decided to stop with an error
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PolicyError {
    /// Explorer returned `status: "0"` with unrecognized content
    Api(ApiFailure),
    /// Status missing or unknown, or a success without a record array
    MalformedResponse(String),
}

impl fmt::Display for PolicyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Api(failure) => write!(f, "API error ({failure})"),
            Self::MalformedResponse(detail) => write!(f, "malformed response: {detail}"),
        }
    }
}

/// Paging decision for one evaluated response
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Page accepted and full; request the next page
    Continue,
    /// Throttled; wait `cooldown` and request the same page again
    RetryCurrentPage {
        /// Wait before retrying
        cooldown: Duration,
    },
    /// No further data (page accepted if the response was a success)
    StopEndOfData,
    /// Page repeats the previous one; discard it and stop
    StopDuplicate,
    /// Unrecoverable explorer error
    StopError(PolicyError),
}

impl Outcome {
    /// Whether the outcome ends the fetch
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Continue | Self::RetryCurrentPage { .. })
    }
}

/// Paging context the policy needs besides the response itself
#[derive(Debug, Clone, Copy)]
pub struct PageContext<'a> {
    /// Page number of the response (1-based)
    pub page: u32,
    /// Records requested per page
    pub offset: usize,
    /// Records of the previously accepted page (empty on the first page)
    pub previous: &'a [Record],
}

/// Strategy deciding whether a page repeats the previous one
pub trait DuplicatePageDetector: Send + Sync + fmt::Debug {
    /// Return `true` if `current` must be treated as a repeat of `previous`
    fn is_duplicate(&self, current: &[Record], previous: &[Record]) -> bool;
}

/// Detects a repeated page by comparing transaction hashes position by position
///
/// Both pages must be non-empty and of equal length. A reordered page is not
/// a duplicate, and records without a hash never match.
#[derive(Debug, Default, Clone, Copy)]
pub struct HashSequenceDetector;

impl DuplicatePageDetector for HashSequenceDetector {
    fn is_duplicate(&self, current: &[Record], previous: &[Record]) -> bool {
        if current.is_empty() || current.len() != previous.len() {
            return false;
        }

        current.iter().zip(previous).all(|(cur, prev)| match (cur.hash(), prev.hash()) {
            (Some(a), Some(b)) => a == b,
            _ => false,
        })
    }
}

/// Disables duplicate detection entirely
#[derive(Debug, Default, Clone, Copy)]
pub struct NoDuplicateDetection;

impl DuplicatePageDetector for NoDuplicateDetection {
    fn is_duplicate(&self, _current: &[Record], _previous: &[Record]) -> bool {
        false
    }
}

/// Decision function from explorer responses to [`Outcome`]s
#[derive(Debug)]
pub struct ResponsePolicy {
    detector: Box<dyn DuplicatePageDetector>,
    rate_limit_cooldown: Duration,
}

impl Default for ResponsePolicy {
    fn default() -> Self {
        Self::new(Box::new(HashSequenceDetector))
    }
}

impl ResponsePolicy {
    /// Create a policy with the given duplicate detector and the default cooldown
    pub fn new(detector: Box<dyn DuplicatePageDetector>) -> Self {
        Self {
            detector,
            rate_limit_cooldown: RATE_LIMIT_COOLDOWN,
        }
    }

    /// Override the wait attached to [`Outcome::RetryCurrentPage`]
    pub fn with_rate_limit_cooldown(mut self, cooldown: Duration) -> Self {
        self.rate_limit_cooldown = cooldown;
        self
    }

    /// Evaluate one response
    pub fn evaluate(&self, response: &ApiResponse, ctx: PageContext<'_>) -> Outcome {
        match &response.status {
            ResponseStatus::Success => self.evaluate_success(response, ctx),
            ResponseStatus::Failure => self.evaluate_failure(response),
            ResponseStatus::Unknown(status) => Outcome::StopError(PolicyError::MalformedResponse(
                format!("unknown status '{status}' (message: {})", response.message),
            )),
        }
    }

    fn evaluate_success(&self, response: &ApiResponse, ctx: PageContext<'_>) -> Outcome {
        let ApiResult::Records(page) = &response.result else {
            return Outcome::StopError(PolicyError::MalformedResponse(format!(
                "success status without a record array: {}",
                truncate(&response.result.as_text(), 200)
            )));
        };

        if !ctx.previous.is_empty() && self.detector.is_duplicate(page, ctx.previous) {
            debug!(page = ctx.page, records = page.len(), "Page repeats the previous page");
            return Outcome::StopDuplicate;
        }

        if page.is_empty() {
            return Outcome::StopEndOfData;
        }

        if page.len() < ctx.offset {
            debug!(
                page = ctx.page,
                records = page.len(),
                offset = ctx.offset,
                "Short page, treating as last page"
            );
            return Outcome::StopEndOfData;
        }

        Outcome::Continue
    }

    fn evaluate_failure(&self, response: &ApiResponse) -> Outcome {
        let message = response.message.trim().to_lowercase();
        let result = response.result.as_text().trim().to_lowercase();

        if message == NO_TRANSACTIONS_FOUND || result == NO_TRANSACTIONS_FOUND {
            return Outcome::StopEndOfData;
        }

        if result.contains(MAX_RATE_LIMIT_REACHED) {
            return Outcome::RetryCurrentPage {
                cooldown: self.rate_limit_cooldown,
            };
        }

        Outcome::StopError(PolicyError::Api(ApiFailure {
            message: response.message.clone(),
            result: response.result.as_text(),
        }))
    }
}

fn truncate(s: &str, max_chars: usize) -> String {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &s[..idx]),
        None => s.to_string(),
    }
}
