//! Fixed-delay rate limiting
//!
//! Paces outbound explorer calls so that at least `1 / calls_per_second` elapses
//! between the completion of one call and the start of the next. There is no
//! burst allowance.
//!
//! A limiter may be shared between tasks. Each [`CallPermit`] holds the
//! limiter's lock until it is dropped, so calls through one limiter never
//! overlap and waiting callers are served in arrival order.

use std::time::Duration;
use tokio::sync::{Mutex, MutexGuard};
use tokio::time::{sleep_until, Instant};
use tracing::trace;

/// Fixed-delay pacing gate for one stream of calls
#[derive(Debug)]
pub struct RateLimiter {
    min_interval: Duration,
    last_completed: Mutex<Option<Instant>>,
}

impl RateLimiter {
    /// Create a limiter allowing `calls` calls per second
    ///
    /// A value of zero is treated as one call per second.
    pub fn per_second(calls: u32) -> Self {
        let calls = calls.max(1);
        Self::with_interval(Duration::from_secs(1) / calls)
    }

    /// Create a limiter with an explicit minimum interval between calls
    pub fn with_interval(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_completed: Mutex::new(None),
        }
    }

    /// Minimum interval enforced between calls
    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }

    /// Time still to wait before the next call may start
    ///
    /// While a call is in flight the full interval is still ahead.
    pub fn remaining_delay(&self) -> Duration {
        match self.last_completed.try_lock() {
            Ok(last) => match *last {
                Some(last) => (last + self.min_interval).saturating_duration_since(Instant::now()),
                None => Duration::ZERO,
            },
            Err(_) => self.min_interval,
        }
    }

    /// Wait until the next call may start
    ///
    /// The returned permit blocks other callers and marks the call as
    /// completed when dropped; hold it for the duration of the request.
    pub async fn acquire(&self) -> CallPermit<'_> {
        let last_completed = self.last_completed.lock().await;

        if let Some(ready_at) = last_completed.map(|last| last + self.min_interval) {
            if ready_at > Instant::now() {
                trace!(
                    wait_ms = ready_at.saturating_duration_since(Instant::now()).as_millis() as u64,
                    "Pacing explorer call"
                );
                sleep_until(ready_at).await;
            }
        }

        CallPermit { last_completed }
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::per_second(crate::downloader::config::CALLS_PER_SECOND_LIMIT)
    }
}

/// Exclusive right to make one call; records completion on drop
#[must_use = "dropping the permit immediately marks the call as completed"]
#[derive(Debug)]
pub struct CallPermit<'a> {
    last_completed: MutexGuard<'a, Option<Instant>>,
}

impl Drop for CallPermit<'_> {
    fn drop(&mut self) {
        *self.last_completed = Some(Instant::now());
    }
}
