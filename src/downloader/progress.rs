//! Terminal progress for asset exports
//!
//! The number of pages is unknown up front, so each asset gets a spinner
//! rather than a bar. Disabled progress uses a hidden bar, so callers never
//! branch on it.

use crate::downloader::job::AssetJob;
use crate::fetcher::pagination::FetchOutcome;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

const TICK_INTERVAL: Duration = Duration::from_millis(120);

/// Spinner shown while one asset is being fetched
#[derive(Debug)]
pub struct AssetProgress {
    bar: ProgressBar,
}

impl AssetProgress {
    /// Start a spinner for `job`; a hidden one when `enabled` is false
    pub fn start(job: &AssetJob, enabled: bool) -> Self {
        if !enabled {
            return Self {
                bar: ProgressBar::hidden(),
            };
        }

        let bar = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed_precise}] {msg}")
        {
            bar.set_style(style);
        }
        bar.set_message(format!("Fetching {}", job.label()));
        bar.enable_steady_tick(TICK_INTERVAL);
        Self { bar }
    }

    /// Whether output is suppressed
    pub fn is_hidden(&self) -> bool {
        self.bar.is_hidden()
    }

    /// Stop the spinner and leave a one-line summary
    pub fn finish(&self, job: &AssetJob, outcome: &FetchOutcome) {
        self.bar.finish_with_message(format!(
            "{}: {} records in {} pages ({})",
            job.label(),
            outcome.records.len(),
            outcome.stats.pages,
            outcome.reason
        ));
    }
}
