//! Per-asset export jobs and their reports

use crate::fetcher::pagination::{FetchOutcome, FetchStats, StopReason};
use crate::fetcher::query::AssetSelector;
use serde::Serialize;
use std::path::PathBuf;

/// One asset stream to export
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetJob {
    /// Asset to fetch
    pub asset: AssetSelector,
}

impl AssetJob {
    /// Job for the given asset
    pub fn new(asset: AssetSelector) -> Self {
        Self { asset }
    }

    /// Display symbol
    pub fn symbol(&self) -> &str {
        self.asset.symbol()
    }

    /// Human-readable description ("ETH transactions", "USDC transfers")
    pub fn label(&self) -> String {
        if self.asset.is_native() {
            format!("{} transactions", self.symbol())
        } else {
            format!("{} transfers", self.symbol())
        }
    }
}

/// Final status of one asset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    /// Data ran out normally
    Completed,
    /// Stopped early; the records are a prefix of the full history
    Partial,
}

/// Report for one exported asset
#[derive(Debug, Clone, Serialize)]
pub struct AssetReport {
    /// Display symbol
    pub symbol: String,
    /// Token contract (`None` for the native asset)
    pub contract: Option<String>,
    /// Records fetched
    pub records: usize,
    /// Final status
    pub status: JobStatus,
    /// Machine-friendly stop label
    pub stop_reason: &'static str,
    /// Human-readable stop detail
    pub stop_detail: String,
    /// Request counters
    pub stats: FetchStats,
    /// Written file, if any
    pub output_path: Option<PathBuf>,
    #[serde(skip)]
    reason: StopReason,
}

impl AssetReport {
    /// Build a report from a fetch outcome
    pub fn new(job: &AssetJob, outcome: &FetchOutcome, output_path: Option<PathBuf>) -> Self {
        let contract = match &job.asset {
            AssetSelector::Native { .. } => None,
            AssetSelector::Token(token) => Some(token.contract.clone()),
        };

        Self {
            symbol: job.symbol().to_string(),
            contract,
            records: outcome.records.len(),
            status: if outcome.reason.is_complete() {
                JobStatus::Completed
            } else {
                JobStatus::Partial
            },
            stop_reason: outcome.reason.label(),
            stop_detail: outcome.reason.to_string(),
            stats: outcome.stats,
            output_path,
            reason: outcome.reason.clone(),
        }
    }

    /// Terminal reason of the fetch
    pub fn reason(&self) -> &StopReason {
        &self.reason
    }

    /// Whether the asset history is complete
    pub fn is_complete(&self) -> bool {
        self.status == JobStatus::Completed
    }
}
