//! Export executor: runs every configured asset and writes the results

use crate::address::{BlockNumber, WalletAddress};
use crate::downloader::config::{FetchSettings, CALLS_PER_SECOND_LIMIT};
use crate::downloader::job::{AssetJob, AssetReport};
use crate::downloader::progress::AssetProgress;
use crate::downloader::DownloadError;
use crate::fetcher::explorer_http::ExplorerHttpClient;
use crate::fetcher::pagination::{FetchOutcome, PagedFetcher};
use crate::fetcher::policy::ResponsePolicy;
use crate::fetcher::query::{AssetSelector, QueryContext};
use crate::fetcher::PageSource;
use crate::metrics::AssetMetrics;
use crate::output::{ExportWriter, DEFAULT_DECIMALS};
use crate::registry::TokenContract;
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

/// Default output directory
pub const DEFAULT_OUTPUT_DIR: &str = "temp";

/// Everything one export run needs
///
/// Built once (usually from the command line) and handed to [`HistoryExecutor`].
#[derive(Debug, Clone)]
pub struct ExportConfig {
    /// Tracked address
    pub address: WalletAddress,
    /// Explorer API endpoint
    pub base_url: String,
    /// Explorer API key
    pub api_key: String,
    /// First block (inclusive)
    pub start_block: BlockNumber,
    /// Last block (inclusive)
    pub end_block: BlockNumber,
    /// Fetch native-asset transactions
    pub include_native: bool,
    /// Display symbol of the native asset
    pub native_symbol: String,
    /// Decimals of the native asset
    pub native_decimals: u32,
    /// Token contracts to fetch, in order
    pub tokens: Vec<TokenContract>,
    /// Output directory
    pub output_dir: PathBuf,
    /// Pacing ceiling for explorer calls
    pub calls_per_second: u32,
    /// Retry and paging limits
    pub settings: FetchSettings,
    /// Show spinners on the terminal
    pub show_progress: bool,
}

impl ExportConfig {
    /// Config with defaults: whole chain, native asset only, `temp/` output
    pub fn new(address: WalletAddress, base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            address,
            base_url: base_url.into(),
            api_key: api_key.into(),
            start_block: BlockNumber::Number(0),
            end_block: BlockNumber::Latest,
            include_native: true,
            native_symbol: "ETH".to_string(),
            native_decimals: DEFAULT_DECIMALS,
            tokens: Vec::new(),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            calls_per_second: CALLS_PER_SECOND_LIMIT,
            settings: FetchSettings::default(),
            show_progress: false,
        }
    }

    /// Restrict the block range
    pub fn with_block_range(mut self, start: BlockNumber, end: BlockNumber) -> Self {
        self.start_block = start;
        self.end_block = end;
        self
    }

    /// Set the token contracts to fetch
    pub fn with_tokens(mut self, tokens: Vec<TokenContract>) -> Self {
        self.tokens = tokens;
        self
    }

    /// Enable or disable the native-asset fetch
    pub fn with_native(mut self, include: bool) -> Self {
        self.include_native = include;
        self
    }

    /// Set the native asset's display symbol
    pub fn with_native_symbol(mut self, symbol: impl Into<String>) -> Self {
        self.native_symbol = symbol.into();
        self
    }

    /// Set the native asset's decimals
    pub fn with_native_decimals(mut self, decimals: u32) -> Self {
        self.native_decimals = decimals;
        self
    }

    /// Set the output directory
    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }

    /// Set the pacing ceiling
    pub fn with_calls_per_second(mut self, calls: u32) -> Self {
        self.calls_per_second = calls;
        self
    }

    /// Set retry and paging limits
    pub fn with_settings(mut self, settings: FetchSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Show or hide terminal spinners
    pub fn with_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    /// Check the config for contradictions
    pub fn validate(&self) -> Result<(), DownloadError> {
        if let (BlockNumber::Number(start), BlockNumber::Number(end)) = (self.start_block, self.end_block) {
            if start > end {
                return Err(DownloadError::ValidationError(format!(
                    "start block {start} is after end block {end}"
                )));
            }
        }
        if self.base_url.trim().is_empty() {
            return Err(DownloadError::ValidationError("explorer base URL is empty".to_string()));
        }
        if self.settings.offset == 0 {
            return Err(DownloadError::ValidationError("page size must be positive".to_string()));
        }
        Ok(())
    }

    /// Jobs to run in order, and the symbols of tokens skipped for lacking a contract
    pub fn jobs(&self) -> (Vec<AssetJob>, Vec<String>) {
        let mut jobs = Vec::new();
        let mut skipped = Vec::new();

        if self.include_native {
            jobs.push(AssetJob::new(AssetSelector::native(self.native_symbol.clone())));
        }

        for token in &self.tokens {
            if token.has_contract() {
                jobs.push(AssetJob::new(AssetSelector::Token(token.clone())));
            } else {
                skipped.push(token.symbol.clone());
            }
        }

        (jobs, skipped)
    }

    fn context_for(&self, job: &AssetJob) -> QueryContext {
        QueryContext::new(
            self.address.clone(),
            self.start_block,
            self.end_block,
            job.asset.clone(),
        )
        .with_offset(self.settings.offset)
    }
}

/// Summary of one export run
#[derive(Debug, Clone, Serialize)]
pub struct ExportReport {
    /// Tracked address
    pub address: String,
    /// Output directory
    pub output_dir: PathBuf,
    /// Per-asset results in run order
    pub assets: Vec<AssetReport>,
    /// Tokens skipped for lacking a contract address
    pub skipped_tokens: Vec<String>,
    /// Combined file, if any rows were written
    pub combined_file: Option<PathBuf>,
}

impl ExportReport {
    /// Records fetched across all assets
    pub fn total_records(&self) -> usize {
        self.assets.iter().map(|a| a.records).sum()
    }

    /// Whether every asset ran to the end of its data
    pub fn is_complete(&self) -> bool {
        self.assets.iter().all(AssetReport::is_complete)
    }

    /// Every file written, per-asset files first
    pub fn files(&self) -> Vec<PathBuf> {
        self.assets
            .iter()
            .filter_map(|a| a.output_path.clone())
            .chain(self.combined_file.clone())
            .collect()
    }
}

/// Runs the assets of an [`ExportConfig`] one after another
pub struct HistoryExecutor {
    config: ExportConfig,
    fetcher: PagedFetcher,
}

impl HistoryExecutor {
    /// Executor talking to the configured explorer over HTTP
    pub fn new(config: ExportConfig) -> Self {
        let source = Arc::new(ExplorerHttpClient::with_calls_per_second(
            config.base_url.clone(),
            config.api_key.clone(),
            config.calls_per_second,
        ));
        Self::with_source(config, source)
    }

    /// Executor reading pages from an arbitrary source
    pub fn with_source(config: ExportConfig, source: Arc<dyn PageSource>) -> Self {
        let fetcher = PagedFetcher::new(source).with_settings(config.settings.clone());
        Self { config, fetcher }
    }

    /// Replace the response policy
    pub fn with_policy(mut self, policy: ResponsePolicy) -> Self {
        self.fetcher = self.fetcher.with_policy(policy);
        self
    }

    /// Config in effect
    pub fn config(&self) -> &ExportConfig {
        &self.config
    }

    /// Fetch every asset, then write the per-asset and combined files
    ///
    /// Fetch problems only end the affected asset and show up in its report.
    /// Output failures abort the run.
    pub async fn run(&self) -> Result<ExportReport, DownloadError> {
        self.config.validate()?;

        let (jobs, skipped_tokens) = self.config.jobs();
        for symbol in &skipped_tokens {
            warn!(token = %symbol, "Skipping token without a contract address");
        }

        info!(
            address = %self.config.address,
            assets = jobs.len(),
            start_block = %self.config.start_block,
            end_block = %self.config.end_block,
            "Starting export"
        );

        let writer = ExportWriter::new(&self.config.output_dir, self.config.address.clone())
            .with_native_decimals(self.config.native_decimals);
        let mut fetched: Vec<(AssetJob, FetchOutcome)> = Vec::with_capacity(jobs.len());
        let mut assets = Vec::with_capacity(jobs.len());

        for job in jobs {
            let outcome = self.fetch_asset(&job).await;

            let output_path = match &job.asset {
                AssetSelector::Native { .. } => writer.write_native(&outcome.records)?,
                AssetSelector::Token(token) => writer.write_token(&token.symbol, &outcome.records)?,
            };

            assets.push(AssetReport::new(&job, &outcome, output_path));
            fetched.push((job, outcome));
        }

        let combined_file = writer.write_combined(
            fetched
                .iter()
                .map(|(job, outcome)| (job.symbol(), outcome.records.as_slice())),
        )?;

        let report = ExportReport {
            address: self.config.address.to_string(),
            output_dir: self.config.output_dir.clone(),
            assets,
            skipped_tokens,
            combined_file,
        };

        info!(
            records = report.total_records(),
            files = report.files().len(),
            complete = report.is_complete(),
            "Export finished"
        );
        Ok(report)
    }

    async fn fetch_asset(&self, job: &AssetJob) -> FetchOutcome {
        let metrics = AssetMetrics::start(job.symbol());
        let progress = AssetProgress::start(job, self.config.show_progress);

        let outcome = self.fetcher.fetch(self.config.context_for(job)).await;

        progress.finish(job, &outcome);
        metrics.record_finished(
            outcome.records.len(),
            outcome.reason.is_complete(),
            outcome.reason.label(),
        );
        outcome
    }
}
