//! Explorer request metrics
//!
//! Every counter is labelled by `asset`, the symbol of the asset being fetched.
//! Counters are recorded through the `metrics` facade and cost nothing until a
//! recorder is installed. [`init_metrics`] installs the Prometheus exporter with
//! a scrape endpoint; the CLI only calls it when `--metrics-addr` is given.

use metrics::{counter, describe_counter, Unit};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;
use tracing::{debug, info, warn};

/// Explorer page requests, labelled by asset and HTTP status
pub const REQUESTS_TOTAL: &str = "explorer_requests_total";
/// Transport failures (network, non-2xx, undecodable body)
pub const TRANSPORT_ERRORS_TOTAL: &str = "explorer_transport_errors_total";
/// "Max rate limit reached" responses that were retried
pub const RATE_LIMIT_RETRIES_TOTAL: &str = "explorer_rate_limit_retries_total";
/// Records accumulated per asset
pub const RECORDS_TOTAL: &str = "explorer_records_total";

static METRICS_INITIALIZED: AtomicBool = AtomicBool::new(false);

/// Metrics setup errors
#[derive(Debug, thiserror::Error)]
pub enum MetricsError {
    /// Exporter could not be installed or bound
    #[error("failed to install Prometheus exporter on {addr}: {reason}")]
    Install {
        /// Requested listen address
        addr: SocketAddr,
        /// Underlying error
        reason: String,
    },
}

/// Install the Prometheus exporter on `addr`
///
/// Idempotent: later calls are no-ops once an exporter is installed.
pub fn init_metrics(addr: SocketAddr) -> Result<(), MetricsError> {
    if METRICS_INITIALIZED.swap(true, Ordering::SeqCst) {
        debug!("Metrics already initialized, skipping");
        return Ok(());
    }

    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .map_err(|e| {
            METRICS_INITIALIZED.store(false, Ordering::SeqCst);
            MetricsError::Install {
                addr,
                reason: e.to_string(),
            }
        })?;

    describe_counter!(REQUESTS_TOTAL, Unit::Count, "Explorer page requests issued");
    describe_counter!(
        TRANSPORT_ERRORS_TOTAL,
        Unit::Count,
        "Explorer requests that failed at the transport layer"
    );
    describe_counter!(
        RATE_LIMIT_RETRIES_TOTAL,
        Unit::Count,
        "Explorer pages retried after a rate limit response"
    );
    describe_counter!(RECORDS_TOTAL, Unit::Count, "Records fetched per asset");

    info!(%addr, "Metrics exporter listening");
    Ok(())
}

/// Check if the exporter is installed
pub fn is_initialized() -> bool {
    METRICS_INITIALIZED.load(Ordering::SeqCst)
}

/// Record one explorer request
pub fn record_request(asset: &str, status: &str) {
    counter!(
        REQUESTS_TOTAL,
        "asset" => asset.to_string(),
        "status" => status.to_string(),
    )
    .increment(1);
}

/// Record one transport failure
pub fn record_transport_error(asset: &str) {
    counter!(TRANSPORT_ERRORS_TOTAL, "asset" => asset.to_string()).increment(1);
}

/// Record one rate-limit retry
pub fn record_rate_limit_retry(asset: &str) {
    counter!(RATE_LIMIT_RETRIES_TOTAL, "asset" => asset.to_string()).increment(1);
}

/// Record the records fetched for one asset
pub fn record_records(asset: &str, count: usize) {
    counter!(RECORDS_TOTAL, "asset" => asset.to_string()).increment(count as u64);
}

/// Wall-clock tracking of one asset export
pub struct AssetMetrics {
    asset: String,
    start_time: Instant,
}

impl AssetMetrics {
    /// Start tracking an asset
    pub fn start(asset: impl Into<String>) -> Self {
        let asset = asset.into();
        info!(asset = %asset, "Asset export started");
        Self {
            asset,
            start_time: Instant::now(),
        }
    }

    /// Record that the asset finished with `records` records
    pub fn record_finished(&self, records: usize, complete: bool, reason: &str) {
        let duration = self.start_time.elapsed();
        if complete {
            info!(
                asset = %self.asset,
                records,
                duration_secs = duration.as_secs(),
                reason,
                "Asset export completed"
            );
        } else {
            warn!(
                asset = %self.asset,
                records,
                duration_secs = duration.as_secs(),
                reason,
                "Asset export stopped early; records may be incomplete"
            );
        }
    }
}
