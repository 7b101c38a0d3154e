//! Integration tests for logging and tracing setup

use crate::support::{page, tracked, ScriptedSource};
use std::io;
use std::sync::{Arc, Mutex};
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::EnvFilter;
use tx_history_exporter::fetcher::{
    ApiResponse, AssetSelector, PagedFetcher, QueryContext, StopReason,
};
use tx_history_exporter::BlockNumber;

fn init_test_tracing() {
    // Either succeeds or fails because another test already installed a subscriber
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new("tx_history_exporter=trace"))
        .with_test_writer()
        .try_init();
}

/// In-memory log sink shared with the subscriber
#[derive(Clone, Default)]
struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl CapturedLogs {
    fn text(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl io::Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for CapturedLogs {
    type Writer = Self;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

#[test]
fn test_env_filter_directives_parse() {
    for directive in [
        "info",
        "tx_history_exporter=debug",
        "warn,tx_history_exporter=trace",
        "tx_history_exporter::fetcher=debug,tx_history_exporter=info",
    ] {
        assert!(
            EnvFilter::try_new(directive).is_ok(),
            "directive should parse: {directive}"
        );
    }
}

#[test]
fn test_json_subscriber_builds() {
    let subscriber = tracing_subscriber::fmt()
        .json()
        .with_env_filter(EnvFilter::new("tx_history_exporter=info"))
        .with_test_writer()
        .finish();

    tracing::subscriber::with_default(subscriber, || {
        tracing::info!(asset = "ETH", records = 237, "Fetch finished");
    });
}

#[tokio::test(start_paused = true)]
async fn test_fetch_logs_at_trace_level() {
    init_test_tracing();

    let source = ScriptedSource::new().script(
        "ETH",
        vec![
            Ok(ApiResponse::failure("NOTOK", "Max rate limit reached")),
            Ok(ApiResponse::success(page("p1", 3))),
        ],
    );
    let ctx = QueryContext::new(
        tracked(),
        BlockNumber::Number(0),
        BlockNumber::Latest,
        AssetSelector::native("ETH"),
    );

    let span = tracing::info_span!("export", address = %tracked());
    let outcome = {
        let _enter = span.enter();
        PagedFetcher::new(Arc::new(source)).fetch(ctx).await
    };

    assert_eq!(outcome.reason, StopReason::EndOfData);
    assert_eq!(outcome.records.len(), 3);
}

#[tokio::test(start_paused = true)]
async fn test_page_progress_visible_at_default_level() {
    let logs = CapturedLogs::default();
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new("tx_history_exporter=info"))
        .with_writer(logs.clone())
        .with_ansi(false)
        .finish();
    let _guard = tracing::subscriber::set_default(subscriber);

    let source = ScriptedSource::new().script(
        "ETH",
        vec![
            Ok(ApiResponse::success(page("p1", 100))),
            Ok(ApiResponse::success(page("p2", 5))),
        ],
    );
    let ctx = QueryContext::new(
        tracked(),
        BlockNumber::Number(0),
        BlockNumber::Latest,
        AssetSelector::native("ETH"),
    );
    let outcome = PagedFetcher::new(Arc::new(source)).fetch(ctx).await;
    assert_eq!(outcome.records.len(), 105);

    let text = logs.text();
    assert!(text.contains("Fetched page"), "missing page progress:\n{text}");
    assert!(text.contains("total=100"));
    assert!(text.contains("Fetched last page"));
    assert!(text.contains("total=105"));
}
