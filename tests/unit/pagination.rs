//! Unit tests for PagedFetcher driven by a scripted page source

use crate::support::{hashes, page, tracked, ScriptedSource};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tx_history_exporter::downloader::FetchSettings;
use tx_history_exporter::fetcher::{
    ApiFailure, ApiResponse, AssetSelector, FetcherError, NoDuplicateDetection, PagedFetcher,
    QueryContext, ResponsePolicy, StopReason,
};
use tx_history_exporter::BlockNumber;

fn native_ctx() -> QueryContext {
    QueryContext::new(
        tracked(),
        BlockNumber::Number(0),
        BlockNumber::Latest,
        AssetSelector::native("ETH"),
    )
}

fn fetcher(source: Arc<ScriptedSource>) -> PagedFetcher {
    PagedFetcher::new(source)
}

#[tokio::test(start_paused = true)]
async fn test_two_full_pages_then_short_page() {
    let source = Arc::new(ScriptedSource::new().script(
        "ETH",
        vec![
            Ok(ApiResponse::success(page("p1", 100))),
            Ok(ApiResponse::success(page("p2", 100))),
            Ok(ApiResponse::success(page("p3", 37))),
        ],
    ));

    let outcome = fetcher(source.clone()).fetch(native_ctx()).await;

    assert_eq!(outcome.reason, StopReason::EndOfData);
    assert_eq!(outcome.records.len(), 237);
    assert_eq!(outcome.stats.pages, 3);
    assert_eq!(outcome.stats.requests, 3);
    assert_eq!(source.pages_requested("ETH"), vec![1, 2, 3]);

    // page order preserved, no overlap
    let all = hashes(&outcome.records);
    assert_eq!(all[0], "p1-0");
    assert_eq!(all[100], "p2-0");
    assert_eq!(all[236], "p3-36");
}

#[tokio::test(start_paused = true)]
async fn test_repeated_page_stops_without_appending() {
    let source = Arc::new(ScriptedSource::new().script(
        "ETH",
        vec![
            Ok(ApiResponse::success(page("same", 100))),
            Ok(ApiResponse::success(page("same", 100))),
        ],
    ));

    let outcome = fetcher(source.clone()).fetch(native_ctx()).await;

    assert_eq!(outcome.reason, StopReason::DuplicatePage);
    assert_eq!(outcome.records.len(), 100);
    assert_eq!(outcome.stats.pages, 1);
    assert_eq!(source.pages_requested("ETH"), vec![1, 2]);
}

#[tokio::test(start_paused = true)]
async fn test_rate_limit_retries_same_page_after_cooldown() {
    let source = Arc::new(ScriptedSource::new().script(
        "ETH",
        vec![
            Ok(ApiResponse::failure("NOTOK", "Max rate limit reached")),
            Ok(ApiResponse::success(page("p1", 50))),
        ],
    ));

    let start = Instant::now();
    let outcome = fetcher(source.clone()).fetch(native_ctx()).await;

    assert_eq!(outcome.reason, StopReason::EndOfData);
    assert_eq!(outcome.records.len(), 50);
    assert_eq!(outcome.stats.rate_limit_retries, 1);
    assert_eq!(source.pages_requested("ETH"), vec![1, 1]);
    assert!(start.elapsed() >= Duration::from_secs(10));
}

#[tokio::test(start_paused = true)]
async fn test_no_transactions_found_on_first_call() {
    let source = Arc::new(
        ScriptedSource::new().script("ETH", vec![Ok(ApiResponse::failure("No transactions found", "[]"))]),
    );

    let outcome = fetcher(source).fetch(native_ctx()).await;

    assert_eq!(outcome.reason, StopReason::EndOfData);
    assert!(outcome.records.is_empty());
    assert_eq!(outcome.stats.pages, 0);
}

#[tokio::test(start_paused = true)]
async fn test_no_transactions_found_after_full_pages_keeps_records() {
    let source = Arc::new(ScriptedSource::new().script(
        "ETH",
        vec![
            Ok(ApiResponse::success(page("p1", 100))),
            Ok(ApiResponse::failure("No transactions found", "")),
        ],
    ));

    let outcome = fetcher(source).fetch(native_ctx()).await;

    assert_eq!(outcome.reason, StopReason::EndOfData);
    assert_eq!(outcome.records.len(), 100);
}

#[tokio::test(start_paused = true)]
async fn test_api_error_keeps_accumulated_records() {
    let source = Arc::new(ScriptedSource::new().script(
        "ETH",
        vec![
            Ok(ApiResponse::success(page("p1", 100))),
            Ok(ApiResponse::failure("NOTOK", "Invalid API Key")),
        ],
    ));

    let outcome = fetcher(source).fetch(native_ctx()).await;

    assert_eq!(
        outcome.reason,
        StopReason::ApiError(ApiFailure {
            message: "NOTOK".to_string(),
            result: "Invalid API Key".to_string(),
        })
    );
    assert_eq!(outcome.records.len(), 100);
}

#[tokio::test(start_paused = true)]
async fn test_transport_failure_is_retried_with_backoff() {
    let source = Arc::new(ScriptedSource::new().script(
        "ETH",
        vec![
            Err(FetcherError::NetworkError("connection reset".into())),
            Err(FetcherError::HttpError("status 502".into())),
            Ok(ApiResponse::success(page("p1", 10))),
        ],
    ));

    let start = Instant::now();
    let outcome = fetcher(source.clone()).fetch(native_ctx()).await;

    assert_eq!(outcome.reason, StopReason::EndOfData);
    assert_eq!(outcome.records.len(), 10);
    assert_eq!(outcome.stats.transport_retries, 2);
    assert_eq!(source.pages_requested("ETH"), vec![1, 1, 1]);
    // 5s + 10s of backoff
    assert!(start.elapsed() >= Duration::from_secs(15));
}

#[tokio::test(start_paused = true)]
async fn test_transport_retries_exhaust_into_transport_error() {
    let mut script = vec![Ok(ApiResponse::success(page("p1", 100)))];
    script.extend((0..3).map(|_| Err(FetcherError::NetworkError("timeout".into()))));
    let source = Arc::new(ScriptedSource::new().script("ETH", script));

    let outcome = fetcher(source.clone())
        .with_settings(FetchSettings::default().with_max_transport_retries(2))
        .fetch(native_ctx())
        .await;

    assert!(matches!(outcome.reason, StopReason::TransportError(_)));
    assert_eq!(outcome.records.len(), 100);
    assert_eq!(outcome.stats.transport_retries, 2);
    assert_eq!(source.pages_requested("ETH"), vec![1, 2, 2, 2]);
}

#[tokio::test(start_paused = true)]
async fn test_zero_transport_retries_stops_immediately() {
    let source = Arc::new(
        ScriptedSource::new().script("ETH", vec![Err(FetcherError::ParseError("not json".into()))]),
    );

    let outcome = fetcher(source)
        .with_settings(FetchSettings::default().with_max_transport_retries(0))
        .fetch(native_ctx())
        .await;

    assert_eq!(
        outcome.reason,
        StopReason::TransportError("parse error: not json".to_string())
    );
    assert_eq!(outcome.stats.requests, 1);
}

#[tokio::test(start_paused = true)]
async fn test_rate_limit_retries_are_bounded() {
    let script = (0..4)
        .map(|_| Ok(ApiResponse::failure("NOTOK", "Max rate limit reached")))
        .collect();
    let source = Arc::new(ScriptedSource::new().script("ETH", script));

    let outcome = fetcher(source.clone())
        .with_settings(FetchSettings::default().with_max_rate_limit_retries(3))
        .fetch(native_ctx())
        .await;

    assert_eq!(outcome.reason, StopReason::RateLimitExhausted);
    assert_eq!(outcome.stats.rate_limit_retries, 3);
    assert_eq!(source.pages_requested("ETH"), vec![1, 1, 1, 1]);
}

#[tokio::test(start_paused = true)]
async fn test_rate_limit_budget_resets_after_accepted_page() {
    let source = Arc::new(ScriptedSource::new().script(
        "ETH",
        vec![
            Ok(ApiResponse::failure("NOTOK", "Max rate limit reached")),
            Ok(ApiResponse::success(page("p1", 100))),
            Ok(ApiResponse::failure("NOTOK", "Max rate limit reached")),
            Ok(ApiResponse::success(page("p2", 1))),
        ],
    ));

    let outcome = fetcher(source)
        .with_settings(FetchSettings::default().with_max_rate_limit_retries(1))
        .fetch(native_ctx())
        .await;

    assert_eq!(outcome.reason, StopReason::EndOfData);
    assert_eq!(outcome.records.len(), 101);
    assert_eq!(outcome.stats.rate_limit_retries, 2);
}

#[tokio::test(start_paused = true)]
async fn test_page_ceiling() {
    let script = (0..3)
        .map(|i| Ok(ApiResponse::success(page(&format!("p{i}"), 100))))
        .collect();
    let source = Arc::new(ScriptedSource::new().script("ETH", script));

    let outcome = fetcher(source)
        .with_settings(FetchSettings::default().with_max_pages(2))
        .fetch(native_ctx())
        .await;

    assert_eq!(outcome.reason, StopReason::PageLimitReached);
    assert_eq!(outcome.records.len(), 200);
}

#[tokio::test(start_paused = true)]
async fn test_disabled_duplicate_detection_keeps_paging() {
    let source = Arc::new(ScriptedSource::new().script(
        "ETH",
        vec![
            Ok(ApiResponse::success(page("same", 100))),
            Ok(ApiResponse::success(page("same", 100))),
            Ok(ApiResponse::success(vec![])),
        ],
    ));

    let outcome = fetcher(source)
        .with_policy(ResponsePolicy::new(Box::new(NoDuplicateDetection)))
        .fetch(native_ctx())
        .await;

    assert_eq!(outcome.reason, StopReason::EndOfData);
    assert_eq!(outcome.records.len(), 200);
}

#[tokio::test(start_paused = true)]
async fn test_malformed_response_stops() {
    let source = Arc::new(ScriptedSource::new().script(
        "ETH",
        vec![Ok(ApiResponse::from_value(serde_json::json!({"unexpected": true})))],
    ));

    let outcome = fetcher(source).fetch(native_ctx()).await;

    assert!(matches!(outcome.reason, StopReason::MalformedResponse(_)));
    assert!(outcome.records.is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_custom_offset_drives_short_page_detection() {
    let source = Arc::new(ScriptedSource::new().script(
        "ETH",
        vec![
            Ok(ApiResponse::success(page("p1", 10))),
            Ok(ApiResponse::success(page("p2", 9))),
        ],
    ));

    let outcome = fetcher(source).fetch(native_ctx().with_offset(10)).await;

    assert_eq!(outcome.reason, StopReason::EndOfData);
    assert_eq!(outcome.records.len(), 19);
}
