//! Integration tests for the explorer HTTP client against a mock server

use crate::support::{tracked, TRACKED};
use serde_json::json;
use std::sync::Arc;
use tx_history_exporter::downloader::RateLimiter;
use tx_history_exporter::fetcher::{
    ApiResult, AssetSelector, ExplorerHttpClient, FetcherError, PageSource,
    PagedFetcher, QueryContext, ResponseStatus, StopReason,
};
use tx_history_exporter::registry::TokenContract;
use tx_history_exporter::BlockNumber;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const USDC: &str = "0xA0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48";

// Each test runtime gets its own connection pool
fn client(server: &MockServer, api_key: &str) -> ExplorerHttpClient {
    ExplorerHttpClient::new(
        Arc::new(reqwest::Client::new()),
        format!("{}/api", server.uri()),
        api_key,
        Arc::new(RateLimiter::per_second(100)),
    )
}

fn native_ctx() -> QueryContext {
    QueryContext::new(
        tracked(),
        BlockNumber::Number(0),
        BlockNumber::Latest,
        AssetSelector::native("ETH"),
    )
}

fn tx(hash: &str) -> serde_json::Value {
    json!({
        "blockNumber": "14881677",
        "timeStamp": "1654041600",
        "hash": hash,
        "from": TRACKED,
        "to": "0x0000000000000000000000000000000000000001",
        "value": "1000000000000000000",
    })
}

#[tokio::test]
async fn test_native_query_parameters_and_decode() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api"))
        .and(query_param("module", "account"))
        .and(query_param("action", "txlist"))
        .and(query_param("address", TRACKED))
        .and(query_param("page", "1"))
        .and(query_param("offset", "100"))
        .and(query_param("startblock", "0"))
        .and(query_param("endblock", "99999999"))
        .and(query_param("sort", "asc"))
        .and(query_param("apikey", "TESTKEY"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "1",
            "message": "OK",
            "result": [tx("0xaaa"), tx("0xbbb")],
        })))
        .expect(1)
        .mount(&server)
        .await;

    let response = client(&server, "TESTKEY")
        .fetch_page(&native_ctx())
        .await
        .unwrap();

    assert_eq!(response.status, ResponseStatus::Success);
    assert_eq!(response.message, "OK");
    let records = response.into_records();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].hash(), Some("0xaaa"));
    assert_eq!(records[1].text("blockNumber").as_deref(), Some("14881677"));
}

#[tokio::test]
async fn test_token_query_includes_contract() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(query_param("action", "tokentx"))
        .and(query_param("contractaddress", USDC))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "0",
            "message": "No transactions found",
            "result": [],
        })))
        .expect(1)
        .mount(&server)
        .await;

    let ctx = QueryContext::new(
        tracked(),
        BlockNumber::Number(0),
        BlockNumber::Latest,
        AssetSelector::Token(TokenContract::new("USDC", USDC)),
    );
    let response = client(&server, "").fetch_page(&ctx).await.unwrap();

    assert_eq!(response.status, ResponseStatus::Failure);
    assert_eq!(response.message, "No transactions found");
}

#[tokio::test]
async fn test_explorer_error_is_passed_through() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "0",
            "message": "NOTOK",
            "result": "Max rate limit reached",
        })))
        .mount(&server)
        .await;

    let response = client(&server, "").fetch_page(&native_ctx()).await.unwrap();

    assert_eq!(response.status, ResponseStatus::Failure);
    assert_eq!(response.result, ApiResult::Text("Max rate limit reached".to_string()));
}

#[tokio::test]
async fn test_server_error_becomes_http_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
        .mount(&server)
        .await;

    let err = client(&server, "").fetch_page(&native_ctx()).await.unwrap_err();

    match err {
        FetcherError::HttpError(msg) => {
            assert!(msg.contains("502"), "unexpected message: {msg}");
            assert!(msg.contains("bad gateway"));
        }
        other => panic!("expected HttpError, got {other:?}"),
    }
}

#[tokio::test]
async fn test_invalid_body_becomes_parse_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .mount(&server)
        .await;

    let err = client(&server, "").fetch_page(&native_ctx()).await.unwrap_err();
    assert!(matches!(err, FetcherError::ParseError(_)));
}

#[tokio::test]
async fn test_unreachable_server_becomes_network_error() {
    // reserve a free port, then close it so nothing is listening
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = ExplorerHttpClient::new(
        Arc::new(reqwest::Client::new()),
        format!("http://{addr}/api"),
        "",
        Arc::new(RateLimiter::per_second(100)),
    );
    let err = client.fetch_page(&native_ctx()).await.unwrap_err();
    assert!(matches!(err, FetcherError::NetworkError(_)));
}

#[tokio::test]
async fn test_paged_fetch_over_http() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "1",
            "message": "OK",
            "result": [tx("0x01"), tx("0x02")],
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "1",
            "message": "OK",
            "result": [tx("0x03")],
        })))
        .expect(1)
        .mount(&server)
        .await;

    let fetcher = PagedFetcher::new(Arc::new(client(&server, "")));
    let outcome = fetcher.fetch(native_ctx().with_offset(2)).await;

    assert_eq!(outcome.reason, StopReason::EndOfData);
    assert_eq!(outcome.records.len(), 3);
    assert_eq!(outcome.stats.requests, 2);
}
