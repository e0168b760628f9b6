//! Tests for HTTP module functionality.

use multibar::download::DownloadTasksBuilder;
use multibar::http::client::{create_http_client, HttpClientConfig, DEFAULT_USER_AGENT};
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use reqwest::StatusCode;

mod common;
use common::helpers::*;
use common::range_server;

fn test_headers(agent: &'static str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(USER_AGENT, HeaderValue::from_static(agent));
    headers
}

#[test]
fn test_default_config() {
    let config = HttpClientConfig::default();
    assert_eq!(config.retries, 3);
    assert!(config.proxy.is_none());
    assert!(config.headers.is_none());
}

#[test]
fn test_http_config_with_custom_headers() {
    let config = HttpClientConfig {
        retries: 2,
        headers: Some(test_headers("custom-test-agent")),
        ..HttpClientConfig::default()
    };

    assert!(create_http_client(config.clone()).is_ok());
    assert_eq!(
        config.headers.unwrap().get(USER_AGENT),
        Some(&HeaderValue::from_static("custom-test-agent"))
    );
}

#[tokio::test]
async fn test_range_not_satisfiable_is_not_retried() {
    let server = range_server::start(create_test_content(100));
    let client = create_http_client(HttpClientConfig {
        headers: Some(test_headers("multibar-test")),
        ..HttpClientConfig::default()
    })
    .unwrap();

    let response = client
        .get(server.file_url("f"))
        .header("Range", "bytes=100-")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::RANGE_NOT_SATISFIABLE);
    assert_eq!(server.requests().len(), 1);
}

#[tokio::test]
async fn test_default_user_agent_is_sent() {
    let server = range_server::start(create_test_content(10));
    let client = create_http_client(HttpClientConfig::default()).unwrap();
    let response = client.get(server.file_url("f")).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(server.user_agents(), vec![DEFAULT_USER_AGENT.to_string()]);
}

#[test]
fn test_download_settings_reach_the_client() {
    let (bars, _out) = capture();
    let tasks = DownloadTasksBuilder::new()
        .retries(0)
        .connect_timeout(None)
        .build(bars)
        .unwrap();
    assert_eq!(tasks.config().retries, 0);
    assert!(tasks.config().connect_timeout.is_none());
    let http = HttpClientConfig::from(tasks.config());
    assert_eq!(http.retries, 0);
    assert!(http.connect_timeout.is_none());
    tasks.close();
}
