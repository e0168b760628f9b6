//! HTTP client setup and middleware configuration.
//!
//! ```rust,no_run
//! use multibar::http::{create_http_client, HttpClientConfig};
//! use reqwest::Proxy;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = HttpClientConfig {
//!     proxy: Some(Proxy::http("http://proxy.example.com:8080")?),
//!     ..HttpClientConfig::default()
//! };
//! let client = create_http_client(config)?;
//! # Ok(())
//! # }
//! ```

use crate::download::DownloadConfig;
use crate::Result;

use reqwest::{
    header::{HeaderMap, HeaderValue, USER_AGENT},
    Proxy,
};
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::{policies::ExponentialBackoff, RetryTransientMiddleware};
use reqwest_tracing::TracingMiddleware;
use std::time::Duration;
use tracing::debug;

/// User agent sent when the headers do not carry one.
pub const DEFAULT_USER_AGENT: &str = concat!("multibar/", env!("CARGO_PKG_VERSION"));

/// Default limit for establishing a connection.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

/// Shortest and longest pause between two attempts of one request.
const RETRY_BOUNDS: (Duration, Duration) = (Duration::from_millis(200), Duration::from_secs(10));

/// Configuration for HTTP client setup.
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    /// Number of retries for transient failures.
    pub retries: u32,
    /// Optional proxy configuration.
    pub proxy: Option<Proxy>,
    /// Default headers to include with all requests.
    pub headers: Option<HeaderMap>,
    /// Limit for establishing a connection. `None` waits indefinitely.
    pub connect_timeout: Option<Duration>,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            retries: 3,
            proxy: None,
            headers: None,
            connect_timeout: Some(DEFAULT_CONNECT_TIMEOUT),
        }
    }
}

impl From<&DownloadConfig> for HttpClientConfig {
    fn from(config: &DownloadConfig) -> Self {
        Self {
            retries: config.retries,
            proxy: config.proxy.clone(),
            headers: config.headers.clone(),
            connect_timeout: config.connect_timeout,
        }
    }
}

impl HttpClientConfig {
    /// The configured headers, with [`DEFAULT_USER_AGENT`] filled in.
    pub fn effective_headers(&self) -> HeaderMap {
        let mut headers = self.headers.clone().unwrap_or_default();
        if !headers.contains_key(USER_AGENT) {
            headers.insert(USER_AGENT, HeaderValue::from_static(DEFAULT_USER_AGENT));
        }
        headers
    }
}

/// Creates the client shared by the download tasks.
///
/// Requests are traced, and transient failures (connection errors, 5xx,
/// 408 and 429) are retried with a bounded exponential backoff. A "range
/// not satisfiable" answer reaches the caller untouched, since it tells a
/// resuming task that the file is already complete.
pub fn create_http_client(config: HttpClientConfig) -> Result<ClientWithMiddleware> {
    let retry_policy = ExponentialBackoff::builder()
        .retry_bounds(RETRY_BOUNDS.0, RETRY_BOUNDS.1)
        .build_with_max_retries(config.retries);

    let mut inner = reqwest::Client::builder().default_headers(config.effective_headers());
    if let Some(timeout) = config.connect_timeout {
        inner = inner.connect_timeout(timeout);
    }
    if let Some(proxy) = config.proxy {
        inner = inner.proxy(proxy);
    }
    debug!(
        retries = config.retries,
        connect_timeout = ?config.connect_timeout,
        "creating http client"
    );

    Ok(ClientBuilder::new(inner.build()?)
        .with(TracingMiddleware::default())
        .with(RetryTransientMiddleware::new_with_policy(retry_policy))
        .build())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = HttpClientConfig::default();
        assert_eq!(config.retries, 3);
        assert!(config.proxy.is_none());
        assert!(config.headers.is_none());
        assert_eq!(config.connect_timeout, Some(DEFAULT_CONNECT_TIMEOUT));
        assert!(create_http_client(config).is_ok());
    }

    #[test]
    fn test_user_agent_is_filled_in() {
        let headers = HttpClientConfig::default().effective_headers();
        assert_eq!(headers.get(USER_AGENT).unwrap(), DEFAULT_USER_AGENT);
    }

    #[test]
    fn test_custom_user_agent_wins() {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static("test-agent"));
        let config = HttpClientConfig {
            headers: Some(headers),
            ..HttpClientConfig::default()
        };
        assert_eq!(config.effective_headers().get(USER_AGENT).unwrap(), "test-agent");
        assert!(create_http_client(config).is_ok());
    }

    #[test]
    fn test_from_download_config() {
        let download = DownloadConfig {
            retries: 7,
            proxy: Some(Proxy::all("http://127.0.0.1:3128").unwrap()),
            connect_timeout: None,
            ..DownloadConfig::default()
        };
        let config = HttpClientConfig::from(&download);
        assert_eq!(config.retries, 7);
        assert!(config.proxy.is_some());
        assert!(config.connect_timeout.is_none());
    }
}
