//! HTTP client used by the download tasks.
//!
//! Requests go through a middleware stack: transient failures are retried
//! with exponential backoff and every request is traced with `tracing`.
//! The client is built once per [`DownloadTasks`](crate::DownloadTasks)
//! from its [`DownloadConfig`](crate::download::DownloadConfig).
//!
//! ```rust
//! use multibar::http::{create_http_client, HttpClientConfig};
//! use reqwest::header::{HeaderMap, USER_AGENT};
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let mut headers = HeaderMap::new();
//! headers.insert(USER_AGENT, "MyApp/1.0".parse()?);
//!
//! let config = HttpClientConfig {
//!     retries: 5,
//!     headers: Some(headers),
//!     ..HttpClientConfig::default()
//! };
//!
//! let client = create_http_client(config)?;
//! # Ok(())
//! # }
//! ```

pub mod client;

pub use client::{create_http_client, HttpClientConfig, DEFAULT_USER_AGENT};
