//! Builder pattern implementation for creating [`DownloadTasks`].
//!
//! # Examples
//!
//! ```rust
//! use multibar::download::DownloadTasksBuilder;
//! use multibar::term::AnsiTerminal;
//! use multibar::MultiBar;
//! use reqwest::header::{self, HeaderValue};
//!
//! # fn main() -> multibar::Result<()> {
//! let bars = MultiBar::builder().output(AnsiTerminal::new(Vec::new())).build();
//! let tasks = DownloadTasksBuilder::new()
//!     .directory("downloads".into())
//!     .retries(5)
//!     .header(header::USER_AGENT, HeaderValue::from_static("multibar/0.3"))
//!     .build(bars)?;
//! # tasks.close();
//! # Ok(())
//! # }
//! ```

use super::config::DownloadConfig;
use super::{DownloadTask, DownloadTasks};
use crate::tracker::Tracker;
use crate::MultiBar;
use crate::{Error, Result};

use reqwest::header::{HeaderMap, HeaderValue, IntoHeaderName};
use std::{path::PathBuf, sync::Arc, time::Duration};

/// Worker threads of the runtime shared by the download tasks.
const RUNTIME_THREADS: usize = 2;

/// A builder used to create [`DownloadTasks`].
#[derive(Debug, Default)]
pub struct DownloadTasksBuilder {
    config: DownloadConfig,
}

impl DownloadTasksBuilder {
    /// Creates a builder with the default options.
    pub fn new() -> Self {
        DownloadTasksBuilder::default()
    }

    /// Sets the directory where to store the downloads.
    pub fn directory(mut self, directory: PathBuf) -> Self {
        self.config.directory = directory;
        self
    }

    /// Set whether partial files are continued with a ranged request.
    pub fn resumable(mut self, resumable: bool) -> Self {
        self.config.resumable = resumable;
        self
    }

    /// Set the number of retries per request.
    pub fn retries(mut self, retries: u32) -> Self {
        self.config.retries = retries;
        self
    }

    /// Route every request through a proxy.
    pub fn proxy(mut self, proxy: reqwest::Proxy) -> Self {
        self.config.proxy = Some(proxy);
        self
    }

    /// Set the limit for establishing a connection. `None` waits indefinitely.
    pub fn connect_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.config.connect_timeout = timeout;
        self
    }

    /// Set the largest slice written at once. Zero keeps the default.
    pub fn buffer_size(mut self, size: usize) -> Self {
        if size > 0 {
            self.config.buffer_size = size;
        }
        self
    }

    /// Replace the default request logic, see [`OnDownloadStart`](super::OnDownloadStart).
    pub fn on_start<F>(mut self, callback: F) -> Self
    where
        F: Fn(&DownloadTask, &Tracker) -> Result<()> + Send + Sync + 'static,
    {
        self.config.on_start = Some(Arc::new(callback));
        self
    }

    fn new_header(&self) -> HeaderMap {
        match self.config.headers {
            Some(ref h) => h.to_owned(),
            _ => HeaderMap::new(),
        }
    }

    /// Add the http headers.
    ///
    /// You can call `.headers()` multiple times and all `HeaderMap` will be
    /// merged into a single one.
    pub fn headers(mut self, headers: HeaderMap) -> Self {
        let mut new = self.new_header();
        new.extend(headers);

        self.config.headers = Some(new);
        self
    }

    /// Add the http header.
    pub fn header<K: IntoHeaderName>(mut self, name: K, value: HeaderValue) -> Self {
        let mut new = self.new_header();

        new.insert(name, value);

        self.config.headers = Some(new);
        self
    }

    /// Create the [`DownloadTasks`] painting on `bars`.
    ///
    /// Fails when the HTTP client or the I/O runtime cannot be created.
    pub fn build(self, bars: MultiBar) -> Result<DownloadTasks> {
        let client = crate::http::create_http_client((&self.config).into())?;
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(RUNTIME_THREADS)
            .thread_name("multibar-download")
            .enable_all()
            .build()
            .map_err(|e| Error::Runtime(e.to_string()))?;
        Ok(DownloadTasks::with_parts(
            bars,
            self.config,
            client,
            Arc::new(runtime),
        ))
    }
}
