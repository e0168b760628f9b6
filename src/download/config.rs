//! Configuration structures and defaults for download tasks.

use super::DownloadTask;
use crate::http::client::DEFAULT_CONNECT_TIMEOUT;
use crate::tracker::Tracker;
use crate::Result;

use reqwest::header::HeaderMap;
use std::env::current_dir;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// Largest slice of the response body written in one step.
pub const DEFAULT_BUFFER_SIZE: usize = 4096;

/// Replaces the default request logic of a download task.
///
/// The callback runs on the task thread. It is expected to send the request
/// and hand the response and the destination file to
/// [`DownloadTask::attach`]; an error is logged and stalls the task.
pub type OnDownloadStart = Arc<dyn Fn(&DownloadTask, &Tracker) -> Result<()> + Send + Sync>;

/// Configuration structure for [`DownloadTasks`](super::DownloadTasks).
#[derive(Clone)]
pub struct DownloadConfig {
    /// Directory where to store the downloaded files.
    pub directory: PathBuf,
    /// Continue partial files with a ranged request.
    pub resumable: bool,
    /// Number of retries per request, handled by the HTTP middleware.
    pub retries: u32,
    /// Optional proxy configuration.
    pub proxy: Option<reqwest::Proxy>,
    /// Custom HTTP headers.
    pub headers: Option<HeaderMap>,
    /// Limit for establishing a connection.
    pub connect_timeout: Option<Duration>,
    /// Largest slice written to the file and the tracker at once.
    pub buffer_size: usize,
    /// Custom start logic.
    pub on_start: Option<OnDownloadStart>,
}

impl std::fmt::Debug for DownloadConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DownloadConfig")
            .field("directory", &self.directory)
            .field("resumable", &self.resumable)
            .field("retries", &self.retries)
            .field("proxy", &self.proxy)
            .field("headers", &self.headers)
            .field("connect_timeout", &self.connect_timeout)
            .field("buffer_size", &self.buffer_size)
            .field("on_start", &self.on_start.is_some())
            .finish()
    }
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            directory: current_dir().unwrap_or_default(),
            resumable: true,
            retries: 3,
            proxy: None,
            headers: None,
            connect_timeout: Some(DEFAULT_CONNECT_TIMEOUT),
            buffer_size: DEFAULT_BUFFER_SIZE,
            on_start: None,
        }
    }
}
