//! Resumable HTTP downloads as progress tasks.
//!
//! [`DownloadTasks`] wraps a [`Tasks`] runner: every URL added becomes a
//! tracker whose task thread requests the file, seeds the bar with the bytes
//! already on disk, and streams the rest into the file.
//!
//! # Examples
//!
//! ```rust,no_run
//! use multibar::download::DownloadTasks;
//! use multibar::MultiBar;
//!
//! # fn main() -> multibar::Result<()> {
//! let tasks = DownloadTasks::builder()
//!     .directory("downloads".into())
//!     .build(MultiBar::new())?;
//! for ver in ["1.21.0", "1.22.0"] {
//!     let url = format!("https://go.dev/dl/go{ver}.src.tar.gz");
//!     tasks.add_with(&url, "", |bar| bar.stepper(1))?;
//! }
//! tasks.wait();
//! tasks.close();
//! # Ok(())
//! # }
//! ```

pub mod builder;
pub mod config;
mod task;

pub use builder::DownloadTasksBuilder;
pub use config::{DownloadConfig, OnDownloadStart, DEFAULT_BUFFER_SIZE};
pub use task::{filename_from_url, plan_resume, DownloadTask, ResumePlan};

use crate::error::Error;
use crate::task::{TaskBuilder, Tasks};
use crate::tracker::{Tracker, TrackerBuilder};
use crate::{MultiBar, Result};

use reqwest::Url;
use reqwest_middleware::ClientWithMiddleware;
use std::{sync::Arc, time::Duration};
use tokio::runtime::Runtime;
use tracing::error;

/// Downloads running as tasks on one coordinator.
pub struct DownloadTasks {
    tasks: Tasks,
    config: DownloadConfig,
    client: ClientWithMiddleware,
    runtime: Arc<Runtime>,
}

impl DownloadTasks {
    /// Download tasks with the default configuration.
    pub fn new(bars: MultiBar) -> Result<Self> {
        DownloadTasksBuilder::new().build(bars)
    }

    /// Creates a builder.
    pub fn builder() -> DownloadTasksBuilder {
        DownloadTasksBuilder::new()
    }

    pub(crate) fn with_parts(
        bars: MultiBar,
        config: DownloadConfig,
        client: ClientWithMiddleware,
        runtime: Arc<Runtime>,
    ) -> Self {
        Self {
            tasks: Tasks::new(bars),
            config,
            client,
            runtime,
        }
    }

    /// The configuration the downloads were built with.
    pub fn config(&self) -> &DownloadConfig {
        &self.config
    }

    /// The coordinator painting the downloads.
    pub fn multibar(&self) -> &MultiBar {
        self.tasks.multibar()
    }

    /// Prepares a download without adding it.
    ///
    /// An empty `filename` is taken from the last segment of the URL path.
    /// Relative names are resolved against the configured directory.
    pub fn task(&self, url: &str, filename: &str) -> Result<DownloadTask> {
        let url = Url::parse(url).map_err(|e| {
            Error::InvalidUrl(format!("The url \"{}\" cannot be parsed: {}", url, e))
        })?;
        let filename = if filename.is_empty() {
            filename_from_url(&url)?
        } else {
            filename.to_string()
        };
        let path = self.config.directory.join(filename);
        Ok(
            DownloadTask::new(url, path, self.client.clone(), self.runtime.clone())
                .with_resumable(self.config.resumable)
                .with_buffer_size(self.config.buffer_size),
        )
    }

    /// Downloads `url` into `filename` and starts right away.
    pub fn add(&self, url: &str, filename: &str) -> Result<Tracker> {
        self.insert(None, url, filename, |bar| bar)
    }

    /// Like [`add`](Self::add), with extra bar settings.
    ///
    /// The start hook and the worker of the bar are replaced by the download.
    pub fn add_with(
        &self,
        url: &str,
        filename: &str,
        bar: impl FnOnce(TrackerBuilder) -> TrackerBuilder,
    ) -> Result<Tracker> {
        self.insert(None, url, filename, bar)
    }

    /// Adds a download to a group of a grouped coordinator.
    pub fn add_to_group(
        &self,
        group: &str,
        url: &str,
        filename: &str,
        bar: impl FnOnce(TrackerBuilder) -> TrackerBuilder,
    ) -> Result<Tracker> {
        self.insert(Some(group), url, filename, bar)
    }

    fn insert(
        &self,
        group: Option<&str>,
        url: &str,
        filename: &str,
        bar: impl FnOnce(TrackerBuilder) -> TrackerBuilder,
    ) -> Result<Tracker> {
        let download = Arc::new(self.task(url, filename)?);
        let starter = download.clone();
        let on_start = self.config.on_start.clone();

        let task = TaskBuilder::from(bar(TrackerBuilder::new().title(download.title())))
            .on_start(move |tracker, _| {
                let started = match &on_start {
                    Some(callback) => callback(starter.as_ref(), tracker),
                    None => starter.start(tracker),
                };
                if let Err(e) = started {
                    error!(url = %starter.url(), error = ?e, "failed to start download");
                }
            })
            .worker(move |tracker, exit| {
                let stop = download.run(tracker, exit);
                download.close();
                stop
            });

        match group {
            Some(group) => self.tasks.add_to_group(group, task),
            None => self.tasks.add(task),
        }
    }

    /// Number of downloads still running.
    pub fn pending(&self) -> usize {
        self.tasks.pending()
    }

    /// Blocks until every download completed or gave up.
    pub fn wait(&self) {
        self.tasks.wait();
    }

    /// Like [`wait`](Self::wait), giving up after `timeout`.
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        self.tasks.wait_timeout(timeout)
    }

    /// Closes the coordinator, which interrupts running downloads.
    pub fn close(&self) {
        self.tasks.close();
    }
}
