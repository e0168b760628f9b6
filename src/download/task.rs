//! A single resumable HTTP download streamed into a tracker.

use crate::error::Error;
use crate::multibar::ExitSignal;
use crate::render::UNKNOWN_TOTAL;
use crate::tracker::{Tracker, TrackerWriter};
use crate::utils::body_length;
use crate::Result;

use parking_lot::Mutex;
use reqwest::{header::RANGE, Response, StatusCode, Url};
use reqwest_middleware::ClientWithMiddleware;
use std::{
    fs::{self, File, OpenOptions},
    future::Future,
    io::{self, Write},
    path::{Path, PathBuf},
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
};
use tokio::runtime::Runtime;
use tracing::{debug, warn};

use super::config::DEFAULT_BUFFER_SIZE;

/// What to do with a response, given the bytes already on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResumePlan {
    /// The requested range starts past the end: the file is complete.
    Complete { size: u64 },
    /// Append the remaining bytes after those on disk.
    Resume { on_disk: u64, remaining: Option<u64> },
    /// Start over from an empty file.
    Fresh { length: Option<u64> },
}

impl ResumePlan {
    /// Bounds and initial value for the tracker.
    pub fn seed(&self) -> (i64, i64) {
        let total = |len: Option<u64>| len.map_or(UNKNOWN_TOTAL, |l| l as i64);
        match *self {
            ResumePlan::Complete { size } => (size as i64, size as i64),
            ResumePlan::Resume { on_disk, remaining } => {
                (total(remaining.map(|r| r + on_disk)), on_disk as i64)
            }
            ResumePlan::Fresh { length } => (total(length), 0),
        }
    }
}

/// Decides how to continue a download from the response status.
///
/// `length` is the number of body bytes the response announces.
pub fn plan_resume(status: StatusCode, on_disk: u64, length: Option<u64>) -> ResumePlan {
    match status {
        StatusCode::RANGE_NOT_SATISFIABLE => ResumePlan::Complete { size: on_disk },
        StatusCode::PARTIAL_CONTENT if on_disk > 0 => ResumePlan::Resume {
            on_disk,
            remaining: length,
        },
        _ => ResumePlan::Fresh { length },
    }
}

/// File name from the last segment of the URL path.
///
/// ```rust
/// use multibar::download::filename_from_url;
/// use reqwest::Url;
///
/// let url = Url::parse("https://example.com/dist/file-0.1.2.zip").unwrap();
/// assert_eq!(filename_from_url(&url).unwrap(), "file-0.1.2.zip");
/// ```
pub fn filename_from_url(url: &Url) -> Result<String> {
    url.path_segments()
        .ok_or_else(|| {
            Error::InvalidUrl(format!("The url \"{}\" does not contain a valid path", url))
        })?
        .next_back()
        .filter(|segment| !segment.is_empty())
        .map(|segment| {
            form_urlencoded::parse(segment.as_bytes())
                .map(|(key, val)| [key, val].concat())
                .collect()
        })
        .ok_or_else(|| {
            Error::InvalidUrl(format!("The url \"{}\" does not contain a filename", url))
        })
}

struct Transfer {
    response: Response,
    sink: TrackerWriter<File>,
}

/// One URL downloaded into one file, reporting to one tracker.
///
/// The task is driven by its task thread: [`start`](Self::start) sends the
/// request and seeds the tracker, [`run`](Self::run) copies the body, and
/// [`close`](Self::close) releases the response and the file.
pub struct DownloadTask {
    url: Url,
    title: String,
    path: PathBuf,
    client: ClientWithMiddleware,
    runtime: Arc<Runtime>,
    resumable: bool,
    buffer_size: usize,
    transfer: Mutex<Option<Transfer>>,
    closed: AtomicBool,
}

impl std::fmt::Debug for DownloadTask {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DownloadTask")
            .field("url", &self.url.as_str())
            .field("path", &self.path)
            .field("resumable", &self.resumable)
            .field("closed", &self.is_closed())
            .finish()
    }
}

impl DownloadTask {
    /// Creates a task saving `url` to `path`, titled by the file name.
    pub fn new(
        url: Url,
        path: PathBuf,
        client: ClientWithMiddleware,
        runtime: Arc<Runtime>,
    ) -> Self {
        let title = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| url.to_string());
        Self {
            url,
            title,
            path,
            client,
            runtime,
            resumable: true,
            buffer_size: DEFAULT_BUFFER_SIZE,
            transfer: Mutex::new(None),
            closed: AtomicBool::new(false),
        }
    }

    /// Set whether a partial file is continued.
    pub fn with_resumable(mut self, resumable: bool) -> Self {
        self.resumable = resumable;
        self
    }

    /// Set the largest slice written at once.
    pub fn with_buffer_size(mut self, size: usize) -> Self {
        self.buffer_size = size.max(1);
        self
    }

    /// The source URL.
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Tracker title, the file name by default.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// The destination file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The client sending the requests.
    pub fn client(&self) -> &ClientWithMiddleware {
        &self.client
    }

    /// Runs a future on the I/O runtime, blocking the calling thread.
    ///
    /// Must not be called from inside an async context.
    pub fn block_on<F: Future>(&self, future: F) -> F::Output {
        self.runtime.block_on(future)
    }

    /// Hands a response and its destination file to [`run`](Self::run).
    pub fn attach(&self, tracker: &Tracker, response: Response, file: File) {
        *self.transfer.lock() = Some(Transfer {
            response,
            sink: TrackerWriter::new(file, tracker.clone()),
        });
    }

    /// Sends the request and prepares the tracker and the file.
    ///
    /// With a partial file on disk the request asks for the missing range
    /// only. A server answering "range not satisfiable" means the file is
    /// already complete: the tracker is filled without a transfer.
    pub fn start(&self, tracker: &Tracker) -> Result<()> {
        let on_disk = if self.resumable {
            size_on_disk(&self.path)?
        } else {
            0
        };

        debug!(url = %self.url, on_disk, "Fetching");
        let mut req = self.client.get(self.url.clone());
        if on_disk > 0 {
            req = req.header(RANGE, format!("bytes={}-", on_disk));
        }
        let mut response = self.block_on(req.send())?;
        let status = response.status();
        if status != StatusCode::RANGE_NOT_SATISFIABLE {
            response = response.error_for_status()?;
        }

        let plan = plan_resume(status, on_disk, body_length(&response, on_disk));
        debug!(url = %self.url, %status, ?plan, "response received");
        let (upper, initial) = plan.seed();
        tracker.update_range(0, upper);
        tracker.set_initial_value(initial);

        let append = match plan {
            ResumePlan::Complete { .. } => {
                tracker.step(0);
                return Ok(());
            }
            ResumePlan::Resume { .. } => true,
            ResumePlan::Fresh { .. } => false,
        };

        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)?;
        }
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .append(append)
            .truncate(!append)
            .open(&self.path)?;
        self.attach(tracker, response, file);
        Ok(())
    }

    /// Copies the response body into the file, counting every slice.
    ///
    /// Checks `exit` before each slice and stops on a read or write error.
    /// Always returns `false`: a download never retires its tracker.
    pub fn run(&self, tracker: &Tracker, exit: &ExitSignal) -> bool {
        let Some(mut transfer) = self.transfer.lock().take() else {
            if !tracker.is_completed() {
                warn!(url = %self.url, "download was not started");
            }
            return false;
        };

        loop {
            let chunk = match self.block_on(transfer.response.chunk()) {
                Ok(Some(chunk)) => chunk,
                Ok(None) => break,
                Err(e) => {
                    warn!(url = %self.url, error = %e, "failed to read the response");
                    return false;
                }
            };
            for slice in chunk.chunks(self.buffer_size) {
                if exit.is_set() {
                    debug!(url = %self.url, "download interrupted");
                    return false;
                }
                if let Err(e) = transfer.sink.write_all(slice) {
                    warn!(
                        url = %self.url,
                        path = ?self.path,
                        error = %e,
                        "failed to write the file"
                    );
                    return false;
                }
            }
        }

        if let Err(e) = transfer.sink.flush() {
            warn!(url = %self.url, path = ?self.path, error = %e, "failed to flush the file");
            return false;
        }
        // A body without announced length ends the range where it stopped.
        let (lower, upper, position) = tracker.bounds();
        if upper == UNKNOWN_TOTAL {
            tracker.update_range(lower, position);
        }
        tracker.step(0);
        debug!(url = %self.url, bytes = position, "download finished");
        false
    }

    /// Releases the response and the file, once.
    pub fn close(&self) {
        if self.closed.swap(true, Ordering::AcqRel) {
            return;
        }
        if let Some(transfer) = self.transfer.lock().take() {
            drop(transfer.response);
            if let Err(e) = transfer.sink.into_inner().sync_all() {
                warn!(path = ?self.path, error = %e, "failed to sync the file");
            }
        }
    }

    /// Whether [`close`](Self::close) already ran.
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }
}

fn size_on_disk(path: &Path) -> io::Result<u64> {
    match fs::metadata(path) {
        Ok(meta) => Ok(meta.len()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(0),
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plan_resume_range_not_satisfiable() {
        let plan = plan_resume(StatusCode::RANGE_NOT_SATISFIABLE, 1000, Some(0));
        assert_eq!(plan, ResumePlan::Complete { size: 1000 });
        assert_eq!(plan.seed(), (1000, 1000));
    }

    #[test]
    fn test_plan_resume_partial_content() {
        let plan = plan_resume(StatusCode::PARTIAL_CONTENT, 500, Some(500));
        assert_eq!(
            plan,
            ResumePlan::Resume {
                on_disk: 500,
                remaining: Some(500)
            }
        );
        assert_eq!(plan.seed(), (1000, 500));
    }

    #[test]
    fn test_plan_resume_full_response_restarts() {
        let plan = plan_resume(StatusCode::OK, 500, Some(1000));
        assert_eq!(plan, ResumePlan::Fresh { length: Some(1000) });
        assert_eq!(plan.seed(), (1000, 0));
    }

    #[test]
    fn test_plan_resume_unknown_length() {
        assert_eq!(
            plan_resume(StatusCode::OK, 0, None).seed(),
            (UNKNOWN_TOTAL, 0)
        );
        assert_eq!(
            plan_resume(StatusCode::PARTIAL_CONTENT, 10, None).seed(),
            (UNKNOWN_TOTAL, 10)
        );
    }

    #[test]
    fn test_filename_from_url() {
        let url = Url::parse("https://example.com/a/b/archive.tar.gz").unwrap();
        assert_eq!(filename_from_url(&url).unwrap(), "archive.tar.gz");

        let url = Url::parse("https://example.com/my%20file.txt").unwrap();
        assert_eq!(filename_from_url(&url).unwrap(), "my file.txt");
    }

    #[test]
    fn test_filename_from_url_without_name() {
        let url = Url::parse("https://example.com/").unwrap();
        assert!(matches!(filename_from_url(&url), Err(Error::InvalidUrl(_))));
    }

    #[test]
    fn test_size_on_disk_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(size_on_disk(&dir.path().join("absent")).unwrap(), 0);
        let path = dir.path().join("present");
        fs::write(&path, [0u8; 12]).unwrap();
        assert_eq!(size_on_disk(&path).unwrap(), 12);
    }
}
