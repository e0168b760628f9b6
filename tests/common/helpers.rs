use multibar::term::AnsiTerminal;
use multibar::{MultiBar, MultiBarBuilder};
use parking_lot::Mutex;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use tempfile::TempDir;

// Common test constants
pub const WAIT: Duration = Duration::from_secs(10);
pub const TEST_DOMAIN: &str = "http://domain.com/file.zip";

/// In-memory output shared between the redraw thread and the test.
#[derive(Clone, Default)]
pub struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

impl SharedBuffer {
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock()).into_owned()
    }

    pub fn len(&self) -> usize {
        self.0.lock().len()
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// A builder painting plain text into a shared buffer.
pub fn capture_builder() -> (MultiBarBuilder, SharedBuffer) {
    let buffer = SharedBuffer::default();
    let builder = MultiBar::builder()
        .output(AnsiTerminal::new(buffer.clone()))
        .colored(false)
        .hide_cursor(false);
    (builder, buffer)
}

/// A flat coordinator painting plain text into a shared buffer.
pub fn capture() -> (MultiBar, SharedBuffer) {
    let (builder, buffer) = capture_builder();
    (builder.build(), buffer)
}

/// Polls `cond` until it holds or `timeout` expires.
pub fn wait_until(timeout: Duration, mut cond: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if cond() {
            return true;
        }
        thread::sleep(Duration::from_millis(5));
    }
    cond()
}

/// Creates a temporary directory for testing purposes
pub fn create_temp_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temporary directory")
}

/// Creates a temporary file with the given content
pub fn create_temp_file(dir: &Path, filename: &str, content: &[u8]) -> PathBuf {
    let file_path = dir.join(filename);
    fs::write(&file_path, content).expect("Failed to write temporary file");
    file_path
}

/// Creates test file content of specified size
pub fn create_test_content(size: usize) -> Vec<u8> {
    (0..size).map(|i| (i % 251) as u8).collect()
}

/// Asserts that a file has the expected size
pub fn assert_file_size(path: &Path, expected_size: u64) {
    let metadata = fs::metadata(path).expect("Failed to get file metadata");
    assert_eq!(
        metadata.len(),
        expected_size,
        "File size mismatch at path: {:?}",
        path
    );
}

/// Test cases for Content-Range parsing: (header, expected total).
pub fn create_test_content_range_headers() -> Vec<(&'static str, Option<u64>)> {
    vec![
        ("bytes 0-1023/2048", Some(2048)),
        ("bytes 200-1023/5000", Some(5000)),
        ("bytes */1000", Some(1000)),
        ("bytes 0-1023/*", None),
        ("invalid", None),
        ("", None),
    ]
}
