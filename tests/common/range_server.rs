//! Minimal HTTP/1.1 server serving one static body, with Range support.
//!
//! GET with `Range: bytes=N-` answers 206 with the tail of the body, or 416
//! when N is past the end. Every connection is closed after one response.

use parking_lot::Mutex;
use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

#[derive(Debug, Clone, Copy)]
pub struct RangeServerOptions {
    /// If false, GET ignores Range and always returns 200 with the full body.
    pub support_ranges: bool,
    /// If false, omit Content-Length; the body ends when the connection closes.
    pub send_length: bool,
    /// Pause between body slices of 1 KiB.
    pub slice_delay: Option<Duration>,
    /// If set, every GET answers with this status and an empty body.
    pub status: Option<u16>,
}

impl Default for RangeServerOptions {
    fn default() -> Self {
        Self {
            support_ranges: true,
            send_length: true,
            slice_delay: None,
            status: None,
        }
    }
}

type RequestLog = Arc<Mutex<Vec<Request>>>;

#[derive(Debug, Clone)]
struct Request {
    method: String,
    range: Option<u64>,
    user_agent: Option<String>,
}

/// A running server recording every request it answers.
#[derive(Clone)]
pub struct RangeServer {
    pub url: String,
    requests: RequestLog,
}

impl RangeServer {
    /// URL of a file named `name` on this server.
    pub fn file_url(&self, name: &str) -> String {
        format!("{}{}", self.url, name)
    }

    /// Requests seen so far, as `(method, range start)`.
    pub fn requests(&self) -> Vec<(String, Option<u64>)> {
        self.requests
            .lock()
            .iter()
            .map(|r| (r.method.clone(), r.range))
            .collect()
    }

    /// `User-Agent` headers seen so far.
    pub fn user_agents(&self) -> Vec<String> {
        self.requests
            .lock()
            .iter()
            .filter_map(|r| r.user_agent.clone())
            .collect()
    }
}

/// Starts a server in a background thread serving `body`. The server runs
/// until the process exits.
pub fn start(body: Vec<u8>) -> RangeServer {
    start_with_options(body, RangeServerOptions::default())
}

pub fn start_with_options(body: Vec<u8>, opts: RangeServerOptions) -> RangeServer {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().unwrap().port();
    let body = Arc::new(body);
    let requests = Arc::new(Mutex::new(Vec::new()));
    let log = requests.clone();
    thread::spawn(move || {
        for stream in listener.incoming().flatten() {
            let body = Arc::clone(&body);
            let log = Arc::clone(&log);
            thread::spawn(move || handle(stream, &body, opts, &log));
        }
    });
    RangeServer {
        url: format!("http://127.0.0.1:{}/", port),
        requests,
    }
}

fn handle(
    mut stream: TcpStream,
    body: &[u8],
    opts: RangeServerOptions,
    log: &Mutex<Vec<Request>>,
) {
    let _ = stream.set_read_timeout(Some(Duration::from_secs(2)));
    let _ = stream.set_write_timeout(Some(Duration::from_secs(2)));
    let mut buf = [0u8; 8192];
    let n = match stream.read(&mut buf) {
        Ok(0) | Err(_) => return,
        Ok(n) => n,
    };
    let Ok(request) = std::str::from_utf8(&buf[..n]) else {
        return;
    };
    let parsed = parse_request(request);
    let (method, range) = (parsed.method.clone(), parsed.range);
    log.lock().push(parsed);

    if !method.eq_ignore_ascii_case("GET") {
        let _ = stream.write_all(b"HTTP/1.1 405 Method Not Allowed\r\nConnection: close\r\n\r\n");
        return;
    }
    if let Some(status) = opts.status {
        let response = format!(
            "HTTP/1.1 {} Test\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
            status
        );
        let _ = stream.write_all(response.as_bytes());
        return;
    }

    let total = body.len() as u64;
    let (status, content_range, slice) = match range.filter(|_| opts.support_ranges) {
        Some(start) if start >= total => (
            "416 Range Not Satisfiable",
            Some(format!("bytes */{}", total)),
            &body[0..0],
        ),
        Some(start) => (
            "206 Partial Content",
            Some(format!("bytes {}-{}/{}", start, total - 1, total)),
            &body[start as usize..],
        ),
        None => ("200 OK", None, body),
    };

    let mut head = format!("HTTP/1.1 {}\r\nConnection: close\r\nAccept-Ranges: bytes\r\n", status);
    if opts.send_length {
        head.push_str(&format!("Content-Length: {}\r\n", slice.len()));
    }
    if let Some(content_range) = content_range {
        head.push_str(&format!("Content-Range: {}\r\n", content_range));
    }
    head.push_str("\r\n");
    if stream.write_all(head.as_bytes()).is_err() {
        return;
    }
    for part in slice.chunks(1024) {
        if stream.write_all(part).is_err() {
            return;
        }
        if let Some(delay) = opts.slice_delay {
            let _ = stream.flush();
            thread::sleep(delay);
        }
    }
    let _ = stream.flush();
}

/// Reads the method, the start of a `Range: bytes=N-` header and the user agent.
fn parse_request(request: &str) -> Request {
    let mut method = "";
    let mut range = None;
    let mut user_agent = None;
    for line in request.lines() {
        let line = line.trim();
        if line.is_empty() {
            break;
        }
        if method.is_empty() {
            method = line.split_whitespace().next().unwrap_or("");
            continue;
        }
        if let Some((name, value)) = line.split_once(':') {
            if name.trim().eq_ignore_ascii_case("user-agent") {
                user_agent = Some(value.trim().to_string());
            }
            if name.trim().eq_ignore_ascii_case("range") {
                let value = value.trim().to_lowercase();
                if let Some(part) = value.strip_prefix("bytes=") {
                    if let Some((start, _)) = part.split_once('-') {
                        range = start.trim().parse::<u64>().ok();
                    }
                }
            }
        }
    }
    Request {
        method: method.to_string(),
        range,
        user_agent,
    }
}
