//! Content length extraction utilities.
//!
//! The download task needs two numbers from a response: how many bytes the
//! body carries and, for ranged responses, how large the whole resource is.

use reqwest::{header::CONTENT_RANGE, Response};

/// Parse Content-Range header to extract total size.
///
/// Content-Range header format: "bytes start-end/total" or "bytes */total"
/// for unsatisfiable ranges.
///
/// # Example
///
/// ```rust
/// use multibar::utils::parse_content_range_total;
///
/// assert_eq!(parse_content_range_total("bytes 0-1023/2048"), Some(2048));
/// assert_eq!(parse_content_range_total("bytes */2048"), Some(2048));
/// ```
pub fn parse_content_range_total(content_range: &str) -> Option<u64> {
    let (_, total) = content_range.split_once('/')?;
    total.trim().parse::<u64>().ok()
}

/// Total resource size announced by a `Content-Range` header, if any.
pub fn content_range_total(response: &Response) -> Option<u64> {
    response
        .headers()
        .get(CONTENT_RANGE)
        .and_then(|v| v.to_str().ok())
        .and_then(parse_content_range_total)
}

/// Number of body bytes the response announces.
///
/// Falls back to the `Content-Range` total minus the bytes already on disk
/// when the server omits `Content-Length` on a ranged response.
pub fn body_length(response: &Response, on_disk: u64) -> Option<u64> {
    response
        .content_length()
        .or_else(|| content_range_total(response).map(|t| t.saturating_sub(on_disk)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_content_range_total() {
        assert_eq!(parse_content_range_total("bytes 0-1023/2048"), Some(2048));
        assert_eq!(parse_content_range_total("bytes 200-1023/5000"), Some(5000));
        assert_eq!(parse_content_range_total("bytes 0-0/1"), Some(1));
        assert_eq!(parse_content_range_total("invalid"), None);
        assert_eq!(parse_content_range_total("bytes 0-1023"), None);
        assert_eq!(parse_content_range_total(""), None);
    }

    #[test]
    fn test_parse_content_range_total_edge_cases() {
        assert_eq!(parse_content_range_total("bytes 0-1023/ 2048 "), Some(2048));
        assert_eq!(parse_content_range_total("bytes */1000"), Some(1000));
        assert_eq!(parse_content_range_total("bytes 0-1023/*"), None);
        assert_eq!(
            parse_content_range_total("bytes 0-1023/999999999999"),
            Some(999999999999)
        );
    }
}
