//! Shared utility functions.
//!
//! - [`format`] - Byte, percent and duration formatting for rendered lines
//! - [`content_length`] - Body and resource sizes from HTTP responses
//!
//! # Examples
//!
//! ```rust
//! use multibar::utils::{fltfmt_percent, humanize_bytes};
//!
//! let (value, unit) = humanize_bytes(1536.0);
//! assert_eq!(format!("{value} {unit}"), "1.5 kB");
//! assert_eq!(fltfmt_percent(0.755), "75.5%");
//! ```

pub mod content_length;
pub mod format;

pub use content_length::{body_length, content_range_total, parse_content_range_total};
pub use format::{durfmt, fltfmt, fltfmt_percent, humanize_bytes, percent_int, round_half_up};
