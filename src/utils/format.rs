//! Number and duration formatting used by the renderers.
//!
//! All rounding here is half-up on the value that is actually displayed:
//! percentages are scaled by 100 first and rounded afterwards.

use std::time::Duration;

const SIZES: [&str; 7] = ["B", "kB", "MB", "GB", "TB", "PB", "EB"];
const BASE: f64 = 1024.0;

/// Rounds `v` half-up to `decimals` decimal places.
pub fn round_half_up(v: f64, decimals: i32) -> f64 {
    let m = 10f64.powi(decimals);
    (v * m + 0.5).floor() / m
}

/// Formats a float with one decimal place, rounding half-up.
pub fn fltfmt(f: f64) -> String {
    format!("{:.1}", round_half_up(f, 1))
}

/// Formats a fraction (`0.755`) as a percent string (`"75.5%"`).
///
/// ```rust
/// use multibar::utils::fltfmt_percent;
///
/// assert_eq!(fltfmt_percent(0.711), "71.1%");
/// assert_eq!(fltfmt_percent(1.0), "100.0%");
/// ```
pub fn fltfmt_percent(f: f64) -> String {
    format!("{}%", fltfmt(f * 100.0))
}

/// Rounds a fraction to the nearest integer percent: `floor(100 * p + 0.5)`.
pub fn percent_int(p: f64) -> i64 {
    (p * 100.0 + 0.5).floor() as i64
}

/// Splits a byte count into a display value and its unit.
///
/// Values below 10 are printed as a bare integer in bytes. Larger values use
/// the largest power-of-1024 unit whose scaled value still rounds to at least
/// one, with one decimal place.
///
/// ```rust
/// use multibar::utils::humanize_bytes;
///
/// assert_eq!(humanize_bytes(5.0), ("5".to_string(), "B"));
/// assert_eq!(humanize_bytes(1536.0), ("1.5".to_string(), "kB"));
/// assert_eq!(humanize_bytes(1048576.0), ("1.0".to_string(), "MB"));
/// ```
pub fn humanize_bytes(s: f64) -> (String, &'static str) {
    if !s.is_finite() || s <= 0.0 {
        return ("0".to_string(), SIZES[0]);
    }
    if s < 10.0 {
        return (format!("{:.0}", round_half_up(s, 0)), SIZES[0]);
    }

    let mut e = 0;
    while e + 1 < SIZES.len() && round_half_up(s / BASE.powi(e as i32 + 1), 1) >= 1.0 {
        e += 1;
    }
    let val = round_half_up(s / BASE.powi(e as i32), 1);
    (format!("{val:.1}"), SIZES[e])
}

/// Formats an elapsed duration compactly: `850ms`, `12.3s`, `4m05s`, `1h02m03s`.
pub fn durfmt(d: Duration) -> String {
    let secs = d.as_secs();
    if secs == 0 {
        return format!("{}ms", d.as_millis());
    }
    if secs < 60 {
        return format!("{:.1}s", round_half_up(d.as_secs_f64(), 1));
    }
    let (h, m, s) = (secs / 3600, (secs % 3600) / 60, secs % 60);
    if h == 0 {
        format!("{m}m{s:02}s")
    } else {
        format!("{h}h{m:02}m{s:02}s")
    }
}
