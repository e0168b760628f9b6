//! Line renderers.
//!
//! A [`Renderer`] turns a snapshot of a tracker into one line of text. Two
//! families are registered:
//!
//! - [`Stepper`] - a bar that fills with the progress value, using half
//!   glyphs for sub-cell precision
//! - [`Spinner`] - a glyph animation that advances on every render
//!
//! Both share the same [`BarConfig`] (width, colors, schema, decorations) and
//! fill the same [`SchemaData`], so a text schema works with either family.
//!
//! # Examples
//!
//! ```rust
//! use multibar::render::BarStyle;
//!
//! let mut renderer = BarStyle::Stepper(3).build().unwrap();
//! renderer.config_mut().set_schema("[{Bar}] {Percent}").unwrap();
//! assert!(BarStyle::Spinner(999).build().is_err());
//! ```

pub mod config;
pub mod spinner;
pub mod stepper;
pub mod template;

pub use config::{BarConfig, DEFAULT_INDENT, DEFAULT_SCHEMA, DEFAULT_WIDTH};
pub use spinner::{max_spinners, Spinner};
pub use stepper::{max_steppers, Stepper};
pub use template::{Field, SchemaData, Template};

use crate::utils::{durfmt, fltfmt_percent, humanize_bytes};
use crate::{Error, Result};
use std::time::Duration;

/// Tracker state as seen by a renderer during one render call.
#[derive(Debug, Clone, Copy)]
pub struct BarState<'a> {
    pub title: &'a str,
    pub lower: i64,
    pub upper: i64,
    pub position: i64,
    /// Progress made since the tracker started, excluding a seeded value.
    pub transferred: i64,
    /// Fraction in `[0, 1]`.
    pub percent: f64,
    pub completed: bool,
    pub elapsed: Duration,
}

/// Upper bound of a tracker whose total is not known yet.
pub const UNKNOWN_TOTAL: i64 = i64::MAX;

/// A strategy producing one display line from tracker state.
pub trait Renderer: Send + Sync {
    /// Builds the bar cell.
    fn bar(&self, state: &BarState<'_>) -> String;

    fn config(&self) -> &BarConfig;

    fn config_mut(&mut self) -> &mut BarConfig;

    /// Computes every schema value for `state`.
    fn prepare(&self, state: &BarState<'_>) -> SchemaData {
        let config = self.config();
        let (current, unit) = humanize_bytes(state.position as f64);
        let total = if state.upper == UNKNOWN_TOTAL {
            "?".to_string()
        } else {
            let (total, total_unit) = humanize_bytes(state.upper as f64);
            format!("{total} {total_unit}")
        };
        let secs = state.elapsed.as_secs_f64();
        let rate = if secs > 0.0 {
            state.transferred.max(0) as f64 / secs
        } else {
            0.0
        };
        let (speed, speed_unit) = humanize_bytes(rate);

        SchemaData {
            indent: config.indent.clone(),
            prepend: config.prepend.clone(),
            bar: self.bar(state),
            percent: fltfmt_percent(state.percent),
            percent_float: state.percent,
            title: state.title.to_string(),
            current: format!("{current} {unit}"),
            total,
            speed: format!("{speed} {speed_unit}/s"),
            elapsed: durfmt(state.elapsed),
            elapsed_time: state.elapsed,
            append: config.append.clone(),
        }
    }

    /// Executes the schema and appends the trailing spaces.
    fn finish(&self, data: &SchemaData) -> String {
        let config = self.config();
        let mut line = config.template.render(data);
        line.push_str(&" ".repeat(config.tail_spaces));
        line
    }
}

/// Selects a registered renderer by family and index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BarStyle {
    Stepper(usize),
    Spinner(usize),
}

impl Default for BarStyle {
    fn default() -> Self {
        BarStyle::Stepper(0)
    }
}

impl BarStyle {
    /// Creates the renderer, failing with [`Error::NotFound`] on an unknown
    /// index.
    pub fn build(self) -> Result<Box<dyn Renderer>> {
        match self {
            BarStyle::Stepper(i) => Stepper::new(i)
                .map(|s| Box::new(s) as Box<dyn Renderer>)
                .ok_or_else(|| Error::NotFound(format!("stepper style {i}"))),
            BarStyle::Spinner(i) => Spinner::new(i)
                .map(|s| Box::new(s) as Box<dyn Renderer>)
                .ok_or_else(|| Error::NotFound(format!("spinner style {i}"))),
        }
    }
}
