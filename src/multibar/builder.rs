//! Builder pattern implementation for creating [`MultiBar`] instances.
//!
//! # Examples
//!
//! ```rust
//! use multibar::term::AnsiTerminal;
//! use multibar::MultiBarBuilder;
//!
//! let bars = MultiBarBuilder::new()
//!     .output(AnsiTerminal::new(Vec::new()))
//!     .grouped(true)
//!     .colored(false)
//!     .on_done(|bars| bars.close())
//!     .build();
//! assert!(bars.is_grouped());
//! # bars.close();
//! ```

use super::config::MultiBarConfig;
use super::MultiBar;
use crate::term::Terminal;

/// A builder used to create a [`MultiBar`].
#[derive(Debug, Default)]
pub struct MultiBarBuilder {
    config: MultiBarConfig,
}

impl MultiBarBuilder {
    /// Creates a builder with the default options.
    pub fn new() -> Self {
        MultiBarBuilder::default()
    }

    /// Sets the output surface.
    pub fn output<T: Terminal + 'static>(mut self, output: T) -> Self {
        self.config.output = Some(Box::new(output));
        self
    }

    /// Organizes trackers in named groups.
    ///
    /// A grouped coordinator only accepts trackers through
    /// [`MultiBar::add_to_group`].
    pub fn grouped(mut self, grouped: bool) -> Self {
        self.config.grouped = grouped;
        self
    }

    /// Set whether the cursor is hidden while painting.
    pub fn hide_cursor(mut self, hide: bool) -> Self {
        self.config.hide_cursor = hide;
        self
    }

    /// Forces ANSI styling on or off.
    pub fn colored(mut self, colored: bool) -> Self {
        self.config.colored = Some(colored);
        self
    }

    /// Sets the indent of every tracker added without one.
    pub fn indent(mut self, indent: impl Into<String>) -> Self {
        self.config.indent = Some(indent.into());
        self
    }

    /// Set callback for when every tracker is done.
    ///
    /// The callback runs at most once, on the redraw thread, outside of any
    /// coordinator lock, so it may call back into the coordinator.
    pub fn on_done<F>(mut self, callback: F) -> Self
    where
        F: FnOnce(&MultiBar) + Send + 'static,
    {
        self.config.on_done = Some(Box::new(callback));
        self
    }

    /// Create the [`MultiBar`] with the specified options.
    pub fn build(self) -> MultiBar {
        MultiBar::with_config(self.config)
    }
}
