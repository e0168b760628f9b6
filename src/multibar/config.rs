//! Configuration structures and defaults for the coordinator.

use super::MultiBar;
use crate::term::Terminal;

/// Callback run once when every tracker of a coordinator is done.
pub type OnDone = Box<dyn FnOnce(&MultiBar) + Send>;

/// Configuration structure for a [`MultiBar`].
pub struct MultiBarConfig {
    /// Output surface. Defaults to standard output.
    pub output: Option<Box<dyn Terminal>>,
    /// Trackers live in named groups instead of one flat list.
    pub grouped: bool,
    /// Hide the cursor while the coordinator is open.
    pub hide_cursor: bool,
    /// Emit ANSI styling for markup. `None` follows the terminal.
    pub colored: Option<bool>,
    /// Indent for trackers that do not set their own.
    pub indent: Option<String>,
    /// Callback for when every tracker is done.
    pub on_done: Option<OnDone>,
}

impl std::fmt::Debug for MultiBarConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MultiBarConfig")
            .field("output", &self.output.is_some())
            .field("grouped", &self.grouped)
            .field("hide_cursor", &self.hide_cursor)
            .field("colored", &self.colored)
            .field("indent", &self.indent)
            .field("on_done", &self.on_done.is_some())
            .finish()
    }
}

impl Default for MultiBarConfig {
    fn default() -> Self {
        Self {
            output: None,
            grouped: false,
            hide_cursor: true,
            colored: None,
            indent: None,
            on_done: None,
        }
    }
}
