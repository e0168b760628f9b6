//! Output surface for the redraw loop.
//!
//! The coordinator only needs a handful of logical operations from the
//! terminal: write text, move the cursor up or left, hide and show the
//! cursor. [`Terminal`] captures them; the escape sequences differ per
//! platform and are hidden behind the implementations:
//!
//! - [`console::Term`] - native console API on Windows, ANSI elsewhere
//! - [`AnsiTerminal`] - ANSI CSI sequences on top of any [`io::Write`]
//!
//! Markup translation (`<b>`, `<font color="green">`, ...) lives in
//! [`markup`].

pub mod markup;

pub use markup::{MarkupTranslator, PlainTranslator, Translator};

use std::io::{self, Write};

/// Line-oriented terminal surface used by the redraw loop.
///
/// Every operation is a no-op for a zero count.
pub trait Terminal: Write + Send {
    /// Moves the cursor up by `n` lines.
    fn move_up(&mut self, n: usize) -> io::Result<()>;
    /// Moves the cursor left by `n` columns.
    fn move_left(&mut self, n: usize) -> io::Result<()>;
    /// Hides the cursor.
    fn hide_cursor(&mut self) -> io::Result<()>;
    /// Shows the cursor.
    fn show_cursor(&mut self) -> io::Result<()>;
    /// Erases everything from the cursor to the end of the screen.
    fn clear_below(&mut self) -> io::Result<()>;
}

impl Terminal for console::Term {
    fn move_up(&mut self, n: usize) -> io::Result<()> {
        self.move_cursor_up(n)
    }

    fn move_left(&mut self, n: usize) -> io::Result<()> {
        self.move_cursor_left(n)
    }

    fn hide_cursor(&mut self) -> io::Result<()> {
        console::Term::hide_cursor(self)
    }

    fn show_cursor(&mut self) -> io::Result<()> {
        console::Term::show_cursor(self)
    }

    fn clear_below(&mut self) -> io::Result<()> {
        self.clear_to_end_of_screen()
    }
}

const CSI: &str = "\x1b[";
const HIDE_CURSOR: &str = "\x1b[?25l";
const SHOW_CURSOR: &str = "\x1b[?25h";

/// ANSI escape sequences written straight into `W`.
///
/// Useful for redirecting the redraw loop into a buffer, a pipe or a log
/// file while keeping the exact byte stream a terminal would receive.
#[derive(Debug, Default)]
pub struct AnsiTerminal<W> {
    inner: W,
}

impl<W: Write + Send> AnsiTerminal<W> {
    /// Wraps `inner`.
    pub fn new(inner: W) -> Self {
        Self { inner }
    }

    /// Get a reference to the wrapped writer.
    pub fn get_ref(&self) -> &W {
        &self.inner
    }

    /// Unwraps the writer.
    pub fn into_inner(self) -> W {
        self.inner
    }

    fn csi(&mut self, n: usize, op: char) -> io::Result<()> {
        if n == 0 {
            return Ok(());
        }
        write!(self.inner, "{CSI}{n}{op}")
    }
}

impl<W: Write + Send> Write for AnsiTerminal<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.inner.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

impl<W: Write + Send> Terminal for AnsiTerminal<W> {
    fn move_up(&mut self, n: usize) -> io::Result<()> {
        self.csi(n, 'A')
    }

    fn move_left(&mut self, n: usize) -> io::Result<()> {
        self.csi(n, 'D')
    }

    fn hide_cursor(&mut self) -> io::Result<()> {
        self.inner.write_all(HIDE_CURSOR.as_bytes())
    }

    fn show_cursor(&mut self) -> io::Result<()> {
        self.inner.write_all(SHOW_CURSOR.as_bytes())
    }

    fn clear_below(&mut self) -> io::Result<()> {
        write!(self.inner, "{CSI}0J")
    }
}
