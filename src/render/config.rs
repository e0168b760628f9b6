//! Presentation settings shared by every renderer.

pub use super::template::DEFAULT_SCHEMA;

use super::template::Template;
use crate::term::markup::color_by_name;
use crate::{Error, Result};

/// Bar width in columns.
pub const DEFAULT_WIDTH: usize = 30;

/// Leading indent of every line.
pub const DEFAULT_INDENT: &str = "    ";

/// Trailing spaces appended to spinner lines.
pub const DEFAULT_SPINNER_TAIL_SPACES: usize = 8;

/// Width, colors, decorations and schema of one renderer.
#[derive(Debug, Clone)]
pub struct BarConfig {
    pub(crate) width: usize,
    pub(crate) indent: String,
    pub(crate) prepend: String,
    pub(crate) append: String,
    pub(crate) template: Template,
    pub(crate) base_color: Option<String>,
    pub(crate) highlight_color: Option<String>,
    pub(crate) tail_spaces: usize,
}

impl BarConfig {
    pub(crate) fn new(
        base_color: Option<&str>,
        highlight_color: Option<&str>,
        tail_spaces: usize,
    ) -> Self {
        Self {
            width: DEFAULT_WIDTH,
            indent: DEFAULT_INDENT.to_string(),
            prepend: String::new(),
            append: String::new(),
            template: Template::default(),
            base_color: base_color.map(str::to_string),
            highlight_color: highlight_color.map(str::to_string),
            tail_spaces,
        }
    }

    /// Bar width in columns.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Sets the bar width. Zero falls back to the default width.
    pub fn set_width(&mut self, width: usize) {
        self.width = if width == 0 { DEFAULT_WIDTH } else { width };
    }

    /// The schema source text.
    pub fn schema(&self) -> &str {
        self.template.source()
    }

    /// Replaces the schema. An empty schema restores the default one.
    pub fn set_schema(&mut self, schema: &str) -> Result<()> {
        self.template = if schema.is_empty() {
            Template::default()
        } else {
            Template::parse(schema)?
        };
        Ok(())
    }

    /// The parsed schema.
    pub fn template(&self) -> &Template {
        &self.template
    }

    /// Leading indent of the line.
    pub fn indent(&self) -> &str {
        &self.indent
    }

    /// Sets the leading indent.
    pub fn set_indent(&mut self, indent: impl Into<String>) {
        self.indent = indent.into();
    }

    /// Text shown before the bar.
    pub fn prepend(&self) -> &str {
        &self.prepend
    }

    /// Sets the text shown before the bar.
    pub fn set_prepend(&mut self, text: impl Into<String>) {
        self.prepend = text.into();
    }

    /// Text shown after the bar.
    pub fn append(&self) -> &str {
        &self.append
    }

    /// Sets the text shown after the bar.
    pub fn set_append(&mut self, text: impl Into<String>) {
        self.append = text.into();
    }

    /// Color name of the unfilled part.
    pub fn base_color(&self) -> Option<&str> {
        self.base_color.as_deref()
    }

    /// Sets the color of unfilled glyphs, by name (`"darkgray"`, `"red"`, ...).
    pub fn set_base_color(&mut self, color: &str) -> Result<()> {
        self.base_color = Some(checked_color(color)?);
        Ok(())
    }

    /// Color name of the filled part.
    pub fn highlight_color(&self) -> Option<&str> {
        self.highlight_color.as_deref()
    }

    /// Sets the color of filled glyphs, by name.
    pub fn set_highlight_color(&mut self, color: &str) -> Result<()> {
        self.highlight_color = Some(checked_color(color)?);
        Ok(())
    }

    /// Drops both colors so glyphs are written without markup.
    pub fn clear_colors(&mut self) {
        self.base_color = None;
        self.highlight_color = None;
    }

    /// Spaces appended after the line.
    pub fn tail_spaces(&self) -> usize {
        self.tail_spaces
    }

    /// Number of spaces appended after the rendered line.
    pub fn set_tail_spaces(&mut self, n: usize) {
        self.tail_spaces = n;
    }
}

fn checked_color(color: &str) -> Result<String> {
    let name = color.trim().to_ascii_lowercase();
    match color_by_name(&name) {
        Some(_) => Ok(name),
        None => Err(Error::NotFound(format!("color {color:?}"))),
    }
}

/// Wraps `text` in a color tag understood by the markup translator.
pub(crate) fn paint(text: &str, color: Option<&str>) -> String {
    match color {
        Some(c) if !text.is_empty() => format!("<{c}>{text}</{c}>"),
        _ => text.to_string(),
    }
}
