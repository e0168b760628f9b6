//! Inline markup to ANSI translation.
//!
//! Rendered lines may carry a small HTML-like markup:
//!
//! | Markup                        | Effect              |
//! |-------------------------------|---------------------|
//! | `<b>`, `<strong>`             | bold                |
//! | `<i>`, `<em>`                 | italic              |
//! | `<u>`                         | underline           |
//! | `<s>`, `<strike>`, `<del>`    | strike-through      |
//! | `<font color="green">`        | foreground color    |
//! | `<green>`, `<lightcyan>`, ... | foreground color    |
//!
//! Unknown tags are kept verbatim. In no-color mode every recognized tag is
//! stripped and the plain text is returned.

use console::{Color, Style};

/// Opaque text transform applied to every rendered line before it is
/// written out.
pub trait Translator: Send + Sync {
    /// Translates `s` into the final terminal text.
    fn translate(&self, s: &str) -> String;
}

/// Passes text through untouched.
#[derive(Debug, Default, Clone, Copy)]
pub struct PlainTranslator;

impl Translator for PlainTranslator {
    fn translate(&self, s: &str) -> String {
        s.to_string()
    }
}

/// Translates inline markup into ANSI sequences, or strips it.
#[derive(Debug, Clone, Copy)]
pub struct MarkupTranslator {
    colored: bool,
}

impl Default for MarkupTranslator {
    fn default() -> Self {
        Self {
            colored: console::colors_enabled(),
        }
    }
}

impl MarkupTranslator {
    /// Creates a translator that emits ANSI styling when `colored` is true.
    pub fn new(colored: bool) -> Self {
        Self { colored }
    }

    /// Creates a translator that strips all markup.
    pub fn no_color() -> Self {
        Self::new(false)
    }

    /// Whether ANSI styling is emitted.
    pub fn is_colored(&self) -> bool {
        self.colored
    }

    fn emit(&self, out: &mut String, stack: &[(String, Attr)], text: &str) {
        if text.is_empty() {
            return;
        }
        if !self.colored || stack.is_empty() {
            out.push_str(text);
            return;
        }
        let style = stack
            .iter()
            .fold(Style::new().force_styling(true), |style, (_, attr)| attr.apply(style));
        out.push_str(&style.apply_to(text).to_string());
    }
}

impl Translator for MarkupTranslator {
    fn translate(&self, s: &str) -> String {
        let mut out = String::with_capacity(s.len());
        let mut stack: Vec<(String, Attr)> = Vec::new();
        let mut text = String::new();
        let mut rest = s;

        while let Some(open) = rest.find('<') {
            text.push_str(&decode_entities(&rest[..open]));
            let after = &rest[open..];
            let Some(close) = after[1..].find(['<', '>']).map(|i| i + 1) else {
                text.push_str(&decode_entities(after));
                rest = "";
                break;
            };
            if after[close..].starts_with('<') {
                text.push('<');
                rest = &after[1..];
                continue;
            }
            let tag = &after[1..close];
            match parse_tag(tag) {
                Some(Tag::Open(name, attr)) => {
                    self.emit(&mut out, &stack, &text);
                    text.clear();
                    stack.push((name, attr));
                }
                Some(Tag::Close(name)) if stack.iter().any(|(n, _)| *n == name) => {
                    self.emit(&mut out, &stack, &text);
                    text.clear();
                    while let Some((n, _)) = stack.pop() {
                        if n == name {
                            break;
                        }
                    }
                }
                _ => text.push_str(&after[..=close]),
            }
            rest = &after[close + 1..];
        }
        text.push_str(&decode_entities(rest));
        self.emit(&mut out, &stack, &text);
        out
    }
}

#[derive(Debug, Clone, Copy)]
enum Attr {
    Bold,
    Italic,
    Underline,
    Strike,
    Fg(Color),
}

impl Attr {
    fn apply(self, style: Style) -> Style {
        match self {
            Attr::Bold => style.bold(),
            Attr::Italic => style.italic(),
            Attr::Underline => style.underlined(),
            Attr::Strike => style.strikethrough(),
            Attr::Fg(color) => style.fg(color),
        }
    }
}

enum Tag {
    Open(String, Attr),
    Close(String),
}

fn parse_tag(tag: &str) -> Option<Tag> {
    let tag = tag.trim();
    if let Some(name) = tag.strip_prefix('/') {
        return Some(Tag::Close(name.trim().to_ascii_lowercase()));
    }
    let (name, attrs) = match tag.split_once(char::is_whitespace) {
        Some((n, a)) => (n.to_ascii_lowercase(), a),
        None => (tag.to_ascii_lowercase(), ""),
    };
    let attr = match name.as_str() {
        "b" | "strong" => Attr::Bold,
        "i" | "em" => Attr::Italic,
        "u" => Attr::Underline,
        "s" | "strike" | "del" => Attr::Strike,
        "font" => Attr::Fg(color_by_name(&font_color(attrs)?)?),
        other => Attr::Fg(color_by_name(other)?),
    };
    Some(Tag::Open(name, attr))
}

fn font_color(attrs: &str) -> Option<String> {
    let (_, value) = attrs.split_once("color")?;
    let value = value.trim_start().strip_prefix('=')?.trim();
    let value = value.trim_matches(|c| c == '"' || c == '\'');
    Some(value.to_ascii_lowercase())
}

/// Resolves a color name to a terminal color.
///
/// Accepts the eight base names, their `light`/`bright` variants and a few
/// gray aliases.
pub fn color_by_name(name: &str) -> Option<Color> {
    let name = name.to_ascii_lowercase();
    let base = |n: &str| match n {
        "black" => Some(0u8),
        "red" => Some(1),
        "green" => Some(2),
        "yellow" => Some(3),
        "blue" => Some(4),
        "magenta" | "purple" => Some(5),
        "cyan" => Some(6),
        "white" => Some(7),
        _ => None,
    };
    match name.as_str() {
        "gray" | "grey" | "darkgray" | "darkgrey" => Some(Color::Color256(8)),
        "lightgray" | "lightgrey" => Some(Color::Color256(7)),
        n => {
            if let Some(b) = n.strip_prefix("light").or_else(|| n.strip_prefix("bright")) {
                base(b).map(|c| Color::Color256(c + 8))
            } else {
                base(n).map(Color::Color256)
            }
        }
    }
}

/// Escapes text so the translator passes it through literally.
pub fn escape(s: &str) -> String {
    if !s.contains(['<', '>', '&']) {
        return s.to_string();
    }
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

fn decode_entities(s: &str) -> String {
    if !s.contains('&') {
        return s.to_string();
    }
    s.replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
}
