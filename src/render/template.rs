//! Text schemas for rendered lines.
//!
//! A schema is plain text with `{Field}` placeholders. Literal braces are
//! written as `{{` and `}}`. Schemas are parsed once, when the renderer is
//! configured, so a malformed schema is reported to the caller instead of
//! surfacing in the middle of a redraw.
//!
//! ```rust
//! use multibar::render::{SchemaData, Template};
//!
//! let tpl = Template::parse("{Title}: {Percent} {{ok}}").unwrap();
//! let data = SchemaData {
//!     title: "fetch".into(),
//!     percent: "50.0%".into(),
//!     ..SchemaData::default()
//! };
//! assert_eq!(tpl.render(&data), "fetch: 50.0% {ok}");
//! ```

use crate::{Error, Result};
use std::{fmt, str::FromStr, time::Duration};

/// Schema used when none is configured.
pub const DEFAULT_SCHEMA: &str =
    "{Indent}{Prepend} {Bar} {Percent} | {Title} | {Current}/{Total} {Speed} {Elapsed} {Append}";

/// Values a schema can refer to, computed fresh for every render.
///
/// `percent_float` and `elapsed_time` are not placeholders; they are there
/// for data-prepared hooks that want the raw numbers.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SchemaData {
    pub indent: String,
    pub prepend: String,
    pub bar: String,
    pub percent: String,
    pub percent_float: f64,
    pub title: String,
    pub current: String,
    pub total: String,
    pub speed: String,
    pub elapsed: String,
    pub elapsed_time: Duration,
    pub append: String,
}

/// A placeholder name usable in a schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Indent,
    Prepend,
    Bar,
    Percent,
    Title,
    Current,
    Total,
    Speed,
    Elapsed,
    Append,
}

impl Field {
    fn value(self, data: &SchemaData) -> &str {
        match self {
            Field::Indent => &data.indent,
            Field::Prepend => &data.prepend,
            Field::Bar => &data.bar,
            Field::Percent => &data.percent,
            Field::Title => &data.title,
            Field::Current => &data.current,
            Field::Total => &data.total,
            Field::Speed => &data.speed,
            Field::Elapsed => &data.elapsed,
            Field::Append => &data.append,
        }
    }
}

impl FromStr for Field {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Ok(match s.trim() {
            "Indent" => Field::Indent,
            "Prepend" => Field::Prepend,
            "Bar" => Field::Bar,
            "Percent" => Field::Percent,
            "Title" => Field::Title,
            "Current" => Field::Current,
            "Total" => Field::Total,
            "Speed" => Field::Speed,
            "Elapsed" => Field::Elapsed,
            "Append" => Field::Append,
            other => return Err(Error::Template(format!("unknown field {{{other}}}"))),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Field(Field),
}

/// A parsed text schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    source: String,
    segments: Vec<Segment>,
}

impl Template {
    /// Parses a schema, rejecting unknown fields and unbalanced braces.
    pub fn parse(source: &str) -> Result<Self> {
        let mut segments = Vec::new();
        let mut literal = String::new();
        let mut chars = source.char_indices().peekable();

        while let Some((at, c)) = chars.next() {
            match c {
                '{' if matches!(chars.peek(), Some((_, '{'))) => {
                    chars.next();
                    literal.push('{');
                }
                '}' if matches!(chars.peek(), Some((_, '}'))) => {
                    chars.next();
                    literal.push('}');
                }
                '{' => {
                    let mut name = String::new();
                    loop {
                        match chars.next() {
                            Some((_, '}')) => break,
                            Some((_, '{')) | None => {
                                return Err(Error::Template(format!(
                                    "unclosed placeholder at byte {at} in {source:?}"
                                )))
                            }
                            Some((_, c)) => name.push(c),
                        }
                    }
                    if !literal.is_empty() {
                        segments.push(Segment::Literal(std::mem::take(&mut literal)));
                    }
                    segments.push(Segment::Field(name.parse()?));
                }
                '}' => {
                    return Err(Error::Template(format!(
                        "unmatched '}}' at byte {at} in {source:?}"
                    )))
                }
                c => literal.push(c),
            }
        }
        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }

        Ok(Self {
            source: source.to_string(),
            segments,
        })
    }

    /// The schema text this template was parsed from.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Fills the placeholders from `data`.
    pub fn render(&self, data: &SchemaData) -> String {
        let mut out = String::with_capacity(self.source.len() + data.bar.len() + data.title.len());
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Field(field) => out.push_str(field.value(data)),
            }
        }
        out
    }
}

impl Default for Template {
    /// The template of [`DEFAULT_SCHEMA`].
    fn default() -> Self {
        use Field::*;
        let lit = |s: &str| Segment::Literal(s.to_string());
        let segments = vec![
            Segment::Field(Indent),
            Segment::Field(Prepend),
            lit(" "),
            Segment::Field(Bar),
            lit(" "),
            Segment::Field(Percent),
            lit(" | "),
            Segment::Field(Title),
            lit(" | "),
            Segment::Field(Current),
            lit("/"),
            Segment::Field(Total),
            lit(" "),
            Segment::Field(Speed),
            lit(" "),
            Segment::Field(Elapsed),
            lit(" "),
            Segment::Field(Append),
        ];
        Self {
            source: DEFAULT_SCHEMA.to_string(),
            segments,
        }
    }
}

impl fmt::Display for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn data() -> SchemaData {
        SchemaData {
            indent: "  ".into(),
            bar: "==>".into(),
            percent: "40.0%".into(),
            title: "t".into(),
            ..SchemaData::default()
        }
    }

    #[test]
    fn test_render_fields() {
        let tpl = Template::parse("{Indent}[{Bar}] {Percent} {Title}").unwrap();
        assert_eq!(tpl.render(&data()), "  [==>] 40.0% t");
    }

    #[test]
    fn test_escaped_braces() {
        let tpl = Template::parse("{{{Title}}}").unwrap();
        assert_eq!(tpl.render(&data()), "{t}");
    }

    #[test]
    fn test_unknown_field() {
        let err = Template::parse("{Nope}").unwrap_err();
        assert!(matches!(err, Error::Template(_)));
    }

    #[test]
    fn test_unbalanced_braces() {
        assert!(Template::parse("{Title").is_err());
        assert!(Template::parse("Title}").is_err());
        assert!(Template::parse("{Ti{tle}").is_err());
    }

    #[test]
    fn test_default_matches_parsed_schema() {
        assert_eq!(Template::parse(DEFAULT_SCHEMA).unwrap(), Template::default());
    }

    #[test]
    fn test_source_is_kept() {
        let tpl = Template::parse("{Bar}").unwrap();
        assert_eq!(tpl.source(), "{Bar}");
        assert_eq!(tpl.to_string(), "{Bar}");
    }
}
