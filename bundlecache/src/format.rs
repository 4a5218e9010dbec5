//! Compiled message patterns.
//!
//! Pattern syntax:
//!
//! - `{0}`, `{1}`, ... insert positional arguments
//! - `{0,number}` / `{0,date,short}` carry a format type and style; the
//!   argument is rendered with its `Display` implementation either way
//! - `''` is a literal single quote
//! - `'...'` quotes a literal section, so `'{0}'` renders as `{0}`
//!
//! Arguments referenced by the pattern but not supplied render as their
//! placeholder (`{3}`), matching what callers expect from partially
//! applied messages.

use std::fmt::{self, Display};

use crate::error::PatternError;
use crate::locale::Locale;

/// A pattern segment.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    /// Positional argument. Any format type and style after the index
    /// (`{0,number,integer}`) is accepted and not kept.
    Argument { index: usize },
}

/// A message pattern compiled for one locale.
///
/// Patterns are immutable; the bundle cache shares them through `Arc` and
/// hands out the same instance for repeated lookups.
///
/// # Example
///
/// ```
/// use bundlecache::{Locale, MessagePattern};
///
/// let pattern = MessagePattern::compile("Hello, {0}!", Locale::language_only("en")).unwrap();
/// assert_eq!(pattern.render(&[&"World"]), "Hello, World!");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessagePattern {
    source: String,
    locale: Locale,
    segments: Vec<Segment>,
}

impl MessagePattern {
    /// Compile a pattern.
    pub fn compile(pattern: &str, locale: Locale) -> Result<Self, PatternError> {
        Ok(Self {
            source: pattern.to_string(),
            locale,
            segments: parse_segments(pattern)?,
        })
    }

    /// A pattern that renders `text` verbatim.
    pub fn literal(text: &str, locale: Locale) -> Self {
        Self {
            source: text.to_string(),
            locale,
            segments: vec![Segment::Literal(text.to_string())],
        }
    }

    /// The pattern text this was compiled from.
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn locale(&self) -> &Locale {
        &self.locale
    }

    /// Number of arguments the pattern refers to (highest index + 1).
    pub fn argument_count(&self) -> usize {
        self.segments
            .iter()
            .filter_map(|segment| match segment {
                Segment::Argument { index, .. } => Some(index + 1),
                Segment::Literal(_) => None,
            })
            .max()
            .unwrap_or(0)
    }

    /// Render with positional arguments.
    pub fn render(&self, args: &[&dyn Display]) -> String {
        let mut out = String::with_capacity(self.source.len());
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Argument { index, .. } => match args.get(*index) {
                    Some(arg) => out.push_str(&arg.to_string()),
                    None => {
                        out.push('{');
                        out.push_str(&index.to_string());
                        out.push('}');
                    }
                },
            }
        }
        out
    }
}

impl Display for MessagePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

fn parse_segments(pattern: &str) -> Result<Vec<Segment>, PatternError> {
    let mut segments = Vec::new();
    let mut literal = String::new();
    let mut chars = pattern.chars().peekable();
    let mut quoted = false;

    while let Some(c) = chars.next() {
        match c {
            '\'' if chars.peek() == Some(&'\'') => {
                chars.next();
                literal.push('\'');
            }
            '\'' => quoted = !quoted,
            '{' if !quoted => {
                if !literal.is_empty() {
                    segments.push(Segment::Literal(std::mem::take(&mut literal)));
                }
                let body = read_argument_body(&mut chars)?;
                segments.push(parse_argument(&body)?);
            }
            _ => literal.push(c),
        }
    }

    if !literal.is_empty() {
        segments.push(Segment::Literal(literal));
    }

    Ok(segments)
}

/// Read up to the `}` closing the current argument.
///
/// Nested braces (choice-style sub-patterns) and quoted sections are kept
/// as-is in the returned body.
fn read_argument_body(
    chars: &mut std::iter::Peekable<std::str::Chars<'_>>,
) -> Result<String, PatternError> {
    let mut body = String::new();
    let mut depth = 0usize;
    let mut quoted = false;

    for c in chars.by_ref() {
        match c {
            '\'' => quoted = !quoted,
            '{' if !quoted => depth += 1,
            '}' if !quoted && depth == 0 => return Ok(body),
            '}' if !quoted => depth -= 1,
            _ => {}
        }
        body.push(c);
    }

    Err(PatternError::UnmatchedBrace)
}

fn parse_argument(body: &str) -> Result<Segment, PatternError> {
    let index_text = match body.split_once(',') {
        Some((index, _format)) => index,
        None => body,
    }
    .trim();
    let index = index_text
        .parse::<usize>()
        .map_err(|_| PatternError::InvalidIndex(index_text.to_string()))?;

    Ok(Segment::Argument { index })
}
