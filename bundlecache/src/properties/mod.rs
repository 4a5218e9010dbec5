//! Parsers for bundle file formats.
//!
//! Two formats are supported:
//!
//! - **Text properties** (`.properties`): `key=value` lines with `#`/`!`
//!   comments, `=`/`:`/whitespace separators, backslash line continuations
//!   and `\t \n \r \f \uXXXX` escapes.
//! - **XML properties** (`.xml`): `<properties>` documents with
//!   `<entry key="...">value</entry>` elements. See [`parse_xml`].
//!
//! Both parsers operate on already-decoded text; choosing the character
//! encoding is the loader's job. Duplicate keys resolve to the last value.

mod xml;

use std::collections::HashMap;

use crate::error::PropertiesError;

pub use xml::parse_xml;

/// Parsed key → text table.
pub type Properties = HashMap<String, String>;

/// Whitespace that separates keys from values and is trimmed at line start.
const BLANKS: [char; 3] = [' ', '\t', '\x0c'];

/// Parse text properties content.
///
/// # Example
///
/// ```
/// use bundlecache::properties::parse_properties;
///
/// let props = parse_properties("# comment\ngreeting = Hello, {0}!\nfarewell:Bye\n").unwrap();
/// assert_eq!(props["greeting"], "Hello, {0}!");
/// assert_eq!(props["farewell"], "Bye");
/// ```
pub fn parse_properties(text: &str) -> Result<Properties, PropertiesError> {
    let mut properties = Properties::new();

    for (line_number, line) in logical_lines(text) {
        let (raw_key, raw_value) = split_key_value(&line);
        let key = unescape(raw_key, line_number)?;
        let value = unescape(raw_value, line_number)?;
        properties.insert(key, value);
    }

    Ok(properties)
}

/// Join continuation lines and drop blanks and comments.
///
/// Returns each logical line with the 1-based number of its first
/// physical line. Leading whitespace is removed from every physical line.
fn logical_lines(text: &str) -> Vec<(usize, String)> {
    let normalized = text.replace("\r\n", "\n").replace('\r', "\n");
    let mut physical = normalized.split('\n').enumerate();
    let mut result = Vec::new();

    while let Some((index, line)) = physical.next() {
        let mut current = line.trim_start_matches(BLANKS);
        if current.is_empty() || current.starts_with('#') || current.starts_with('!') {
            continue;
        }

        let mut logical = String::with_capacity(current.len());
        loop {
            if !ends_with_continuation(current) {
                logical.push_str(current);
                break;
            }
            logical.push_str(&current[..current.len() - 1]);
            match physical.next() {
                Some((_, next)) => current = next.trim_start_matches(BLANKS),
                None => break,
            }
        }

        result.push((index + 1, logical));
    }

    result
}

/// A line continues when it ends with an odd number of backslashes.
fn ends_with_continuation(line: &str) -> bool {
    let trailing = line.chars().rev().take_while(|&c| c == '\\').count();
    trailing % 2 == 1
}

/// Split a logical line at the first unescaped separator.
///
/// The key ends at the first unescaped `=`, `:` or blank. Blanks after the
/// key are skipped, then at most one `=`/`:` if the key ended on a blank.
fn split_key_value(line: &str) -> (&str, &str) {
    let mut key_end = line.len();
    let mut value_start = line.len();
    let mut has_separator = false;
    let mut escaped = false;

    for (i, c) in line.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' => escaped = true,
            '=' | ':' => {
                key_end = i;
                value_start = i + 1;
                has_separator = true;
                break;
            }
            ' ' | '\t' | '\x0c' => {
                key_end = i;
                value_start = i + 1;
                break;
            }
            _ => {}
        }
    }

    let mut value = line[value_start..].trim_start_matches(BLANKS);
    if !has_separator {
        if let Some(rest) = value.strip_prefix(['=', ':']) {
            value = rest.trim_start_matches(BLANKS);
        }
    }

    (&line[..key_end], value)
}

/// Resolve backslash escapes.
///
/// `\uXXXX` escapes are UTF-16 code units; surrogate pairs written as two
/// escapes combine into one character and lone surrogates become U+FFFD.
fn unescape(raw: &str, line: usize) -> Result<String, PropertiesError> {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    let mut high_surrogate: Option<u16> = None;

    while let Some(c) = chars.next() {
        let decoded = if c == '\\' {
            match chars.next() {
                Some('u') => {
                    let hex: String = chars.by_ref().take(4).collect();
                    let unit = parse_code_unit(&hex)
                        .ok_or(PropertiesError::MalformedUnicodeEscape { line })?;
                    push_code_unit(&mut out, &mut high_surrogate, unit);
                    continue;
                }
                Some('t') => '\t',
                Some('n') => '\n',
                Some('r') => '\r',
                Some('f') => '\x0c',
                Some(other) => other,
                None => break,
            }
        } else {
            c
        };

        if high_surrogate.take().is_some() {
            out.push(char::REPLACEMENT_CHARACTER);
        }
        out.push(decoded);
    }

    if high_surrogate.is_some() {
        out.push(char::REPLACEMENT_CHARACTER);
    }

    Ok(out)
}

fn parse_code_unit(hex: &str) -> Option<u16> {
    if hex.len() != 4 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    u16::from_str_radix(hex, 16).ok()
}

fn push_code_unit(out: &mut String, high_surrogate: &mut Option<u16>, unit: u16) {
    if let Some(high) = high_surrogate.take() {
        if (0xDC00..0xE000).contains(&unit) {
            let code = 0x10000 + ((u32::from(high) - 0xD800) << 10) + (u32::from(unit) - 0xDC00);
            out.push(char::from_u32(code).unwrap_or(char::REPLACEMENT_CHARACTER));
            return;
        }
        out.push(char::REPLACEMENT_CHARACTER);
    }

    if (0xD800..0xDC00).contains(&unit) {
        *high_surrogate = Some(unit);
        return;
    }

    // Lone low surrogates have no char value
    out.push(char::from_u32(u32::from(unit)).unwrap_or(char::REPLACEMENT_CHARACTER));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> Properties {
        parse_properties(text).unwrap()
    }

    #[test]
    fn test_separators() {
        let props = parse("a=1\nb:2\nc 3\nd = 4\ne : 5\nf   6\n");
        assert_eq!(props["a"], "1");
        assert_eq!(props["b"], "2");
        assert_eq!(props["c"], "3");
        assert_eq!(props["d"], "4");
        assert_eq!(props["e"], "5");
        assert_eq!(props["f"], "6");
    }

    #[test]
    fn test_only_first_separator_splits() {
        let props = parse("url=http://example.com/?a=b\n");
        assert_eq!(props["url"], "http://example.com/?a=b");
    }

    #[test]
    fn test_blank_then_equals_consumes_one_separator() {
        let props = parse("key = =value\n");
        assert_eq!(props["key"], "=value");
    }

    #[test]
    fn test_comments_and_blank_lines() {
        let props = parse("# hash\n! bang\n\n   \n  # indented\nk=v\n");
        assert_eq!(props.len(), 1);
        assert_eq!(props["k"], "v");
    }

    #[test]
    fn test_key_without_value() {
        let props = parse("empty\nalso=\n");
        assert_eq!(props["empty"], "");
        assert_eq!(props["also"], "");
    }

    #[test]
    fn test_leading_whitespace_trimmed_trailing_kept() {
        let props = parse("   k = value  \n");
        assert_eq!(props["k"], "value  ");
    }

    #[test]
    fn test_line_continuation() {
        let props = parse("fruits = apple, \\\n         banana, \\\n   cherry\nnext=1\n");
        assert_eq!(props["fruits"], "apple, banana, cherry");
        assert_eq!(props["next"], "1");
    }

    #[test]
    fn test_even_backslashes_do_not_continue() {
        let props = parse("path=C:\\\\\nnext=1\n");
        assert_eq!(props["path"], "C:\\");
        assert_eq!(props["next"], "1");
    }

    #[test]
    fn test_continuation_at_end_of_input() {
        let props = parse("k=v\\");
        assert_eq!(props["k"], "v");
    }

    #[test]
    fn test_escaped_separators_in_key() {
        let props = parse("a\\=b\\:c\\ d=value\n");
        assert_eq!(props["a=b:c d"], "value");
    }

    #[test]
    fn test_character_escapes() {
        let props = parse("k=tab\\tnl\\ncr\\rff\\fq\\q\n");
        assert_eq!(props["k"], "tab\tnl\ncr\rff\x0cqq");
    }

    #[test]
    fn test_unicode_escape() {
        let props = parse("k=caf\\u00e9\n");
        assert_eq!(props["k"], "café");
    }

    #[test]
    fn test_unicode_surrogate_pair() {
        let props = parse("k=\\ud83d\\ude00\n");
        assert_eq!(props["k"], "😀");
    }

    #[test]
    fn test_lone_surrogate_is_replaced() {
        let props = parse("k=\\ud83dx\n");
        assert_eq!(props["k"], "\u{FFFD}x");
    }

    #[test]
    fn test_malformed_unicode_escape() {
        let err = parse_properties("ok=1\nbad=\\u12g4\n").unwrap_err();
        assert_eq!(err, PropertiesError::MalformedUnicodeEscape { line: 2 });

        let err = parse_properties("bad=\\u12").unwrap_err();
        assert_eq!(err, PropertiesError::MalformedUnicodeEscape { line: 1 });
    }

    #[test]
    fn test_crlf_and_cr_line_endings() {
        let props = parse("a=1\r\nb=2\rc=3");
        assert_eq!(props["a"], "1");
        assert_eq!(props["b"], "2");
        assert_eq!(props["c"], "3");
    }

    #[test]
    fn test_duplicate_key_last_wins() {
        let props = parse("k=first\nk=second\n");
        assert_eq!(props["k"], "second");
    }

    #[test]
    fn test_message_braces_untouched() {
        let props = parse("greeting=Hello, {0}! It''s {1,number}.\n");
        assert_eq!(props["greeting"], "Hello, {0}! It''s {1,number}.");
    }
}
