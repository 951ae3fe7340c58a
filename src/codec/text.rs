//! Message-line serialization and parsing.
//!
//! Serialization emits every value as a bare token with backslash escapes.
//! Parsing is more liberal and honors two quoting styles on top of the
//! bare form, so hand-authored lines work too:
//!
//! - single-quoted: every character up to the closing quote is literal,
//!   no escape sequences at all;
//! - double-quoted: backslash escapes exactly `\`, `"`, `` ` ``, `$` and
//!   newline; a backslash before anything else is kept literally;
//! - bare: backslash escapes exactly the next character, an unescaped
//!   space ends the value.

use crate::error::{LaunchwireError, Result};

/// One `name=value` pair carried by a message line.
///
/// Order within a message is preserved from parse to serialize but carries
/// no meaning for the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Property {
    /// Property name. Never escaped on output; a name containing `=` or
    /// a space is a caller error and is not detected here.
    pub name: String,
    /// Property value, unescaped.
    pub value: String,
}

impl Property {
    /// Create a new property.
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

impl<N: Into<String>, V: Into<String>> From<(N, V)> for Property {
    fn from((name, value): (N, V)) -> Self {
        Self::new(name, value)
    }
}

/// A parsed message line: prefix plus ordered properties.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedMessage {
    /// Everything before the first unescaped `:`.
    pub prefix: String,
    /// Properties in the order they appeared.
    pub properties: Vec<Property>,
}

/// Serialize a prefix and ordered properties into one message line.
///
/// The prefix is emitted verbatim followed by `:` (it must not itself
/// require escaping). Each value has backslash, both quote characters and
/// space backslash-escaped so it reads back as a single bare token. The
/// output has no trailing newline or NUL; the transport appends the wire
/// terminator when framing.
///
/// # Example
///
/// ```
/// use launchwire::codec::{serialize_message, Property};
///
/// let line = serialize_message("p", &[Property::new("k", "a b\"c\\d")]);
/// assert_eq!(line, r#"p: k=a\ b\"c\\d"#);
/// ```
pub fn serialize_message(prefix: &str, properties: &[Property]) -> String {
    let mut line = String::with_capacity(prefix.len() + 1 + properties.len() * 16);
    line.push_str(prefix);
    line.push(':');

    for property in properties {
        line.push(' ');
        line.push_str(&property.name);
        line.push('=');
        push_escaped(&mut line, &property.value);
    }

    line
}

fn push_escaped(out: &mut String, value: &str) {
    for c in value.chars() {
        if matches!(c, '\\' | '"' | '\'' | ' ') {
            out.push('\\');
        }
        out.push(c);
    }
}

/// Parse a message line back into its prefix and properties.
///
/// The only fatal failure is a missing `prefix:` delimiter
/// ([`LaunchwireError::MissingPrefix`]). A property name with no following
/// `=` silently stops extraction instead; properties parsed up to that
/// point are still returned.
///
/// # Example
///
/// ```
/// use launchwire::codec::parse_message;
///
/// let parsed = parse_message(r#"new: ID="1_TIME123" NAME="My App" SCREEN=0"#).unwrap();
/// assert_eq!(parsed.prefix, "new");
/// assert_eq!(parsed.properties[1].name, "NAME");
/// assert_eq!(parsed.properties[1].value, "My App");
/// ```
pub fn parse_message(text: &str) -> Result<ParsedMessage> {
    let (prefix, mut rest) = split_prefix(text).ok_or(LaunchwireError::MissingPrefix)?;

    let mut properties = Vec::new();
    while let Some((property, tail)) = parse_property(rest) {
        properties.push(property);
        rest = tail;
    }

    Ok(ParsedMessage {
        prefix: prefix.to_string(),
        properties,
    })
}

/// Scan to the first unescaped `:` and split around it.
///
/// The prefix is taken verbatim, escape pairs included; a `\x` pair never
/// terminates the scan.
fn split_prefix(text: &str) -> Option<(&str, &str)> {
    let bytes = text.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            b':' => return Some((&text[..i], &text[i + 1..])),
            _ => i += 1,
        }
    }
    None
}

/// Parse one ` name=value ` group off the front of `input`.
///
/// Returns `None` when no `=` remains, which ends property extraction.
fn parse_property(input: &str) -> Option<(Property, &str)> {
    let input = input.trim_start_matches(' ');
    let eq = input.find('=')?;
    let name = &input[..eq];

    // Spaces after the `=` are skipped, like spaces between properties.
    let after_eq = input[eq + 1..].trim_start_matches(' ');
    let (value, rest) = parse_value(after_eq);

    Some((Property::new(name, value), rest.trim_start_matches(' ')))
}

enum Quoting {
    Bare,
    Single,
    Double,
}

/// Read one value off the front of `input`, honoring the quoting grammar.
///
/// Returns the unescaped value and the unconsumed remainder, which starts
/// at the terminating space when there is one.
fn parse_value(input: &str) -> (String, &str) {
    let mut value = String::new();
    let mut mode = Quoting::Bare;
    let mut end = input.len();

    let mut chars = input.char_indices();
    while let Some((i, c)) = chars.next() {
        match mode {
            Quoting::Bare => match c {
                ' ' => {
                    end = i;
                    break;
                }
                '\\' => {
                    // A trailing backslash at end of input is dropped.
                    if let Some((_, escaped)) = chars.next() {
                        value.push(escaped);
                    }
                }
                '\'' => mode = Quoting::Single,
                '"' => mode = Quoting::Double,
                _ => value.push(c),
            },
            Quoting::Single => match c {
                '\'' => mode = Quoting::Bare,
                _ => value.push(c),
            },
            Quoting::Double => match c {
                '"' => mode = Quoting::Bare,
                '\\' => match chars.next() {
                    Some((_, next)) if matches!(next, '\\' | '"' | '`' | '$' | '\n') => {
                        value.push(next);
                    }
                    Some((_, next)) => {
                        value.push('\\');
                        value.push(next);
                    }
                    None => {}
                },
                _ => value.push(c),
            },
        }
    }

    (value, &input[end..])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn props(pairs: &[(&str, &str)]) -> Vec<Property> {
        pairs.iter().map(|&(n, v)| Property::new(n, v)).collect()
    }

    #[test]
    fn test_serialize_no_properties() {
        assert_eq!(serialize_message("remove", &[]), "remove:");
    }

    #[test]
    fn test_serialize_plain_properties() {
        let line = serialize_message(
            "new",
            &props(&[("ID", "1_TIME123"), ("SCREEN", "0")]),
        );
        assert_eq!(line, "new: ID=1_TIME123 SCREEN=0");
    }

    #[test]
    fn test_serialize_escapes_space_quote_backslash() {
        let line = serialize_message("p", &props(&[("k", "a b\"c\\d")]));
        assert_eq!(line, r#"p: k=a\ b\"c\\d"#);
    }

    #[test]
    fn test_parse_escaped_value() {
        let parsed = parse_message(r#"p: k=a\ b\"c\\d"#).unwrap();
        assert_eq!(parsed.prefix, "p");
        assert_eq!(parsed.properties, props(&[("k", "a b\"c\\d")]));
    }

    #[test]
    fn test_parse_example_line() {
        let parsed =
            parse_message(r#"new: ID="1_TIME123" NAME="My App" SCREEN=0"#).unwrap();
        assert_eq!(parsed.prefix, "new");
        assert_eq!(
            parsed.properties,
            props(&[("ID", "1_TIME123"), ("NAME", "My App"), ("SCREEN", "0")])
        );
    }

    #[test]
    fn test_parse_missing_prefix_is_fatal() {
        assert!(matches!(
            parse_message("no delimiter here"),
            Err(LaunchwireError::MissingPrefix)
        ));
    }

    #[test]
    fn test_parse_empty_input_is_fatal() {
        assert!(parse_message("").is_err());
    }

    #[test]
    fn test_parse_prefix_only() {
        let parsed = parse_message("change:").unwrap();
        assert_eq!(parsed.prefix, "change");
        assert!(parsed.properties.is_empty());
    }

    #[test]
    fn test_parse_name_without_equals_stops_quietly() {
        // Extraction stops at `bogus`; the earlier property survives.
        let parsed = parse_message("p: a=1 bogus").unwrap();
        assert_eq!(parsed.properties, props(&[("a", "1")]));
    }

    #[test]
    fn test_parse_skips_spaces_after_equals() {
        let parsed = parse_message("p: a=   1").unwrap();
        assert_eq!(parsed.properties, props(&[("a", "1")]));
    }

    #[test]
    fn test_parse_single_quoted_takes_everything_literally() {
        let parsed = parse_message(r#"p: k='a\ b"c$d'"#).unwrap();
        assert_eq!(parsed.properties, props(&[("k", r#"a\ b"c$d"#)]));
    }

    #[test]
    fn test_parse_double_quoted_escape_set() {
        let parsed = parse_message("p: k=\"a\\$b\\`c\\\"d\\\\e\"").unwrap();
        assert_eq!(parsed.properties, props(&[("k", "a$b`c\"d\\e")]));
    }

    #[test]
    fn test_parse_double_quoted_keeps_other_backslashes() {
        let parsed = parse_message(r#"p: k="a\xb""#).unwrap();
        assert_eq!(parsed.properties, props(&[("k", r"a\xb")]));
    }

    #[test]
    fn test_parse_double_quoted_escaped_newline() {
        let parsed = parse_message("p: k=\"a\\\nb\"").unwrap();
        assert_eq!(parsed.properties, props(&[("k", "a\nb")]));
    }

    #[test]
    fn test_parse_bare_backslash_escapes_anything() {
        let parsed = parse_message(r"p: k=a\=b\ c").unwrap();
        assert_eq!(parsed.properties, props(&[("k", "a=b c")]));
    }

    #[test]
    fn test_parse_trailing_backslash_is_dropped() {
        let parsed = parse_message(r"p: k=ab\").unwrap();
        assert_eq!(parsed.properties, props(&[("k", "ab")]));
    }

    #[test]
    fn test_parse_unterminated_quote_ends_at_input() {
        let parsed = parse_message("p: k='never closed").unwrap();
        assert_eq!(parsed.properties, props(&[("k", "never closed")]));
    }

    #[test]
    fn test_prefix_scan_ignores_escaped_colon() {
        let parsed = parse_message(r"we\:ird: a=1").unwrap();
        assert_eq!(parsed.prefix, r"we\:ird");
        assert_eq!(parsed.properties, props(&[("a", "1")]));
    }

    #[test]
    fn test_parse_empty_value_in_final_position() {
        let parsed = parse_message("p: a=").unwrap();
        assert_eq!(parsed.properties, props(&[("a", "")]));
    }

    #[test]
    fn test_round_trip_awkward_values() {
        let cases = props(&[
            ("ID", "1_TIME123"),
            ("NAME", "My App"),
            ("PATH", r"C:\Program Files\app"),
            ("QUOTED", r#"say "hi""#),
            ("APOSTROPHE", "it's here"),
            ("LEADING_QUOTE", "'starts quoted'"),
            ("DOLLARS", "$HOME `pwd`"),
            ("NEWLINE", "line one\nline two"),
            ("EQUALS", "a=b=c"),
        ]);

        let line = serialize_message("change", &cases);
        let parsed = parse_message(&line).unwrap();

        assert_eq!(parsed.prefix, "change");
        assert_eq!(parsed.properties, cases);
    }

    #[test]
    fn test_round_trip_preserves_property_order() {
        let cases = props(&[("z", "1"), ("a", "2"), ("m", "3")]);
        let parsed = parse_message(&serialize_message("p", &cases)).unwrap();
        let names: Vec<&str> = parsed.properties.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["z", "a", "m"]);
    }
}
