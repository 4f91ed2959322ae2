//! TOON decoding.
//!
//! Parses TOON text back into a [`Value`] tree. The decoder tokenizes by
//! physical lines, derives structure from indentation (two spaces per
//! level, tabs rejected), and recognizes three line forms: key entries,
//! `- ` sequence elements, and table rows.
//!
//! The decoder never silently drops data: mis-indented lines, missing or
//! surplus table rows, and trailing content all fail with an error naming
//! the offending line.
//!
//! ## Usage
//!
//! ```rust
//! use toon_temporal::from_str;
//!
//! let value = from_str("name: Alice\nage: 30").unwrap();
//! let obj = value.as_object().unwrap();
//! assert_eq!(obj.get("name").and_then(|v| v.as_str()), Some("Alice"));
//! assert_eq!(obj.get("age").and_then(|v| v.as_i64()), Some(30));
//! ```

use crate::value::looks_like_number;
use crate::{Error, Number, Result, Value, ValueMap};

/// Parses TOON text into a value tree.
///
/// Empty input decodes to an empty object, matching the encoder's
/// rendering of a top-level empty map as the empty string.
///
/// # Errors
///
/// Returns `BadInput` for any malformed document, with the line number of
/// the first offending line.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_str(input: &str) -> Result<Value> {
    let lines = tokenize(input)?;
    if lines.is_empty() {
        return Ok(Value::Object(ValueMap::new()));
    }
    let mut parser = Parser { lines, pos: 0 };
    let value = parser.parse_root()?;
    if let Some(line) = parser.peek() {
        return Err(Error::syntax(line.number, "unexpected trailing content"));
    }
    Ok(value)
}

#[derive(Clone, Copy)]
struct Line<'a> {
    number: usize,
    depth: usize,
    content: &'a str,
}

fn tokenize(input: &str) -> Result<Vec<Line<'_>>> {
    let mut lines = Vec::new();
    for (idx, raw) in input.lines().enumerate() {
        let number = idx + 1;
        let trimmed = raw.trim_end();
        if trimmed.is_empty() {
            continue;
        }
        let indent = trimmed.len() - trimmed.trim_start_matches(' ').len();
        let content = &trimmed[indent..];
        if content.starts_with('\t') {
            return Err(Error::syntax(number, "tab indentation is not allowed"));
        }
        if indent % 2 != 0 {
            return Err(Error::syntax(
                number,
                format!("indentation of {} spaces is not a multiple of 2", indent),
            ));
        }
        lines.push(Line {
            number,
            depth: indent / 2,
            content,
        });
    }
    Ok(lines)
}

enum KeySuffix<'a> {
    /// `key: value` — the scalar or inline text after the colon.
    Value(&'a str),
    /// `key:` — a nested block follows one level deeper.
    Block,
    /// `key[N]{h1,h2}:` — a table header.
    Table {
        count: usize,
        headers: Vec<String>,
    },
}

struct Parser<'a> {
    lines: Vec<Line<'a>>,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn peek(&self) -> Option<Line<'a>> {
        self.lines.get(self.pos).copied()
    }

    fn advance(&mut self) {
        self.pos += 1;
    }

    fn parse_root(&mut self) -> Result<Value> {
        let first = match self.peek() {
            Some(line) => line,
            None => return Ok(Value::Object(ValueMap::new())),
        };
        if first.depth != 0 {
            return Err(Error::syntax(
                first.number,
                "unexpected indentation at start of document",
            ));
        }
        let content = first.content;
        if content == "{}" {
            self.advance();
            return Ok(Value::Object(ValueMap::new()));
        }
        if content == "[]" {
            self.advance();
            return Ok(Value::Array(Vec::new()));
        }
        if content == "-" || content.starts_with("- ") {
            return self.parse_list(0);
        }
        if let Some((count, headers)) = parse_table_suffix(content, first.number)? {
            self.advance();
            return self.parse_table_rows(1, count, headers, first.number);
        }
        if content.starts_with('[') {
            self.advance();
            return parse_inline_seq(content, first.number);
        }
        if is_key_line(content) {
            return self.parse_map(0);
        }
        self.advance();
        parse_scalar_token(content, first.number)
    }

    fn parse_map(&mut self, depth: usize) -> Result<Value> {
        let mut map = ValueMap::new();
        while let Some(line) = self.peek() {
            if line.depth < depth {
                break;
            }
            if line.depth > depth {
                return Err(Error::syntax(line.number, "unexpected indentation"));
            }
            let (key, suffix) = split_key_line(line.content, line.number)?;
            self.advance();
            let value = match suffix {
                KeySuffix::Value(text) => parse_value_text(text, line.number)?,
                KeySuffix::Block => self.parse_child_block(depth + 1, line.number)?,
                KeySuffix::Table { count, headers } => {
                    self.parse_table_rows(depth + 1, count, headers, line.number)?
                }
            };
            map.insert(key, value);
        }
        Ok(Value::Object(map))
    }

    fn parse_list(&mut self, depth: usize) -> Result<Value> {
        let mut items = Vec::new();
        while let Some(line) = self.peek() {
            if line.depth < depth {
                break;
            }
            if line.depth > depth {
                return Err(Error::syntax(line.number, "unexpected indentation"));
            }
            if line.content == "-" {
                self.advance();
                items.push(self.parse_child_block(depth + 1, line.number)?);
            } else if let Some(rest) = line.content.strip_prefix("- ") {
                self.advance();
                items.push(parse_value_text(rest, line.number)?);
            } else {
                return Err(Error::syntax(line.number, "expected '- ' list element"));
            }
        }
        Ok(Value::Array(items))
    }

    /// Parses the block introduced by a `key:` line or a bare `-` marker:
    /// a map, a list, a keyless table, or an inline sequence, one level
    /// deeper than the introducing line.
    fn parse_child_block(&mut self, depth: usize, parent_line: usize) -> Result<Value> {
        let line = match self.peek() {
            Some(line) if line.depth >= depth => line,
            _ => {
                return Err(Error::syntax(parent_line, "expected an indented block"));
            }
        };
        if line.depth > depth {
            return Err(Error::syntax(line.number, "unexpected indentation"));
        }
        if line.content == "-" || line.content.starts_with("- ") {
            return self.parse_list(depth);
        }
        if let Some((count, headers)) = parse_table_suffix(line.content, line.number)? {
            self.advance();
            return self.parse_table_rows(depth + 1, count, headers, line.number);
        }
        if line.content.starts_with('[') && !is_key_line(line.content) {
            self.advance();
            return parse_inline_seq(line.content, line.number);
        }
        self.parse_map(depth)
    }

    fn parse_table_rows(
        &mut self,
        depth: usize,
        count: usize,
        headers: Vec<String>,
        header_line: usize,
    ) -> Result<Value> {
        let mut rows = Vec::with_capacity(count);
        for found in 0..count {
            let line = match self.peek() {
                Some(line) if line.depth == depth => line,
                _ => {
                    return Err(Error::syntax(
                        header_line,
                        format!("table declared {} rows, found {}", count, found),
                    ));
                }
            };
            self.advance();
            let cells = split_delimited(line.content, line.number)?;
            if cells.len() != headers.len() {
                return Err(Error::syntax(
                    line.number,
                    format!(
                        "table row has {} cells, expected {}",
                        cells.len(),
                        headers.len()
                    ),
                ));
            }
            let mut row = ValueMap::with_capacity(headers.len());
            for (header, cell) in headers.iter().zip(cells) {
                row.insert(header.clone(), parse_scalar_token(cell.trim(), line.number)?);
            }
            rows.push(Value::Object(row));
        }
        if let Some(line) = self.peek() {
            if line.depth == depth {
                return Err(Error::syntax(
                    line.number,
                    format!("table declared {} rows, found more", count),
                ));
            }
        }
        Ok(Value::Array(rows))
    }
}

/// Whether a line introduces a key (either `key: …` or a table header).
fn is_key_line(content: &str) -> bool {
    if let Some(rest) = content.strip_prefix('"') {
        match scan_quoted(rest) {
            Some(end) => {
                let after = &rest[end..];
                after.starts_with(':')
                    || matches!(parse_table_suffix_silent(after), Some(_))
            }
            None => false,
        }
    } else {
        match content.find([':', '[']) {
            Some(idx) if idx > 0 => {
                if content.as_bytes()[idx] == b':' {
                    true
                } else {
                    parse_table_suffix_silent(&content[idx..]).is_some()
                }
            }
            _ => false,
        }
    }
}

fn split_key_line<'a>(content: &'a str, number: usize) -> Result<(String, KeySuffix<'a>)> {
    if let Some(rest) = content.strip_prefix('"') {
        let (key, consumed) = parse_quoted(content, number)?;
        let after = &rest[consumed - 1..];
        return match after.as_bytes().first() {
            Some(b':') => Ok((key, value_or_block(&after[1..]))),
            Some(b'[') => match parse_table_suffix(after, number)? {
                Some((count, headers)) => Ok((key, KeySuffix::Table { count, headers })),
                None => Err(Error::syntax(number, "expected ':' after key")),
            },
            _ => Err(Error::syntax(number, "expected ':' after key")),
        };
    }
    let idx = content
        .find([':', '['])
        .ok_or_else(|| Error::syntax(number, "expected 'key: value'"))?;
    if idx == 0 {
        return Err(Error::syntax(number, "empty key"));
    }
    let key = content[..idx].trim_end().to_string();
    let after = &content[idx..];
    if after.as_bytes()[0] == b':' {
        Ok((key, value_or_block(&after[1..])))
    } else {
        match parse_table_suffix(after, number)? {
            Some((count, headers)) => Ok((key, KeySuffix::Table { count, headers })),
            None => Err(Error::syntax(number, "expected 'key: value'")),
        }
    }
}

fn value_or_block(after_colon: &str) -> KeySuffix<'_> {
    let trimmed = after_colon.trim();
    if trimmed.is_empty() {
        KeySuffix::Block
    } else {
        KeySuffix::Value(trimmed)
    }
}

/// Parses `[N]{h1,h2,…}:` when `s` is exactly a table suffix. Returns
/// `Ok(None)` when `s` does not have the shape at all, and an error when
/// it starts like a header but is malformed.
fn parse_table_suffix(s: &str, number: usize) -> Result<Option<(usize, Vec<String>)>> {
    let inner = match s.strip_prefix('[') {
        Some(inner) => inner,
        None => return Ok(None),
    };
    let close = match inner.find(']') {
        Some(idx) => idx,
        None => return Ok(None),
    };
    let count_text = &inner[..close];
    if count_text.is_empty() || !count_text.bytes().all(|b| b.is_ascii_digit()) {
        return Ok(None);
    }
    let rest = &inner[close + 1..];
    if !rest.starts_with('{') || !rest.ends_with("}:") {
        return Ok(None);
    }
    let count: usize = count_text
        .parse()
        .map_err(|_| Error::syntax(number, "invalid table length"))?;
    let header_text = &rest[1..rest.len() - 2];
    if header_text.is_empty() {
        return Err(Error::syntax(number, "table header has no columns"));
    }
    let mut headers = Vec::new();
    for part in split_delimited(header_text, number)? {
        let part = part.trim();
        if part.is_empty() {
            return Err(Error::syntax(number, "empty table column name"));
        }
        if part.starts_with('"') {
            let (name, consumed) = parse_quoted(part, number)?;
            if consumed != part.len() {
                return Err(Error::syntax(number, "unexpected text after column name"));
            }
            headers.push(name);
        } else {
            headers.push(part.to_string());
        }
    }
    Ok(Some((count, headers)))
}

fn parse_table_suffix_silent(s: &str) -> Option<(usize, Vec<String>)> {
    parse_table_suffix(s, 0).ok().flatten()
}

/// Parses the text after `key: ` or `- `: an empty composite, an inline
/// sequence, or a scalar.
fn parse_value_text(text: &str, number: usize) -> Result<Value> {
    let text = text.trim();
    match text {
        "{}" => Ok(Value::Object(ValueMap::new())),
        "[]" => Ok(Value::Array(Vec::new())),
        _ if text.starts_with('[') => parse_inline_seq(text, number),
        _ => parse_scalar_token(text, number),
    }
}

fn parse_inline_seq(text: &str, number: usize) -> Result<Value> {
    let inner = text
        .strip_prefix('[')
        .and_then(|rest| rest.strip_suffix(']'))
        .ok_or_else(|| Error::syntax(number, "unterminated inline sequence"))?;
    if inner.trim().is_empty() {
        return Ok(Value::Array(Vec::new()));
    }
    let mut elements = Vec::new();
    for part in split_delimited(inner, number)? {
        elements.push(parse_scalar_token(part.trim(), number)?);
    }
    Ok(Value::Array(elements))
}

/// Splits on top-level commas, honoring quoted segments.
fn split_delimited(s: &str, number: usize) -> Result<Vec<&str>> {
    let mut parts = Vec::new();
    let mut start = 0;
    let mut in_quotes = false;
    let mut escaped = false;
    for (idx, ch) in s.char_indices() {
        if in_quotes {
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == '"' {
                in_quotes = false;
            }
        } else if ch == '"' {
            in_quotes = true;
        } else if ch == ',' {
            parts.push(&s[start..idx]);
            start = idx + 1;
        }
    }
    if in_quotes {
        return Err(Error::syntax(number, "unterminated string"));
    }
    parts.push(&s[start..]);
    Ok(parts)
}

fn parse_scalar_token(token: &str, number: usize) -> Result<Value> {
    if token.is_empty() {
        return Err(Error::syntax(number, "empty value"));
    }
    match token {
        "null" => return Ok(Value::Null),
        "true" => return Ok(Value::Bool(true)),
        "false" => return Ok(Value::Bool(false)),
        _ => {}
    }
    if token.starts_with('"') {
        let (text, consumed) = parse_quoted(token, number)?;
        if consumed != token.len() {
            return Err(Error::syntax(number, "unexpected text after closing quote"));
        }
        return Ok(Value::String(text));
    }
    if looks_like_number(token) {
        let integral = token
            .char_indices()
            .all(|(i, c)| c.is_ascii_digit() || (i == 0 && matches!(c, '+' | '-')));
        if integral {
            if let Ok(i) = token.parse::<i64>() {
                return Ok(Value::Number(Number::Integer(i)));
            }
        }
        let f = token
            .parse::<f64>()
            .map_err(|_| Error::syntax(number, format!("invalid number '{}'", token)))?;
        return Ok(Value::Number(Number::Float(f)));
    }
    Ok(Value::String(token.to_string()))
}

/// Scans a quoted string starting at `s[0] == '"'`; returns the unescaped
/// text and the number of bytes consumed including both quotes.
fn parse_quoted(s: &str, number: usize) -> Result<(String, usize)> {
    debug_assert!(s.starts_with('"'));
    let mut out = String::new();
    let mut chars = s.char_indices().skip(1);
    while let Some((idx, ch)) = chars.next() {
        match ch {
            '"' => return Ok((out, idx + 1)),
            '\\' => match chars.next() {
                Some((_, '"')) => out.push('"'),
                Some((_, '\\')) => out.push('\\'),
                Some((_, '/')) => out.push('/'),
                Some((_, 'n')) => out.push('\n'),
                Some((_, 'r')) => out.push('\r'),
                Some((_, 't')) => out.push('\t'),
                Some((_, 'b')) => out.push('\u{0008}'),
                Some((_, 'f')) => out.push('\u{000C}'),
                Some((_, 'u')) => {
                    let mut code = 0u32;
                    for _ in 0..4 {
                        let digit = chars
                            .next()
                            .and_then(|(_, c)| c.to_digit(16))
                            .ok_or_else(|| {
                                Error::syntax(
                                    number,
                                    "invalid unicode escape (expected 4 hex digits)",
                                )
                            })?;
                        code = code * 16 + digit;
                    }
                    let ch = char::from_u32(code).ok_or_else(|| {
                        Error::syntax(number, "invalid unicode code point")
                    })?;
                    out.push(ch);
                }
                Some((_, other)) => {
                    return Err(Error::syntax(
                        number,
                        format!("invalid escape sequence '\\{}'", other),
                    ));
                }
                None => break,
            },
            other => out.push(other),
        }
    }
    Err(Error::syntax(number, "unterminated string"))
}

/// Offset in bytes just past the closing quote, given the text after the
/// opening quote. `None` when unterminated.
fn scan_quoted(after_open: &str) -> Option<usize> {
    let mut escaped = false;
    for (idx, ch) in after_open.char_indices() {
        if escaped {
            escaped = false;
        } else if ch == '\\' {
            escaped = true;
        } else if ch == '"' {
            return Some(idx + 1);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::toon;

    #[test]
    fn simple_map() {
        let value = from_str("name: Alice\nage: 30").unwrap();
        assert_eq!(value, toon!({ "name": "Alice", "age": 30 }));
    }

    #[test]
    fn nested_map() {
        let value = from_str("user:\n  name: Bob\n  active: true").unwrap();
        assert_eq!(
            value,
            toon!({ "user": { "name": "Bob", "active": true } })
        );
    }

    #[test]
    fn inline_and_list_sequences_agree() {
        let inline = from_str("scores: [95, 87, 92]").unwrap();
        let list = from_str("scores:\n  - 95\n  - 87\n  - 92").unwrap();
        assert_eq!(inline, list);
        assert_eq!(inline, toon!({ "scores": [95, 87, 92] }));
    }

    #[test]
    fn table_rows_build_objects_in_header_order() {
        let value = from_str("users[2]{id,name}:\n  1,Alice\n  2,Bob").unwrap();
        assert_eq!(
            value,
            toon!({
                "users": [
                    { "id": 1, "name": "Alice" },
                    { "id": 2, "name": "Bob" }
                ]
            })
        );
    }

    #[test]
    fn root_forms() {
        assert_eq!(from_str("").unwrap(), toon!({}));
        assert_eq!(from_str("{}").unwrap(), toon!({}));
        assert_eq!(from_str("[]").unwrap(), toon!([]));
        assert_eq!(from_str("[1, 2]").unwrap(), toon!([1, 2]));
        assert_eq!(from_str("- a\n- b").unwrap(), toon!(["a", "b"]));
        assert_eq!(from_str("42").unwrap(), toon!(42));
        assert_eq!(from_str("hello").unwrap(), toon!("hello"));
    }

    #[test]
    fn numbers_prefer_integers() {
        let value = from_str("a: 3\nb: 3.0\nc: -7\nd: 2.5").unwrap();
        let obj = value.as_object().unwrap();
        assert_eq!(obj.get("a"), Some(&Value::Number(Number::Integer(3))));
        assert_eq!(obj.get("b"), Some(&Value::Number(Number::Float(3.0))));
        assert_eq!(obj.get("c"), Some(&Value::Number(Number::Integer(-7))));
        assert_eq!(obj.get("d"), Some(&Value::Number(Number::Float(2.5))));
    }

    #[test]
    fn integer_overflow_widens_to_float() {
        let value = from_str("n: 123456789012345678901234567890").unwrap();
        assert!(matches!(
            value.as_object().unwrap().get("n"),
            Some(Value::Number(Number::Float(_)))
        ));
    }

    #[test]
    fn quoted_strings_unescape() {
        let value = from_str(r#"s: "a\nb\u0041""#).unwrap();
        assert_eq!(
            value.as_object().unwrap().get("s").unwrap().as_str(),
            Some("a\nbA")
        );
    }

    #[test]
    fn quoted_key() {
        let value = from_str("\"a: b\": 1").unwrap();
        assert_eq!(
            value.as_object().unwrap().get("a: b").unwrap().as_i64(),
            Some(1)
        );
    }

    #[test]
    fn tab_indentation_rejected() {
        assert!(from_str("a:\n\tb: 1").is_err());
    }

    #[test]
    fn odd_indentation_rejected() {
        assert!(from_str("a:\n   b: 1").is_err());
    }

    #[test]
    fn indentation_jump_rejected() {
        assert!(from_str("a:\n    b: 1").is_err());
        assert!(from_str("a: 1\n  b: 2").is_err());
    }

    #[test]
    fn table_row_count_must_match() {
        assert!(from_str("t[3]{a,b}:\n  1,2\n  3,4").is_err());
        assert!(from_str("t[1]{a,b}:\n  1,2\n  3,4").is_err());
    }

    #[test]
    fn table_cell_count_must_match() {
        assert!(from_str("t[2]{a,b}:\n  1,2\n  3").is_err());
    }

    #[test]
    fn dangling_key_rejected() {
        assert!(from_str("a:").is_err());
    }

    #[test]
    fn list_of_objects() {
        let value = from_str("items:\n  -\n    name: A\n  -\n    name: B").unwrap();
        assert_eq!(
            value,
            toon!({ "items": [{ "name": "A" }, { "name": "B" }] })
        );
    }

    #[test]
    fn quoted_cell_with_comma() {
        let value = from_str("t[2]{a,b}:\n  \"x,y\",1\n  z,2").unwrap();
        let rows = value.as_object().unwrap().get("t").unwrap().as_array().unwrap();
        assert_eq!(rows[0].as_object().unwrap().get("a").unwrap().as_str(), Some("x,y"));
    }
}
