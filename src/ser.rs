//! TOON encoding.
//!
//! Serializes a [`Value`] tree into the indentation-structured TOON text
//! form. The encoder applies the format's space-saving layouts:
//!
//! - **Tabular sequences**: uniform object sequences collapse to a header
//!   plus comma-separated rows
//! - **Inline sequences**: short scalar sequences render as `[v1, v2, v3]`
//! - **Quote minimization**: strings stay unquoted whenever unambiguous
//!
//! Every layout decision is reversible: [`crate::de::from_str`] parses the
//! output back into an identical tree.
//!
//! ## Usage
//!
//! ```rust
//! use toon_temporal::{from_str, to_string};
//!
//! let value = serde_json::from_str(r#"{"name":"Alice","age":30}"#).unwrap();
//! let toon = to_string(&value).unwrap();
//! assert_eq!(toon, "name: Alice\nage: 30");
//!
//! let back = from_str(&toon).unwrap();
//! assert_eq!(back, value);
//! ```

use crate::value::looks_like_number;
use crate::{Error, Number, Result, ToonOptions, Value};

/// Encodes a value with the default options.
///
/// # Errors
///
/// Returns `BadInput` for values outside the encodable set (currently only
/// non-finite floats, which JSON input can never produce).
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_string(value: &Value) -> Result<String> {
    to_string_with_options(value, &ToonOptions::default())
}

/// Encodes a value with explicit options.
///
/// # Errors
///
/// Returns `BadInput` for values outside the encodable set.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_string_with_options(value: &Value, options: &ToonOptions) -> Result<String> {
    let mut encoder = Encoder {
        out: String::with_capacity(256),
        options,
    };
    encoder.write_root(value)?;
    Ok(encoder.finish())
}

struct Encoder<'a> {
    out: String,
    options: &'a ToonOptions,
}

impl Encoder<'_> {
    fn finish(mut self) -> String {
        if self.out.ends_with('\n') {
            self.out.pop();
        }
        self.out
    }

    fn line(&mut self, depth: usize, text: &str) {
        for _ in 0..depth {
            self.out.push_str("  ");
        }
        self.out.push_str(text);
        self.out.push('\n');
    }

    fn write_root(&mut self, value: &Value) -> Result<()> {
        match value {
            // A top-level empty map encodes as the empty string.
            Value::Object(obj) if obj.is_empty() => Ok(()),
            Value::Object(obj) => self.write_entries(obj, 0),
            Value::Array(arr) => self.write_seq(None, arr, 0),
            scalar => {
                let text = scalar_text(scalar)?;
                self.line(0, &text);
                Ok(())
            }
        }
    }

    fn write_entries(&mut self, obj: &crate::ValueMap, depth: usize) -> Result<()> {
        for (key, value) in obj.iter() {
            self.write_entry(key, value, depth)?;
        }
        Ok(())
    }

    fn write_entry(&mut self, key: &str, value: &Value, depth: usize) -> Result<()> {
        let key_text = quoted_if_needed(key);
        match value {
            Value::Object(obj) if obj.is_empty() => {
                self.line(depth, &format!("{}: {{}}", key_text));
                Ok(())
            }
            Value::Object(obj) => {
                self.line(depth, &format!("{}:", key_text));
                self.write_entries(obj, depth + 1)
            }
            Value::Array(arr) => self.write_seq(Some(key_text.as_str()), arr, depth),
            scalar => {
                let text = scalar_text(scalar)?;
                self.line(depth, &format!("{}: {}", key_text, text));
                Ok(())
            }
        }
    }

    /// Writes a sequence under an optional key. `key` is `None` at the
    /// root and below a bare `-` list marker, where the header or inline
    /// form stands on its own line.
    fn write_seq(&mut self, key: Option<&str>, arr: &[Value], depth: usize) -> Result<()> {
        if arr.is_empty() {
            match key {
                Some(k) => self.line(depth, &format!("{}: []", k)),
                None => self.line(depth, "[]"),
            }
            return Ok(());
        }

        if let Some(headers) = table_shape(arr) {
            let header_list = headers
                .iter()
                .map(|h| quoted_if_needed(h))
                .collect::<Vec<_>>()
                .join(",");
            let header = format!("[{}]{{{}}}:", arr.len(), header_list);
            match key {
                Some(k) => self.line(depth, &format!("{}{}", k, header)),
                None => self.line(depth, &header),
            }
            for element in arr {
                let obj = element.as_object().ok_or_else(|| {
                    Error::internal("table row is not an object")
                })?;
                let mut cells = Vec::with_capacity(headers.len());
                for value in obj.values() {
                    cells.push(scalar_text(value)?);
                }
                self.line(depth + 1, &cells.join(","));
            }
            return Ok(());
        }

        if arr.iter().all(Value::is_scalar) {
            let inline = inline_seq(arr)?;
            let content = match key {
                Some(k) => format!("{}: {}", k, inline),
                None => inline,
            };
            if depth * 2 + content.len() <= self.options.width_budget {
                self.line(depth, &content);
                return Ok(());
            }
        }

        match key {
            Some(k) => {
                self.line(depth, &format!("{}:", k));
                self.write_list(arr, depth + 1)
            }
            None => self.write_list(arr, depth),
        }
    }

    fn write_list(&mut self, arr: &[Value], depth: usize) -> Result<()> {
        for element in arr {
            match element {
                Value::Object(obj) if obj.is_empty() => self.line(depth, "- {}"),
                Value::Object(obj) => {
                    self.line(depth, "-");
                    self.write_entries(obj, depth + 1)?;
                }
                Value::Array(inner) if inner.is_empty() => self.line(depth, "- []"),
                Value::Array(inner) => {
                    if inner.iter().all(Value::is_scalar) {
                        let inline = inline_seq(inner)?;
                        if depth * 2 + 2 + inline.len() <= self.options.width_budget {
                            self.line(depth, &format!("- {}", inline));
                            continue;
                        }
                    }
                    self.line(depth, "-");
                    self.write_seq(None, inner, depth + 1)?;
                }
                scalar => {
                    let text = scalar_text(scalar)?;
                    self.line(depth, &format!("- {}", text));
                }
            }
        }
        Ok(())
    }
}

/// Detects the uniform shape eligible for tabular compression: at least
/// two objects with identical key sets in identical order, scalar values
/// only.
fn table_shape(arr: &[Value]) -> Option<Vec<&str>> {
    if arr.len() < 2 {
        return None;
    }
    let first = arr.first()?.as_object()?;
    if first.is_empty() {
        return None;
    }
    let headers: Vec<&str> = first.keys().map(String::as_str).collect();
    for element in arr {
        let obj = element.as_object()?;
        if obj.len() != headers.len() {
            return None;
        }
        for ((key, value), header) in obj.iter().zip(&headers) {
            if key != header || !value.is_scalar() {
                return None;
            }
        }
    }
    Some(headers)
}

fn inline_seq(arr: &[Value]) -> Result<String> {
    let mut parts = Vec::with_capacity(arr.len());
    for element in arr {
        parts.push(scalar_text(element)?);
    }
    Ok(format!("[{}]", parts.join(", ")))
}

fn scalar_text(value: &Value) -> Result<String> {
    match value {
        Value::Null => Ok("null".to_string()),
        Value::Bool(b) => Ok(if *b { "true" } else { "false" }.to_string()),
        Value::Number(Number::Integer(i)) => Ok(i.to_string()),
        Value::Number(n @ Number::Float(f)) => {
            if !f.is_finite() {
                return Err(Error::bad_input("non-finite number is not encodable"));
            }
            Ok(n.to_string())
        }
        Value::String(s) => Ok(quoted_if_needed(s)),
        other => Err(Error::internal(format!(
            "expected scalar, found {}",
            other.type_name()
        ))),
    }
}

#[inline]
fn needs_quotes(s: &str) -> bool {
    s.is_empty()
        || s == "true"
        || s == "false"
        || s == "null"
        || looks_like_number(s)
        || s.starts_with(' ')
        || s.ends_with(' ')
        || s.starts_with('-')
        || s.starts_with('#')
        || s.chars().any(|c| {
            c.is_control() || matches!(c, ':' | ',' | '"' | '\\' | '[' | ']' | '{' | '}')
        })
}

fn quoted_if_needed(s: &str) -> String {
    if !needs_quotes(s) {
        return s.to_string();
    }
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for ch in s.chars() {
        match ch {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\u{0008}' => out.push_str("\\b"),
            '\u{000C}' => out.push_str("\\f"),
            c if c.is_control() => {
                out.push_str(&format!("\\u{:04x}", c as u32));
            }
            c => out.push(c),
        }
    }
    out.push('"');
    out
}
