//! JSON checker and formatter.

use std::io;

use serde::Serialize;
use serde_json::ser::{Formatter as JsonWriter, PrettyFormatter};
use serde_json::{Map, Value};

use crate::config::LanguageOptions;
use crate::errors::FormatError;

use super::{FormatResult, Formatter};

/// Parses JSON and, when reformatting, serializes it again.
///
/// Recognized options:
/// - `indent`: number of spaces, or an indentation string. Without it the
///   output is a single line with `", "` and `": "` separators.
/// - `sort_keys`: sort object keys; otherwise source order is kept.
///
/// Non-ASCII characters are written as-is.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonFormatter;

impl Formatter for JsonFormatter {
    fn name(&self) -> &str {
        "json"
    }

    fn format(&self, code: &str, options: &LanguageOptions) -> FormatResult {
        let value: Value = serde_json::from_str(code).map_err(FormatError::syntax)?;

        if !options.reformat {
            return Ok(code.to_string());
        }

        let value = if options.get_bool("sort_keys")?.unwrap_or(false) {
            sort_keys(value)
        } else {
            value
        };

        match indent_option(options)? {
            Some(indent) => write_json(&value, PrettyFormatter::with_indent(indent.as_bytes())),
            None => write_json(&value, SpacedFormatter),
        }
    }
}

fn indent_option(options: &LanguageOptions) -> std::result::Result<Option<String>, FormatError> {
    match options.get("indent") {
        None => Ok(None),
        Some(toml::Value::Integer(n)) if *n >= 0 => Ok(Some(" ".repeat(*n as usize))),
        Some(toml::Value::String(s)) => Ok(Some(s.clone())),
        Some(other) => Err(FormatError::option(format!(
            "option 'indent' must be a non-negative integer or a string, found {}",
            other
        ))),
    }
}

fn write_json<F: JsonWriter>(value: &Value, formatter: F) -> FormatResult {
    let mut buf = Vec::new();
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    value.serialize(&mut ser).map_err(FormatError::syntax)?;
    String::from_utf8(buf).map_err(FormatError::syntax)
}

fn sort_keys(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(String, Value)> = map.into_iter().collect();
            entries.sort_by(|a, b| a.0.cmp(&b.0));
            Value::Object(
                entries
                    .into_iter()
                    .map(|(k, v)| (k, sort_keys(v)))
                    .collect::<Map<String, Value>>(),
            )
        }
        Value::Array(items) => Value::Array(items.into_iter().map(sort_keys).collect()),
        other => other,
    }
}

/// Single-line output with a space after every `,` and `:`.
struct SpacedFormatter;

impl JsonWriter for SpacedFormatter {
    fn begin_array_value<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_key<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_value<W>(&mut self, writer: &mut W) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        writer.write_all(b": ")
    }
}
