//! Loading externally declared formatters.
//!
//! Each entry of the `[formatters]` configuration table names a command:
//!
//! ```toml
//! [snippet-fmt.formatters]
//! python3 = ["black", "-q", "-"]
//! yaml = { command = ["yamlfmt", "-"] }
//! ```
//!
//! Entries are checked one by one; a malformed entry never prevents the
//! others from loading.

use std::sync::Arc;

use indexmap::IndexMap;

use crate::errors::{Result, SnippetFmtError};

use super::{CommandFormatter, Formatter};

/// A discovered formatter name and whether it could be loaded.
pub type Discovered = (String, Result<Arc<dyn Formatter>>);

/// Builds formatters from configuration entries, in declaration order.
pub fn discover_formatters(entries: &IndexMap<String, toml::Value>) -> Vec<Discovered> {
    entries
        .iter()
        .map(|(name, value)| {
            let outcome = load_entry(name, value).map(|f| Arc::new(f) as Arc<dyn Formatter>);
            (name.clone(), outcome)
        })
        .collect()
}

fn load_entry(name: &str, value: &toml::Value) -> Result<CommandFormatter> {
    let command = match value {
        toml::Value::Array(_) => value,
        toml::Value::Table(table) => table.get("command").ok_or_else(|| invalid(name, "missing 'command'"))?,
        other => {
            return Err(invalid(
                name,
                format!("expected a command list or table, found {}", other.type_str()),
            ))
        }
    };

    let toml::Value::Array(parts) = command else {
        return Err(invalid(name, "'command' must be a list of strings"));
    };

    let argv = parts
        .iter()
        .map(|part| {
            part.as_str()
                .map(str::to_string)
                .ok_or_else(|| invalid(name, "'command' must be a list of strings"))
        })
        .collect::<Result<Vec<_>>>()?;

    CommandFormatter::new(name, argv)
}

fn invalid(name: &str, reason: impl Into<String>) -> SnippetFmtError {
    SnippetFmtError::InvalidFormatter {
        name: name.to_string(),
        reason: reason.into(),
    }
}
