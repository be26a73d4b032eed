//! Per-language options.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::errors::FormatError;

/// Options for one configured language tag.
///
/// Every formatter understands `reformat`; anything else is formatter
/// specific and kept in `extra` in declaration order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LanguageOptions {
    /// Rewrite the code. When false the formatter only checks it.
    #[serde(default)]
    pub reformat: bool,

    /// Formatter-specific options, e.g. `indent` or `config-file`.
    #[serde(default, flatten)]
    pub extra: IndexMap<String, toml::Value>,
}

impl LanguageOptions {
    /// Creates check-only options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates options with `reformat = true`.
    pub fn reformatting() -> Self {
        Self {
            reformat: true,
            extra: IndexMap::new(),
        }
    }

    /// Adds a formatter-specific option.
    pub fn with_option(mut self, key: impl Into<String>, value: impl Into<toml::Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }

    /// Returns a raw option value.
    pub fn get(&self, key: &str) -> Option<&toml::Value> {
        self.extra.get(key)
    }

    /// Returns a boolean option.
    pub fn get_bool(&self, key: &str) -> std::result::Result<Option<bool>, FormatError> {
        match self.get(key) {
            None => Ok(None),
            Some(toml::Value::Boolean(b)) => Ok(Some(*b)),
            Some(other) => Err(type_error(key, "a boolean", other)),
        }
    }

    /// Returns a string option.
    pub fn get_str(&self, key: &str) -> std::result::Result<Option<&str>, FormatError> {
        match self.get(key) {
            None => Ok(None),
            Some(toml::Value::String(s)) => Ok(Some(s.as_str())),
            Some(other) => Err(type_error(key, "a string", other)),
        }
    }

    /// Returns a list-of-strings option, such as a command line.
    pub fn get_string_list(&self, key: &str) -> std::result::Result<Option<Vec<String>>, FormatError> {
        match self.get(key) {
            None => Ok(None),
            Some(toml::Value::Array(items)) => items
                .iter()
                .map(|item| match item {
                    toml::Value::String(s) => Ok(s.clone()),
                    other => Err(type_error(key, "a list of strings", other)),
                })
                .collect::<std::result::Result<Vec<_>, _>>()
                .map(Some),
            Some(other) => Err(type_error(key, "a list of strings", other)),
        }
    }
}

fn type_error(key: &str, expected: &str, found: &toml::Value) -> FormatError {
    FormatError::option(format!(
        "option '{}' must be {}, found {}",
        key,
        expected,
        found.type_str()
    ))
}
