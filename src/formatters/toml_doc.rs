//! TOML checker and formatter.

use crate::config::LanguageOptions;
use crate::errors::FormatError;

use super::{FormatResult, Formatter};

/// Parses TOML and, when reformatting, writes the parsed table back out.
#[derive(Debug, Clone, Copy, Default)]
pub struct TomlFormatter;

impl Formatter for TomlFormatter {
    fn name(&self) -> &str {
        "toml"
    }

    fn format(&self, code: &str, options: &LanguageOptions) -> FormatResult {
        let table: toml::Table = code.parse().map_err(|e: toml::de::Error| {
            FormatError::syntax(e.message())
        })?;

        if !options.reformat {
            return Ok(code.to_string());
        }

        toml::to_string(&table).map_err(FormatError::syntax)
    }
}
