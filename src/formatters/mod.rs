//! Formatters and syntax checkers for code blocks.
//!
//! A formatter receives the dedented code of one block together with the
//! options configured for its language, and returns replacement code or a
//! [`FormatError`]. With `reformat = false` the built-in formatters only
//! validate and hand the code back unchanged.

mod command;
mod discovery;
mod ini;
mod json;
mod python;
mod registry;
mod toml_doc;

pub use command::CommandFormatter;
pub use discovery::{discover_formatters, Discovered};
pub use ini::{IniDocument, IniFormatter};
pub use json::JsonFormatter;
pub use python::PythonFormatter;
pub use registry::FormatterRegistry;
pub use toml_doc::TomlFormatter;

use crate::config::LanguageOptions;
use crate::errors::FormatError;

/// Outcome of formatting one block.
pub type FormatResult = std::result::Result<String, FormatError>;

/// A formatter or validator for one language.
pub trait Formatter: Send + Sync {
    /// Returns the name of this formatter.
    fn name(&self) -> &str;

    /// Checks, and when `options.reformat` is set rewrites, `code`.
    fn format(&self, code: &str, options: &LanguageOptions) -> FormatResult;
}

/// The no-op formatter: returns its input unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoFormat;

impl Formatter for NoFormat {
    fn name(&self) -> &str {
        "noformat"
    }

    fn format(&self, code: &str, _options: &LanguageOptions) -> FormatResult {
        Ok(code.to_string())
    }
}

/// Adapts a closure to the [`Formatter`] trait.
pub struct FnFormatter<F> {
    name: String,
    func: F,
}

impl<F> FnFormatter<F>
where
    F: Fn(&str, &LanguageOptions) -> FormatResult + Send + Sync,
{
    /// Wraps `func` under `name`.
    pub fn new(name: impl Into<String>, func: F) -> Self {
        Self {
            name: name.into(),
            func,
        }
    }
}

impl<F> Formatter for FnFormatter<F>
where
    F: Fn(&str, &LanguageOptions) -> FormatResult + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn format(&self, code: &str, options: &LanguageOptions) -> FormatResult {
        (self.func)(code, options)
    }
}

impl<F> std::fmt::Debug for FnFormatter<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnFormatter")
            .field("name", &self.name)
            .finish()
    }
}
