//! Error types for snippet-fmt.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Main error type for snippet-fmt operations.
#[derive(Error, Debug)]
pub enum SnippetFmtError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("Glob pattern error: {0}")]
    GlobPattern(#[from] glob::PatternError),

    #[error("Invalid formatter entry '{name}': {reason}")]
    InvalidFormatter { name: String, reason: String },

    #[error("{}: the reformatter has not been run yet", .path.display())]
    NotRun { path: PathBuf },
}

/// Result type alias for snippet-fmt operations.
pub type Result<T> = std::result::Result<T, SnippetFmtError>;

/// The category of a formatter failure, shown in error reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormatErrorKind {
    /// The code is not valid in its declared language.
    Syntax,
    /// An external formatter command could not be run.
    Command,
    /// A language option has an unusable value.
    Option,
}

impl FormatErrorKind {
    /// Returns the name used in `<file>:<line>: <kind>: <message>` reports.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Syntax => "SyntaxError",
            Self::Command => "CommandError",
            Self::Option => "OptionError",
        }
    }
}

impl fmt::Display for FormatErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error returned by a formatter for a single code block.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct FormatError {
    /// What went wrong.
    pub kind: FormatErrorKind,
    /// Human-readable detail.
    pub message: String,
}

impl FormatError {
    /// Creates a new error of the given kind.
    pub fn new(kind: FormatErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// The code failed to parse.
    pub fn syntax(message: impl fmt::Display) -> Self {
        Self::new(FormatErrorKind::Syntax, message.to_string())
    }

    /// An external command failed to start or to communicate.
    pub fn command(message: impl fmt::Display) -> Self {
        Self::new(FormatErrorKind::Command, message.to_string())
    }

    /// A language option could not be interpreted.
    pub fn option(message: impl fmt::Display) -> Self {
        Self::new(FormatErrorKind::Option, message.to_string())
    }
}
