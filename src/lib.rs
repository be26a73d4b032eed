//! snippet-fmt - reformat and validate code blocks in reStructuredText
//!
//! This library finds `code`, `code-block` and `sourcecode` directives in
//! reStructuredText documents and passes each block's body through a
//! formatter chosen by its language tag. Blocks whose formatter fails are
//! left untouched and reported with their line number.
//!
//! # Example
//!
//! ```no_run
//! use snippet_fmt::commands::{reformat, ReformatOptions};
//! use snippet_fmt::interface::Context;
//!
//! let ctx = Context::from_current_dir().unwrap();
//! let options = ReformatOptions {
//!     files: vec!["README.rst".into()],
//!     ..Default::default()
//! };
//! let summary = reformat(&ctx, options).unwrap();
//! println!("{} files changed", summary.changed);
//! ```

pub mod commands;
pub mod config;
pub mod errors;
pub mod formatters;
pub mod interface;
pub mod io;
pub mod readers;
pub mod text_location;
pub mod whitespace;

// Re-export commonly used types
pub use config::{Config, LanguageOptions};
pub use errors::{FormatError, FormatErrorKind, Result, SnippetFmtError};
pub use formatters::{Formatter, FormatterRegistry};
pub use interface::{reformat, Context, ReformatResult, Reformatter};

pub use commands::{ReformatOptions, RunSummary};
