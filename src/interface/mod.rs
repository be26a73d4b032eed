//! High-level interface for reformatting documents.

mod context;
mod reformatter;

pub use context::Context;
pub use reformatter::{reformat, CodeBlockError, ReformatResult, Reformatter};
