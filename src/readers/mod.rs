//! Readers for locating code blocks in reStructuredText documents.

mod directive;
mod types;

pub use directive::{classify_line, find_blocks, DirectiveMatcher, Header};
pub use types::{DirectiveBlock, LineKind};
