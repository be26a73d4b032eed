//! Type definitions for readers.

use std::ops::Range;

/// A directive block found in a document.
///
/// All fields borrow from the scanned text; `before` followed by `code`
/// is exactly the matched region.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectiveBlock<'a> {
    /// Leading whitespace of the directive line.
    pub indent: &'a str,
    /// The directive name, e.g. `code-block`.
    pub directive: &'a str,
    /// The language tag after `::`, if any.
    pub language: Option<&'a str>,
    /// Header line, option lines and empty lines before the body.
    pub before: &'a str,
    /// The code body, still indented, including its trailing newlines.
    pub code: &'a str,
    /// Byte range of the whole block in the scanned text.
    pub span: Range<usize>,
}

impl<'a> DirectiveBlock<'a> {
    /// Byte offset of the directive line.
    pub fn start(&self) -> usize {
        self.span.start
    }

    /// Byte offset just past the last body line.
    pub fn end(&self) -> usize {
        self.span.end
    }

    /// Byte offset of the first code line.
    pub fn code_start(&self) -> usize {
        self.span.start + self.before.len()
    }
}

/// Classification of a line following a directive header, relative to the
/// header's indentation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    /// A zero-length line.
    Empty,
    /// Deeper-indented line whose first non-blank character is `:`.
    Option,
    /// Deeper-indented line of any other content.
    Body,
    /// Anything that ends the block.
    Other,
}

impl LineKind {
    /// Whether a line of this kind can be part of a code body.
    pub fn continues_body(self) -> bool {
        !matches!(self, Self::Other)
    }
}
