//! Directive block matching.
//!
//! A block is a header line, zero or more option lines, any number of empty
//! lines and then a body of one or more lines indented deeper than the
//! header:
//!
//! ```text
//!   .. code-block:: python
//!       :caption: example
//!
//!       print("hello")
//! ```
//!
//! Lines are classified one at a time and grouped by a small state machine,
//! so matching is linear in the size of the document.

use crate::config::Config;

use super::types::{DirectiveBlock, LineKind};

/// One line of the scanned text.
#[derive(Debug, Clone, Copy)]
struct Line<'a> {
    /// Byte offset of the first character.
    start: usize,
    /// Content without the line feed.
    content: &'a str,
    /// Whether the line is terminated by `\n`.
    terminated: bool,
}

impl Line<'_> {
    fn end(&self) -> usize {
        self.start + self.content.len() + usize::from(self.terminated)
    }
}

fn split_lines(text: &str) -> Vec<Line<'_>> {
    let mut lines = Vec::new();
    let mut start = 0;
    for raw in text.split_inclusive('\n') {
        let (content, terminated) = match raw.strip_suffix('\n') {
            Some(content) => (content, true),
            None => (raw, false),
        };
        lines.push(Line {
            start,
            content,
            terminated,
        });
        start += raw.len();
    }
    lines
}

fn is_blank_char(c: char) -> bool {
    c == ' ' || c == '\t'
}

fn is_language_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || c == '_'
}

/// A parsed directive header line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header<'a> {
    pub indent: &'a str,
    pub directive: &'a str,
    pub language: Option<&'a str>,
}

/// Classifies a line that follows a header indented by `indent`.
pub fn classify_line(content: &str, indent: &str) -> LineKind {
    if content.is_empty() {
        return LineKind::Empty;
    }
    let Some(rest) = content.strip_prefix(indent) else {
        return LineKind::Other;
    };
    let deeper = rest.trim_start_matches(is_blank_char);
    if deeper.len() == rest.len() {
        return LineKind::Other;
    }
    if deeper.starts_with(':') {
        LineKind::Option
    } else {
        LineKind::Body
    }
}

/// Finds directive blocks for a configured set of directive names.
#[derive(Debug, Clone)]
pub struct DirectiveMatcher {
    directives: Vec<String>,
}

impl DirectiveMatcher {
    /// Creates a matcher for the given directive names.
    ///
    /// Names are tried in order; empty names are ignored.
    pub fn new<I, S>(directives: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let directives = directives
            .into_iter()
            .map(Into::into)
            .filter(|name: &String| !name.is_empty())
            .collect();
        Self { directives }
    }

    /// Creates a matcher for the directives in a configuration.
    pub fn from_config(config: &Config) -> Self {
        Self::new(config.directives.iter().cloned())
    }

    /// Returns the directive names this matcher accepts.
    pub fn directives(&self) -> &[String] {
        &self.directives
    }

    /// Parses a header line (without its line feed).
    ///
    /// A language tag must end the line. Without one, trailing whitespace
    /// is allowed.
    pub fn parse_header<'a>(&self, line: &'a str) -> Option<Header<'a>> {
        let rest = line.trim_start_matches(is_blank_char);
        let indent = &line[..line.len() - rest.len()];
        let rest = rest.strip_prefix("..")?.trim_start_matches(is_blank_char);

        let (directive, tail) = self.directives.iter().find_map(|name| {
            let tail = rest.strip_prefix(name.as_str())?.strip_prefix("::")?;
            Some((&rest[..name.len()], tail))
        })?;

        let tail = tail.trim_start_matches(is_blank_char);
        let tag_len = tail
            .find(|c: char| !is_language_char(c))
            .unwrap_or(tail.len());
        let (tag, remainder) = tail.split_at(tag_len);

        if tag.is_empty() {
            if !remainder.chars().all(char::is_whitespace) {
                return None;
            }
            Some(Header {
                indent,
                directive,
                language: None,
            })
        } else if remainder.is_empty() {
            Some(Header {
                indent,
                directive,
                language: Some(tag),
            })
        } else {
            None
        }
    }

    /// Returns every non-overlapping block in source order.
    pub fn find_blocks<'a>(&self, text: &'a str) -> Vec<DirectiveBlock<'a>> {
        let lines = split_lines(text);
        let mut blocks = Vec::new();
        let mut index = 0;

        while index < lines.len() {
            match self.match_at(text, &lines, index) {
                Some((block, next)) => {
                    tracing::trace!(
                        "Matched '{}' block at byte {}",
                        block.directive,
                        block.start()
                    );
                    blocks.push(block);
                    index = next;
                }
                None => index += 1,
            }
        }

        blocks
    }

    /// Tries to match a block whose header is `lines[first]`.
    ///
    /// Returns the block and the index of the line after it.
    fn match_at<'a>(
        &self,
        text: &'a str,
        lines: &[Line<'a>],
        first: usize,
    ) -> Option<(DirectiveBlock<'a>, usize)> {
        let header_line = lines[first];
        if !header_line.terminated {
            return None;
        }
        let header = self.parse_header(header_line.content)?;
        let kind_at = |index: usize| {
            let line = &lines[index];
            if line.terminated {
                classify_line(line.content, header.indent)
            } else {
                LineKind::Other
            }
        };

        let mut cursor = first + 1;
        while cursor < lines.len() && kind_at(cursor) == LineKind::Option {
            cursor += 1;
        }
        while cursor < lines.len() && kind_at(cursor) == LineKind::Empty {
            cursor += 1;
        }

        let body_start = cursor;
        let mut has_content = false;
        while cursor < lines.len() {
            let kind = kind_at(cursor);
            if !kind.continues_body() {
                break;
            }
            has_content |= kind != LineKind::Empty;
            cursor += 1;
        }

        if !has_content {
            return None;
        }

        let start = header_line.start;
        let code_start = lines[body_start].start;
        let end = lines[cursor - 1].end();

        Some((
            DirectiveBlock {
                indent: header.indent,
                directive: header.directive,
                language: header.language,
                before: &text[start..code_start],
                code: &text[code_start..end],
                span: start..end,
            },
            cursor,
        ))
    }
}

impl Default for DirectiveMatcher {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

/// Convenience function to find all blocks for a configuration.
pub fn find_blocks<'a>(text: &'a str, config: &Config) -> Vec<DirectiveBlock<'a>> {
    DirectiveMatcher::from_config(config).find_blocks(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn matcher() -> DirectiveMatcher {
        DirectiveMatcher::default()
    }

    #[test]
    fn test_parse_header_with_language() {
        let header = matcher().parse_header("  .. code-block:: python").unwrap();
        assert_eq!(header.indent, "  ");
        assert_eq!(header.directive, "code-block");
        assert_eq!(header.language, Some("python"));
    }

    #[test]
    fn test_parse_header_without_language() {
        let header = matcher().parse_header(".. sourcecode::  ").unwrap();
        assert_eq!(header.indent, "");
        assert_eq!(header.language, None);
    }

    #[test]
    fn test_parse_header_spacing() {
        let header = matcher().parse_header("\t..  code::\tc-sharp_2").unwrap();
        assert_eq!(header.indent, "\t");
        assert_eq!(header.directive, "code");
        assert_eq!(header.language, Some("c-sharp_2"));
    }

    #[test]
    fn test_parse_header_rejects() {
        let m = matcher();
        // Unknown directive, and a configured name that is only a prefix.
        assert!(m.parse_header(".. literalinclude:: foo.py").is_none());
        assert!(m.parse_header(".. code-cell:: python").is_none());
        // Tag characters outside the allowed set, or text after the tag.
        assert!(m.parse_header(".. code-block:: c++").is_none());
        assert!(m.parse_header(".. code-block:: python extra").is_none());
        assert!(m.parse_header(".. code-block:: python ").is_none());
        // Not a directive.
        assert!(m.parse_header("code-block:: python").is_none());
    }

    #[test]
    fn test_directive_names_case_sensitive() {
        let m = DirectiveMatcher::new(["Code-Block"]);
        assert!(m.parse_header(".. code-block:: python").is_none());
        assert!(m.parse_header(".. Code-Block:: python").is_some());
    }

    #[test]
    fn test_classify_line() {
        assert_eq!(classify_line("", "  "), LineKind::Empty);
        assert_eq!(classify_line("    :linenos:", "  "), LineKind::Option);
        assert_eq!(classify_line("  \t x = 1", "  "), LineKind::Body);
        assert_eq!(classify_line("  x = 1", "  "), LineKind::Other);
        assert_eq!(classify_line(" x = 1", "  "), LineKind::Other);
        assert_eq!(classify_line("  ", "  "), LineKind::Other);
        assert_eq!(classify_line("   ", "  "), LineKind::Body);
    }

    #[test]
    fn test_simple_block() {
        let text = "Title\n=====\n\n.. code-block:: python\n\n    print('hello')\n\nAfter.\n";
        let blocks = matcher().find_blocks(text);

        assert_eq!(blocks.len(), 1);
        let block = &blocks[0];
        assert_eq!(block.indent, "");
        assert_eq!(block.language, Some("python"));
        assert_eq!(block.before, ".. code-block:: python\n\n");
        assert_eq!(block.code, "    print('hello')\n\n");
        assert_eq!(&text[block.span.clone()], format!("{}{}", block.before, block.code));
    }

    #[test]
    fn test_options_and_indent() {
        let text = concat!(
            "* item\n",
            "\n",
            "  .. code:: toml\n",
            "      :caption: Example\n",
            "      :linenos:\n",
            "\n",
            "\n",
            "      [project]\n",
            "      name = \"demo\"\n",
            "\n",
            "  More text.\n",
        );
        let blocks = matcher().find_blocks(text);

        assert_eq!(blocks.len(), 1);
        let block = &blocks[0];
        assert_eq!(block.indent, "  ");
        assert_eq!(block.directive, "code");
        assert_eq!(
            block.before,
            "  .. code:: toml\n      :caption: Example\n      :linenos:\n\n\n"
        );
        assert_eq!(block.code, "      [project]\n      name = \"demo\"\n\n");
    }

    #[test]
    fn test_body_ends_on_dedent() {
        let text = ".. code:: json\n\n   {}\n\n  [1]\n";
        let blocks = matcher().find_blocks(text);

        // The body stops at the first line that is not indented deeper
        // than the header; indentation need not be consistent within it.
        assert_eq!(blocks[0].code, "   {}\n\n  [1]\n");

        let text = ".. code:: json\n\n   {}\nnot code\n";
        assert_eq!(matcher().find_blocks(text)[0].code, "   {}\n");
    }

    #[test]
    fn test_no_body_not_matched() {
        let text = ".. code-block:: python\n\nParagraph.\n";
        assert!(matcher().find_blocks(text).is_empty());

        let text = ".. code-block:: python\n";
        assert!(matcher().find_blocks(text).is_empty());
    }

    #[test]
    fn test_unterminated_last_line() {
        // The body must end with a line feed.
        let text = ".. code:: python\n\n    x = 1";
        assert!(matcher().find_blocks(text).is_empty());
    }

    #[test]
    fn test_multiple_blocks_in_order() {
        let text = concat!(
            ".. code:: json\n",
            "\n",
            "    {\"a\": 1}\n",
            "\n",
            "Text\n",
            "\n",
            ".. sourcecode:: ini\n",
            "\n",
            "    [section]\n",
            "    key = value\n",
            "\n",
            ".. note::\n",
            "\n",
            "    Not code.\n",
        );
        let blocks = matcher().find_blocks(text);

        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].language, Some("json"));
        assert_eq!(blocks[1].language, Some("ini"));
        assert!(blocks[0].end() <= blocks[1].start());
    }

    #[test]
    fn test_nested_directive_is_part_of_body() {
        let text = ".. code:: rst\n\n    .. code:: python\n\n        x = 1\n\n";
        let blocks = matcher().find_blocks(text);

        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].language, Some("rst"));
        assert_eq!(blocks[0].code, "    .. code:: python\n\n        x = 1\n\n");
    }

    #[test]
    fn test_unknown_language_still_matched() {
        let text = ".. code-block:: brainfuck\n\n    ++[>+<-]\n";
        let blocks = matcher().find_blocks(text);
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].language, Some("brainfuck"));
    }

    #[test]
    fn test_configured_directives_only() {
        let text = ".. code-cell:: python\n\n    x = 1\n\n.. code:: python\n\n    y = 2\n";
        let config = Config::default().with_directives(["code-cell"]);
        let blocks = find_blocks(text, &config);

        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].directive, "code-cell");
        assert_eq!(blocks[0].code, "    x = 1\n\n");
    }
}
