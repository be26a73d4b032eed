//! Indentation and trailing-newline handling around formatter calls.
//!
//! A captured code body is dedented before it is handed to a formatter and
//! re-indented afterwards. The run of trailing line feeds is cut off first
//! and restored byte-for-byte, so formatters never see trailing blank lines.

use std::borrow::Cow;

fn is_blank_char(c: char) -> bool {
    c == ' ' || c == '\t'
}

fn leading_blanks(line: &str) -> &str {
    let rest = line.trim_start_matches(is_blank_char);
    &line[..line.len() - rest.len()]
}

/// Returns the indentation that is re-applied after formatting.
///
/// This is the smallest leading space/tab run, by string comparison, over
/// all lines that start with whitespace and have at least one character
/// after it (the line feed counts). With mixed tabs and spaces the result
/// may not be a true common prefix.
pub fn common_indent(code: &str) -> &str {
    code.split_inclusive('\n')
        .filter_map(|line| {
            let run = leading_blanks(line);
            (!run.is_empty() && run.len() < line.len()).then_some(run)
        })
        .min()
        .unwrap_or("")
}

/// Returns the maximal run of `\n` at the end of `code`.
pub fn trailing_newlines(code: &str) -> &str {
    let kept = code.trim_end_matches('\n');
    &code[kept.len()..]
}

/// Removes the whitespace margin shared by all non-blank lines.
///
/// Lines consisting only of spaces and tabs are emptied and do not take
/// part in computing the margin. When two lines disagree on tabs versus
/// spaces, the margin is their longest common prefix.
pub fn dedent_text(text: &str) -> String {
    let lines: Vec<&str> = text
        .split('\n')
        .map(|line| {
            if line.chars().all(is_blank_char) {
                ""
            } else {
                line
            }
        })
        .collect();

    let mut margin: Option<&str> = None;
    for line in lines.iter().filter(|line| !line.is_empty()) {
        let indent = leading_blanks(line);
        margin = Some(match margin {
            None => indent,
            Some(current) if indent.starts_with(current) => current,
            Some(current) if current.starts_with(indent) => indent,
            Some(current) => {
                let shared = current
                    .bytes()
                    .zip(indent.bytes())
                    .take_while(|(a, b)| a == b)
                    .count();
                &current[..shared]
            }
        });
    }

    let margin = margin.unwrap_or("");
    lines
        .iter()
        .map(|line| line.strip_prefix(margin).unwrap_or(line))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Prefixes every line that has non-whitespace content.
pub fn indent_text(text: &str, prefix: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for line in text.split_inclusive('\n') {
        if !line.trim().is_empty() {
            out.push_str(prefix);
        }
        out.push_str(line);
    }
    out
}

/// A code body split into the parts a formatter sees and the parts that
/// are restored afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dedented {
    /// Indentation re-applied to the formatted output.
    pub common_indent: String,
    /// Trailing line feeds re-appended to the formatted output.
    pub trailing_newlines: String,
    /// Dedented code without its trailing line feeds.
    pub body: String,
}

impl Dedented {
    /// Re-indents formatter output for this body.
    pub fn reindent(&self, formatted: &str) -> String {
        reindent(formatted, &self.common_indent, &self.trailing_newlines)
    }
}

/// Splits a captured code body for formatting.
pub fn dedent(code: &str) -> Dedented {
    let trailing = trailing_newlines(code);
    let body = &code[..code.len() - trailing.len()];
    Dedented {
        common_indent: common_indent(code).to_string(),
        trailing_newlines: trailing.to_string(),
        body: dedent_text(body),
    }
}

/// Restores indentation and the trailing line feeds around formatter output.
///
/// Any trailing whitespace the formatter produced is dropped first, so a
/// formatter that ends its output with a newline does not change the number
/// of blank lines after the block.
pub fn reindent(formatted: &str, common_indent: &str, trailing_newlines: &str) -> String {
    let indented = indent_text(formatted, common_indent);
    let mut out = indented.trim_end().to_string();
    out.push_str(trailing_newlines);
    out
}

/// Makes `text` end in exactly one line feed.
///
/// Trailing lines that contain only whitespace are dropped. Text with no
/// visible content becomes empty.
pub fn normalize_trailing_blank_lines(text: &str) -> Cow<'_, str> {
    let mut content_end = None;
    let mut start = 0;
    for line in text.split('\n') {
        if !line.trim().is_empty() {
            content_end = Some(start + line.len());
        }
        start += line.len() + 1;
    }

    match content_end {
        None if text.is_empty() => Cow::Borrowed(text),
        None => Cow::Owned(String::new()),
        Some(end) if text.len() == end + 1 => Cow::Borrowed(text),
        Some(end) => {
            let mut out = String::with_capacity(end + 1);
            out.push_str(&text[..end]);
            out.push('\n');
            Cow::Owned(out)
        }
    }
}
