//! Reformatting of code blocks in a single document.

use std::fmt;
use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::errors::{FormatError, Result, SnippetFmtError};
use crate::formatters::FormatterRegistry;
use crate::io::{atomic_write, unified_diff, DEFAULT_CONTEXT};
use crate::readers::{find_blocks, DirectiveBlock};
use crate::text_location::TextLocation;
use crate::whitespace::{dedent, normalize_trailing_blank_lines};

use super::context::Context;

/// A formatter failure attributed to one code block.
#[derive(Debug, Clone, PartialEq)]
pub struct CodeBlockError {
    /// Where the block's directive line starts.
    pub location: TextLocation,
    /// The block's language tag, empty when it had none.
    pub language: String,
    /// The failure reported by the formatter.
    pub error: FormatError,
}

impl fmt::Display for CodeBlockError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}: {}", self.location, self.error.kind.name(), self.error.message)
    }
}

/// Outcome of one reformatting pass.
#[derive(Debug, Clone, PartialEq)]
pub struct ReformatResult {
    /// The reformatted document.
    pub text: String,
    /// Per-block failures in document order.
    pub errors: Vec<CodeBlockError>,
    /// Whether `text` differs from the input.
    pub changed: bool,
}

/// Reformats every matched code block in `source`.
///
/// Text outside the blocks is copied verbatim, apart from the run of blank
/// lines at the very end, which is reduced to a single line feed. A block
/// whose formatter fails is left exactly as written and its error is
/// recorded; the other blocks are still processed.
///
/// Documents with `\r\n` line endings are matched and formatted as `\n`
/// text and written back with `\r\n` throughout.
pub fn reformat(source: &str, config: &Config, registry: &FormatterRegistry) -> ReformatResult {
    if !source.contains("\r\n") {
        return reformat_lf(source, config, registry);
    }

    let mut result = reformat_lf(&source.replace("\r\n", "\n"), config, registry);
    result.text = result.text.replace('\n', "\r\n");
    result.changed = result.text != source;
    result
}

fn reformat_lf(source: &str, config: &Config, registry: &FormatterRegistry) -> ReformatResult {
    let text = normalize_trailing_blank_lines(source);
    let blocks = find_blocks(&text, config);

    let mut out = String::with_capacity(text.len());
    let mut errors = Vec::new();
    let mut pos = 0;

    for block in &blocks {
        out.push_str(&text[pos..block.start()]);
        match format_block(block, config, registry) {
            Ok(code) => {
                out.push_str(block.before);
                out.push_str(&code);
            }
            Err(error) => {
                tracing::debug!(
                    "Block at offset {} ({}) failed: {}",
                    block.start(),
                    block.language.unwrap_or(""),
                    error
                );
                errors.push(CodeBlockError {
                    location: TextLocation::from_offset(&text, block.start()),
                    language: block.language.unwrap_or("").to_string(),
                    error,
                });
                out.push_str(&text[block.span.clone()]);
            }
        }
        pos = block.end();
    }
    out.push_str(&text[pos..]);

    let changed = out != source;
    ReformatResult {
        text: out,
        errors,
        changed,
    }
}

fn format_block(
    block: &DirectiveBlock<'_>,
    config: &Config,
    registry: &FormatterRegistry,
) -> std::result::Result<String, FormatError> {
    // Unconfigured tags are never touched, not even their whitespace.
    let Some((key, options)) = block.language.and_then(|tag| config.language(tag)) else {
        return Ok(block.code.to_string());
    };
    let formatter = registry.resolve(key);

    tracing::debug!(
        "Formatting {} block at offset {} with '{}'",
        key,
        block.start(),
        formatter.name()
    );

    let dedented = dedent(block.code);
    let formatted = formatter.format(&dedented.body, options)?;
    if formatted == dedented.body {
        return Ok(block.code.to_string());
    }
    Ok(dedented.reindent(&formatted))
}

/// Reformats the code blocks of one file.
///
/// ```no_run
/// use std::path::Path;
/// use snippet_fmt::interface::{Context, Reformatter};
///
/// let ctx = Context::from_current_dir().unwrap();
/// let mut r = Reformatter::from_file(Path::new("README.rst"), &ctx).unwrap();
/// if r.run() {
///     r.to_file().unwrap();
/// }
/// ```
#[derive(Debug)]
pub struct Reformatter<'c> {
    /// Path as given by the caller, used in reports.
    pub filename: PathBuf,
    path: PathBuf,
    ctx: &'c Context,
    original: String,
    result: Option<ReformatResult>,
}

impl<'c> Reformatter<'c> {
    /// Reads a file relative to the context's base directory.
    pub fn from_file(filename: &Path, ctx: &'c Context) -> Result<Self> {
        let path = ctx.resolve_path(filename);
        let original = std::fs::read_to_string(&path)?;
        Ok(Self {
            filename: filename.to_path_buf(),
            path,
            ctx,
            original,
            result: None,
        })
    }

    /// Wraps in-memory text. [`to_file`](Self::to_file) writes to
    /// `filename` resolved against the context's base directory.
    pub fn from_source(filename: impl Into<PathBuf>, source: impl Into<String>, ctx: &'c Context) -> Self {
        let filename = filename.into();
        Self {
            path: ctx.resolve_path(&filename),
            filename,
            ctx,
            original: source.into(),
            result: None,
        }
    }

    /// Runs the reformatter. Returns whether the document changed.
    pub fn run(&mut self) -> bool {
        let mut result = reformat(&self.original, &self.ctx.config, &self.ctx.formatters);
        for error in &mut result.errors {
            error.location.filename = Some(self.filename.clone());
        }
        let changed = result.changed;
        self.result = Some(result);
        changed
    }

    /// Returns the text read from the file.
    pub fn original_source(&self) -> &str {
        &self.original
    }

    /// Returns the reformatted text.
    pub fn reformatted_source(&self) -> Result<&str> {
        Ok(&self.result()?.text)
    }

    /// Returns the block errors of the last run.
    pub fn errors(&self) -> &[CodeBlockError] {
        match &self.result {
            Some(result) => &result.errors,
            None => &[],
        }
    }

    /// Returns the block errors formatted as `file:line: Kind: message`.
    pub fn error_lines(&self) -> Vec<String> {
        self.errors().iter().map(ToString::to_string).collect()
    }

    /// Returns a unified diff of the changes.
    pub fn get_diff(&self) -> Result<String> {
        let name = self.filename.display().to_string();
        Ok(unified_diff(
            &self.original,
            self.reformatted_source()?,
            &format!("{}\t(original)", name),
            &format!("{}\t(reformatted)", name),
            DEFAULT_CONTEXT,
        ))
    }

    /// Writes the reformatted text back if it changed.
    ///
    /// Returns whether the file was written.
    pub fn to_file(&self) -> Result<bool> {
        let result = self.result()?;
        if !result.changed {
            return Ok(false);
        }
        atomic_write(&self.path, &result.text)?;
        tracing::info!("Reformatted {}", self.filename.display());
        Ok(true)
    }

    fn result(&self) -> Result<&ReformatResult> {
        self.result.as_ref().ok_or_else(|| SnippetFmtError::NotRun {
            path: self.filename.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LanguageOptions;
    use crate::formatters::FormatResult;
    use pretty_assertions::assert_eq;
    use std::fs;
    use tempfile::tempdir;

    fn upper(code: &str, _options: &LanguageOptions) -> FormatResult {
        Ok(code.to_uppercase())
    }

    fn registry() -> FormatterRegistry {
        let mut registry = FormatterRegistry::builtin();
        registry.register_fn("shout", upper);
        registry
    }

    fn shout_config() -> Config {
        Config::default().with_languages([("shout", LanguageOptions::new())])
    }

    #[test]
    fn test_block_reformatted_in_place() {
        let source = "Intro\n\n.. code-block:: shout\n\n    hello\n    world\n\nOutro\n";
        let result = reformat(source, &shout_config(), &registry());

        assert_eq!(
            result.text,
            "Intro\n\n.. code-block:: shout\n\n    HELLO\n    WORLD\n\nOutro\n"
        );
        assert!(result.changed);
        assert!(result.errors.is_empty());
    }

    #[test]
    fn test_unconfigured_language_untouched() {
        let source = ".. code-block:: shout\n\n    hello\n";
        let result = reformat(source, &Config::default(), &registry());
        assert_eq!(result.text, source);
        assert!(!result.changed);
    }

    #[test]
    fn test_untagged_block_untouched() {
        let source = ".. code::\n\n    hello\n";
        let result = reformat(source, &shout_config(), &registry());
        assert_eq!(result.text, source);
    }

    #[test]
    fn test_trailing_blank_lines_trimmed() {
        let result = reformat("text\n\n\n  \n", &Config::default(), &registry());
        assert_eq!(result.text, "text\n");
        assert!(result.changed);

        let result = reformat("", &Config::default(), &registry());
        assert_eq!(result.text, "");
        assert!(!result.changed);
    }

    #[test]
    fn test_failed_block_kept_and_reported() {
        let source = "Title\n=====\n\n.. code-block:: json\n\n    {\"a\": }\n\n.. code-block:: shout\n\n    ok\n";
        let config = Config::default().with_languages([
            ("json", LanguageOptions::new()),
            ("shout", LanguageOptions::new()),
        ]);
        let result = reformat(source, &config, &registry());

        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].location.line, 4);
        assert_eq!(result.errors[0].language, "json");
        assert!(result.text.contains("    {\"a\": }\n"));
        assert!(result.text.ends_with("    OK\n"));
    }

    #[test]
    fn test_second_pass_is_stable() {
        let source = ".. code-block:: shout\n\n    hello\n\n\n";
        let first = reformat(source, &shout_config(), &registry());
        let second = reformat(&first.text, &shout_config(), &registry());
        assert_eq!(second.text, first.text);
        assert!(!second.changed);
    }

    #[test]
    fn test_reformatter_requires_run() {
        let ctx = Context::default_for_dir(PathBuf::from("."));
        let r = Reformatter::from_source("doc.rst", "text\n", &ctx);

        assert!(matches!(r.reformatted_source(), Err(SnippetFmtError::NotRun { .. })));
        assert!(r.get_diff().is_err());
        assert!(r.to_file().is_err());
        assert!(r.errors().is_empty());
    }

    #[test]
    fn test_reformatter_error_lines() {
        let ctx = Context::default_for_dir(PathBuf::from("."));
        let mut r = Reformatter::from_source(
            "doc.rst",
            "Intro\n\n.. code-block:: toml\n\n    [broken\n",
            &ctx,
        );

        assert!(!r.run());
        let lines = r.error_lines();
        assert_eq!(lines.len(), 1);
        assert!(lines[0].starts_with("doc.rst:3: SyntaxError: "), "{}", lines[0]);
    }

    #[test]
    fn test_reformatter_diff_and_write() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("doc.rst"), "Some text\n\n\n").unwrap();
        let ctx = Context::default_for_dir(dir.path().to_path_buf());

        let mut r = Reformatter::from_file(Path::new("doc.rst"), &ctx).unwrap();
        assert!(r.run());

        let diff = r.get_diff().unwrap();
        assert!(diff.starts_with("--- doc.rst\t(original)\n+++ doc.rst\t(reformatted)\n"));

        assert!(r.to_file().unwrap());
        assert_eq!(fs::read_to_string(dir.path().join("doc.rst")).unwrap(), "Some text\n");
    }

    #[test]
    fn test_unchanged_file_not_written() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("doc.rst");
        fs::write(&path, "Some text\n").unwrap();
        let ctx = Context::default_for_dir(dir.path().to_path_buf());

        let mut r = Reformatter::from_file(&path, &ctx).unwrap();
        assert!(!r.run());
        assert_eq!(r.get_diff().unwrap(), "");
        assert!(!r.to_file().unwrap());
    }
}
