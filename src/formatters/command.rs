//! Formatters backed by external commands.

use std::io::Write;
use std::process::{Command, Stdio};
use std::thread;

use crate::config::LanguageOptions;
use crate::errors::{FormatError, Result, SnippetFmtError};

use super::{FormatResult, Formatter};

/// Runs `argv` with `code` on stdin and returns its stdout.
///
/// A non-zero exit status is a syntax error carrying the last line the
/// command wrote to stderr.
pub(crate) fn run_command(argv: &[String], code: &str) -> FormatResult {
    let (program, args) = argv
        .split_first()
        .ok_or_else(|| FormatError::option("formatter command is empty"))?;

    tracing::debug!("Running formatter command: {}", argv.join(" "));

    let mut child = Command::new(program)
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| FormatError::command(format!("failed to run '{}': {}", program, e)))?;

    let mut stdin = child
        .stdin
        .take()
        .ok_or_else(|| FormatError::command(format!("failed to open stdin of '{}'", program)))?;
    let input = code.to_string();
    // Feed stdin from a separate thread so a chatty child cannot block on a
    // full stdout pipe while we are still writing.
    let writer = thread::spawn(move || stdin.write_all(input.as_bytes()));

    let output = child
        .wait_with_output()
        .map_err(|e| FormatError::command(format!("failed to wait for '{}': {}", program, e)))?;

    match writer.join() {
        Ok(Ok(())) => {}
        // The child may exit without reading all of its input.
        Ok(Err(e)) if e.kind() == std::io::ErrorKind::BrokenPipe => {}
        Ok(Err(e)) => {
            return Err(FormatError::command(format!(
                "failed to write to '{}': {}",
                program, e
            )))
        }
        Err(_) => {
            return Err(FormatError::command(format!(
                "stdin writer for '{}' panicked",
                program
            )))
        }
    }

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        let message = stderr
            .lines()
            .rev()
            .map(str::trim)
            .find(|line| !line.is_empty())
            .map(|line| line.strip_prefix("SyntaxError: ").unwrap_or(line).to_string())
            .unwrap_or_else(|| format!("'{}' exited with {}", program, output.status));
        return Err(FormatError::syntax(message));
    }

    String::from_utf8(output.stdout)
        .map_err(|e| FormatError::command(format!("'{}' produced invalid UTF-8: {}", program, e)))
}

/// A formatter that pipes code through an external command.
///
/// With `reformat = true` the command's output replaces the code;
/// otherwise the command only validates it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandFormatter {
    name: String,
    argv: Vec<String>,
}

impl CommandFormatter {
    /// Creates a command formatter. The command line must not be empty.
    pub fn new(name: impl Into<String>, argv: Vec<String>) -> Result<Self> {
        let name = name.into();
        if argv.is_empty() || argv[0].trim().is_empty() {
            return Err(SnippetFmtError::InvalidFormatter {
                name,
                reason: "command is empty".to_string(),
            });
        }
        Ok(Self { name, argv })
    }
}

impl Formatter for CommandFormatter {
    fn name(&self) -> &str {
        &self.name
    }

    fn format(&self, code: &str, options: &LanguageOptions) -> FormatResult {
        let output = run_command(&self.argv, code)?;
        if options.reformat {
            Ok(output)
        } else {
            Ok(code.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::FormatErrorKind;

    fn argv(parts: &[&str]) -> Vec<String> {
        parts.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_empty_command_rejected() {
        assert!(CommandFormatter::new("empty", Vec::new()).is_err());
        assert!(CommandFormatter::new("blank", argv(&[" "])).is_err());
    }

    #[test]
    fn test_missing_program() {
        let err = run_command(&argv(&["snippet-fmt-no-such-program"]), "x").unwrap_err();
        assert_eq!(err.kind, FormatErrorKind::Command);
    }

    #[cfg(unix)]
    #[test]
    fn test_reformat_uses_stdout() {
        let formatter = CommandFormatter::new("upper", argv(&["tr", "a-z", "A-Z"])).unwrap();
        let out = formatter
            .format("hello", &LanguageOptions::reformatting())
            .unwrap();
        assert_eq!(out, "HELLO");
    }

    #[cfg(unix)]
    #[test]
    fn test_check_only_returns_input() {
        let formatter = CommandFormatter::new("upper", argv(&["tr", "a-z", "A-Z"])).unwrap();
        let out = formatter.format("hello", &LanguageOptions::new()).unwrap();
        assert_eq!(out, "hello");
    }

    #[cfg(unix)]
    #[test]
    fn test_failure_reports_last_stderr_line() {
        let formatter = CommandFormatter::new(
            "fail",
            argv(&["sh", "-c", "echo first >&2; echo 'SyntaxError: bad input' >&2; exit 1"]),
        )
        .unwrap();
        let err = formatter.format("x", &LanguageOptions::new()).unwrap_err();
        assert_eq!(err.kind, FormatErrorKind::Syntax);
        assert_eq!(err.message, "bad input");
    }
}
