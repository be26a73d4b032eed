//! Python checker and formatter.
//!
//! Both jobs are delegated to external tools. Checking runs the interpreter
//! on the code with `ast.parse`; reformatting runs a formatter that reads
//! stdin and writes stdout.
//!
//! Options:
//! - `check-command`: overrides the checking command line.
//! - `command`: overrides the reformatting command line.
//! - `config-file`: passed as `--config <file>` to the default formatter.

use crate::config::LanguageOptions;
use crate::errors::FormatError;

use super::command::run_command;
use super::{FormatResult, Formatter};

const CHECK_SCRIPT: &str = "import ast, sys; ast.parse(sys.stdin.read())";

/// Checks Python syntax, or reformats Python code.
#[derive(Debug, Clone, Copy, Default)]
pub struct PythonFormatter;

impl PythonFormatter {
    /// The command line used to check syntax.
    pub fn check_command(options: &LanguageOptions) -> std::result::Result<Vec<String>, FormatError> {
        Ok(options.get_string_list("check-command")?.unwrap_or_else(|| {
            vec!["python3".to_string(), "-c".to_string(), CHECK_SCRIPT.to_string()]
        }))
    }

    /// The command line used to reformat.
    pub fn reformat_command(options: &LanguageOptions) -> std::result::Result<Vec<String>, FormatError> {
        if let Some(command) = options.get_string_list("command")? {
            return Ok(command);
        }
        let mut argv = vec!["ruff".to_string(), "format".to_string()];
        if let Some(config_file) = options.get_str("config-file")? {
            argv.push("--config".to_string());
            argv.push(config_file.to_string());
        }
        argv.push("-".to_string());
        Ok(argv)
    }
}

impl Formatter for PythonFormatter {
    fn name(&self) -> &str {
        "python"
    }

    fn format(&self, code: &str, options: &LanguageOptions) -> FormatResult {
        if options.reformat {
            run_command(&Self::reformat_command(options)?, code)
        } else {
            run_command(&Self::check_command(options)?, code)?;
            Ok(code.to_string())
        }
    }
}
