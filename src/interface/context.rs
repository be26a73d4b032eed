//! Execution context for reformatting runs.

use std::path::PathBuf;

use crate::config::Config;
use crate::errors::SnippetFmtError;
use crate::formatters::{discover_formatters, Formatter, FormatterRegistry};

/// Context for snippet-fmt operations.
///
/// Holds the configuration and the formatter registry built from it.
#[derive(Debug)]
pub struct Context {
    /// Configuration.
    pub config: Config,
    /// Formatter registry.
    pub formatters: FormatterRegistry,
    /// Base directory for operations.
    pub base_dir: PathBuf,
    /// Formatter entries from the configuration that failed to load.
    pub skipped_formatters: Vec<(String, SnippetFmtError)>,
}

impl Context {
    /// Creates a new context with the given configuration.
    ///
    /// Built-in formatters are registered first, then the entries of the
    /// configuration's `[formatters]` table.
    pub fn new(config: Config, base_dir: PathBuf) -> Self {
        let mut formatters = FormatterRegistry::builtin();
        let skipped_formatters = formatters.apply_discovered(discover_formatters(&config.formatters));

        Self {
            config,
            formatters,
            base_dir,
            skipped_formatters,
        }
    }

    /// Creates a context with default configuration.
    pub fn default_for_dir(base_dir: PathBuf) -> Self {
        Self::new(Config::default(), base_dir)
    }

    /// Creates a context from the current directory.
    pub fn from_current_dir() -> std::io::Result<Self> {
        let base_dir = std::env::current_dir()?;
        let config = match crate::config::read_config(&base_dir) {
            Ok(config) => config,
            Err(e) => {
                tracing::error!("Failed to read configuration: {}. Using defaults.", e);
                Config::default()
            }
        };
        Ok(Self::new(config, base_dir))
    }

    /// Registers a formatter, replacing any existing one with that name.
    pub fn register_formatter<F: Formatter + 'static>(&mut self, name: impl Into<String>, formatter: F) {
        self.formatters.register(name, formatter);
    }

    /// Resolves a path relative to the base directory.
    pub fn resolve_path(&self, path: &std::path::Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base_dir.join(path)
        }
    }
}
