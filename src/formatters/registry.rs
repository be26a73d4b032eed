//! Registry mapping language names to formatters.

use std::sync::Arc;

use indexmap::IndexMap;

use crate::config::LanguageOptions;
use crate::errors::SnippetFmtError;

use super::discovery::Discovered;
use super::{
    FnFormatter, FormatResult, Formatter, IniFormatter, JsonFormatter, NoFormat, PythonFormatter,
    TomlFormatter,
};

/// Registry of formatters, keyed by lowercase language name.
///
/// Built once at startup and read-only afterwards, so it can be shared
/// between threads processing different documents.
pub struct FormatterRegistry {
    formatters: IndexMap<String, Arc<dyn Formatter>>,
    fallback: Arc<dyn Formatter>,
}

impl std::fmt::Debug for FormatterRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let entries: Vec<(&str, &str)> = self
            .formatters
            .iter()
            .map(|(name, formatter)| (name.as_str(), formatter.name()))
            .collect();
        f.debug_struct("FormatterRegistry")
            .field("formatters", &entries)
            .finish()
    }
}

impl Default for FormatterRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

impl FormatterRegistry {
    /// Creates a registry with no entries; everything resolves to no-op.
    #[must_use]
    pub fn new() -> Self {
        Self {
            formatters: IndexMap::new(),
            fallback: Arc::new(NoFormat),
        }
    }

    /// Creates a registry holding the built-in formatters.
    #[must_use]
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        registry.register("bash", NoFormat);
        registry.register("python", PythonFormatter);
        registry.register("python3", PythonFormatter);
        registry.register("toml", TomlFormatter);
        registry.register("ini", IniFormatter);
        registry.register("json", JsonFormatter);
        registry
    }

    /// Registers a formatter, replacing any previous entry of that name.
    pub fn register<F: Formatter + 'static>(&mut self, name: impl Into<String>, formatter: F) {
        self.register_arc(name, Arc::new(formatter));
    }

    /// Registers a shared formatter, replacing any previous entry of that name.
    ///
    /// Names are stored lower-cased.
    pub fn register_arc(&mut self, name: impl Into<String>, formatter: Arc<dyn Formatter>) {
        let name = name.into().to_lowercase();
        if self.formatters.contains_key(&name) {
            tracing::debug!("Overriding formatter '{}' with '{}'", name, formatter.name());
        }
        self.formatters.insert(name, formatter);
    }

    /// Registers a closure as a formatter.
    pub fn register_fn<F>(&mut self, name: impl Into<String>, func: F)
    where
        F: Fn(&str, &LanguageOptions) -> FormatResult + Send + Sync + 'static,
    {
        let name = name.into();
        self.register(name.clone(), FnFormatter::new(name, func));
    }

    /// Registers discovered formatters in order, so later entries win.
    ///
    /// Entries that failed to load are skipped and returned for reporting.
    pub fn apply_discovered(&mut self, discovered: Vec<Discovered>) -> Vec<(String, SnippetFmtError)> {
        let mut skipped = Vec::new();
        for (name, outcome) in discovered {
            match outcome {
                Ok(formatter) => self.register_arc(name, formatter),
                Err(e) => {
                    tracing::warn!("Skipping formatter '{}': {}", name, e);
                    skipped.push((name, e));
                }
            }
        }
        skipped
    }

    /// Returns the formatter registered under exactly `name`.
    pub fn get(&self, name: &str) -> Option<&Arc<dyn Formatter>> {
        self.formatters.get(name)
    }

    /// Resolves a language tag, lower-casing it first.
    ///
    /// Unknown names resolve to the no-op formatter.
    pub fn resolve(&self, language: &str) -> Arc<dyn Formatter> {
        self.formatters
            .get(&language.to_lowercase())
            .cloned()
            .unwrap_or_else(|| self.noformat())
    }

    /// Returns the no-op formatter.
    pub fn noformat(&self) -> Arc<dyn Formatter> {
        Arc::clone(&self.fallback)
    }

    /// Returns the registered names in registration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.formatters.keys().map(String::as_str)
    }

    /// Returns the number of registered formatters.
    pub fn len(&self) -> usize {
        self.formatters.len()
    }

    /// Returns true if no formatters are registered.
    pub fn is_empty(&self) -> bool {
        self.formatters.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::FormatError;

    #[test]
    fn test_builtin_names() {
        let registry = FormatterRegistry::builtin();
        assert_eq!(
            registry.names().collect::<Vec<_>>(),
            vec!["bash", "python", "python3", "toml", "ini", "json"]
        );
        assert_eq!(registry.get("json").unwrap().name(), "json");
    }

    #[test]
    fn test_resolve_lowercases() {
        let registry = FormatterRegistry::builtin();
        assert_eq!(registry.resolve("JSON").name(), "json");
        assert_eq!(registry.resolve("Toml").name(), "toml");
    }

    #[test]
    fn test_resolve_unknown_is_noformat() {
        let registry = FormatterRegistry::builtin();
        assert_eq!(registry.resolve("rust").name(), "noformat");
        assert_eq!(FormatterRegistry::new().resolve("json").name(), "noformat");
    }

    #[test]
    fn test_last_registration_wins() {
        let mut registry = FormatterRegistry::builtin();
        registry.register_fn("json", |_: &str, _: &LanguageOptions| Ok("{}".to_string()));

        let formatter = registry.resolve("json");
        assert_eq!(formatter.name(), "json");
        assert_eq!(
            formatter.format("[1, 2]", &LanguageOptions::new()).unwrap(),
            "{}"
        );
        assert_eq!(registry.len(), 6);
    }

    #[test]
    fn test_apply_discovered_skips_failures() {
        let mut registry = FormatterRegistry::new();
        let ok: Arc<dyn Formatter> = Arc::new(FnFormatter::new(
            "shout",
            |code: &str, _: &LanguageOptions| -> FormatResult { Ok(code.to_uppercase()) },
        ));
        let discovered = vec![
            ("shout".to_string(), Ok(ok)),
            (
                "broken".to_string(),
                Err(SnippetFmtError::InvalidFormatter {
                    name: "broken".to_string(),
                    reason: "command is empty".to_string(),
                }),
            ),
        ];

        let skipped = registry.apply_discovered(discovered);

        assert_eq!(skipped.len(), 1);
        assert_eq!(skipped[0].0, "broken");
        assert!(registry.get("broken").is_none());
        assert_eq!(
            registry.resolve("shout").format("hi", &LanguageOptions::new()),
            Ok::<_, FormatError>("HI".to_string())
        );
    }
}
