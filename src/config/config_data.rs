//! Configuration data structures.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::language::LanguageOptions;

/// Main configuration structure for snippet-fmt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Directive names whose bodies are formatted, e.g. `code-block` for
    /// `.. code-block::`. Matched case-sensitively.
    #[serde(default = "default_directives")]
    pub directives: Vec<String>,

    /// Languages to check or reformat, keyed by the tag exactly as written
    /// after the directive. `JSON` and `json` may carry different options.
    #[serde(default = "default_languages")]
    pub languages: IndexMap<String, LanguageOptions>,

    /// External command formatters, registered by name on top of the
    /// built-in ones.
    #[serde(default)]
    pub formatters: IndexMap<String, toml::Value>,
}

fn default_directives() -> Vec<String> {
    vec![
        "code".to_string(),
        "code-block".to_string(),
        "sourcecode".to_string(),
    ]
}

fn default_languages() -> IndexMap<String, LanguageOptions> {
    ["python", "python3", "toml", "TOML", "ini", "INI", "json", "JSON"]
        .into_iter()
        .map(|tag| (tag.to_string(), LanguageOptions::default()))
        .collect()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            directives: default_directives(),
            languages: default_languages(),
            formatters: IndexMap::new(),
        }
    }
}

impl Config {
    /// Creates a new default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the directive names.
    #[must_use]
    pub fn with_directives<I, S>(mut self, directives: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.directives = directives.into_iter().map(Into::into).collect();
        self
    }

    /// Replaces the configured languages.
    #[must_use]
    pub fn with_languages<I, S>(mut self, languages: I) -> Self
    where
        I: IntoIterator<Item = (S, LanguageOptions)>,
        S: Into<String>,
    {
        self.languages = languages
            .into_iter()
            .map(|(tag, opts)| (tag.into(), opts))
            .collect();
        self
    }

    /// Looks up the options for a tag, using the exact configured spelling.
    pub fn language(&self, tag: &str) -> Option<(&str, &LanguageOptions)> {
        self.languages
            .get_key_value(tag)
            .map(|(key, opts)| (key.as_str(), opts))
    }
}
