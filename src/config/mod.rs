//! Configuration loading and management.

mod config_data;
mod language;

use std::fs;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;

pub use config_data::Config;
pub use language::LanguageOptions;

use crate::errors::{Result, SnippetFmtError};

/// Standard configuration file names to search for, in order.
const CONFIG_FILES: &[&str] = &["pyproject.toml", "formate.toml"];

/// Table names that may hold the configuration, checked at the top level
/// and then under `[tool]`.
const SECTION_NAMES: &[&str] = &["snippet-fmt", "snippet_fmt"];

/// Finds the configuration file in the given directory or its parents.
///
/// A candidate only counts when it has a `snippet-fmt` section, so a
/// `formate.toml` holding another tool's settings is passed over. Files
/// that cannot be parsed are returned so the error is reported.
pub fn find_config_file(start_dir: &Path) -> Option<PathBuf> {
    let mut current = start_dir.to_path_buf();

    loop {
        for name in CONFIG_FILES {
            let candidate = current.join(name);
            if candidate.is_file() && has_section(&candidate) {
                return Some(candidate);
            }
        }

        if !current.pop() {
            break;
        }
    }

    None
}

fn has_section(path: &Path) -> bool {
    let Ok(content) = fs::read_to_string(path) else {
        return true;
    };
    match content.parse::<toml::Table>() {
        Ok(root) => !matches!(find_section(&root), Ok(None)),
        Err(_) => true,
    }
}

/// Parses configuration from TOML text.
///
/// The settings are taken from `[snippet-fmt]`, `[snippet_fmt]`,
/// `[tool.snippet-fmt]` or `[tool.snippet_fmt]`, whichever comes first,
/// falling back to the top-level table. Invalid entries are logged and
/// skipped; see [`parse_toml_entries`].
pub fn parse_toml(content: &str) -> Result<Config> {
    let (config, skipped) = parse_toml_entries(content)?;
    for error in &skipped {
        tracing::error!("Skipping configuration entry: {}", error);
    }
    Ok(config)
}

/// Parses configuration, returning the entries that were skipped.
///
/// Only malformed TOML or a section that is not a table fails outright.
/// A bad `directives` value, a bad language entry or a non-table
/// `formatters` value is dropped and the rest of the file still applies.
pub fn parse_toml_entries(content: &str) -> Result<(Config, Vec<SnippetFmtError>)> {
    let root: toml::Table = content.parse()?;
    let section = find_section(&root)?.cloned();
    Ok(config_from_table(section.unwrap_or(root)))
}

fn find_section(root: &toml::Table) -> Result<Option<&toml::Table>> {
    let tool = match root.get("tool") {
        Some(toml::Value::Table(tool)) => Some(tool),
        _ => None,
    };
    let candidates = SECTION_NAMES
        .iter()
        .map(|name| (*name, root.get(*name)))
        .chain(SECTION_NAMES.iter().map(|name| (*name, tool.and_then(|t| t.get(*name)))));

    for (name, value) in candidates {
        match value {
            Some(toml::Value::Table(section)) => return Ok(Some(section)),
            Some(other) => {
                return Err(SnippetFmtError::Config(format!(
                    "'{}' must be a table, found {}",
                    name,
                    other.type_str()
                )))
            }
            None => {}
        }
    }

    Ok(None)
}

fn config_from_table(mut section: toml::Table) -> (Config, Vec<SnippetFmtError>) {
    let mut config = Config::default();
    let mut skipped = Vec::new();

    if let Some(value) = section.remove("directives") {
        match value.try_into::<Vec<String>>() {
            Ok(directives) => config.directives = directives,
            Err(e) => skipped.push(invalid_entry("directives", e)),
        }
    }

    match section.remove("languages") {
        Some(toml::Value::Table(languages)) => {
            config.languages = IndexMap::new();
            for (tag, value) in languages {
                match value.try_into::<LanguageOptions>() {
                    Ok(options) => {
                        config.languages.insert(tag, options);
                    }
                    Err(e) => skipped.push(invalid_entry(&format!("languages.{}", tag), e)),
                }
            }
        }
        Some(other) => skipped.push(invalid_entry(
            "languages",
            format!("expected a table, found {}", other.type_str()),
        )),
        None => {}
    }

    match section.remove("formatters") {
        Some(toml::Value::Table(formatters)) => config.formatters = formatters.into_iter().collect(),
        Some(other) => skipped.push(invalid_entry(
            "formatters",
            format!("expected a table, found {}", other.type_str()),
        )),
        None => {}
    }

    (config, skipped)
}

fn invalid_entry(key: &str, reason: impl std::fmt::Display) -> SnippetFmtError {
    SnippetFmtError::Config(format!("invalid entry '{}': {}", key, reason))
}

/// Reads configuration from a TOML file.
pub fn read_config_file(path: &Path) -> Result<Config> {
    let content = fs::read_to_string(path)?;
    let config = parse_toml(&content)?;
    tracing::debug!("Loaded configuration from {}", path.display());
    Ok(config)
}

/// Reads configuration, searching from the given directory.
///
/// If no config file is found, returns the default configuration.
pub fn read_config(start_dir: &Path) -> Result<Config> {
    match find_config_file(start_dir) {
        Some(path) => read_config_file(&path),
        None => Ok(Config::default()),
    }
}

/// Reads configuration from a specific file, or returns default if file doesn't exist.
pub fn read_config_or_default(path: &Path) -> Result<Config> {
    if path.exists() {
        read_config_file(path)
    } else {
        Ok(Config::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    const STANDALONE: &str = r#"
[languages.toml]
reformat = true

[languages.JSON]
reformat = true

[languages.json]
reformat = true
indent = 2

[languages.python3]
reformat = true
config-file = "pyproject.toml"
"#;

    const TABLE: &str = r#"
[snippet-fmt]
directives = ["code-block"]

[snippet-fmt.languages.ini]
reformat = true
"#;

    const PYPROJECT: &str = r#"
[project]
name = "demo"

[tool.snippet_fmt]
directives = ["code", "code-cell"]

[tool.snippet_fmt.languages.JSON]
reformat = true
"#;

    #[test]
    fn test_parse_standalone() {
        let config = parse_toml(STANDALONE).unwrap();
        assert_eq!(
            config.languages.keys().collect::<Vec<_>>(),
            vec!["toml", "JSON", "json", "python3"]
        );
        assert_eq!(
            config.languages["json"].get("indent"),
            Some(&toml::Value::Integer(2))
        );
        assert_eq!(
            config.languages["python3"].get_str("config-file").unwrap(),
            Some("pyproject.toml")
        );
        assert_eq!(config.directives, vec!["code", "code-block", "sourcecode"]);
    }

    #[test]
    fn test_parse_named_table() {
        let config = parse_toml(TABLE).unwrap();
        assert_eq!(config.directives, vec!["code-block"]);
        assert_eq!(config.languages.len(), 1);
        assert!(config.languages["ini"].reformat);
    }

    #[test]
    fn test_parse_tool_table() {
        let config = parse_toml(PYPROJECT).unwrap();
        assert_eq!(config.directives, vec!["code", "code-cell"]);
        assert_eq!(config.languages.keys().collect::<Vec<_>>(), vec!["JSON"]);
    }

    #[test]
    fn test_missing_languages_uses_defaults() {
        let config = parse_toml("directives = [\"sourcecode\"]").unwrap();
        assert_eq!(config.directives, vec!["sourcecode"]);
        assert_eq!(config.languages.len(), 8);
        assert!(config.languages.contains_key("TOML"));
    }

    #[test]
    fn test_parse_invalid() {
        assert!(parse_toml("directives = [").is_err());
        assert!(matches!(
            parse_toml("snippet-fmt = 1"),
            Err(SnippetFmtError::Config(_))
        ));
    }

    #[test]
    fn test_bad_entries_skipped() {
        let (config, skipped) = parse_toml_entries(
            r#"
directives = 3
formatters = "nope"

[languages.json]
reformat = true

[languages.toml]
reformat = "yes"
"#,
        )
        .unwrap();

        assert_eq!(config.directives, vec!["code", "code-block", "sourcecode"]);
        assert_eq!(config.languages.keys().collect::<Vec<_>>(), vec!["json"]);
        assert!(config.languages["json"].reformat);
        assert!(config.formatters.is_empty());

        let messages: Vec<String> = skipped.iter().map(ToString::to_string).collect();
        assert_eq!(messages.len(), 3);
        assert!(messages[0].contains("'directives'"));
        assert!(messages[1].contains("'languages.toml'"));
        assert!(messages[2].contains("'formatters'"));
    }

    #[test]
    fn test_find_config_file() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("formate.toml");
        fs::write(&config_path, TABLE).unwrap();

        let found = find_config_file(dir.path()).unwrap();
        assert_eq!(found, config_path);
    }

    #[test]
    fn test_find_config_file_parent() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("pyproject.toml");
        fs::write(&config_path, PYPROJECT).unwrap();

        let subdir = dir.path().join("docs");
        fs::create_dir(&subdir).unwrap();

        let found = find_config_file(&subdir).unwrap();
        assert_eq!(found, config_path);

        let config = read_config(&subdir).unwrap();
        assert_eq!(config.directives, vec!["code", "code-cell"]);
    }

    #[test]
    fn test_pyproject_searched_first() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("formate.toml"), TABLE).unwrap();
        let pyproject = dir.path().join("pyproject.toml");
        fs::write(&pyproject, PYPROJECT).unwrap();

        assert_eq!(find_config_file(dir.path()).unwrap(), pyproject);
    }

    #[test]
    fn test_formate_used_when_pyproject_has_no_section() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("pyproject.toml"), "[project]\nname = \"demo\"\n").unwrap();
        let formate = dir.path().join("formate.toml");
        fs::write(&formate, TABLE).unwrap();

        assert_eq!(find_config_file(dir.path()).unwrap(), formate);
        assert_eq!(read_config(dir.path()).unwrap().directives, vec!["code-block"]);
    }

    #[test]
    fn test_file_without_section_passed_over() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join("formate.toml"),
            "[hooks]\nreformat-generics = 40\n\n[config]\nindent = \"\\t\"\n",
        )
        .unwrap();
        fs::write(
            dir.path().join("pyproject.toml"),
            "[tool.snippet-fmt]\ndirectives = [\"code-block\"]\n\n[tool.snippet-fmt.languages.json]\nreformat = true\n",
        )
        .unwrap();

        let config = read_config(dir.path()).unwrap();
        assert_eq!(config.directives, vec!["code-block"]);
        assert_eq!(config.languages.keys().collect::<Vec<_>>(), vec!["json"]);

        fs::write(dir.path().join("pyproject.toml"), "[project]\nname = \"demo\"\n").unwrap();
        assert_eq!(find_config_file(dir.path()), None);
        assert_eq!(read_config(dir.path()).unwrap(), Config::default());
    }

    #[test]
    fn test_read_config_or_default_missing() {
        let dir = tempdir().unwrap();
        let config = read_config_or_default(&dir.path().join("formate.toml")).unwrap();
        assert_eq!(config, Config::default());
    }
}
