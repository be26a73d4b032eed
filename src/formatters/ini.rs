//! INI checker and formatter.
//!
//! Follows the usual config-parser dialect: `[section]` headers,
//! `key = value` or `key: value` options with lower-cased keys, `#` and `;`
//! comment lines, and values continued on lines indented deeper than their
//! key. Duplicate sections or options are errors.

use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::config::LanguageOptions;
use crate::errors::FormatError;

use super::{FormatResult, Formatter};

static SECTION: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\[(?P<header>.+)\]").unwrap());

static OPTION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?P<option>.*?)\s*(?P<vi>[=:])\s*(?P<value>.*)$").unwrap());

const DEFAULT_SECTION: &str = "DEFAULT";

const COMMENT_PREFIXES: &[&str] = &["#", ";"];

/// A parsed INI document. Multi-line values are stored joined by `\n`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IniDocument {
    /// Options of the `[DEFAULT]` section.
    pub defaults: IndexMap<String, String>,
    /// All other sections, in source order.
    pub sections: IndexMap<String, IndexMap<String, String>>,
}

impl IniDocument {
    /// Parses INI text.
    pub fn parse(source: &str) -> std::result::Result<Self, FormatError> {
        let mut doc = Self::default();
        // Options are collected as lists of lines and joined at the end.
        let mut defaults: IndexMap<String, Vec<String>> = IndexMap::new();
        let mut sections: IndexMap<String, IndexMap<String, Vec<String>>> = IndexMap::new();
        let mut current: Option<String> = None;
        let mut option: Option<String> = None;
        let mut indent_level = 0usize;
        let mut bad_lines = Vec::new();

        for (index, line) in source.lines().enumerate() {
            let lineno = index + 1;
            let value = line.trim();

            if COMMENT_PREFIXES.iter().any(|p| value.starts_with(p)) {
                continue;
            }

            if value.is_empty() {
                // Blank lines inside a value are kept until the value ends.
                if let (Some(section), Some(name)) = (&current, &option) {
                    let target = section_mut(&mut defaults, &mut sections, section);
                    if let Some(lines) = target.get_mut(name) {
                        lines.push(String::new());
                    }
                }
                continue;
            }

            let cur_indent = line.len() - line.trim_start().len();

            if let (Some(section), Some(name)) = (&current, &option) {
                if cur_indent > indent_level {
                    let target = section_mut(&mut defaults, &mut sections, section);
                    if let Some(lines) = target.get_mut(name) {
                        lines.push(value.to_string());
                    }
                    continue;
                }
            }

            indent_level = cur_indent;

            if let Some(caps) = SECTION.captures(value) {
                let header = caps["header"].to_string();
                if header != DEFAULT_SECTION {
                    if sections.contains_key(&header) {
                        return Err(FormatError::syntax(format!(
                            "while reading from '<string>' [line {:2}]: section '{}' already exists",
                            lineno, header
                        )));
                    }
                    sections.insert(header.clone(), IndexMap::new());
                }
                current = Some(header);
                option = None;
                continue;
            }

            let Some(section) = &current else {
                return Err(FormatError::syntax(format!(
                    "File contains no section headers. line: {}: '{}'",
                    lineno, line
                )));
            };

            match OPTION.captures(value) {
                Some(caps) if !caps["option"].is_empty() => {
                    let name = caps["option"].trim_end().to_lowercase();
                    let target = section_mut(&mut defaults, &mut sections, section);
                    if target.contains_key(&name) {
                        return Err(FormatError::syntax(format!(
                            "while reading from '<string>' [line {:2}]: option '{}' in section '{}' already exists",
                            lineno, name, section
                        )));
                    }
                    target.insert(name.clone(), vec![caps["value"].trim().to_string()]);
                    option = Some(name);
                }
                _ => bad_lines.push(format!("[line {:2}]: '{}'", lineno, line)),
            }
        }

        if !bad_lines.is_empty() {
            return Err(FormatError::syntax(format!(
                "Source contains parsing errors: '<string>' {}",
                bad_lines.join(" ")
            )));
        }

        doc.defaults = join_values(defaults);
        doc.sections = sections
            .into_iter()
            .map(|(name, options)| (name, join_values(options)))
            .collect();
        Ok(doc)
    }

    /// Writes the document back out.
    ///
    /// Every section is followed by an empty line and continuation lines
    /// are indented with a tab.
    pub fn write(&self) -> String {
        let mut out = String::new();
        if !self.defaults.is_empty() {
            write_section(&mut out, DEFAULT_SECTION, &self.defaults);
        }
        for (name, options) in &self.sections {
            write_section(&mut out, name, options);
        }
        out
    }
}

fn section_mut<'m>(
    defaults: &'m mut IndexMap<String, Vec<String>>,
    sections: &'m mut IndexMap<String, IndexMap<String, Vec<String>>>,
    name: &str,
) -> &'m mut IndexMap<String, Vec<String>> {
    if name == DEFAULT_SECTION {
        defaults
    } else {
        sections.entry(name.to_string()).or_default()
    }
}

fn join_values(options: IndexMap<String, Vec<String>>) -> IndexMap<String, String> {
    options
        .into_iter()
        .map(|(name, lines)| (name, lines.join("\n").trim_end().to_string()))
        .collect()
}

fn write_section(out: &mut String, name: &str, options: &IndexMap<String, String>) {
    out.push('[');
    out.push_str(name);
    out.push_str("]\n");
    for (key, value) in options {
        out.push_str(key);
        out.push_str(" = ");
        out.push_str(&value.replace('\n', "\n\t"));
        out.push('\n');
    }
    out.push('\n');
}

/// Parses INI and, when reformatting, writes it back in canonical form.
#[derive(Debug, Clone, Copy, Default)]
pub struct IniFormatter;

impl Formatter for IniFormatter {
    fn name(&self) -> &str {
        "ini"
    }

    fn format(&self, code: &str, options: &LanguageOptions) -> FormatResult {
        let doc = IniDocument::parse(code)?;
        if options.reformat {
            Ok(doc.write())
        } else {
            Ok(code.to_string())
        }
    }
}
