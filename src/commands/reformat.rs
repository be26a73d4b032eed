//! Reformat command implementation.

use std::io::IsTerminal;
use std::path::{Path, PathBuf};

use crate::errors::Result;
use crate::interface::{CodeBlockError, Context, Reformatter};
use crate::io::colour_diff;

/// Options for the reformat command.
#[derive(Debug, Clone)]
pub struct ReformatOptions {
    /// Files to reformat.
    pub files: Vec<PathBuf>,
    /// Glob patterns of files to skip.
    pub exclude: Vec<String>,
    /// Force coloured diffs on or off; `None` colours only on a terminal.
    pub colour: Option<bool>,
    /// Print a diff for every changed file.
    pub show_diff: bool,
    /// Report changes without writing files.
    pub check: bool,
}

impl Default for ReformatOptions {
    fn default() -> Self {
        Self {
            files: Vec::new(),
            exclude: Vec::new(),
            colour: None,
            show_diff: true,
            check: false,
        }
    }
}

/// What happened to one file.
#[derive(Debug, Clone)]
pub struct FileReport {
    /// The file, as given.
    pub path: PathBuf,
    /// Whether reformatting changed the content.
    pub changed: bool,
    /// Whether the file was rewritten.
    pub written: bool,
    /// Block errors in document order.
    pub errors: Vec<CodeBlockError>,
}

/// Totals over all processed files.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Files processed.
    pub files: usize,
    /// Files whose content changed.
    pub changed: usize,
    /// Block errors across all files.
    pub errors: usize,
    /// Files skipped by an exclude pattern.
    pub excluded: usize,
}

impl RunSummary {
    /// Whether the run should exit with a failure status.
    pub fn is_failure(&self) -> bool {
        self.changed > 0 || self.errors > 0
    }
}

/// Reformats one file, printing its errors and diff.
///
/// Error lines go to stderr and the diff to stdout. The file is written
/// only when its content changed and `options.check` is off.
pub fn reformat_file(path: &Path, ctx: &Context, options: &ReformatOptions) -> Result<FileReport> {
    let mut reformatter = Reformatter::from_file(path, ctx)?;
    let changed = reformatter.run();

    for line in reformatter.error_lines() {
        eprintln!("{}", line);
    }

    let mut written = false;
    if changed {
        if options.show_diff {
            let diff = reformatter.get_diff()?;
            if use_colour(options.colour) {
                println!("{}", colour_diff(&diff));
            } else {
                println!("{}", diff);
            }
        }
        if !options.check {
            written = reformatter.to_file()?;
        }
    }

    Ok(FileReport {
        path: path.to_path_buf(),
        changed,
        written,
        errors: reformatter.errors().to_vec(),
    })
}

/// Executes the reformat command over every file in `options`.
pub fn reformat(ctx: &Context, options: ReformatOptions) -> Result<RunSummary> {
    let patterns = options
        .exclude
        .iter()
        .map(|p| glob::Pattern::new(p.as_str()))
        .collect::<std::result::Result<Vec<_>, _>>()?;

    let mut summary = RunSummary::default();
    for path in &options.files {
        if patterns.iter().any(|p| p.matches_path(path)) {
            tracing::debug!("Excluding {}", path.display());
            summary.excluded += 1;
            continue;
        }

        let report = reformat_file(path, ctx, &options)?;
        summary.files += 1;
        summary.errors += report.errors.len();
        if report.changed {
            summary.changed += 1;
        }
    }

    tracing::debug!(
        "Processed {} files: {} changed, {} errors",
        summary.files,
        summary.changed,
        summary.errors
    );
    Ok(summary)
}

fn use_colour(choice: Option<bool>) -> bool {
    match choice {
        Some(forced) => {
            colored::control::set_override(forced);
            forced
        }
        None => std::io::stdout().is_terminal() && std::env::var_os("NO_COLOR").is_none(),
    }
}
