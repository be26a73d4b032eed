//! snippet-fmt CLI - reformat code blocks in reStructuredText files

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use snippet_fmt::commands::{self, ReformatOptions};
use snippet_fmt::config::{self, Config};
use snippet_fmt::interface::Context;

const DEFAULT_CONFIG_FILE: &str = "pyproject.toml";

#[derive(Parser)]
#[command(name = "snippet-fmt")]
#[command(author, version, about = "Format and validate code snippets in reStructuredText files", long_about = None)]
struct Cli {
    /// The files to reformat
    #[arg(value_name = "FILE")]
    files: Vec<PathBuf>,

    /// The path or filename of the TOML configuration file to use
    #[arg(short, long, value_name = "FILENAME", default_value = DEFAULT_CONFIG_FILE)]
    config_file: PathBuf,

    /// Patterns for files to exclude from formatting
    #[arg(short, long, value_name = "PATTERN")]
    exclude: Vec<String>,

    /// Force coloured output on
    #[arg(long, overrides_with = "no_colour")]
    colour: bool,

    /// Force coloured output off
    #[arg(long, overrides_with = "colour")]
    no_colour: bool,

    /// Show a diff of the changes
    #[arg(long, overrides_with = "no_diff")]
    diff: bool,

    /// Do not show a diff of the changes
    #[arg(long, overrides_with = "diff")]
    no_diff: bool,

    /// Report changes without writing files
    #[arg(long)]
    check: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn colour(&self) -> Option<bool> {
        match (self.colour, self.no_colour) {
            (true, _) => Some(true),
            (_, true) => Some(false),
            _ => None,
        }
    }
}

fn load_config(path: &Path, base_dir: &Path) -> Config {
    // The default name searches upwards through pyproject.toml and
    // formate.toml; an explicit file is read as-is.
    let result = if path == Path::new(DEFAULT_CONFIG_FILE) {
        config::read_config(base_dir)
    } else {
        config::read_config_or_default(&base_dir.join(path))
    };

    match result {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Failed to read configuration: {}. Using defaults.", e);
            Config::default()
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Set up logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let base_dir = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    let config = load_config(&cli.config_file, &base_dir);
    let ctx = Context::new(config, base_dir);

    let options = ReformatOptions {
        colour: cli.colour(),
        show_diff: cli.diff || !cli.no_diff,
        check: cli.check,
        exclude: cli.exclude,
        files: cli.files,
    };

    match commands::reformat(&ctx, options) {
        Ok(summary) if summary.is_failure() => ExitCode::FAILURE,
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
