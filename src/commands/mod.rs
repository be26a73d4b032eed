//! Command implementations.

mod reformat;

pub use reformat::{reformat, reformat_file, FileReport, ReformatOptions, RunSummary};
