//! File output and diff rendering.

mod diff;
mod write;

pub use diff::{colour_diff, unified_diff, DEFAULT_CONTEXT};
pub use write::atomic_write;
