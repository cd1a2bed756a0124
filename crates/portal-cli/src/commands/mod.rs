//! Subcommand implementations
//!
//! Each command reads its input file, writes a report to the given writer and
//! returns a summary value so callers and tests can inspect the result.

pub mod content;
pub mod normalize;
pub mod template;

use anyhow::{Context, Result};
use std::path::Path;

fn read_document(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}
