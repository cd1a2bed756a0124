//! `content` subcommand: summarize editable content

use super::read_document;
use anyhow::{Context, Result};
use portal_content::EditableItems;
use serde::Serialize;
use std::io::Write;
use std::path::Path;

/// Content report
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContentSummary {
    /// Editable regions by key
    pub regions: Vec<EntrySummary>,
    /// Editable web parts by key
    pub web_parts: Vec<EntrySummary>,
}

/// One stored value
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntrySummary {
    /// Stored key, composite keys included
    pub id: String,
    /// Content length in characters
    pub length: usize,
}

impl ContentSummary {
    /// Summarize loaded content
    #[must_use]
    pub fn of(items: &EditableItems) -> Self {
        Self {
            regions: items.regions().map(EntrySummary::of).collect(),
            web_parts: items.web_parts().map(EntrySummary::of).collect(),
        }
    }
}

impl EntrySummary {
    fn of((id, value): (&str, &str)) -> Self {
        Self {
            id: id.to_string(),
            length: value.chars().count(),
        }
    }
}

/// Parse the content document at `path` and report its entries
///
/// # Errors
/// Returns error if the file cannot be read or parsed, or output fails
pub fn run(path: &Path, json: bool, out: &mut dyn Write) -> Result<ContentSummary> {
    let xml = read_document(path)?;
    let items = EditableItems::from_content_xml(&xml)
        .with_context(|| format!("invalid content document {}", path.display()))?;
    let summary = ContentSummary::of(&items);
    tracing::debug!(
        path = %path.display(),
        regions = summary.regions.len(),
        web_parts = summary.web_parts.len(),
        "inspected content"
    );

    if json {
        serde_json::to_writer_pretty(&mut *out, &summary)?;
        writeln!(out)?;
        return Ok(summary);
    }

    for (label, entries) in [("region", &summary.regions), ("webpart", &summary.web_parts)] {
        for entry in entries {
            writeln!(out, "{label} {} ({} chars)", entry.id, entry.length)?;
        }
    }
    Ok(summary)
}
