//! `normalize` subcommand: re-serialize a document
//!
//! Templates get GUIDs assigned and macro values escaped per configuration;
//! content entries are written sorted with CDATA terminators escaped.

use super::read_document;
use crate::config::PortalConfig;
use anyhow::{bail, Context, Result};
use portal_content::EditableItems;
use portal_webparts::{PageTemplateInstance, PAGE_ELEMENT};
use portal_xml::parse_document;
use std::io::Write;
use std::path::Path;
use std::str::FromStr;

const CONTENT_ELEMENT: &str = "content";

/// Kind of document being normalized
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    /// `<page>` template
    Template,
    /// `<content>` editable items
    Content,
}

impl DocumentKind {
    /// Detect the kind from the root element
    ///
    /// # Errors
    /// Returns error if the XML is malformed or the root is unknown
    pub fn detect(xml: &str) -> Result<Self> {
        let root = parse_document(xml)?;
        if root.is(PAGE_ELEMENT) {
            Ok(Self::Template)
        } else if root.is(CONTENT_ELEMENT) {
            Ok(Self::Content)
        } else {
            bail!("cannot infer document kind from root <{}>", root.name())
        }
    }
}

impl FromStr for DocumentKind {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "template" => Ok(Self::Template),
            "content" => Ok(Self::Content),
            other => bail!("unknown document kind '{other}'"),
        }
    }
}

/// Normalize the document at `path`
///
/// Writes to `output` if given, otherwise to `out`.
///
/// # Errors
/// Returns error if the document cannot be read, parsed or written
pub fn run(
    path: &Path,
    kind: Option<DocumentKind>,
    output: Option<&Path>,
    config: &PortalConfig,
    out: &mut dyn Write,
) -> Result<DocumentKind> {
    let xml = read_document(path)?;
    let kind = match kind {
        Some(kind) => kind,
        None => DocumentKind::detect(&xml)
            .with_context(|| format!("in {}", path.display()))?,
    };

    let normalized = normalize(&xml, kind, config)
        .with_context(|| format!("failed to normalize {}", path.display()))?;

    match output {
        Some(target) => {
            std::fs::write(target, &normalized)
                .with_context(|| format!("failed to write {}", target.display()))?;
            tracing::info!(from = %path.display(), to = %target.display(), "normalized document");
        }
        None => writeln!(out, "{normalized}")?,
    }
    Ok(kind)
}

/// Normalize XML text of a known kind
///
/// # Errors
/// Returns error if the document is invalid for `kind`
pub fn normalize(xml: &str, kind: DocumentKind, config: &PortalConfig) -> Result<String> {
    let normalized = match kind {
        DocumentKind::Template => {
            let mut template = PageTemplateInstance::from_xml(xml)?;
            template.to_xml_with(&config.macro_escape, &config.write)?
        }
        DocumentKind::Content => EditableItems::from_content_xml(xml)?.content_xml_with(&config.write)?,
    };
    Ok(normalized)
}
