//! `template` subcommand: summarize a page template

use super::read_document;
use anyhow::{Context, Result};
use portal_webparts::{PageTemplateInstance, VariantMode, WebPartInstance, WebPartZoneInstance};
use serde::Serialize;
use std::io::Write;
use std::path::Path;
use uuid::Uuid;

/// Template report
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TemplateSummary {
    /// Zones in document order
    pub zones: Vec<ZoneSummary>,
}

/// One zone of a template report
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ZoneSummary {
    /// Zone ID
    pub id: String,
    /// Live web parts in order
    pub web_parts: Vec<WebPartSummary>,
}

/// One web part of a template report
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WebPartSummary {
    /// Control ID
    pub control_id: String,
    /// Web-part type code name
    pub web_part_type: String,
    /// Instance GUID as stored
    pub guid: Option<Uuid>,
    /// Declared variant mode
    pub variant_mode: VariantMode,
    /// Number of stored properties
    pub properties: usize,
}

impl TemplateSummary {
    /// Summarize a parsed template
    #[must_use]
    pub fn of(template: &PageTemplateInstance) -> Self {
        Self {
            zones: template.zones().map(ZoneSummary::of).collect(),
        }
    }

    /// Total number of web parts
    #[must_use]
    pub fn web_part_count(&self) -> usize {
        self.zones.iter().map(|zone| zone.web_parts.len()).sum()
    }
}

impl ZoneSummary {
    fn of(zone: &WebPartZoneInstance) -> Self {
        Self {
            id: zone.zone_id().to_string(),
            web_parts: zone.web_parts().map(WebPartSummary::of).collect(),
        }
    }
}

impl WebPartSummary {
    fn of(instance: &WebPartInstance) -> Self {
        Self {
            control_id: instance.control_id().to_string(),
            web_part_type: instance.web_part_type().to_string(),
            guid: instance.instance_guid(),
            variant_mode: instance.variant_mode(),
            properties: instance.properties().len(),
        }
    }
}

/// Parse the template at `path` and report its layout
///
/// # Errors
/// Returns error if the file cannot be read or parsed, or output fails
pub fn run(path: &Path, json: bool, out: &mut dyn Write) -> Result<TemplateSummary> {
    let xml = read_document(path)?;
    let template = PageTemplateInstance::from_xml(&xml)
        .with_context(|| format!("invalid page template {}", path.display()))?;
    let summary = TemplateSummary::of(&template);
    tracing::debug!(
        path = %path.display(),
        zones = summary.zones.len(),
        web_parts = summary.web_part_count(),
        "inspected template"
    );

    if json {
        serde_json::to_writer_pretty(&mut *out, &summary)?;
        writeln!(out)?;
    } else {
        write_text(&summary, out)?;
    }
    Ok(summary)
}

fn write_text(summary: &TemplateSummary, out: &mut dyn Write) -> Result<()> {
    writeln!(
        out,
        "{} zone(s), {} web part(s)",
        summary.zones.len(),
        summary.web_part_count()
    )?;
    for zone in &summary.zones {
        writeln!(out, "zone {}", zone.id)?;
        for web_part in &zone.web_parts {
            write!(out, "  {} ({})", web_part.control_id, web_part.web_part_type)?;
            if web_part.variant_mode != VariantMode::None {
                write!(out, " variants={}", web_part.variant_mode)?;
            }
            match web_part.guid {
                Some(guid) => writeln!(out, " guid={guid}")?,
                None => writeln!(out, " guid=<unassigned>")?,
            }
        }
    }
    Ok(())
}
