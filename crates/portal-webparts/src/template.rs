//! Page template instance
//!
//! The persisted layout of a page template: a `<page>` root holding zones in
//! document order, each holding its web parts.

use crate::error::{WebPartError, WebPartResult};
use crate::instance::WebPartInstance;
use crate::macros::{IdentityTransformation, MacroTransformation};
use crate::variant::VariantLoader;
use crate::zone::{WebPartZoneInstance, ZONE_ELEMENT};
use indexmap::IndexMap;
use portal_xml::{parse_document, write_document, WriteOptions, XmlElement};
use serde::Serialize;

/// Element name of a persisted template
pub const PAGE_ELEMENT: &str = "page";

const DEFAULT_CONTROL_ID: &str = "webpart";

/// Zones of a page template keyed by lower-cased zone ID
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PageTemplateInstance {
    zones: IndexMap<String, WebPartZoneInstance>,
}

impl PageTemplateInstance {
    /// Create empty template
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a `<page>` document; blank input yields an empty template
    ///
    /// # Errors
    /// Returns error if the XML is malformed, the root is not `<page>`, or a
    /// zone or web part is invalid
    pub fn from_xml(xml: &str) -> WebPartResult<Self> {
        if xml.trim().is_empty() {
            return Ok(Self::new());
        }
        Self::from_element(&parse_document(xml)?)
    }

    /// Build from a `<page>` element
    ///
    /// A zone ID repeated in the document merges into the first occurrence;
    /// merged web parts are renamed when their control ID is already taken.
    ///
    /// # Errors
    /// Returns error if the root is not `<page>` or a zone or web part is invalid
    pub fn from_element(element: &XmlElement) -> WebPartResult<Self> {
        if !element.is(PAGE_ELEMENT) {
            return Err(WebPartError::unexpected_element(PAGE_ELEMENT, element.name()));
        }

        let mut template = Self::new();
        for node in element.elements_named(ZONE_ELEMENT) {
            let zone = WebPartZoneInstance::from_element(node)?;
            let key = zone_key(zone.zone_id());
            if template.zones.contains_key(&key) {
                tracing::warn!(zone_id = zone.zone_id(), "duplicate zone merged");
                for instance in zone.web_parts().cloned() {
                    template.add_web_part(zone.zone_id(), instance)?;
                }
            } else {
                template.zones.insert(key, zone);
            }
        }

        tracing::debug!(zones = template.zones.len(), "loaded page template");
        Ok(template)
    }

    /// Serialize to a `<page>` element
    pub fn to_element(&mut self, transformation: &dyn MacroTransformation) -> XmlElement {
        let mut element = XmlElement::new(PAGE_ELEMENT);
        for zone in self.zones.values_mut() {
            element.push_element(zone.to_element(transformation));
        }
        element
    }

    /// Serialize to a compact `<page>` document
    ///
    /// # Errors
    /// Returns error if serialization fails
    pub fn to_xml(&mut self) -> WebPartResult<String> {
        self.to_xml_with(&IdentityTransformation, &WriteOptions::default())
    }

    /// Serialize with explicit macro policy and formatting
    ///
    /// # Errors
    /// Returns error if serialization fails
    pub fn to_xml_with(
        &mut self,
        transformation: &dyn MacroTransformation,
        options: &WriteOptions,
    ) -> WebPartResult<String> {
        let element = self.to_element(transformation);
        Ok(write_document(&element, options)?)
    }

    /// Zones in document order
    pub fn zones(&self) -> impl Iterator<Item = &WebPartZoneInstance> {
        self.zones.values()
    }

    /// Zone by case-insensitive ID
    #[must_use]
    pub fn zone(&self, zone_id: &str) -> Option<&WebPartZoneInstance> {
        self.zones.get(&zone_key(zone_id))
    }

    /// Mutable zone by case-insensitive ID
    pub fn zone_mut(&mut self, zone_id: &str) -> Option<&mut WebPartZoneInstance> {
        self.zones.get_mut(&zone_key(zone_id))
    }

    /// Zone by ID, appended if missing
    pub fn ensure_zone(&mut self, zone_id: &str) -> &mut WebPartZoneInstance {
        self.zones
            .entry(zone_key(zone_id))
            .or_insert_with(|| WebPartZoneInstance::new(zone_id.trim()))
    }

    /// Remove a zone with all its web parts
    pub fn remove_zone(&mut self, zone_id: &str) -> Option<WebPartZoneInstance> {
        self.zones.shift_remove(&zone_key(zone_id))
    }

    /// All live web parts, zone by zone
    pub fn web_parts(&self) -> impl Iterator<Item = &WebPartInstance> {
        self.zones.values().flat_map(WebPartZoneInstance::web_parts)
    }

    /// Web part by control ID in any zone
    #[must_use]
    pub fn find_web_part(&self, control_id: &str) -> Option<&WebPartInstance> {
        self.zones
            .values()
            .find_map(|zone| zone.get_web_part(control_id))
    }

    /// Mutable web part by control ID in any zone
    pub fn find_web_part_mut(&mut self, control_id: &str) -> Option<&mut WebPartInstance> {
        self.zones
            .values_mut()
            .find_map(|zone| zone.get_web_part_mut(control_id))
    }

    /// Control ID derived from `base` that no web part in the template uses
    ///
    /// Returns `base` itself when free, otherwise `base` without its trailing
    /// digits plus the smallest positive number that is free.
    #[must_use]
    pub fn unique_control_id(&self, base: &str) -> String {
        let base = base.trim();
        let base = if base.is_empty() { DEFAULT_CONTROL_ID } else { base };
        if self.find_web_part(base).is_none() {
            return base.to_string();
        }

        let stem = base.trim_end_matches(|c: char| c.is_ascii_digit());
        let stem = if stem.is_empty() { DEFAULT_CONTROL_ID } else { stem };
        (1_u64..)
            .map(|n| format!("{stem}{n}"))
            .find(|candidate| self.find_web_part(candidate).is_none())
            .unwrap_or_else(|| format!("{stem}{}", uuid::Uuid::new_v4().simple()))
    }

    /// Add a web part to a zone, renaming it if its control ID is taken
    ///
    /// # Errors
    /// Returns error if the zone does not exist
    pub fn add_web_part(
        &mut self,
        zone_id: &str,
        mut instance: WebPartInstance,
    ) -> WebPartResult<&mut WebPartInstance> {
        if self.zone(zone_id).is_none() {
            return Err(WebPartError::ZoneNotFound(zone_id.to_string()));
        }

        let control_id = self.unique_control_id(instance.control_id());
        if control_id != instance.control_id() {
            tracing::debug!(from = instance.control_id(), to = %control_id, "renamed colliding web part");
            instance.set_control_id(control_id);
        }

        let zone = self
            .zone_mut(zone_id)
            .ok_or_else(|| WebPartError::ZoneNotFound(zone_id.to_string()))?;
        Ok(zone.add_web_part(instance))
    }

    /// Remove a web part from whichever zone holds it
    pub fn remove_web_part(&mut self, control_id: &str) -> Option<WebPartInstance> {
        self.zones
            .values_mut()
            .find_map(|zone| zone.remove_web_part(control_id))
    }

    /// Move a web part to `target_zone` at `position` (`None` appends)
    ///
    /// The instance keeps its identity and variants.
    ///
    /// # Errors
    /// Returns error if the web part or the target zone does not exist
    pub fn move_web_part(
        &mut self,
        control_id: &str,
        target_zone: &str,
        position: Option<usize>,
    ) -> WebPartResult<()> {
        if self.zone(target_zone).is_none() {
            return Err(WebPartError::ZoneNotFound(target_zone.to_string()));
        }
        let instance = self
            .remove_web_part(control_id)
            .ok_or_else(|| WebPartError::WebPartNotFound(control_id.to_string()))?;

        let zone = self
            .zone_mut(target_zone)
            .ok_or_else(|| WebPartError::ZoneNotFound(target_zone.to_string()))?;
        let position = position.unwrap_or(usize::MAX);
        zone.insert_web_part(position, instance);
        Ok(())
    }

    /// Copy a web part into `target_zone` under a fresh identity
    ///
    /// Returns the control ID given to the copy.
    ///
    /// # Errors
    /// Returns error if the web part or the target zone does not exist
    pub fn copy_web_part(&mut self, control_id: &str, target_zone: &str) -> WebPartResult<String> {
        let copy = self
            .find_web_part(control_id)
            .ok_or_else(|| WebPartError::WebPartNotFound(control_id.to_string()))?
            .duplicate();
        let added = self.add_web_part(target_zone, copy)?;
        Ok(added.control_id().to_string())
    }

    /// Load variants for every web part that declares a variant mode
    ///
    /// Returns the total number of variants loaded.
    ///
    /// # Errors
    /// Returns error on the first loader failure
    pub fn load_variants(
        &mut self,
        loader: &dyn VariantLoader,
        document_id: Option<i64>,
    ) -> WebPartResult<usize> {
        let mut total = 0;
        for zone in self.zones.values_mut() {
            for instance in zone.web_parts_mut() {
                let mode = instance.variant_mode();
                if mode.has_variants() {
                    total += instance.load_variants(loader, mode, document_id)?;
                }
            }
        }
        Ok(total)
    }
}

fn zone_key(zone_id: &str) -> String {
    zone_id.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::variant::{InMemoryVariantLoader, VariantMode};
    use pretty_assertions::assert_eq;

    const TEMPLATE: &str = r#"<page>
        <webpartzone id="zoneHeader" v="1">
          <webpart controlid="logo" type="image" guid="11111111-1111-4111-8111-111111111111" v="1"/>
        </webpartzone>
        <webpartzone id="zoneContent" v="1">
          <webpart controlid="text1" type="statictext" v="1" variantmode="mvt" guid="22222222-2222-4222-8222-222222222222">
            <property name="text">Hello</property>
          </webpart>
          <webpart controlid="text2" type="statictext" v="1"/>
        </webpartzone>
      </page>"#;

    fn template() -> PageTemplateInstance {
        PageTemplateInstance::from_xml(TEMPLATE).unwrap()
    }

    #[test]
    fn zones_in_document_order() {
        let ids: Vec<_> = template().zones().map(|z| z.zone_id().to_string()).collect();
        assert_eq!(ids, vec!["zoneHeader", "zoneContent"]);
    }

    #[test]
    fn finds_web_parts_across_zones() {
        let template = template();
        assert_eq!(template.find_web_part("LOGO").unwrap().parent_zone_id(), Some("zoneHeader"));
        assert_eq!(template.web_parts().count(), 3);
        assert!(template.zone("zonecontent").is_some());
    }

    #[test]
    fn wrong_root_fails() {
        assert!(matches!(
            PageTemplateInstance::from_xml("<content/>"),
            Err(WebPartError::UnexpectedElement { .. })
        ));
    }

    #[test]
    fn duplicate_zone_merge_renames_colliding_web_parts() {
        let template = PageTemplateInstance::from_xml(
            r#"<page>
                 <webpartzone id="main"><webpart controlid="text1" type="statictext"/></webpartzone>
                 <webpartzone id="MAIN"><webpart controlid="text1" type="image"/></webpartzone>
               </page>"#,
        )
        .unwrap();

        assert_eq!(template.zones().count(), 1);
        let ids: Vec<_> = template.web_parts().map(WebPartInstance::control_id).collect();
        assert_eq!(ids, vec!["text1", "text2"]);
        assert_eq!(template.find_web_part("text2").unwrap().web_part_type(), "image");
        assert_eq!(template.find_web_part("text2").unwrap().parent_zone_id(), Some("main"));
    }

    #[test]
    fn blank_is_empty_template() {
        assert_eq!(PageTemplateInstance::from_xml("").unwrap().zones().count(), 0);
    }

    #[test]
    fn unique_control_id_skips_taken() {
        let template = template();
        assert_eq!(template.unique_control_id("banner"), "banner");
        assert_eq!(template.unique_control_id("text1"), "text3");
        assert_eq!(template.unique_control_id("logo"), "logo1");
        assert_eq!(template.unique_control_id("  "), "webpart");
    }

    #[test]
    fn add_renames_on_collision() {
        let mut template = template();
        let added = template
            .add_web_part("zoneHeader", WebPartInstance::new("text1", "statictext"))
            .unwrap();
        assert_eq!(added.control_id(), "text3");
        assert_eq!(added.parent_zone_id(), Some("zoneHeader"));
    }

    #[test]
    fn add_to_missing_zone_fails() {
        let mut template = template();
        assert!(matches!(
            template.add_web_part("nope", WebPartInstance::new("x", "y")),
            Err(WebPartError::ZoneNotFound(_))
        ));
    }

    #[test]
    fn move_keeps_identity() {
        let mut template = template();
        let guid = template.find_web_part("text1").unwrap().instance_guid();

        template.move_web_part("text1", "zoneHeader", Some(0)).unwrap();

        let header = template.zone("zoneHeader").unwrap();
        assert_eq!(header.position_of("text1"), Some(0));
        let moved = header.get_web_part("text1").unwrap();
        assert_eq!(moved.instance_guid(), guid);
        assert!(!moved.is_removed());
        assert!(template.zone("zoneContent").unwrap().get_web_part("text1").is_none());
    }

    #[test]
    fn move_missing_web_part_fails() {
        let mut template = template();
        assert!(matches!(
            template.move_web_part("ghost", "zoneHeader", None),
            Err(WebPartError::WebPartNotFound(_))
        ));
    }

    #[test]
    fn copy_gets_new_id_and_guid() {
        let mut template = template();
        let new_id = template.copy_web_part("text1", "zoneContent").unwrap();

        assert_eq!(new_id, "text3");
        let original = template.find_web_part("text1").unwrap();
        let copy = template.find_web_part(&new_id).unwrap();
        assert_ne!(original.instance_guid(), copy.instance_guid());
        assert_eq!(copy.get_text("text").as_deref(), Some("Hello"));
    }

    #[test]
    fn removed_web_parts_are_not_saved() {
        let mut template = template();
        template.remove_web_part("text2").unwrap();
        let xml = template.to_xml().unwrap();
        assert!(!xml.contains("text2"));
        assert!(xml.contains("text1"));
    }

    #[test]
    fn loads_variants_for_declared_modes() {
        let mut template = template();
        let parent = template.find_web_part("text1").unwrap();
        let guid = parent.instance_guid().unwrap();

        let mut variant = parent.clone();
        variant.set_variant_id(Some(4));
        variant.set_value("text", "Variant B");

        let mut loader = InMemoryVariantLoader::new();
        loader.register(guid, VariantMode::Mvt, None, variant);

        assert_eq!(template.load_variants(&loader, Some(1)).unwrap(), 1);
        let text1 = template.find_web_part("text1").unwrap();
        assert_eq!(
            text1.select_variant(Some(4)).get_text("text").as_deref(),
            Some("Variant B")
        );
        assert!(!template.find_web_part("logo").unwrap().has_variants());
    }
}
