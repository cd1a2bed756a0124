//! Web-part zone instance
//!
//! A zone groups the web parts placed in one area of a page template:
//!
//! ```text
//! <webpartzone id="zoneA" v="1">
//!   <property name="container">box</property>
//!   <webpart controlid="text1" type="statictext" ...>...</webpart>
//! </webpartzone>
//! ```

use crate::error::{WebPartError, WebPartResult};
use crate::instance::{WebPartInstance, CURRENT_XML_VERSION, WEBPART_ELEMENT};
use crate::macros::MacroTransformation;
use crate::properties::PropertyBag;
use crate::value::PropertyValue;
use portal_xml::XmlElement;
use serde::Serialize;

/// Element name of a persisted zone
pub const ZONE_ELEMENT: &str = "webpartzone";

const ID_ATTRIBUTE: &str = "id";
const VERSION_ATTRIBUTE: &str = "v";

/// Zone holding an ordered list of web-part instances
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WebPartZoneInstance {
    zone_id: String,
    xml_version: u32,
    properties: PropertyBag,
    web_parts: Vec<WebPartInstance>,
}

impl WebPartZoneInstance {
    /// Create empty zone
    #[must_use]
    pub fn new(zone_id: impl Into<String>) -> Self {
        Self {
            zone_id: zone_id.into(),
            xml_version: CURRENT_XML_VERSION,
            properties: PropertyBag::new(),
            web_parts: Vec::new(),
        }
    }

    /// Build from a `<webpartzone>` element
    ///
    /// # Errors
    /// Returns error if the zone has no id or one of its web parts is invalid
    pub fn from_element(element: &XmlElement) -> WebPartResult<Self> {
        if !element.is(ZONE_ELEMENT) {
            return Err(WebPartError::unexpected_element(ZONE_ELEMENT, element.name()));
        }
        let zone_id = element
            .non_blank_attribute(ID_ATTRIBUTE)
            .ok_or(WebPartError::MissingZoneId)?;

        let mut zone = Self::new(zone_id);
        zone.xml_version = element
            .non_blank_attribute(VERSION_ATTRIBUTE)
            .and_then(|v| v.parse().ok())
            .unwrap_or(0);
        zone.properties.load_from(element);

        for node in element.elements_named(WEBPART_ELEMENT) {
            let instance = WebPartInstance::from_element(node)?;
            zone.add_web_part(instance);
        }

        tracing::debug!(zone_id = %zone.zone_id, web_parts = zone.web_parts.len(), "loaded zone");
        Ok(zone)
    }

    /// Serialize to a `<webpartzone>` element, skipping removed web parts
    pub fn to_element(&mut self, transformation: &dyn MacroTransformation) -> XmlElement {
        let mut element = XmlElement::new(ZONE_ELEMENT)
            .with_attribute(ID_ATTRIBUTE, self.zone_id.as_str())
            .with_attribute(VERSION_ATTRIBUTE, self.xml_version.to_string());
        self.properties.write_to(&mut element, transformation);
        for instance in self.web_parts.iter_mut().filter(|wp| !wp.is_removed()) {
            element.push_element(instance.to_element(transformation));
        }
        element
    }

    /// Zone identifier
    #[inline]
    #[must_use]
    pub fn zone_id(&self) -> &str {
        &self.zone_id
    }

    /// Persisted format version
    #[inline]
    #[must_use]
    pub fn xml_version(&self) -> u32 {
        self.xml_version
    }

    /// Zone property bag
    #[inline]
    #[must_use]
    pub fn properties(&self) -> &PropertyBag {
        &self.properties
    }

    /// Zone property value
    #[must_use]
    pub fn get_value(&self, name: &str) -> Option<&PropertyValue> {
        self.properties.get(name)
    }

    /// Store zone property value
    pub fn set_value(&mut self, name: &str, value: impl Into<PropertyValue>) {
        self.properties.set(name, value);
    }

    /// Web parts in order, excluding removed ones
    pub fn web_parts(&self) -> impl Iterator<Item = &WebPartInstance> {
        self.web_parts.iter().filter(|wp| !wp.is_removed())
    }

    /// Mutable web parts in order, excluding removed ones
    pub fn web_parts_mut(&mut self) -> impl Iterator<Item = &mut WebPartInstance> {
        self.web_parts.iter_mut().filter(|wp| !wp.is_removed())
    }

    /// Number of live web parts
    #[must_use]
    pub fn len(&self) -> usize {
        self.web_parts().count()
    }

    /// Check if zone has no live web parts
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Web part by case-insensitive control ID
    #[must_use]
    pub fn get_web_part(&self, control_id: &str) -> Option<&WebPartInstance> {
        self.web_parts()
            .find(|wp| wp.control_id().eq_ignore_ascii_case(control_id))
    }

    /// Mutable web part by case-insensitive control ID
    pub fn get_web_part_mut(&mut self, control_id: &str) -> Option<&mut WebPartInstance> {
        self.web_parts_mut()
            .find(|wp| wp.control_id().eq_ignore_ascii_case(control_id))
    }

    /// Position of a live web part
    #[must_use]
    pub fn position_of(&self, control_id: &str) -> Option<usize> {
        self.web_parts()
            .position(|wp| wp.control_id().eq_ignore_ascii_case(control_id))
    }

    /// Append a web part, attaching it to this zone
    pub fn add_web_part(&mut self, instance: WebPartInstance) -> &mut WebPartInstance {
        let position = self.web_parts.len();
        self.insert_web_part(position, instance)
    }

    /// Insert a web part before the live web part at `position`
    ///
    /// Positions past the end append.
    pub fn insert_web_part(&mut self, position: usize, mut instance: WebPartInstance) -> &mut WebPartInstance {
        self.web_parts.retain(|wp| !wp.is_removed());
        let index = position.min(self.web_parts.len());
        instance.restore();
        instance.set_parent_zone_id(Some(self.zone_id.clone()));
        self.web_parts.insert(index, instance);
        &mut self.web_parts[index]
    }

    /// Detach a web part, returning it flagged as removed
    pub fn remove_web_part(&mut self, control_id: &str) -> Option<WebPartInstance> {
        let index = self
            .web_parts
            .iter()
            .position(|wp| !wp.is_removed() && wp.control_id().eq_ignore_ascii_case(control_id))?;
        let mut instance = self.web_parts.remove(index);
        instance.mark_removed();
        instance.set_parent_zone_id(None);
        tracing::debug!(zone_id = %self.zone_id, control_id, "removed web part");
        Some(instance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::macros::IdentityTransformation;
    use portal_xml::parse_document;

    fn zone_xml() -> &'static str {
        r#"<webpartzone id="zoneA" v="1">
             <property name="Container">box</property>
             <webpart controlid="text1" type="statictext"/>
             <webpart controlid="image1" type="image"/>
           </webpartzone>"#
    }

    #[test]
    fn loads_properties_and_web_parts() {
        let zone = WebPartZoneInstance::from_element(&parse_document(zone_xml()).unwrap()).unwrap();

        assert_eq!(zone.zone_id(), "zoneA");
        assert_eq!(zone.get_value("container"), Some(&PropertyValue::from("box")));
        assert_eq!(zone.len(), 2);
        assert_eq!(zone.get_web_part("TEXT1").unwrap().parent_zone_id(), Some("zoneA"));
        assert_eq!(zone.position_of("image1"), Some(1));
    }

    #[test]
    fn missing_id_fails() {
        let element = parse_document("<webpartzone/>").unwrap();
        assert!(matches!(
            WebPartZoneInstance::from_element(&element),
            Err(WebPartError::MissingZoneId)
        ));
    }

    #[test]
    fn invalid_web_part_fails_zone() {
        let element =
            parse_document(r#"<webpartzone id="z"><webpart type="statictext"/></webpartzone>"#).unwrap();
        assert!(matches!(
            WebPartZoneInstance::from_element(&element),
            Err(WebPartError::MissingAttribute { .. })
        ));
    }

    #[test]
    fn remove_flags_and_detaches() {
        let mut zone = WebPartZoneInstance::from_element(&parse_document(zone_xml()).unwrap()).unwrap();
        let removed = zone.remove_web_part("text1").unwrap();

        assert!(removed.is_removed());
        assert_eq!(removed.parent_zone_id(), None);
        assert!(zone.get_web_part("text1").is_none());
        assert!(zone.remove_web_part("text1").is_none());

        let element = zone.to_element(&IdentityTransformation);
        assert_eq!(element.elements_named("webpart").count(), 1);
    }

    #[test]
    fn insert_clamps_position() {
        let mut zone = WebPartZoneInstance::new("z");
        zone.add_web_part(WebPartInstance::new("a", "t"));
        zone.insert_web_part(0, WebPartInstance::new("b", "t"));
        zone.insert_web_part(99, WebPartInstance::new("c", "t"));

        let order: Vec<_> = zone.web_parts().map(WebPartInstance::control_id).collect();
        assert_eq!(order, vec!["b", "a", "c"]);
    }
}
