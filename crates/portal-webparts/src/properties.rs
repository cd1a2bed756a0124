//! Case-insensitive property bag shared by web parts and zones
//!
//! Persisted as `<property name="..." ismacro="true">value</property>`
//! children of the owning element. Typed values carry a `type` attribute
//! (`bool`, `int`, `guid`); whitespace-only text is written as CDATA so it
//! survives reloading.

use crate::macros::MacroTransformation;
use crate::value::{parse_bool, PropertyValue};
use portal_xml::XmlElement;
use serde::Serialize;
use std::collections::BTreeMap;

pub(crate) const PROPERTY_ELEMENT: &str = "property";
const NAME_ATTRIBUTE: &str = "name";
const MACRO_ATTRIBUTE: &str = "ismacro";
const TYPE_ATTRIBUTE: &str = "type";

/// Property bag keyed by lower-cased property name
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct PropertyBag(BTreeMap<String, PropertyValue>);

impl PropertyBag {
    /// Create empty bag
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Normalized key for a property name
    #[inline]
    #[must_use]
    pub fn key(name: &str) -> String {
        name.trim().to_lowercase()
    }

    /// Value by case-insensitive name
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&PropertyValue> {
        self.0.get(&Self::key(name))
    }

    /// Store value, returning the previous one
    pub fn set(&mut self, name: &str, value: impl Into<PropertyValue>) -> Option<PropertyValue> {
        self.0.insert(Self::key(name), value.into())
    }

    /// Remove value
    pub fn remove(&mut self, name: &str) -> Option<PropertyValue> {
        self.0.remove(&Self::key(name))
    }

    /// Check for a property
    #[inline]
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(&Self::key(name))
    }

    /// Number of properties
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check if bag is empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Property names in order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Entries in name order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &PropertyValue)> {
        self.0.iter().map(|(key, value)| (key.as_str(), value))
    }

    /// Replace contents with the `<property>` children of `element`
    pub(crate) fn load_from(&mut self, element: &XmlElement) {
        self.0.clear();
        for node in element.elements_named(PROPERTY_ELEMENT) {
            let Some(name) = node.non_blank_attribute(NAME_ATTRIBUTE) else {
                tracing::warn!(owner = element.name(), "property without name skipped");
                continue;
            };
            let is_macro = node
                .attribute(MACRO_ATTRIBUTE)
                .and_then(parse_bool)
                .unwrap_or(false);
            let text = node.text();
            let value = if is_macro {
                PropertyValue::Macro(text)
            } else if let Some(tag) = node.non_blank_attribute(TYPE_ATTRIBUTE) {
                PropertyValue::from_tagged(tag, &text).unwrap_or_else(|| {
                    tracing::warn!(property = name, tag, "untyped value kept as text");
                    PropertyValue::Text(text)
                })
            } else {
                PropertyValue::Text(text)
            };
            self.0.insert(Self::key(name), value);
        }
    }

    /// Append `<property>` children to `element`
    pub(crate) fn write_to(&self, element: &mut XmlElement, transformation: &dyn MacroTransformation) {
        for (name, value) in &self.0 {
            let mut node = XmlElement::new(PROPERTY_ELEMENT).with_attribute(NAME_ATTRIBUTE, name);
            let text = match value {
                PropertyValue::Macro(expression) => {
                    node.set_attribute(MACRO_ATTRIBUTE, "true");
                    transformation.transform(name, expression)
                }
                other => {
                    if let Some(tag) = other.type_tag() {
                        node.set_attribute(TYPE_ATTRIBUTE, tag);
                    }
                    other.to_string()
                }
            };
            if text.trim().is_empty() {
                if !text.is_empty() {
                    node.push_cdata(text);
                }
            } else {
                node.push_text(text);
            }
            element.push_element(node);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::macros::IdentityTransformation;
    use portal_xml::parse_document;

    #[test]
    fn names_are_case_insensitive() {
        let mut bag = PropertyBag::new();
        bag.set("Container", "box");
        assert_eq!(bag.get("CONTAINER"), Some(&PropertyValue::from("box")));
        assert!(bag.contains(" container "));
        assert_eq!(bag.names().collect::<Vec<_>>(), vec!["container"]);
    }

    #[test]
    fn loads_literal_and_macro_values() {
        let element = parse_document(
            r#"<webpart>
                 <property name="Text">Hello</property>
                 <property name="visible" ismacro="true">{%CurrentUser.IsAuthenticated%}</property>
                 <property name="empty"/>
                 <property>orphan</property>
               </webpart>"#,
        )
        .unwrap();

        let mut bag = PropertyBag::new();
        bag.load_from(&element);

        assert_eq!(bag.len(), 3);
        assert_eq!(bag.get("text"), Some(&PropertyValue::from("Hello")));
        assert!(bag.get("visible").unwrap().is_macro());
        assert_eq!(bag.get("empty"), Some(&PropertyValue::from("")));
    }

    #[test]
    fn typed_and_blank_values_survive_reload() {
        let guid = uuid::Uuid::new_v4();
        let mut bag = PropertyBag::new();
        bag.set("width", 640);
        bag.set("visible", false);
        bag.set("target", guid);
        bag.set("pad", "   ");
        bag.set("indent", "\t ");
        bag.set("count", "640");

        let mut element = XmlElement::new("webpart");
        bag.write_to(&mut element, &IdentityTransformation);
        let xml = portal_xml::write_document(&element, &portal_xml::WriteOptions::new().with_indent(2)).unwrap();

        let mut reloaded = PropertyBag::new();
        reloaded.load_from(&parse_document(&xml).unwrap());

        assert_eq!(reloaded, bag);
        assert_eq!(reloaded.get("width"), Some(&PropertyValue::Int(640)));
        assert_eq!(reloaded.get("pad"), Some(&PropertyValue::from("   ")));
        assert_eq!(reloaded.get("count"), Some(&PropertyValue::from("640")));
    }

    #[test]
    fn unparsable_typed_value_loads_as_text() {
        let element = parse_document(r#"<webpart><property name="width" type="int">wide</property></webpart>"#).unwrap();
        let mut bag = PropertyBag::new();
        bag.load_from(&element);
        assert_eq!(bag.get("width"), Some(&PropertyValue::from("wide")));
    }

    #[test]
    fn writes_sorted_with_macro_flag() {
        let mut bag = PropertyBag::new();
        bag.set("zeta", 5);
        bag.set("alpha", PropertyValue::Macro("{%x%}".to_string()));

        let mut element = XmlElement::new("webpart");
        bag.write_to(&mut element, &IdentityTransformation);

        let written: Vec<_> = element.elements().collect();
        assert_eq!(written[0].attribute("name"), Some("alpha"));
        assert_eq!(written[0].attribute("ismacro"), Some("true"));
        assert_eq!(written[0].text(), "{%x%}");
        assert_eq!(written[1].attribute("name"), Some("zeta"));
        assert_eq!(written[1].attribute("ismacro"), None);
        assert_eq!(written[1].attribute("type"), Some("int"));
        assert_eq!(written[1].text(), "5");
    }
}
