//! Web-part instance
//!
//! Provides [`WebPartInstance`]: one placement of a web part inside a zone,
//! persisted as
//!
//! ```text
//! <webpart controlid="text1" type="statictext" guid="..." v="1">
//!   <property name="text">Hello</property>
//!   <property name="visible" ismacro="true">{%CurrentUser.IsAuthenticated%}</property>
//! </webpart>
//! ```

use crate::error::{VariantLoadError, WebPartError, WebPartResult};
use crate::macros::{resolve_property_macros, IdentityTransformation, MacroTransformation};
use crate::properties::PropertyBag;
use crate::value::{parse_bool, PropertyValue};
use crate::variant::{VariantLoader, VariantMode};
use portal_xml::{parse_document, write_document, WriteOptions, XmlElement};
use serde::Serialize;
use uuid::Uuid;

/// Element name of a persisted instance
pub const WEBPART_ELEMENT: &str = "webpart";

/// Property name that reads and writes the control ID
pub const CONTROL_ID_PROPERTY: &str = "webpartcontrolid";

/// Format version written for new instances
pub const CURRENT_XML_VERSION: u32 = 1;

const CONTROL_ID_ATTRIBUTE: &str = "controlid";
const TYPE_ATTRIBUTE: &str = "type";
const GUID_ATTRIBUTE: &str = "guid";
const WIDGET_ATTRIBUTE: &str = "iswidget";
const MINIMIZED_ATTRIBUTE: &str = "minimized";
const VARIANT_MODE_ATTRIBUTE: &str = "variantmode";
const VERSION_ATTRIBUTE: &str = "v";

/// One placement of a web part
///
/// `Clone` is deep for properties and variants and keeps the instance GUID,
/// so an edited copy still identifies the same placement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WebPartInstance {
    control_id: String,
    web_part_type: String,
    instance_guid: Option<Uuid>,
    xml_version: u32,
    properties: PropertyBag,
    is_widget: bool,
    minimized: bool,
    #[serde(skip)]
    removed: bool,
    variant_id: Option<i64>,
    variant_mode: VariantMode,
    variants: Vec<WebPartInstance>,
    parent_zone_id: Option<String>,
}

impl WebPartInstance {
    /// Create instance with the given control ID and web-part type
    #[must_use]
    pub fn new(control_id: impl Into<String>, web_part_type: impl Into<String>) -> Self {
        Self {
            control_id: control_id.into(),
            web_part_type: web_part_type.into(),
            instance_guid: None,
            xml_version: CURRENT_XML_VERSION,
            properties: PropertyBag::new(),
            is_widget: false,
            minimized: false,
            removed: false,
            variant_id: None,
            variant_mode: VariantMode::None,
            variants: Vec::new(),
            parent_zone_id: None,
        }
    }

    /// Parse a `<webpart>` document
    ///
    /// # Errors
    /// Returns error if the XML is malformed or `controlid`/`type` is missing
    pub fn from_xml(xml: &str) -> WebPartResult<Self> {
        let element = parse_document(xml)?;
        Self::from_element(&element)
    }

    /// Build from a `<webpart>` element
    ///
    /// # Errors
    /// Returns error if the element is not `<webpart>` or `controlid`/`type`
    /// is missing or blank
    pub fn from_element(element: &XmlElement) -> WebPartResult<Self> {
        let mut instance = Self::new(String::new(), String::new());
        instance.load_from_element(element)?;
        Ok(instance)
    }

    /// Replace the persisted state with the content of `element`
    ///
    /// The parent zone is kept; variants are dropped.
    ///
    /// # Errors
    /// Returns error if the element is not `<webpart>` or `controlid`/`type`
    /// is missing or blank. The instance is left unchanged on error.
    pub fn load_from_element(&mut self, element: &XmlElement) -> WebPartResult<()> {
        if !element.is(WEBPART_ELEMENT) {
            return Err(WebPartError::unexpected_element(WEBPART_ELEMENT, element.name()));
        }

        let control_id = element
            .non_blank_attribute(CONTROL_ID_ATTRIBUTE)
            .ok_or(WebPartError::MissingAttribute {
                attribute: CONTROL_ID_ATTRIBUTE,
            })?;
        let web_part_type = element
            .non_blank_attribute(TYPE_ATTRIBUTE)
            .ok_or(WebPartError::MissingAttribute {
                attribute: TYPE_ATTRIBUTE,
            })?;

        let instance_guid = element.non_blank_attribute(GUID_ATTRIBUTE).and_then(|raw| {
            match Uuid::parse_str(raw) {
                Ok(guid) if !guid.is_nil() => Some(guid),
                Ok(_) => None,
                Err(_) => {
                    tracing::warn!(control_id, guid = raw, "ignoring invalid instance guid");
                    None
                }
            }
        });

        self.control_id = control_id.to_string();
        self.web_part_type = web_part_type.to_string();
        self.instance_guid = instance_guid;
        self.xml_version = element
            .non_blank_attribute(VERSION_ATTRIBUTE)
            .and_then(|v| v.parse().ok())
            .unwrap_or(0);
        self.is_widget = flag(element, WIDGET_ATTRIBUTE);
        self.minimized = flag(element, MINIMIZED_ATTRIBUTE);
        self.variant_mode = element
            .attribute(VARIANT_MODE_ATTRIBUTE)
            .map(VariantMode::parse)
            .unwrap_or_default();
        self.removed = false;
        self.variants.clear();
        self.properties.load_from(element);

        tracing::debug!(
            control_id = %self.control_id,
            web_part_type = %self.web_part_type,
            properties = self.properties.len(),
            "loaded web part instance"
        );
        Ok(())
    }

    /// Serialize to a `<webpart>` element
    ///
    /// Assigns a new GUID first if the instance has none. Macro property values
    /// pass through `transformation`.
    pub fn to_element(&mut self, transformation: &dyn MacroTransformation) -> XmlElement {
        let guid = self.ensure_guid();

        let mut element = XmlElement::new(WEBPART_ELEMENT)
            .with_attribute(CONTROL_ID_ATTRIBUTE, self.control_id.as_str())
            .with_attribute(TYPE_ATTRIBUTE, self.web_part_type.as_str())
            .with_attribute(GUID_ATTRIBUTE, guid.hyphenated().to_string());
        if self.is_widget {
            element.set_attribute(WIDGET_ATTRIBUTE, "true");
        }
        if self.minimized {
            element.set_attribute(MINIMIZED_ATTRIBUTE, "true");
        }
        if self.variant_mode != VariantMode::None {
            element.set_attribute(VARIANT_MODE_ATTRIBUTE, self.variant_mode.as_str());
        }
        element.set_attribute(VERSION_ATTRIBUTE, self.xml_version.to_string());

        self.properties.write_to(&mut element, transformation);
        element
    }

    /// Serialize to a compact `<webpart>` document
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

    /// Control ID, unique within the parent zone
    #[inline]
    #[must_use]
    pub fn control_id(&self) -> &str {
        &self.control_id
    }

    /// Set control ID
    pub fn set_control_id(&mut self, control_id: impl Into<String>) {
        self.control_id = control_id.into();
    }

    /// Code name of the web-part definition
    #[inline]
    #[must_use]
    pub fn web_part_type(&self) -> &str {
        &self.web_part_type
    }

    /// Set web-part type
    pub fn set_web_part_type(&mut self, web_part_type: impl Into<String>) {
        self.web_part_type = web_part_type.into();
    }

    /// Stable identity across edits, if assigned
    #[inline]
    #[must_use]
    pub fn instance_guid(&self) -> Option<Uuid> {
        self.instance_guid
    }

    /// Set instance GUID
    pub fn set_instance_guid(&mut self, guid: Uuid) {
        self.instance_guid = Some(guid);
    }

    /// Instance GUID, generated on first use
    pub fn ensure_guid(&mut self) -> Uuid {
        *self.instance_guid.get_or_insert_with(Uuid::new_v4)
    }

    /// Persisted format version
    #[inline]
    #[must_use]
    pub fn xml_version(&self) -> u32 {
        self.xml_version
    }

    /// Set format version
    pub fn set_xml_version(&mut self, version: u32) {
        self.xml_version = version;
    }

    /// Placed by an editor as a widget
    #[inline]
    #[must_use]
    pub fn is_widget(&self) -> bool {
        self.is_widget
    }

    /// Set widget flag
    pub fn set_widget(&mut self, is_widget: bool) {
        self.is_widget = is_widget;
    }

    /// Collapsed in design mode
    #[inline]
    #[must_use]
    pub fn minimized(&self) -> bool {
        self.minimized
    }

    /// Set minimized flag
    pub fn set_minimized(&mut self, minimized: bool) {
        self.minimized = minimized;
    }

    /// Removed from its zone
    #[inline]
    #[must_use]
    pub fn is_removed(&self) -> bool {
        self.removed
    }

    /// Flag as removed
    pub fn mark_removed(&mut self) {
        self.removed = true;
    }

    /// Clear the removed flag when placed into a zone again
    pub(crate) fn restore(&mut self) {
        self.removed = false;
    }

    /// Variant identifier when this instance is itself a variant
    #[inline]
    #[must_use]
    pub fn variant_id(&self) -> Option<i64> {
        self.variant_id
    }

    /// Set variant identifier
    pub fn set_variant_id(&mut self, variant_id: Option<i64>) {
        self.variant_id = variant_id;
    }

    /// Variant mode of this placement
    #[inline]
    #[must_use]
    pub fn variant_mode(&self) -> VariantMode {
        self.variant_mode
    }

    /// Set variant mode
    pub fn set_variant_mode(&mut self, mode: VariantMode) {
        self.variant_mode = mode;
    }

    /// Loaded variants
    #[inline]
    #[must_use]
    pub fn variants(&self) -> &[WebPartInstance] {
        &self.variants
    }

    /// Check if variants are loaded
    #[inline]
    #[must_use]
    pub fn has_variants(&self) -> bool {
        !self.variants.is_empty()
    }

    /// Append a variant
    pub fn add_variant(&mut self, mut variant: WebPartInstance) {
        variant.parent_zone_id.clone_from(&self.parent_zone_id);
        self.variants.push(variant);
    }

    /// Zone holding this instance
    #[inline]
    #[must_use]
    pub fn parent_zone_id(&self) -> Option<&str> {
        self.parent_zone_id.as_deref()
    }

    /// Attach to a zone; variants follow their parent
    pub(crate) fn set_parent_zone_id(&mut self, zone_id: Option<String>) {
        for variant in &mut self.variants {
            variant.parent_zone_id.clone_from(&zone_id);
        }
        self.parent_zone_id = zone_id;
    }

    /// Property bag
    #[inline]
    #[must_use]
    pub fn properties(&self) -> &PropertyBag {
        &self.properties
    }

    /// Property names in order
    pub fn property_names(&self) -> impl Iterator<Item = &str> {
        self.properties.names()
    }

    /// Property value by case-insensitive name
    ///
    /// `webpartcontrolid` reads the control ID.
    #[must_use]
    pub fn get_value(&self, name: &str) -> Option<PropertyValue> {
        if is_control_id_alias(name) {
            return Some(PropertyValue::Text(self.control_id.clone()));
        }
        self.properties.get(name).cloned()
    }

    /// Property value rendered as text
    #[must_use]
    pub fn get_text(&self, name: &str) -> Option<String> {
        self.get_value(name).map(|value| value.to_string())
    }

    /// Store a property value
    ///
    /// `webpartcontrolid` writes the control ID.
    pub fn set_value(&mut self, name: &str, value: impl Into<PropertyValue>) {
        let value = value.into();
        if is_control_id_alias(name) {
            self.control_id = value.to_string();
            return;
        }
        self.properties.set(name, value);
    }

    /// Remove a property value
    pub fn remove_value(&mut self, name: &str) -> Option<PropertyValue> {
        self.properties.remove(name)
    }

    /// Replace `{%name%}` tokens with this instance's property values
    ///
    /// Tokens naming unknown properties or macro-valued properties stay as is.
    #[must_use]
    pub fn resolve_property_macros(&self, input: &str) -> String {
        resolve_property_macros(input, |name| {
            self.get_value(name).and_then(|value| value.resolved_text())
        })
        .into_owned()
    }

    /// Deep copy with a fresh GUID and no variants
    ///
    /// Used when a placement is copied rather than edited.
    #[must_use]
    pub fn duplicate(&self) -> Self {
        let mut copy = self.clone();
        copy.instance_guid = Some(Uuid::new_v4());
        copy.variants.clear();
        copy.variant_id = None;
        copy.removed = false;
        copy
    }

    /// Fetch variants for `mode` through `loader`
    ///
    /// Replaces the current variant list and records `mode`. Returned variants
    /// without an identifier are discarded. `VariantMode::None` and
    /// `VariantMode::Conflicted` clear the list without calling the loader.
    ///
    /// # Errors
    /// Returns error if the loader fails; the current variants are kept
    pub fn load_variants(
        &mut self,
        loader: &dyn VariantLoader,
        mode: VariantMode,
        document_id: Option<i64>,
    ) -> Result<usize, VariantLoadError> {
        self.variant_mode = mode;
        if !mode.has_variants() {
            self.variants.clear();
            return Ok(0);
        }

        let loaded = loader.load(self, mode, document_id)?;
        let mut variants = Vec::with_capacity(loaded.len());
        for mut variant in loaded {
            if variant.variant_id.is_none() {
                tracing::warn!(
                    control_id = %self.control_id,
                    "discarding variant without identifier"
                );
                continue;
            }
            variant.variant_mode = mode;
            variant.parent_zone_id.clone_from(&self.parent_zone_id);
            variants.push(variant);
        }

        tracing::debug!(
            control_id = %self.control_id,
            mode = %mode,
            count = variants.len(),
            "loaded web part variants"
        );
        self.variants = variants;
        Ok(self.variants.len())
    }

    /// Instance to render for the chosen variant
    ///
    /// Falls back to this instance when no variant is chosen or the chosen one
    /// is not loaded.
    #[must_use]
    pub fn select_variant(&self, variant_id: Option<i64>) -> &WebPartInstance {
        variant_id
            .and_then(|id| self.variants.iter().find(|v| v.variant_id == Some(id)))
            .unwrap_or(self)
    }
}

fn is_control_id_alias(name: &str) -> bool {
    name.trim().eq_ignore_ascii_case(CONTROL_ID_PROPERTY)
}

fn flag(element: &XmlElement, attribute: &str) -> bool {
    element
        .attribute(attribute)
        .and_then(parse_bool)
        .unwrap_or(false)
}
