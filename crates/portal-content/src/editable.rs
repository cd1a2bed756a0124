//! Editable regions and editable web-part content of a document
//!
//! Content is persisted as:
//!
//! ```text
//! <content>
//!   <region id="main"><![CDATA[<p>...</p>]]></region>
//!   <webpart id="editabletext1"><![CDATA[...]]></webpart>
//! </content>
//! ```
//!
//! Stored values have `]]>` escaped to `]]#>`; the escaping is reversed on load.

use crate::error::{ContentError, ContentResult};
use crate::multikey::MultiKeyDictionary;
use portal_xml::{escape_cdata, parse_document, unescape_cdata, write_document, WriteOptions, XmlElement};
use serde::Serialize;

const CONTENT_ELEMENT: &str = "content";
const REGION_ELEMENT: &str = "region";
const WEBPART_ELEMENT: &str = "webpart";
const ID_ATTRIBUTE: &str = "id";

/// Resolved HTML fragments keyed by control ID
///
/// Holds two tables: free-text editable regions and editable web parts. Both
/// are keyed case-insensitively and accept composite `;`-joined keys.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EditableItems {
    regions: MultiKeyDictionary<String>,
    web_parts: MultiKeyDictionary<String>,
}

impl EditableItems {
    /// Create empty container
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a content document into a new container
    ///
    /// # Errors
    /// Returns error if the XML is malformed or its root is not `<content>`
    pub fn from_content_xml(xml: &str) -> ContentResult<Self> {
        let mut items = Self::new();
        items.load_content_xml(xml)?;
        Ok(items)
    }

    /// Replace the container's state with the given content document
    ///
    /// Blank input leaves the container empty.
    ///
    /// # Errors
    /// Returns error if the XML is malformed or its root is not `<content>`
    pub fn load_content_xml(&mut self, xml: &str) -> ContentResult<()> {
        self.clear();
        if xml.trim().is_empty() {
            return Ok(());
        }

        let root = parse_document(xml)?;
        if !root.is(CONTENT_ELEMENT) {
            return Err(ContentError::UnexpectedRoot {
                found: root.name().to_string(),
            });
        }

        for element in root.elements() {
            let table = if element.is(REGION_ELEMENT) {
                &mut self.regions
            } else if element.is(WEBPART_ELEMENT) {
                &mut self.web_parts
            } else {
                tracing::debug!(element = element.name(), "skipping unknown content element");
                continue;
            };

            let Some(id) = element.non_blank_attribute(ID_ATTRIBUTE) else {
                tracing::warn!(element = element.name(), "content entry without id skipped");
                continue;
            };

            table.insert(id, unescape_cdata(&element.text()).into_owned());
        }

        tracing::debug!(
            regions = self.regions.len(),
            web_parts = self.web_parts.len(),
            "loaded editable content"
        );
        Ok(())
    }

    /// Serialize to a compact content document, entries sorted by key
    ///
    /// # Errors
    /// Returns error if serialization fails
    pub fn content_xml(&self) -> ContentResult<String> {
        self.content_xml_with(&WriteOptions::default())
    }

    /// Serialize with explicit formatting options
    ///
    /// # Errors
    /// Returns error if serialization fails
    pub fn content_xml_with(&self, options: &WriteOptions) -> ContentResult<String> {
        let mut root = XmlElement::new(CONTENT_ELEMENT);
        append_entries(&mut root, REGION_ELEMENT, &self.regions);
        append_entries(&mut root, WEBPART_ELEMENT, &self.web_parts);
        Ok(write_document(&root, options)?)
    }

    /// Content for `control_id`
    ///
    /// Web-part content takes precedence over a region with the same ID.
    #[must_use]
    pub fn get(&self, control_id: &str) -> Option<&str> {
        self.web_parts
            .get(control_id)
            .or_else(|| self.regions.get(control_id))
            .map(String::as_str)
    }

    /// Store content for `control_id`
    ///
    /// Always writes the web-part table, so a region with the same ID becomes
    /// masked for [`Self::get`]. Use [`Self::set_region`] to address regions.
    pub fn set_value(&mut self, control_id: &str, value: impl Into<String>) {
        self.web_parts.insert(control_id, value.into());
    }

    /// Store editable region content
    pub fn set_region(&mut self, region_id: &str, value: impl Into<String>) {
        self.regions.insert(region_id, value.into());
    }

    /// Store editable web-part content
    pub fn set_web_part(&mut self, control_id: &str, value: impl Into<String>) {
        self.web_parts.insert(control_id, value.into());
    }

    /// Region content only
    #[must_use]
    pub fn region(&self, region_id: &str) -> Option<&str> {
        self.regions.get(region_id).map(String::as_str)
    }

    /// Web-part content only
    #[must_use]
    pub fn web_part(&self, control_id: &str) -> Option<&str> {
        self.web_parts.get(control_id).map(String::as_str)
    }

    /// Remove `control_id` from both tables, returning the masking value
    pub fn remove(&mut self, control_id: &str) -> Option<String> {
        let web_part = self.web_parts.remove(control_id);
        let region = self.regions.remove(control_id);
        web_part.or(region)
    }

    /// Region entries ordered by key
    pub fn regions(&self) -> impl Iterator<Item = (&str, &str)> {
        self.regions.iter().map(|(key, value)| (key, value.as_str()))
    }

    /// Web-part entries ordered by key
    pub fn web_parts(&self) -> impl Iterator<Item = (&str, &str)> {
        self.web_parts.iter().map(|(key, value)| (key, value.as_str()))
    }

    /// Underlying region table
    #[inline]
    #[must_use]
    pub fn editable_regions(&self) -> &MultiKeyDictionary<String> {
        &self.regions
    }

    /// Underlying web-part table
    #[inline]
    #[must_use]
    pub fn editable_web_parts(&self) -> &MultiKeyDictionary<String> {
        &self.web_parts
    }

    /// Drop all content
    pub fn clear(&mut self) {
        self.regions.clear();
        self.web_parts.clear();
    }

    /// Check if both tables are empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.regions.is_empty() && self.web_parts.is_empty()
    }
}

fn append_entries(root: &mut XmlElement, name: &str, table: &MultiKeyDictionary<String>) {
    for (key, value) in table.iter() {
        let mut entry = XmlElement::new(name).with_attribute(ID_ATTRIBUTE, key);
        entry.push_cdata(escape_cdata(value).into_owned());
        root.push_element(entry);
    }
}
