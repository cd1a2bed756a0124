//! Owned XML element tree
//!
//! Provides [`XmlElement`] and [`parse_document`]. The tree is deliberately
//! small: elements, text and CDATA. Comments, processing instructions and the
//! declaration are dropped on read.

use crate::error::{XmlError, XmlResult};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

/// Child node of an [`XmlElement`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum XmlNode {
    /// Nested element
    Element(XmlElement),
    /// Entity-unescaped character data
    Text(String),
    /// Raw CDATA section payload
    CData(String),
}

/// XML element with ordered attributes and children
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct XmlElement {
    name: String,
    attributes: Vec<(String, String)>,
    children: Vec<XmlNode>,
}

impl XmlElement {
    /// Create empty element
    #[inline]
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Element name as written
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Case-insensitive name check
    #[inline]
    #[must_use]
    pub fn is(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name)
    }

    /// Attribute value by case-insensitive name
    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Attribute value, `None` when missing or blank
    #[must_use]
    pub fn non_blank_attribute(&self, name: &str) -> Option<&str> {
        self.attribute(name)
            .map(str::trim)
            .filter(|value| !value.is_empty())
    }

    /// Set attribute, replacing an existing one of the same name
    pub fn set_attribute(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self
            .attributes
            .iter_mut()
            .find(|(key, _)| key.eq_ignore_ascii_case(&name))
        {
            Some(slot) => slot.1 = value,
            None => self.attributes.push((name, value)),
        }
    }

    /// Builder form of [`Self::set_attribute`]
    #[inline]
    #[must_use]
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_attribute(name, value);
        self
    }

    /// Attributes in document order
    pub fn attributes(&self) -> impl Iterator<Item = (&str, &str)> {
        self.attributes
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_str()))
    }

    /// Child nodes in document order
    #[inline]
    #[must_use]
    pub fn children(&self) -> &[XmlNode] {
        &self.children
    }

    /// Append child element
    pub fn push_element(&mut self, element: XmlElement) {
        self.children.push(XmlNode::Element(element));
    }

    /// Append text node
    pub fn push_text(&mut self, text: impl Into<String>) {
        self.children.push(XmlNode::Text(text.into()));
    }

    /// Append CDATA node
    ///
    /// The payload must already be escaped; the writer rejects a raw `]]>`.
    pub fn push_cdata(&mut self, text: impl Into<String>) {
        self.children.push(XmlNode::CData(text.into()));
    }

    /// Child elements in document order
    pub fn elements(&self) -> impl Iterator<Item = &XmlElement> {
        self.children.iter().filter_map(|node| match node {
            XmlNode::Element(element) => Some(element),
            _ => None,
        })
    }

    /// Child elements with the given case-insensitive name
    pub fn elements_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a XmlElement> {
        self.elements().filter(move |element| element.is(name))
    }

    /// Concatenated text and CDATA content of direct children
    #[must_use]
    pub fn text(&self) -> String {
        let mut out = String::new();
        for node in &self.children {
            match node {
                XmlNode::Text(text) | XmlNode::CData(text) => out.push_str(text),
                XmlNode::Element(_) => {}
            }
        }
        out
    }
}

/// Parse a document and return its root element
///
/// # Errors
/// Returns error if the input is malformed, empty, or has several roots
pub fn parse_document(xml: &str) -> XmlResult<XmlElement> {
    let mut reader = Reader::from_str(xml);
    let mut stack: Vec<XmlElement> = Vec::new();
    let mut root: Option<XmlElement> = None;

    loop {
        let position = u64::try_from(reader.buffer_position()).unwrap_or_default();
        let event = reader
            .read_event()
            .map_err(|e| XmlError::malformed(position, e.to_string()))?;

        match event {
            Event::Start(start) => {
                let element = element_from_start(&start, position)?;
                if stack.is_empty() {
                    if let Some(existing) = &root {
                        tracing::debug!(root = existing.name(), "second root element");
                        return Err(XmlError::MultipleRoots(element.name));
                    }
                }
                stack.push(element);
            }
            Event::Empty(start) => {
                let element = element_from_start(&start, position)?;
                attach(&mut stack, &mut root, element)?;
            }
            Event::End(end) => {
                let found = String::from_utf8_lossy(end.name().as_ref()).into_owned();
                let element = stack.pop().ok_or_else(|| {
                    XmlError::malformed(position, format!("unexpected closing tag </{found}>"))
                })?;
                if element.name != found {
                    return Err(XmlError::MismatchedTag {
                        expected: element.name,
                        found,
                    });
                }
                attach(&mut stack, &mut root, element)?;
            }
            Event::Text(text) => {
                let text = text
                    .unescape()
                    .map_err(|e| XmlError::malformed(position, e.to_string()))?;
                match stack.last_mut() {
                    Some(parent) => {
                        if !text.trim().is_empty() {
                            parent.push_text(text.into_owned());
                        }
                    }
                    None if text.trim().is_empty() => {}
                    None => {
                        return Err(XmlError::malformed(position, "text outside of root element"));
                    }
                }
            }
            Event::CData(cdata) => {
                let raw = cdata.into_inner();
                let text = String::from_utf8(raw.into_owned())
                    .map_err(|e| XmlError::malformed(position, e.to_string()))?;
                match stack.last_mut() {
                    Some(parent) => parent.push_cdata(text),
                    None => {
                        return Err(XmlError::malformed(position, "cdata outside of root element"));
                    }
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if let Some(open) = stack.pop() {
        let position = u64::try_from(reader.buffer_position()).unwrap_or_default();
        return Err(XmlError::malformed(
            position,
            format!("unclosed element <{}>", open.name),
        ));
    }

    root.ok_or(XmlError::EmptyDocument)
}

fn element_from_start(start: &BytesStart<'_>, position: u64) -> XmlResult<XmlElement> {
    let mut element = XmlElement::new(String::from_utf8_lossy(start.name().as_ref()).into_owned());
    for attribute in start.attributes() {
        let attribute = attribute.map_err(|e| XmlError::malformed(position, e.to_string()))?;
        let key = String::from_utf8_lossy(attribute.key.as_ref()).into_owned();
        let value = attribute
            .unescape_value()
            .map_err(|e| XmlError::malformed(position, e.to_string()))?
            .into_owned();
        element.attributes.push((key, value));
    }
    Ok(element)
}

fn attach(
    stack: &mut [XmlElement],
    root: &mut Option<XmlElement>,
    element: XmlElement,
) -> XmlResult<()> {
    match stack.last_mut() {
        Some(parent) => {
            parent.push_element(element);
            Ok(())
        }
        None if root.is_some() => Err(XmlError::MultipleRoots(element.name)),
        None => {
            *root = Some(element);
            Ok(())
        }
    }
}
