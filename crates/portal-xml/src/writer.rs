//! Element tree serializer

use crate::cdata::CDATA_END;
use crate::element::{XmlElement, XmlNode};
use crate::error::{XmlError, XmlResult};
use quick_xml::events::{BytesCData, BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use serde::{Deserialize, Serialize};

/// Output formatting options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WriteOptions {
    /// Indent nested elements by this many spaces (`None` = single line)
    pub indent: Option<usize>,
    /// Emit `<?xml version="1.0" encoding="utf-8"?>`
    pub xml_declaration: bool,
}

impl WriteOptions {
    /// Compact output without declaration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With indentation
    #[inline]
    #[must_use]
    pub fn with_indent(mut self, spaces: usize) -> Self {
        self.indent = Some(spaces);
        self
    }

    /// With XML declaration
    #[inline]
    #[must_use]
    pub fn with_declaration(mut self) -> Self {
        self.xml_declaration = true;
        self
    }
}

/// Serialize an element tree to a string
///
/// # Errors
/// Returns error if a CDATA node holds a raw `]]>` or the writer fails
pub fn write_document(root: &XmlElement, options: &WriteOptions) -> XmlResult<String> {
    let mut writer = match options.indent {
        Some(spaces) if spaces > 0 => Writer::new_with_indent(Vec::new(), b' ', spaces),
        _ => Writer::new(Vec::new()),
    };

    if options.xml_declaration {
        writer
            .write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))
            .map_err(|e| XmlError::Write(e.to_string()))?;
    }

    write_element(&mut writer, root)?;

    String::from_utf8(writer.into_inner()).map_err(|e| XmlError::Write(e.to_string()))
}

fn write_element(writer: &mut Writer<Vec<u8>>, element: &XmlElement) -> XmlResult<()> {
    let mut start = BytesStart::new(element.name());
    for (key, value) in element.attributes() {
        start.push_attribute((key, value));
    }

    if element.children().is_empty() {
        return writer
            .write_event(Event::Empty(start))
            .map_err(|e| XmlError::Write(e.to_string()));
    }

    writer
        .write_event(Event::Start(start))
        .map_err(|e| XmlError::Write(e.to_string()))?;

    for child in element.children() {
        match child {
            XmlNode::Element(nested) => write_element(writer, nested)?,
            XmlNode::Text(text) => writer
                .write_event(Event::Text(BytesText::new(text)))
                .map_err(|e| XmlError::Write(e.to_string()))?,
            XmlNode::CData(text) => {
                if text.contains(CDATA_END) {
                    return Err(XmlError::UnescapedCData);
                }
                writer
                    .write_event(Event::CData(BytesCData::new(text.as_str())))
                    .map_err(|e| XmlError::Write(e.to_string()))?;
            }
        }
    }

    writer
        .write_event(Event::End(BytesEnd::new(element.name())))
        .map_err(|e| XmlError::Write(e.to_string()))
}
