//! Portal XML
//!
//! The small XML surface the portal engine persists its documents in.
//!
//! # Core Concepts
//!
//! - [`XmlElement`]: Owned element tree (name, ordered attributes, children)
//! - [`parse_document`]: quick-xml backed reader producing the root element
//! - [`write_document`]: Serializer honouring [`WriteOptions`]
//! - [`escape_cdata`] / [`unescape_cdata`]: `]]>` <-> `]]#>` so stored HTML
//!   can never close its own CDATA section
//!
//! # Example
//!
//! ```rust
//! use portal_xml::{parse_document, write_document, WriteOptions};
//!
//! let root = parse_document(r#"<content><region id="main"><![CDATA[<b>hi</b>]]></region></content>"#).unwrap();
//! assert_eq!(root.name(), "content");
//! let region = root.elements_named("region").next().unwrap();
//! assert_eq!(region.text(), "<b>hi</b>");
//!
//! let xml = write_document(&root, &WriteOptions::default()).unwrap();
//! assert!(xml.contains("<![CDATA[<b>hi</b>]]>"));
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

mod cdata;
mod element;
mod error;
mod writer;

pub use cdata::{escape_cdata, unescape_cdata, CDATA_END, ESCAPED_CDATA_END};
pub use element::{parse_document, XmlElement, XmlNode};
pub use error::{XmlError, XmlResult};
pub use writer::{write_document, WriteOptions};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
