//! Portal Content
//!
//! Editable document content: the resolved HTML of free-text regions and
//! editable web parts, keyed by control ID.
//!
//! # Core Concepts
//!
//! - [`EditableItems`]: Region and web-part tables with `<content>` XML load/save
//! - [`MultiKeyDictionary`]: Case-insensitive map where `"a;b"` aliases one slot
//!   through `"a"` and `"b"`
//!
//! # Example
//!
//! ```rust
//! use portal_content::EditableItems;
//!
//! let mut items = EditableItems::new();
//! items.set_region("main", "<p>Hello ]]> world</p>");
//!
//! let xml = items.content_xml().unwrap();
//! let reloaded = EditableItems::from_content_xml(&xml).unwrap();
//! assert_eq!(reloaded.get("MAIN"), Some("<p>Hello ]]> world</p>"));
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

mod editable;
mod error;
mod multikey;

pub use editable::EditableItems;
pub use error::{ContentError, ContentResult};
pub use multikey::{MultiKeyDictionary, KEY_SEPARATOR};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
