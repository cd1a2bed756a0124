//! Portal Web Parts
//!
//! Configuration model for web parts placed on page templates.
//!
//! # Core Concepts
//!
//! - [`WebPartInstance`]: One placement of a web part with its properties,
//!   identity and variants; loaded from and saved to `<webpart>` XML
//! - [`WebPartZoneInstance`]: Ordered web parts of one page area
//! - [`PageTemplateInstance`]: Zones of a page template in document order
//! - [`VariantLoader`]: Injected source of MVT and personalization variants
//! - [`MacroTransformation`]: Policy applied to macro values on save
//!
//! # Example
//!
//! ```rust
//! use portal_webparts::{PropertyValue, WebPartInstance};
//!
//! let mut instance = WebPartInstance::new("text1", "statictext");
//! instance.set_value("Text", "Hello");
//! instance.set_value("visible", PropertyValue::Macro("{%CurrentUser.IsAuthenticated%}".into()));
//!
//! let xml = instance.to_xml().unwrap();
//! let reloaded = WebPartInstance::from_xml(&xml).unwrap();
//!
//! assert_eq!(reloaded.get_text("text").as_deref(), Some("Hello"));
//! assert!(reloaded.get_value("VISIBLE").unwrap().is_macro());
//! assert_eq!(reloaded.instance_guid(), instance.instance_guid());
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

mod error;
mod instance;
mod macros;
mod properties;
mod template;
mod value;
mod variant;
mod zone;

pub use error::{VariantLoadError, WebPartError, WebPartResult};
pub use instance::{WebPartInstance, CONTROL_ID_PROPERTY, CURRENT_XML_VERSION, WEBPART_ELEMENT};
pub use macros::{resolve_property_macros, IdentityTransformation, MacroEscape, MacroTransformation};
pub use properties::PropertyBag;
pub use template::{PageTemplateInstance, PAGE_ELEMENT};
pub use value::PropertyValue;
pub use variant::{InMemoryVariantLoader, VariantLoader, VariantMode};
pub use zone::{WebPartZoneInstance, ZONE_ELEMENT};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
