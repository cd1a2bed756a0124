//! Error types for the web-part configuration model
//!
//! Load failures carry a fixed prefix naming the loader that rejected the
//! node, so page-compile error logs point straight at the bad template.

use portal_xml::XmlError;

/// Errors while loading, saving or editing web-part configuration
#[derive(Debug, thiserror::Error)]
pub enum WebPartError {
    /// Required `<webpart>` attribute missing or blank
    #[error("[WebPartInstance.LoadFromXmlNode]: missing or empty '{attribute}' attribute")]
    MissingAttribute { attribute: &'static str },

    /// `<webpartzone>` without an id
    #[error("[WebPartZoneInstance.LoadFromXmlNode]: missing or empty 'id' attribute")]
    MissingZoneId,

    /// Node has the wrong element name
    #[error("unexpected element <{found}>, expected <{expected}>")]
    UnexpectedElement {
        expected: &'static str,
        found: String,
    },

    /// Zone lookup failed
    #[error("zone not found: {0}")]
    ZoneNotFound(String),

    /// Web part lookup failed
    #[error("web part not found: {0}")]
    WebPartNotFound(String),

    /// Underlying XML failure
    #[error("xml error: {0}")]
    Xml(#[from] XmlError),

    /// Variant source failure
    #[error("variant load failed: {0}")]
    Variant(#[from] VariantLoadError),
}

impl WebPartError {
    /// Create unexpected element error
    pub fn unexpected_element(expected: &'static str, found: impl Into<String>) -> Self {
        Self::UnexpectedElement {
            expected,
            found: found.into(),
        }
    }
}

/// Errors raised by a [`crate::VariantLoader`]
#[derive(Debug, thiserror::Error)]
pub enum VariantLoadError {
    /// Backing store could not be queried
    #[error("variant source unavailable: {0}")]
    Unavailable(String),

    /// Stored variant could not be turned into an instance
    #[error("invalid variant definition for '{control_id}': {message}")]
    InvalidDefinition { control_id: String, message: String },
}

/// Result type alias for web-part operations
pub type WebPartResult<T> = Result<T, WebPartError>;
