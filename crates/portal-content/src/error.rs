//! Error types for editable content handling

use portal_xml::XmlError;

/// Errors while loading or saving editable content
#[derive(Debug, thiserror::Error)]
pub enum ContentError {
    /// Underlying XML failure
    #[error("xml error: {0}")]
    Xml(#[from] XmlError),

    /// Document root is not `<content>`
    #[error("unexpected root element <{found}>, expected <content>")]
    UnexpectedRoot { found: String },
}

/// Result type alias for content operations
pub type ContentResult<T> = Result<T, ContentError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unexpected_root_display() {
        let err = ContentError::UnexpectedRoot {
            found: "page".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "unexpected root element <page>, expected <content>"
        );
    }

    #[test]
    fn xml_conversion() {
        let err: ContentError = XmlError::EmptyDocument.into();
        assert!(matches!(err, ContentError::Xml(XmlError::EmptyDocument)));
    }
}
