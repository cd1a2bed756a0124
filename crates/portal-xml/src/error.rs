//! Error types for XML reading and writing

/// Errors raised while reading or writing portal XML
#[derive(Debug, thiserror::Error)]
pub enum XmlError {
    /// Input was empty or contained only whitespace/comments
    #[error("document has no root element")]
    EmptyDocument,

    /// Reader rejected the input
    #[error("malformed xml at byte {position}: {message}")]
    Malformed { position: u64, message: String },

    /// A second top-level element followed the root
    #[error("unexpected element <{0}> after document root")]
    MultipleRoots(String),

    /// Closing tag did not match the open element
    #[error("mismatched closing tag: expected </{expected}>, found </{found}>")]
    MismatchedTag { expected: String, found: String },

    /// CDATA payload contains a raw section terminator
    #[error("cdata content contains an unescaped section terminator")]
    UnescapedCData,

    /// Serialization failed
    #[error("xml write failed: {0}")]
    Write(String),
}

impl XmlError {
    /// Create malformed-input error
    pub fn malformed(position: u64, message: impl Into<String>) -> Self {
        Self::Malformed {
            position,
            message: message.into(),
        }
    }
}

/// Result type alias for XML operations
pub type XmlResult<T> = Result<T, XmlError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn malformed_display() {
        let err = XmlError::malformed(12, "unexpected eof");
        assert_eq!(err.to_string(), "malformed xml at byte 12: unexpected eof");
    }

    #[test]
    fn mismatched_display() {
        let err = XmlError::MismatchedTag {
            expected: "webpart".to_string(),
            found: "zone".to_string(),
        };
        assert!(err.to_string().contains("</webpart>"));
    }
}
