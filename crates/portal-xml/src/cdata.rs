//! CDATA-safe escaping of stored markup
//!
//! Content blobs are written inside `<![CDATA[ ... ]]>`. A literal `]]>` in
//! the payload would terminate the section early, so it is stored as `]]#>`.

use std::borrow::Cow;

/// CDATA section terminator
pub const CDATA_END: &str = "]]>";

/// Stored replacement for [`CDATA_END`]
pub const ESCAPED_CDATA_END: &str = "]]#>";

/// Escape text for embedding in a CDATA section
#[must_use]
pub fn escape_cdata(text: &str) -> Cow<'_, str> {
    if text.contains(CDATA_END) {
        Cow::Owned(text.replace(CDATA_END, ESCAPED_CDATA_END))
    } else {
        Cow::Borrowed(text)
    }
}

/// Reverse [`escape_cdata`]
#[must_use]
pub fn unescape_cdata(text: &str) -> Cow<'_, str> {
    if text.contains(ESCAPED_CDATA_END) {
        Cow::Owned(text.replace(ESCAPED_CDATA_END, CDATA_END))
    } else {
        Cow::Borrowed(text)
    }
}
