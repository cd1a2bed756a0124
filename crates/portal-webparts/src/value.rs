//! Typed property values
//!
//! Provides [`PropertyValue`]. A property is either a concrete value or an
//! unresolved macro expression; the macro flag travels with the value.

use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};
use uuid::Uuid;

/// Value stored in a web-part or zone property bag
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum PropertyValue {
    /// Literal text (everything loaded from XML starts here)
    Text(String),
    /// Boolean flag
    Bool(bool),
    /// Integer
    Int(i64),
    /// Identifier
    Guid(Uuid),
    /// Unresolved macro expression
    Macro(String),
}

impl PropertyValue {
    /// Check if value is an unresolved macro
    #[inline]
    #[must_use]
    pub fn is_macro(&self) -> bool {
        matches!(self, Self::Macro(_))
    }

    /// Literal text, `None` for non-text values
    #[inline]
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Lenient boolean view
    ///
    /// Text accepts `true`/`false`, `1`/`0`, `yes`/`no`, `on`/`off`.
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(value) => Some(*value),
            Self::Int(value) => Some(*value != 0),
            Self::Text(text) => parse_bool(text),
            Self::Guid(_) | Self::Macro(_) => None,
        }
    }

    /// Lenient integer view
    #[must_use]
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(value) => Some(*value),
            Self::Bool(value) => Some(i64::from(*value)),
            Self::Text(text) => text.trim().parse().ok(),
            Self::Guid(_) | Self::Macro(_) => None,
        }
    }

    /// Lenient identifier view
    #[must_use]
    pub fn as_guid(&self) -> Option<Uuid> {
        match self {
            Self::Guid(value) => Some(*value),
            Self::Text(text) => Uuid::parse_str(text.trim()).ok(),
            _ => None,
        }
    }

    /// Text usable in a resolved string, `None` for macros
    #[must_use]
    pub fn resolved_text(&self) -> Option<String> {
        if self.is_macro() {
            None
        } else {
            Some(self.to_string())
        }
    }
}

impl Display for PropertyValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(text) | Self::Macro(text) => f.write_str(text),
            Self::Bool(value) => write!(f, "{value}"),
            Self::Int(value) => write!(f, "{value}"),
            Self::Guid(value) => write!(f, "{}", value.hyphenated()),
        }
    }
}

impl From<&str> for PropertyValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for PropertyValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<bool> for PropertyValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for PropertyValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<i32> for PropertyValue {
    fn from(value: i32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<Uuid> for PropertyValue {
    fn from(value: Uuid) -> Self {
        Self::Guid(value)
    }
}

impl PropertyValue {
    /// Persisted type tag, `None` for text and macros
    pub(crate) fn type_tag(&self) -> Option<&'static str> {
        match self {
            Self::Bool(_) => Some("bool"),
            Self::Int(_) => Some("int"),
            Self::Guid(_) => Some("guid"),
            Self::Text(_) | Self::Macro(_) => None,
        }
    }

    /// Rebuild a typed value from its tag and persisted text
    ///
    /// `None` when the tag is unknown or the text does not parse.
    pub(crate) fn from_tagged(tag: &str, text: &str) -> Option<Self> {
        match tag.trim().to_ascii_lowercase().as_str() {
            "bool" => parse_bool(text).map(Self::Bool),
            "int" => text.trim().parse().ok().map(Self::Int),
            "guid" => Uuid::parse_str(text.trim()).ok().map(Self::Guid),
            _ => None,
        }
    }
}

/// Lenient boolean parse shared by attributes and property values
pub(crate) fn parse_bool(text: &str) -> Option<bool> {
    match text.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_coerces_leniently() {
        assert_eq!(PropertyValue::from("True").as_bool(), Some(true));
        assert_eq!(PropertyValue::from(" 0 ").as_bool(), Some(false));
        assert_eq!(PropertyValue::from("maybe").as_bool(), None);
        assert_eq!(PropertyValue::from(" 42").as_int(), Some(42));
        assert_eq!(PropertyValue::from("x").as_int(), None);
    }

    #[test]
    fn guid_from_text() {
        let id = Uuid::new_v4();
        assert_eq!(PropertyValue::from(id.to_string()).as_guid(), Some(id));
        assert_eq!(PropertyValue::Guid(id).to_string(), id.hyphenated().to_string());
    }

    #[test]
    fn macro_is_not_resolvable_text() {
        let value = PropertyValue::Macro("{%CurrentUser.UserName%}".to_string());
        assert!(value.is_macro());
        assert_eq!(value.resolved_text(), None);
        assert_eq!(value.as_text(), None);
        assert_eq!(value.to_string(), "{%CurrentUser.UserName%}");
    }

    #[test]
    fn tagged_values_rebuild() {
        let id = Uuid::new_v4();
        for value in [PropertyValue::Bool(false), PropertyValue::Int(-640), PropertyValue::Guid(id)] {
            let tag = value.type_tag().unwrap();
            assert_eq!(PropertyValue::from_tagged(tag, &value.to_string()), Some(value));
        }
        assert_eq!(PropertyValue::from("640").type_tag(), None);
        assert_eq!(PropertyValue::from_tagged("int", "wide"), None);
        assert_eq!(PropertyValue::from_tagged("colour", "red"), None);
    }

    #[test]
    fn display_of_scalars() {
        assert_eq!(PropertyValue::Bool(true).to_string(), "true");
        assert_eq!(PropertyValue::Int(-3).to_string(), "-3");
        assert_eq!(PropertyValue::from(7).as_int(), Some(7));
        assert_eq!(PropertyValue::Bool(true).as_int(), Some(1));
    }
}
