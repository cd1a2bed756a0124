//! Property macro handling
//!
//! Two concerns live here:
//! - [`resolve_property_macros`] substitutes `{%name%}` tokens with property
//!   values of the same instance.
//! - [`MacroTransformation`] is the escaping policy applied to macro property
//!   values when they are written back to XML. Evaluating macro expressions is
//!   not done here.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;

static PROPERTY_MACRO: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\{%\s*([A-Za-z_][A-Za-z0-9_.]*)\s*%\}").expect("property macro pattern is valid")
});

/// Replace `{%name%}` tokens using `lookup`
///
/// Tokens whose name `lookup` cannot resolve are left untouched.
pub fn resolve_property_macros<F>(input: &str, mut lookup: F) -> Cow<'_, str>
where
    F: FnMut(&str) -> Option<String>,
{
    if !input.contains("{%") {
        return Cow::Borrowed(input);
    }
    PROPERTY_MACRO.replace_all(input, |caps: &Captures<'_>| {
        lookup(&caps[1]).unwrap_or_else(|| caps[0].to_string())
    })
}

/// Escaping policy for macro property values on save
pub trait MacroTransformation {
    /// Transform `expression` stored under `property`
    fn transform(&self, property: &str, expression: &str) -> String;
}

impl<F> MacroTransformation for F
where
    F: Fn(&str, &str) -> String,
{
    fn transform(&self, property: &str, expression: &str) -> String {
        self(property, expression)
    }
}

/// Writes macro expressions unchanged
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityTransformation;

impl MacroTransformation for IdentityTransformation {
    fn transform(&self, _property: &str, expression: &str) -> String {
        expression.to_string()
    }
}

/// Configurable macro escaping policy
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MacroEscape {
    /// Keep expressions exactly as stored
    #[default]
    Preserve,
    /// Trim and make sure the expression is wrapped as `{%expr%}`
    Normalize,
}

impl MacroTransformation for MacroEscape {
    fn transform(&self, _property: &str, expression: &str) -> String {
        match self {
            Self::Preserve => expression.to_string(),
            Self::Normalize => {
                let trimmed = expression.trim();
                let inner = trimmed
                    .strip_prefix("{%")
                    .and_then(|rest| rest.strip_suffix("%}"))
                    .unwrap_or(trimmed)
                    .trim();
                format!("{{%{inner}%}}")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lookup(name: &str) -> Option<String> {
        match name {
            "title" => Some("Welcome".to_string()),
            "count" => Some("3".to_string()),
            "empty" => Some(String::new()),
            _ => None,
        }
    }

    #[test]
    fn resolves_known_tokens() {
        assert_eq!(
            resolve_property_macros("<h1>{%title%}</h1> x{% count %}", lookup),
            "<h1>Welcome</h1> x3"
        );
    }

    #[test]
    fn unknown_tokens_are_kept() {
        assert_eq!(
            resolve_property_macros("{%missing%} and {%CurrentDocument.Name%}", lookup),
            "{%missing%} and {%CurrentDocument.Name%}"
        );
    }

    #[test]
    fn empty_value_resolves_to_nothing() {
        assert_eq!(resolve_property_macros("[{%empty%}]", lookup), "[]");
    }

    #[test]
    fn input_without_tokens_is_borrowed() {
        assert!(matches!(
            resolve_property_macros("plain", lookup),
            Cow::Borrowed("plain")
        ));
    }

    #[test]
    fn normalize_wraps_bare_expressions() {
        let policy = MacroEscape::Normalize;
        assert_eq!(policy.transform("p", " CurrentUser.UserName "), "{%CurrentUser.UserName%}");
        assert_eq!(policy.transform("p", "{%  a + b %}"), "{%a + b%}");
        assert_eq!(MacroEscape::Preserve.transform("p", " x "), " x ");
    }

    #[test]
    fn closures_are_transformations() {
        let upper = |_: &str, expr: &str| expr.to_uppercase();
        assert_eq!(upper.transform("p", "abc"), "ABC");
        assert_eq!(IdentityTransformation.transform("p", "abc"), "abc");
    }
}
