//! Inspector configuration
//!
//! Loaded from TOML:
//!
//! ```toml
//! macro_escape = "normalize"
//!
//! [write]
//! indent = 2
//! xml_declaration = true
//! ```

use anyhow::{Context, Result};
use portal_webparts::MacroEscape;
use portal_xml::WriteOptions;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// File picked up from the working directory when `--config` is not given
pub const DEFAULT_CONFIG_FILE: &str = "portal.toml";

/// Output settings used when documents are written back
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PortalConfig {
    /// XML formatting
    pub write: WriteOptions,
    /// Policy for macro property values
    pub macro_escape: MacroEscape,
}

impl PortalConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With write options
    #[inline]
    #[must_use]
    pub fn with_write_options(mut self, write: WriteOptions) -> Self {
        self.write = write;
        self
    }

    /// With macro escaping policy
    #[inline]
    #[must_use]
    pub fn with_macro_escape(mut self, macro_escape: MacroEscape) -> Self {
        self.macro_escape = macro_escape;
        self
    }

    /// Parse TOML text
    ///
    /// # Errors
    /// Returns error if the text is not a valid configuration
    pub fn from_toml_str(text: &str) -> Result<Self> {
        toml::from_str(text).context("invalid portal configuration")
    }

    /// Load a TOML file
    ///
    /// # Errors
    /// Returns error if the file cannot be read or parsed
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        Self::from_toml_str(&text).with_context(|| format!("in {}", path.display()))
    }

    /// Load `explicit` if given, else `portal.toml` from `dir` if present,
    /// else defaults
    ///
    /// # Errors
    /// Returns error if an explicitly requested file is missing or any
    /// loaded file is invalid
    pub fn resolve(explicit: Option<&Path>, dir: &Path) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }
        let fallback = dir.join(DEFAULT_CONFIG_FILE);
        if fallback.is_file() {
            tracing::debug!(path = %fallback.display(), "using config from working directory");
            return Self::load(&fallback);
        }
        Ok(Self::default())
    }
}
