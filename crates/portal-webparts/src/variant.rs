//! Web-part variants
//!
//! A variant is an alternate configuration of a placed web part, used for
//! A/B (MVT) testing or content personalization. Variants live outside the
//! template XML; a [`VariantLoader`] fetches them on demand.

use crate::error::VariantLoadError;
use crate::instance::WebPartInstance;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt::{self, Display, Formatter};
use uuid::Uuid;

/// How the variants of an instance are chosen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VariantMode {
    /// No variants
    #[default]
    None,
    /// Multivariate testing
    Mvt,
    /// Content personalization
    ContentPersonalization,
    /// Both kinds were configured; neither applies
    Conflicted,
}

impl VariantMode {
    /// Attribute form
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Mvt => "mvt",
            Self::ContentPersonalization => "contentpersonalization",
            Self::Conflicted => "conflicted",
        }
    }

    /// Parse attribute form, unknown values map to `None`
    #[must_use]
    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "mvt" => Self::Mvt,
            "contentpersonalization" | "cp" => Self::ContentPersonalization,
            "conflicted" => Self::Conflicted,
            _ => Self::None,
        }
    }

    /// Check if variants should be loaded for this mode
    #[inline]
    #[must_use]
    pub fn has_variants(self) -> bool {
        matches!(self, Self::Mvt | Self::ContentPersonalization)
    }
}

impl Display for VariantMode {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Source of variant instances for a placed web part
#[cfg_attr(test, mockall::automock)]
pub trait VariantLoader {
    /// Fetch variants of `instance` for `mode`, optionally scoped to a document
    ///
    /// # Errors
    /// Returns error if the backing store cannot be queried
    fn load(
        &self,
        instance: &WebPartInstance,
        mode: VariantMode,
        document_id: Option<i64>,
    ) -> Result<Vec<WebPartInstance>, VariantLoadError>;
}

/// Variant registered with an [`InMemoryVariantLoader`]
#[derive(Debug, Clone)]
struct StoredVariant {
    document_id: Option<i64>,
    instance: WebPartInstance,
}

/// Variant store keyed by the parent instance GUID
#[derive(Debug, Clone, Default)]
pub struct InMemoryVariantLoader {
    variants: HashMap<(Uuid, VariantMode), Vec<StoredVariant>>,
}

impl InMemoryVariantLoader {
    /// Create empty loader
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a variant for the instance identified by `parent_guid`
    ///
    /// `document_id = None` makes the variant apply to every document.
    pub fn register(
        &mut self,
        parent_guid: Uuid,
        mode: VariantMode,
        document_id: Option<i64>,
        variant: WebPartInstance,
    ) {
        self.variants
            .entry((parent_guid, mode))
            .or_default()
            .push(StoredVariant {
                document_id,
                instance: variant,
            });
    }

    /// Number of registered variants
    #[must_use]
    pub fn len(&self) -> usize {
        self.variants.values().map(Vec::len).sum()
    }

    /// Check if no variant is registered
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl VariantLoader for InMemoryVariantLoader {
    fn load(
        &self,
        instance: &WebPartInstance,
        mode: VariantMode,
        document_id: Option<i64>,
    ) -> Result<Vec<WebPartInstance>, VariantLoadError> {
        let Some(guid) = instance.instance_guid() else {
            return Ok(Vec::new());
        };
        let found = self
            .variants
            .get(&(guid, mode))
            .map(|stored| {
                stored
                    .iter()
                    .filter(|v| v.document_id.is_none() || v.document_id == document_id)
                    .map(|v| v.instance.clone())
                    .collect()
            })
            .unwrap_or_default();
        Ok(found)
    }
}
