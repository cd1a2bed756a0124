//! Dictionary with composite aliasing keys
//!
//! Provides [`MultiKeyDictionary`]: a case-insensitive map where a key such as
//! `"header;footer"` stores one value that is reachable through `"header"`,
//! `"footer"` and the full composite key alike.

use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

/// Separator between the components of a composite key
pub const KEY_SEPARATOR: char = ';';

/// Case-insensitive dictionary where composite keys alias one value slot
///
/// Main keys are stored normalized: components trimmed, lower-cased, empty
/// components dropped, rejoined with `;`. Every component of a composite main
/// key is indexed to point at the owning main key.
///
/// # Invariants
/// - A sub-key points at exactly one composite main key.
/// - A sub-key never also exists as a standalone main key.
/// - Re-assigning a composite main key first drops every alias that pointed
///   at it, then registers its current components.
/// - A stored composite key lists exactly the sub-keys that point at it. A
///   slot that loses a sub-key to another composite is re-keyed to what is
///   left, so replaying the stored keys in any order rebuilds the same state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MultiKeyDictionary<V> {
    /// Main key -> value, ordered for deterministic iteration
    #[serde(flatten)]
    values: BTreeMap<String, V>,

    /// Sub-key -> owning composite main key
    #[serde(skip)]
    sub_keys: HashMap<String, String>,
}

impl<V> Default for MultiKeyDictionary<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> MultiKeyDictionary<V> {
    /// Create empty dictionary
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self {
            values: BTreeMap::new(),
            sub_keys: HashMap::new(),
        }
    }

    /// Normalize a raw key: trim, lower-case and sort components, drop empty
    /// and repeated ones
    ///
    /// `"B; a;"` becomes `"a;b"`, and `"a;"` becomes the single key `"a"`.
    /// Composites naming the same components are the same key whatever their
    /// order.
    #[must_use]
    pub fn normalize_key(key: &str) -> String {
        let mut parts: Vec<String> = key
            .split(KEY_SEPARATOR)
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(str::to_lowercase)
            .collect();
        parts.sort_unstable();
        parts.dedup();
        parts.join(";")
    }

    /// Main key that owns the slot reachable through `key`
    ///
    /// Composite keys resolve to themselves; single keys resolve through the
    /// alias index and otherwise to themselves. Blank keys resolve to `None`.
    #[must_use]
    pub fn main_key(&self, key: &str) -> Option<String> {
        let key = Self::normalize_key(key);
        if key.is_empty() {
            return None;
        }
        if key.contains(KEY_SEPARATOR) {
            return Some(key);
        }
        match self.sub_keys.get(&key) {
            Some(main) => Some(main.clone()),
            None => Some(key),
        }
    }

    /// Store a value, returning the value previously held by the slot
    ///
    /// A composite key claims each of its components; a single key that is an
    /// alias writes through to its owning slot. Blank keys are ignored.
    pub fn insert(&mut self, key: &str, value: V) -> Option<V> {
        let main = Self::normalize_key(key);
        if main.is_empty() {
            tracing::debug!(key, "ignoring blank dictionary key");
            return None;
        }

        if !main.contains(KEY_SEPARATOR) {
            let target = self.sub_keys.get(&main).cloned().unwrap_or(main);
            return self.values.insert(target, value);
        }

        // Drop stale aliases of this slot before re-registering its components.
        self.detach_aliases(&main);

        let parts: Vec<String> = main.split(KEY_SEPARATOR).map(str::to_string).collect();
        for part in &parts {
            if let Some(owner) = self.sub_keys.get(part).cloned() {
                if owner != main {
                    self.release_sub_key(&owner, part);
                }
            }
            self.values.remove(part);
        }
        for part in parts {
            self.sub_keys.insert(part, main.clone());
        }

        self.values.insert(main, value)
    }

    /// Value reachable through `key`
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&V> {
        let main = self.main_key(key)?;
        self.values.get(&main)
    }

    /// Mutable value reachable through `key`
    pub fn get_mut(&mut self, key: &str) -> Option<&mut V> {
        let main = self.main_key(key)?;
        self.values.get_mut(&main)
    }

    /// Check whether `key` reaches a value
    #[inline]
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Remove the slot reachable through `key` together with all its aliases
    pub fn remove(&mut self, key: &str) -> Option<V> {
        let main = self.main_key(key)?;
        let value = self.values.remove(&main)?;
        self.detach_aliases(&main);
        Some(value)
    }

    /// Number of stored slots (aliases are not counted)
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Check if no slot is stored
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Remove all slots and aliases
    pub fn clear(&mut self) {
        self.values.clear();
        self.sub_keys.clear();
    }

    /// Slots ordered by main key
    pub fn iter(&self) -> impl Iterator<Item = (&str, &V)> {
        self.values.iter().map(|(key, value)| (key.as_str(), value))
    }

    /// Main keys in order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    /// Sub-keys currently aliasing `main`, sorted
    #[must_use]
    pub fn aliases_of(&self, main: &str) -> Vec<&str> {
        let main = Self::normalize_key(main);
        let mut aliases: Vec<&str> = self
            .sub_keys
            .iter()
            .filter(|(_, owner)| **owner == main)
            .map(|(sub, _)| sub.as_str())
            .collect();
        aliases.sort_unstable();
        aliases
    }

    fn detach_aliases(&mut self, main: &str) {
        self.sub_keys.retain(|_, owner| owner != main);
    }

    /// Take `part` away from the composite slot `owner`
    ///
    /// The slot is re-keyed to its remaining components so its stored key
    /// never names a sub-key it no longer owns.
    fn release_sub_key(&mut self, owner: &str, part: &str) {
        self.sub_keys.remove(part);
        let Some(value) = self.values.remove(owner) else {
            return;
        };
        let remaining: Vec<&str> = owner
            .split(KEY_SEPARATOR)
            .filter(|component| *component != part)
            .collect();
        if remaining.is_empty() {
            return;
        }

        let rekeyed = remaining.join(";");
        if remaining.len() == 1 {
            self.sub_keys.remove(&rekeyed);
        } else {
            for component in &remaining {
                self.sub_keys.insert((*component).to_string(), rekeyed.clone());
            }
        }
        tracing::debug!(sub_key = part, from = owner, to = %rekeyed, "re-keyed slot after losing sub-key");
        self.values.insert(rekeyed, value);
    }
}

impl<'a, V> IntoIterator for &'a MultiKeyDictionary<V> {
    type Item = (&'a String, &'a V);
    type IntoIter = std::collections::btree_map::Iter<'a, String, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.iter()
    }
}
