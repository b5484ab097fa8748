//! The key/value mapping held for one INI section.

use std::collections::HashMap;

use serde::Serialize;

/// The keys and values of a single section.
///
/// Keys are unique, trimmed and case-sensitive. Values are trimmed and have
/// their inline comment removed. Listing order is unspecified.
///
/// Equality is structural: two sections are equal when they hold the same
/// key/value pairs, regardless of the order they were read in.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Section {
    entries: HashMap<String, String>,
}

impl Section {
    /// Creates an empty section.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a pair unless the key is already present.
    ///
    /// Returns `false` when the key was already taken; the stored value is
    /// left untouched.
    pub(crate) fn insert_first(&mut self, key: &str, value: &str) -> bool {
        if self.entries.contains_key(key) {
            return false;
        }
        self.entries.insert(key.to_string(), value.to_string());
        true
    }

    /// Returns the value stored under `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// Checks whether `key` is present.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// All keys in the section.
    #[must_use]
    pub fn keys(&self) -> Vec<&str> {
        self.entries.keys().map(String::as_str).collect()
    }

    /// All key/value pairs in the section.
    #[must_use]
    pub fn pairs(&self) -> Vec<(&str, &str)> {
        self.entries
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_str()))
            .collect()
    }

    /// Number of keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the section has no keys.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
