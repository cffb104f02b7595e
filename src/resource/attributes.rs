//! Ordered keyword/value storage for a single resource

use indexmap::IndexMap;

/// Ordered mapping of keyword to one or more string values
///
/// Insertion order is preserved. Setting an existing keyword replaces its
/// values without moving it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Attributes {
    entries: IndexMap<String, Vec<String>>,
}

impl Attributes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the first value of `key`
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .get(key)
            .and_then(|values| values.first())
            .map(String::as_str)
    }

    /// Returns every value of `key`
    pub fn values(&self, key: &str) -> Option<&[String]> {
        self.entries.get(key).map(Vec::as_slice)
    }

    /// Returns all values of `key` joined with `separator`
    pub fn joined(&self, key: &str, separator: &str) -> Option<String> {
        self.entries.get(key).map(|values| values.join(separator))
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Sets `key` to a single value
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.insert(key.into(), vec![value.into()]);
    }

    /// Sets `key` to a list of values
    pub fn set_values(&mut self, key: impl Into<String>, values: Vec<String>) {
        self.entries.insert(key.into(), values);
    }

    /// Removes `key`, keeping the order of the remaining keywords
    pub fn remove(&mut self, key: &str) -> Option<Vec<String>> {
        self.entries.shift_remove(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries
            .iter()
            .map(|(key, values)| (key.as_str(), values.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Copies every keyword of `other` into `self` with `suffix` appended
    ///
    /// When `only` is non-empty, just those keywords are copied.
    pub fn merge_suffixed(&mut self, other: &Attributes, suffix: &str, only: &[String]) {
        for (key, values) in other.iter() {
            if only.is_empty() || only.iter().any(|k| k == key) {
                self.set_values(format!("{key}{suffix}"), values.to_vec());
            }
        }
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Attributes {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut attributes = Attributes::new();
        for (key, value) in iter {
            attributes.set(key, value);
        }
        attributes
    }
}
