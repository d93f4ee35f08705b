//! Case-insensitive header multimap

use serde::{Deserialize, Serialize};

/// One header name with every value it appeared with
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeaderEntry {
    /// Name as first seen in the message
    pub name: String,

    /// Raw values in order of appearance
    pub values: Vec<String>,
}

/// Header name to values map with case-insensitive keys.
///
/// Names are compared ASCII case-insensitively on every insert and lookup.
/// Iteration follows the order in which each name first appeared.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HeaderMap {
    entries: Vec<HeaderEntry>,
}

impl HeaderMap {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Append a value under `name`, keeping any earlier values.
    pub fn append(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.position(&name) {
            Some(idx) => self.entries[idx].values.push(value),
            None => self.entries.push(HeaderEntry {
                name,
                values: vec![value],
            }),
        }
    }

    /// All values stored under `name`
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&[String]> {
        self.position(name)
            .map(|idx| self.entries[idx].values.as_slice())
    }

    /// First value stored under `name`
    #[must_use]
    pub fn get_first(&self, name: &str) -> Option<&str> {
        self.get(name)
            .and_then(<[String]>::first)
            .map(String::as_str)
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    /// Number of distinct header names
    #[must_use]
    pub const fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &HeaderEntry> {
        self.entries.iter()
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.entries
            .iter()
            .position(|entry| entry.name.eq_ignore_ascii_case(name))
    }
}

impl<'a> IntoIterator for &'a HeaderMap {
    type Item = &'a HeaderEntry;
    type IntoIter = std::slice::Iter<'a, HeaderEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl<K, V> FromIterator<(K, V)> for HeaderMap
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (name, value) in iter {
            map.append(name, value);
        }
        map
    }
}
