//! # Header Map
//!
//! The raw, already-signature-verified but untyped body of an assertion: a
//! mapping from field name to string value. Produced by an external decoder
//! and consumed by the per-kind builders in `attest-asserts`.
//!
//! Keys iterate in sorted order, so two maps holding the same fields compare
//! and render identically regardless of insertion order.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// An ordered mapping from header name to string value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HeaderMap(BTreeMap<String, String>);

impl HeaderMap {
    /// An empty header map.
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Look up a header value.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    /// Whether the header is present (possibly empty).
    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    /// Insert or replace a header, returning the previous value.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.0.insert(name.into(), value.into())
    }

    /// Builder-style insert, for constructing maps inline.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(name, value);
        self
    }

    /// Remove a header, returning its value.
    pub fn remove(&mut self, name: &str) -> Option<String> {
        self.0.remove(name)
    }

    /// Number of headers.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if there are no headers.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over `(name, value)` pairs in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K, V> FromIterator<(K, V)> for HeaderMap
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

impl From<BTreeMap<String, String>> for HeaderMap {
    fn from(map: BTreeMap<String, String>) -> Self {
        Self(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_and_contains() {
        let headers = HeaderMap::new().with("subject-id", "s1").with("grade", "");
        assert_eq!(headers.get("subject-id"), Some("s1"));
        assert!(headers.contains("grade"));
        assert_eq!(headers.get("grade"), Some(""));
        assert_eq!(headers.get("missing"), None);
        assert_eq!(headers.len(), 2);
    }

    #[test]
    fn iteration_is_key_ordered() {
        let headers: HeaderMap = [("b", "2"), ("a", "1"), ("c", "3")].into_iter().collect();
        let keys: Vec<&str> = headers.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["a", "b", "c"]);
    }

    #[test]
    fn equality_ignores_insertion_order() {
        let a = HeaderMap::new().with("x", "1").with("y", "2");
        let b = HeaderMap::new().with("y", "2").with("x", "1");
        assert_eq!(a, b);
    }

    #[test]
    fn insert_replaces_and_remove() {
        let mut headers = HeaderMap::new();
        assert_eq!(headers.insert("size", "1"), None);
        assert_eq!(headers.insert("size", "2"), Some("1".to_string()));
        assert_eq!(headers.remove("size"), Some("2".to_string()));
        assert!(headers.is_empty());
    }

    #[test]
    fn serializes_as_plain_object() {
        let headers = HeaderMap::new().with("grade", "stable");
        let json = serde_json::to_string(&headers).unwrap();
        assert_eq!(json, r#"{"grade":"stable"}"#);
        let back: HeaderMap = serde_json::from_str(&json).unwrap();
        assert_eq!(back, headers);
    }
}
