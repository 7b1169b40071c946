//! Storage boundary towards the shared document substrate.
//!
//! The engine only needs a key/value map and a mutable character sequence.
//! Merging concurrent changes is the substrate's business; the local
//! implementations here are plain single-process containers.

use std::collections::BTreeMap;
use std::fmt;

use serde_json::Value;

/// A mutable text buffer. Offsets are byte offsets and must lie on character
/// boundaries.
pub trait SharedText {
    fn snapshot(&self) -> String;
    fn len(&self) -> usize;
    fn insert(&mut self, at: usize, text: &str);
    fn delete(&mut self, at: usize, len: usize);

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Replaces the whole content.
    fn set(&mut self, text: &str) {
        let len = self.len();
        self.delete(0, len);
        self.insert(0, text);
    }
}

/// A map of scalar values.
pub trait KeyValue {
    fn get(&self, key: &str) -> Option<&Value>;
    fn set(&mut self, key: &str, value: Value);
    fn delete(&mut self, key: &str) -> Option<Value>;
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocalText(String);

impl LocalText {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl SharedText for LocalText {
    fn snapshot(&self) -> String {
        self.0.clone()
    }

    fn len(&self) -> usize {
        self.0.len()
    }

    #[track_caller]
    fn insert(&mut self, at: usize, text: &str) {
        self.0.insert_str(at, text);
    }

    #[track_caller]
    fn delete(&mut self, at: usize, len: usize) {
        self.0.replace_range(at..at + len, "");
    }
}

impl fmt::Display for LocalText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LocalMap(BTreeMap<String, Value>);

impl LocalMap {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0.iter().map(|(key, value)| (key.as_str(), value))
    }
}

impl KeyValue for LocalMap {
    fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    fn set(&mut self, key: &str, value: Value) {
        self.0.insert(key.to_owned(), value);
    }

    fn delete(&mut self, key: &str) -> Option<Value> {
        self.0.remove(key)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{KeyValue, LocalMap, LocalText, SharedText};

    #[test]
    fn text_edits() {
        let mut text = LocalText::new("hello world");
        text.delete(5, 6);
        text.insert(5, ", there");
        assert_eq!(text.snapshot(), "hello, there");
        text.set("");
        assert!(text.is_empty());
    }

    #[test]
    fn map_set_and_delete() {
        let mut map = LocalMap::default();
        map.set("position", json!({ "x": 1.0, "y": 2.0 }));
        assert_eq!(map.get("position"), Some(&json!({ "x": 1.0, "y": 2.0 })));
        assert_eq!(map.delete("position"), Some(json!({ "x": 1.0, "y": 2.0 })));
        assert!(map.is_empty());
    }
}
