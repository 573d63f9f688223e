use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Key/value custom properties attached to objects and to the scene
///
/// Values are JSON so the host can store anything from a boolean tag to a
/// serialized backup record. Keys are ordered for stable serialization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct CustomProps {
    data: BTreeMap<String, serde_json::Value>,
}

impl CustomProps {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a value by key
    pub fn get(&self, key: &str) -> Option<&serde_json::Value> {
        self.data.get(key)
    }

    /// Get a boolean value; non-boolean values read as `None`
    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.data.get(key).and_then(serde_json::Value::as_bool)
    }

    /// Set a value by key
    pub fn set(&mut self, key: impl Into<String>, value: serde_json::Value) {
        self.data.insert(key.into(), value);
    }

    /// Remove a value by key
    pub fn remove(&mut self, key: &str) -> Option<serde_json::Value> {
        self.data.remove(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.data.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.data.keys()
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_set_get_remove() {
        let mut props = CustomProps::new();
        props.set("QGS", json!(true));
        props.set("note", json!("hand-made"));

        assert_eq!(props.get_bool("QGS"), Some(true));
        assert_eq!(props.get_bool("note"), None);
        assert_eq!(props.len(), 2);

        assert_eq!(props.remove("QGS"), Some(json!(true)));
        assert!(props.remove("QGS").is_none());
        assert!(!props.contains_key("QGS"));
    }

    #[test]
    fn test_serializes_as_plain_object() {
        let mut props = CustomProps::new();
        props.set("b", json!(1));
        props.set("a", json!(2));
        let text = serde_json::to_string(&props).unwrap();
        assert_eq!(text, r#"{"a":2,"b":1}"#);
    }
}
