//! User-supplied and canonical configurations

use super::value::Value;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Partial, unvalidated configuration supplied by scene authors
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserConfig {
    values: BTreeMap<String, Value>,
}

impl UserConfig {
    /// Create an empty configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a value (builder pattern)
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    /// Insert or replace a value, returning the previous one
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.values.insert(key.into(), value.into())
    }

    /// Look up a value
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    /// Whether a value was supplied for `key`
    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Remove a value
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.values.remove(key)
    }

    /// Values sorted by key
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.values.iter().map(|(key, value)| (key.as_str(), value))
    }

    /// Overlay `other` on top of this configuration
    pub fn merge(&mut self, other: &Self) {
        for (key, value) in &other.values {
            self.values.insert(key.clone(), value.clone());
        }
    }

    /// Number of supplied values
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether nothing was supplied
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for UserConfig {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        }
    }
}

/// Fully resolved configuration, one entry per schema property in
/// declaration order
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CanonicalConfig {
    entries: Vec<(String, Value)>,
}

impl CanonicalConfig {
    /// Create an empty configuration
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, key: impl Into<String>, value: Value) {
        self.entries.push((key.into(), value));
    }

    pub(crate) fn get_mut(&mut self, key: &str) -> Option<&mut Value> {
        self.entries
            .iter_mut()
            .find(|(existing, _)| existing == key)
            .map(|(_, value)| value)
    }

    /// Look up a value
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries
            .iter()
            .find(|(existing, _)| existing == key)
            .map(|(_, value)| value)
    }

    /// Whether the configuration has a field named `key`
    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Field names in declaration order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(key, _)| key.as_str())
    }

    /// Fields in declaration order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(key, value)| (key.as_str(), value))
    }

    /// Number of fields
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether there are no fields
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_config_merge_overrides() {
        let mut base = UserConfig::new().with("width", 1.0).with("color", "red");
        base.merge(&UserConfig::new().with("width", 3.0));
        assert_eq!(base.get("width"), Some(&Value::Number(3.0)));
        assert_eq!(base.get("color"), Some(&Value::Text("red".to_string())));
        assert_eq!(base.len(), 2);
    }

    #[test]
    fn test_user_config_from_ron_map() {
        let config: UserConfig =
            ron::from_str(r#"{"primitive": "sphere", "radius": 2}"#).expect("valid ron");
        assert_eq!(config.get("radius"), Some(&Value::Number(2.0)));
        assert!(config.contains("primitive"));
    }

    #[test]
    fn test_canonical_config_keeps_order() {
        let mut config = CanonicalConfig::new();
        config.push("b", Value::Bool(true));
        config.push("a", Value::Number(1.0));
        assert_eq!(config.keys().collect::<Vec<_>>(), vec!["b", "a"]);
        if let Some(value) = config.get_mut("a") {
            *value = Value::Number(2.0);
        }
        assert_eq!(config.get("a"), Some(&Value::Number(2.0)));
        assert!(!config.contains_key("c"));
    }
}
