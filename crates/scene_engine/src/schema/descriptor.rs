//! Schema and property descriptors

use super::value::{Value, ValueKind};
use crate::foundation::color::Color;
use serde::{Deserialize, Serialize};

/// Equality constraint on a sibling property
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Requirement {
    /// Sibling property name
    pub property: String,
    /// Value the sibling must resolve to
    pub value: Value,
}

/// Declarative description of a single schema property
///
/// The kind is derived from `kind`, then `default`, then `one_of[0]`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PropertyDescriptor {
    /// Explicit value kind
    pub kind: Option<ValueKind>,
    /// Fallback value when the user supplies none (or an invalid one)
    pub default: Option<Value>,
    /// Ordered list of permitted values
    pub one_of: Option<Vec<Value>>,
    /// Lower clamp bound for numbers
    pub min: Option<f64>,
    /// Upper clamp bound for numbers
    pub max: Option<f64>,
    /// Sibling constraints; the property is skipped when any is unmet
    pub requires: Vec<Requirement>,
}

impl PropertyDescriptor {
    /// Empty descriptor; at least a kind plus a default or a `one_of` list
    /// must be added before it resolves
    pub fn new() -> Self {
        Self::default()
    }

    /// Descriptor with an explicit kind
    pub fn of_kind(kind: ValueKind) -> Self {
        Self {
            kind: Some(kind),
            ..Self::default()
        }
    }

    /// Boolean property with a default
    pub fn boolean(default: bool) -> Self {
        Self::of_kind(ValueKind::Boolean).with_default(default)
    }

    /// Numeric property with a default
    pub fn number(default: f64) -> Self {
        Self::of_kind(ValueKind::Number).with_default(default)
    }

    /// Text property with a default
    pub fn string(default: impl Into<String>) -> Self {
        Self::of_kind(ValueKind::String).with_default(default.into())
    }

    /// Color property with a default
    pub fn color(default: Color) -> Self {
        Self::of_kind(ValueKind::Color).with_default(default)
    }

    /// Enumerated property; the first entry is the default
    pub fn one_of<I, V>(values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Self::default().with_one_of(values)
    }

    /// Reference to one of the named resources; the first entry is the default
    pub fn reference<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::of_kind(ValueKind::Reference)
            .with_one_of(names.into_iter().map(|name| Value::Reference(name.into())))
    }

    /// Set the kind (builder pattern)
    pub fn with_kind(mut self, kind: ValueKind) -> Self {
        self.kind = Some(kind);
        self
    }

    /// Set the default (builder pattern)
    pub fn with_default(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    /// Set the permitted values (builder pattern)
    pub fn with_one_of<I, V>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.one_of = Some(values.into_iter().map(Into::into).collect());
        self
    }

    /// Set both clamp bounds (builder pattern)
    pub fn range(mut self, min: f64, max: f64) -> Self {
        self.min = Some(min);
        self.max = Some(max);
        self
    }

    /// Set the lower clamp bound (builder pattern)
    pub fn with_min(mut self, min: f64) -> Self {
        self.min = Some(min);
        self
    }

    /// Set the upper clamp bound (builder pattern)
    pub fn with_max(mut self, max: f64) -> Self {
        self.max = Some(max);
        self
    }

    /// Add a sibling requirement (builder pattern)
    pub fn requires(mut self, property: impl Into<String>, value: impl Into<Value>) -> Self {
        self.requires.push(Requirement {
            property: property.into(),
            value: value.into(),
        });
        self
    }
}

/// Ordered mapping from property name to descriptor
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Schema {
    properties: Vec<(String, PropertyDescriptor)>,
}

impl Schema {
    /// Create an empty schema
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a property (builder pattern); redeclaring a name replaces it in place
    pub fn property(mut self, name: impl Into<String>, descriptor: PropertyDescriptor) -> Self {
        let name = name.into();
        match self.properties.iter_mut().find(|(existing, _)| *existing == name) {
            Some((_, slot)) => *slot = descriptor,
            None => self.properties.push((name, descriptor)),
        }
        self
    }

    /// Look up a property descriptor
    pub fn get(&self, name: &str) -> Option<&PropertyDescriptor> {
        self.properties
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, descriptor)| descriptor)
    }

    /// Whether the schema declares `name`
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Properties in declaration order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &PropertyDescriptor)> {
        self.properties
            .iter()
            .map(|(name, descriptor)| (name.as_str(), descriptor))
    }

    /// Number of declared properties
    pub fn len(&self) -> usize {
        self.properties.len()
    }

    /// Whether no properties are declared
    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }
}
