//! Property values and value kinds

use crate::foundation::color::Color;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The closed set of kinds a schema property can have
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueKind {
    /// `true` / `false`
    Boolean,
    /// 64-bit float, optionally clamped into a range
    Number,
    /// Free text
    String,
    /// RGB color
    Color,
    /// Name of another typed resource, normally restricted by `one_of`
    Reference,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Boolean => "boolean",
            Self::Number => "number",
            Self::String => "string",
            Self::Color => "color",
            Self::Reference => "reference",
        };
        f.write_str(name)
    }
}

/// A configuration value
///
/// User configuration usually arrives as [`Value::Text`] and is coerced to
/// the property's kind by the resolver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// Boolean value
    Bool(bool),
    /// Numeric value
    Number(f64),
    /// Text value
    Text(String),
    /// Color value
    Color(Color),
    /// Reference to a named resource
    Reference(String),
}

impl Value {
    /// The kind this value belongs to
    pub fn kind(&self) -> ValueKind {
        match self {
            Self::Bool(_) => ValueKind::Boolean,
            Self::Number(_) => ValueKind::Number,
            Self::Text(_) => ValueKind::String,
            Self::Color(_) => ValueKind::Color,
            Self::Reference(_) => ValueKind::Reference,
        }
    }

    /// Boolean payload, if this is a boolean
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(value) => Some(*value),
            _ => None,
        }
    }

    /// Numeric payload, if this is a number
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(value) => Some(*value),
            _ => None,
        }
    }

    /// Text payload for text and reference values
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(value) | Self::Reference(value) => Some(value),
            _ => None,
        }
    }

    /// Color payload, if this is a color
    pub fn as_color(&self) -> Option<Color> {
        match self {
            Self::Color(value) => Some(*value),
            _ => None,
        }
    }

    /// Build a reference value
    pub fn reference(name: impl Into<String>) -> Self {
        Self::Reference(name.into())
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(value) => write!(f, "{value}"),
            Self::Number(value) => write!(f, "{value}"),
            Self::Text(value) | Self::Reference(value) => f.write_str(value),
            Self::Color(value) => write!(f, "{value}"),
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<f32> for Value {
    fn from(value: f32) -> Self {
        Self::Number(f64::from(value))
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Self::Number(f64::from(value))
    }
}

impl From<u32> for Value {
    fn from(value: u32) -> Self {
        Self::Number(f64::from(value))
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<Color> for Value {
    fn from(value: Color) -> Self {
        Self::Color(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kinds_and_accessors() {
        assert_eq!(Value::from(true).kind(), ValueKind::Boolean);
        assert_eq!(Value::from(2).as_number(), Some(2.0));
        assert_eq!(Value::reference("phong").as_str(), Some("phong"));
        assert_eq!(Value::from("box").kind(), ValueKind::String);
        assert_eq!(Value::from(Color::from_hex(0xff0000)).kind(), ValueKind::Color);
        assert_eq!(Value::from(1.5).as_bool(), None);
    }

    #[test]
    fn test_display() {
        assert_eq!(Value::from(1.0).to_string(), "1");
        assert_eq!(Value::from(0.5).to_string(), "0.5");
        assert_eq!(Value::from(Color::from_hex(0x00ff00)).to_string(), "#00ff00");
        assert_eq!(ValueKind::Reference.to_string(), "reference");
    }

    #[test]
    fn test_untagged_deserialization_from_ron() {
        let values: Vec<Value> = ron::from_str(r#"[true, 3, 2.5, "red"]"#).expect("valid ron");
        assert_eq!(
            values,
            vec![
                Value::Bool(true),
                Value::Number(3.0),
                Value::Number(2.5),
                Value::Text("red".to_string()),
            ]
        );
    }
}
