//! Component schemas and configuration resolution
//!
//! A [`Schema`] describes the properties a component accepts. The
//! [`resolve`] function turns a partial [`UserConfig`] into a
//! [`CanonicalConfig`] holding exactly one correctly-typed value per
//! applicable property, reporting recoverable problems as warnings.

pub mod config;
pub mod descriptor;
pub mod resolver;
pub mod value;

pub use config::{CanonicalConfig, UserConfig};
pub use descriptor::{PropertyDescriptor, Requirement, Schema};
pub use resolver::{resolve, Resolution};
pub use value::{Value, ValueKind};

/// Schema programming errors
///
/// These abort construction of the component that declared the schema.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum SchemaError {
    /// No kind, default or `one_of` entry to derive the kind from
    #[error("unable to derive the type of property '{property}'; declare a kind, a default or a one_of list")]
    NoDerivableKind {
        /// Offending property
        property: String,
    },

    /// `one_of` declared but empty
    #[error("property '{property}' declares an empty one_of list")]
    EmptyOneOf {
        /// Offending property
        property: String,
    },

    /// The fallback value is missing or fails validation
    #[error("property '{property}' has an invalid default: {reason}")]
    InvalidDefault {
        /// Offending property
        property: String,
        /// What is wrong with it
        reason: String,
    },

    /// `min` is greater than `max`
    #[error("property '{property}' has min {min} greater than max {max}")]
    InvalidRange {
        /// Offending property
        property: String,
        /// Declared lower bound
        min: f64,
        /// Declared upper bound
        max: f64,
    },
}

impl SchemaError {
    /// Property the error relates to
    pub fn property(&self) -> &str {
        match self {
            Self::NoDerivableKind { property }
            | Self::EmptyOneOf { property }
            | Self::InvalidDefault { property, .. }
            | Self::InvalidRange { property, .. } => property,
        }
    }
}
