//! Schema resolution
//!
//! Walks the schema in declaration order. For every property whose
//! `requires` constraints hold, the user value is coerced to the property's
//! kind and checked against `one_of`; a value that fails either check is
//! replaced by the property's fallback (`default`, else `one_of[0]`) and a
//! warning is recorded. Schema mistakes are returned as [`SchemaError`].

use super::{
    CanonicalConfig, PropertyDescriptor, Schema, SchemaError, UserConfig, Value, ValueKind,
};
use crate::foundation::{color::Color, diagnostics::Diagnostic};

/// Output of [`resolve`]
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    /// The canonical configuration
    pub config: CanonicalConfig,
    /// Recoverable problems with the user configuration
    pub warnings: Vec<Diagnostic>,
}

/// Resolve `user` against `schema` on behalf of the component type `owner`
pub fn resolve(owner: &str, user: &UserConfig, schema: &Schema) -> Result<Resolution, SchemaError> {
    let plans = schema
        .iter()
        .map(|(name, descriptor)| PropertyPlan::new(name, descriptor))
        .collect::<Result<Vec<_>, _>>()?;

    let mut config = CanonicalConfig::new();
    let mut warnings = Vec::new();

    for plan in &plans {
        if !plan.requirements_met(&plans, user) {
            log::debug!("({owner}) skipping '{}': requirements not met", plan.name);
            continue;
        }

        let value = match user.get(plan.name) {
            Some(raw) => match plan.accept(raw) {
                Ok(value) => value,
                Err(rejection) => {
                    warnings.push(rejection.into_diagnostic(owner, plan, raw));
                    plan.fallback.clone()
                }
            },
            None => plan.fallback.clone(),
        };
        config.push(plan.name, value);
    }

    for (key, value) in user.iter() {
        if !schema.contains(key) {
            warnings.push(
                Diagnostic::warning(
                    "property is not declared in the component schema - property will be ignored",
                )
                .with_component(owner)
                .with_property(key)
                .with_context(value.to_string()),
            );
        }
    }

    Ok(Resolution { config, warnings })
}

/// A schema property with its derived kind and validated fallback
struct PropertyPlan<'s> {
    name: &'s str,
    descriptor: &'s PropertyDescriptor,
    kind: ValueKind,
    permitted: Option<Vec<Value>>,
    fallback: Value,
}

enum Rejection {
    WrongKind,
    NotPermitted,
}

impl<'s> PropertyPlan<'s> {
    fn new(name: &'s str, descriptor: &'s PropertyDescriptor) -> Result<Self, SchemaError> {
        let property = || name.to_string();

        if descriptor.one_of.as_ref().is_some_and(Vec::is_empty) {
            return Err(SchemaError::EmptyOneOf { property: property() });
        }
        if let (Some(min), Some(max)) = (descriptor.min, descriptor.max) {
            if min > max {
                return Err(SchemaError::InvalidRange { property: property(), min, max });
            }
        }

        let first_permitted = descriptor.one_of.as_ref().and_then(|values| values.first());
        let kind = descriptor
            .kind
            .or_else(|| descriptor.default.as_ref().map(Value::kind))
            .or_else(|| first_permitted.map(Value::kind))
            .ok_or_else(|| SchemaError::NoDerivableKind { property: property() })?;

        let permitted = descriptor
            .one_of
            .as_ref()
            .map(|values| {
                values
                    .iter()
                    .map(|value| {
                        coerce(value, kind, descriptor).ok_or_else(|| SchemaError::InvalidDefault {
                            property: property(),
                            reason: format!("one_of entry {value} is not of type '{kind}'"),
                        })
                    })
                    .collect::<Result<Vec<_>, _>>()
            })
            .transpose()?;

        let raw_fallback = descriptor.default.as_ref().or(first_permitted).ok_or_else(|| {
            SchemaError::InvalidDefault {
                property: property(),
                reason: "no default value or one_of list to fall back on".to_string(),
            }
        })?;
        let fallback = coerce(raw_fallback, kind, descriptor).ok_or_else(|| {
            SchemaError::InvalidDefault {
                property: property(),
                reason: format!("{raw_fallback} is not of type '{kind}'"),
            }
        })?;
        if permitted.as_ref().is_some_and(|values| !values.contains(&fallback)) {
            return Err(SchemaError::InvalidDefault {
                property: property(),
                reason: format!("{fallback} is not one of the permitted values"),
            });
        }

        Ok(Self {
            name,
            descriptor,
            kind,
            permitted,
            fallback,
        })
    }

    fn accept(&self, raw: &Value) -> Result<Value, Rejection> {
        let value = coerce(raw, self.kind, self.descriptor).ok_or(Rejection::WrongKind)?;
        match &self.permitted {
            Some(values) if !values.contains(&value) => Err(Rejection::NotPermitted),
            _ => Ok(value),
        }
    }

    /// Value this property would resolve to, ignoring its own requirements
    fn would_be(&self, user: &UserConfig) -> Value {
        user.get(self.name)
            .and_then(|raw| self.accept(raw).ok())
            .unwrap_or_else(|| self.fallback.clone())
    }

    fn requirements_met(&self, plans: &[PropertyPlan<'_>], user: &UserConfig) -> bool {
        self.descriptor.requires.iter().all(|requirement| {
            match plans.iter().find(|plan| plan.name == requirement.property) {
                Some(sibling) => {
                    let expected = coerce(&requirement.value, sibling.kind, sibling.descriptor)
                        .unwrap_or_else(|| requirement.value.clone());
                    sibling.would_be(user) == expected
                }
                None => user.get(&requirement.property) == Some(&requirement.value),
            }
        })
    }

    fn permitted_list(&self) -> String {
        self.permitted
            .as_ref()
            .map(|values| {
                values
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join(", ")
            })
            .unwrap_or_default()
    }
}

impl Rejection {
    fn into_diagnostic(self, owner: &str, plan: &PropertyPlan<'_>, raw: &Value) -> Diagnostic {
        let message = match self {
            Self::WrongKind => format!(
                "cannot set property to {raw} as it is not of type '{}' - applying the default value instead",
                plan.kind
            ),
            Self::NotPermitted => format!(
                "cannot set property to {raw} as it is not one of the permitted values [{}] - applying the default value instead",
                plan.permitted_list()
            ),
        };
        Diagnostic::warning(message)
            .with_component(owner)
            .with_property(plan.name)
            .with_context(format!("default: {}", plan.fallback))
    }
}

/// Coerce `raw` into `kind`, returning `None` when it cannot be represented
fn coerce(raw: &Value, kind: ValueKind, descriptor: &PropertyDescriptor) -> Option<Value> {
    match kind {
        ValueKind::Number => {
            let number = match raw {
                Value::Number(number) => *number,
                Value::Text(text) => text.trim().parse::<f64>().ok()?,
                _ => return None,
            };
            if number.is_nan() {
                return None;
            }
            let min = descriptor.min.unwrap_or(number);
            let max = descriptor.max.unwrap_or(number);
            Some(Value::Number(number.max(min).min(max)))
        }
        ValueKind::Boolean => Some(Value::Bool(match raw {
            Value::Bool(flag) => *flag,
            other => other.to_string().trim().eq_ignore_ascii_case("true"),
        })),
        ValueKind::String => Some(Value::Text(match raw {
            Value::Text(text) | Value::Reference(text) => text.clone(),
            other => other.to_string(),
        })),
        ValueKind::Color => match raw {
            Value::Color(color) => Some(Value::Color(*color)),
            Value::Text(text) => Color::parse(text).map(Value::Color),
            Value::Number(packed) if packed.fract() == 0.0 && (0.0..=16_777_215.0).contains(packed) => {
                #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
                let hex = *packed as u32;
                Some(Value::Color(Color::from_hex(hex)))
            }
            _ => None,
        },
        ValueKind::Reference => match raw {
            Value::Text(name) | Value::Reference(name) => Some(Value::Reference(name.clone())),
            _ => None,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::diagnostics::Severity;

    fn geometry_schema() -> Schema {
        Schema::new()
            .property("primitive", PropertyDescriptor::one_of(["box", "sphere", "plane"]))
            .property("width", PropertyDescriptor::number(1.0).with_min(0.0))
            .property(
                "radius",
                PropertyDescriptor::number(1.0).requires("primitive", "sphere"),
            )
            .property("wireframe", PropertyDescriptor::boolean(false))
            .property("color", PropertyDescriptor::color(Color::from_hex(0xffffff)))
    }

    #[test]
    fn test_defaults_fill_every_applicable_property() {
        let resolution = resolve("Geometry", &UserConfig::new(), &geometry_schema())
            .expect("schema is valid");

        let keys: Vec<_> = resolution.config.keys().collect();
        assert_eq!(keys, vec!["primitive", "width", "wireframe", "color"]);
        assert_eq!(resolution.config.get("primitive"), Some(&Value::from("box")));
        assert_eq!(resolution.config.get("wireframe"), Some(&Value::Bool(false)));
        assert!(resolution.warnings.is_empty());
    }

    #[test]
    fn test_requires_includes_property_when_met() {
        let user = UserConfig::new().with("primitive", "sphere").with("radius", "2.5");
        let resolution = resolve("Geometry", &user, &geometry_schema()).expect("schema is valid");
        assert_eq!(resolution.config.get("radius"), Some(&Value::Number(2.5)));
    }

    #[test]
    fn test_requires_uses_would_be_value_of_invalid_sibling() {
        // "cone" is rejected, so primitive resolves to "box" and radius is skipped
        let user = UserConfig::new().with("primitive", "cone").with("radius", 3.0);
        let resolution = resolve("Geometry", &user, &geometry_schema()).expect("schema is valid");
        assert!(!resolution.config.contains_key("radius"));
        assert_eq!(resolution.warnings.len(), 1);
    }

    #[test]
    fn test_clamping() {
        let schema = Schema::new().property("level", PropertyDescriptor::number(5.0).range(0.0, 10.0));

        let high = resolve("Dial", &UserConfig::new().with("level", 15), &schema).expect("valid");
        assert_eq!(high.config.get("level"), Some(&Value::Number(10.0)));

        let low = resolve("Dial", &UserConfig::new().with("level", -5), &schema).expect("valid");
        assert_eq!(low.config.get("level"), Some(&Value::Number(0.0)));
        assert!(low.warnings.is_empty());
    }

    #[test]
    fn test_rejected_value_falls_back_with_one_warning() {
        let schema = Schema::new().property(
            "mode",
            PropertyDescriptor::one_of(["a", "b"]).with_default("a"),
        );
        let resolution =
            resolve("Switch", &UserConfig::new().with("mode", "c"), &schema).expect("valid");

        assert_eq!(resolution.config.get("mode"), Some(&Value::from("a")));
        assert_eq!(resolution.warnings.len(), 1);
        let warning = &resolution.warnings[0];
        assert_eq!(warning.severity, Severity::Warning);
        assert_eq!(warning.component_type.as_deref(), Some("Switch"));
        assert_eq!(warning.property.as_deref(), Some("mode"));
    }

    #[test]
    fn test_wrong_kind_falls_back() {
        let resolution = resolve(
            "Geometry",
            &UserConfig::new().with("width", "wide").with("color", "chartreuse-ish"),
            &geometry_schema(),
        )
        .expect("valid");
        assert_eq!(resolution.config.get("width"), Some(&Value::Number(1.0)));
        assert_eq!(
            resolution.config.get("color"),
            Some(&Value::Color(Color::from_hex(0xffffff)))
        );
        assert_eq!(resolution.warnings.len(), 2);
    }

    #[test]
    fn test_string_coercions() {
        let user = UserConfig::new()
            .with("wireframe", "true")
            .with("color", "#ff0000")
            .with("width", "4");
        let resolution = resolve("Geometry", &user, &geometry_schema()).expect("valid");
        assert_eq!(resolution.config.get("wireframe"), Some(&Value::Bool(true)));
        assert_eq!(
            resolution.config.get("color"),
            Some(&Value::Color(Color::from_hex(0xff0000)))
        );
        assert_eq!(resolution.config.get("width"), Some(&Value::Number(4.0)));
    }

    #[test]
    fn test_reference_kind() {
        let schema = Schema::new().property("shading", PropertyDescriptor::reference(["basic", "phong"]));
        let resolution =
            resolve("Material", &UserConfig::new().with("shading", "phong"), &schema).expect("valid");
        assert_eq!(resolution.config.get("shading"), Some(&Value::reference("phong")));

        let rejected =
            resolve("Material", &UserConfig::new().with("shading", 3.0), &schema).expect("valid");
        assert_eq!(rejected.config.get("shading"), Some(&Value::reference("basic")));
        assert_eq!(rejected.warnings.len(), 1);
    }

    #[test]
    fn test_unknown_user_property_warns() {
        let resolution = resolve(
            "Geometry",
            &UserConfig::new().with("heigth", 2.0),
            &geometry_schema(),
        )
        .expect("valid");
        assert_eq!(resolution.warnings.len(), 1);
        assert_eq!(resolution.warnings[0].property.as_deref(), Some("heigth"));
    }

    #[test]
    fn test_fatal_schema_errors() {
        let no_kind = Schema::new().property("mystery", PropertyDescriptor::new());
        assert!(matches!(
            resolve("Broken", &UserConfig::new(), &no_kind),
            Err(SchemaError::NoDerivableKind { .. })
        ));

        let empty = Schema::new().property("choice", PropertyDescriptor::one_of(Vec::<Value>::new()));
        assert!(matches!(
            resolve("Broken", &UserConfig::new(), &empty),
            Err(SchemaError::EmptyOneOf { .. })
        ));

        let bad_default = Schema::new().property(
            "mode",
            PropertyDescriptor::one_of(["a", "b"]).with_default("z"),
        );
        assert!(matches!(
            resolve("Broken", &UserConfig::new(), &bad_default),
            Err(SchemaError::InvalidDefault { .. })
        ));

        let kind_only = Schema::new().property("size", PropertyDescriptor::of_kind(ValueKind::Number));
        assert!(matches!(
            resolve("Broken", &UserConfig::new(), &kind_only),
            Err(SchemaError::InvalidDefault { .. })
        ));

        let inverted = Schema::new().property("size", PropertyDescriptor::number(1.0).range(5.0, 1.0));
        let error = resolve("Broken", &UserConfig::new(), &inverted).expect_err("range is inverted");
        assert_eq!(error.property(), "size");
    }
}
