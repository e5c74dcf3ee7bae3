//! Component registry and entity templates
//!
//! The registry maps component names to factories so scenes can be
//! described as data. An [`EntityTemplate`] names default components with
//! their configuration and maps template-level properties onto component
//! fields.

use super::{
    component::{Component, ComponentInstance},
    world::World,
    EntityId,
};
use crate::config::Config;
use crate::foundation::diagnostics::Diagnostic;
use crate::schema::{SchemaError, UserConfig};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Errors raised while instantiating registered components
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum RegistryError {
    /// No factory registered under the name
    #[error("unknown component '{0}'")]
    UnknownComponent(String),

    /// The component's schema is invalid
    #[error("invalid schema for component '{component}': {source}")]
    Schema {
        /// Component name
        component: String,
        /// Underlying schema error
        #[source]
        source: SchemaError,
    },
}

type Factory = Box<dyn Fn() -> Box<dyn Component>>;

/// Named component factories
#[derive(Default)]
pub struct ComponentRegistry {
    factories: BTreeMap<String, Factory>,
}

impl ComponentRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a factory under `name`, replacing any previous one
    pub fn register<C, F>(&mut self, name: impl Into<String>, factory: F) -> &mut Self
    where
        C: Component,
        F: Fn() -> C + 'static,
    {
        let name = name.into();
        if self.factories.contains_key(&name) {
            log::warn!("component factory '{name}' registered twice - replacing it");
        }
        self.factories
            .insert(name, Box::new(move || Box::new(factory()) as Box<dyn Component>));
        self
    }

    /// Whether a factory is registered under `name`
    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    /// Registered names in sorted order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.factories.keys().map(String::as_str)
    }

    /// Instantiate the component registered under `name`
    pub fn create(&self, name: &str, config: &UserConfig) -> Result<ComponentInstance, RegistryError> {
        let factory = self
            .factories
            .get(name)
            .ok_or_else(|| RegistryError::UnknownComponent(name.to_string()))?;
        ComponentInstance::from_boxed(factory(), config).map_err(|source| RegistryError::Schema {
            component: name.to_string(),
            source,
        })
    }
}

impl std::fmt::Debug for ComponentRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.factories.keys()).finish()
    }
}

/// Target of a template property mapping
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyMapping {
    /// Registered component name
    pub component: String,
    /// Field of that component
    pub field: String,
}

/// Declarative recipe for an entity
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EntityTemplate {
    /// Name given to spawned entities
    pub name: String,
    /// Default components with their configuration, in attach order
    pub components: Vec<(String, UserConfig)>,
    /// Template property to component field
    pub mappings: BTreeMap<String, PropertyMapping>,
}

impl EntityTemplate {
    /// Create an empty template
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Add a default component (builder pattern)
    pub fn with_component(mut self, name: impl Into<String>, config: UserConfig) -> Self {
        self.components.push((name.into(), config));
        self
    }

    /// Map a template property onto a component field (builder pattern)
    pub fn with_mapping(
        mut self,
        property: impl Into<String>,
        component: impl Into<String>,
        field: impl Into<String>,
    ) -> Self {
        self.mappings.insert(
            property.into(),
            PropertyMapping {
                component: component.into(),
                field: field.into(),
            },
        );
        self
    }

    /// Per-component configuration after applying `properties` and `extra`
    ///
    /// Extra components that the template already names are merged into the
    /// default configuration; others are appended. Properties without a
    /// mapping, or mapped onto a component the template does not name, are
    /// returned as warnings.
    pub fn plan(
        &self,
        properties: &UserConfig,
        extra: &[(String, UserConfig)],
    ) -> (Vec<(String, UserConfig)>, Vec<Diagnostic>) {
        let mut components = self.components.clone();
        for (name, config) in extra {
            match components.iter_mut().find(|(existing, _)| existing == name) {
                Some((_, existing)) => existing.merge(config),
                None => components.push((name.clone(), config.clone())),
            }
        }

        let mut warnings = Vec::new();
        for (property, value) in properties.iter() {
            let target = self.mappings.get(property).and_then(|mapping| {
                components
                    .iter_mut()
                    .find(|(name, _)| *name == mapping.component)
                    .map(|(_, config)| (mapping, config))
            });
            match target {
                Some((mapping, config)) => {
                    config.insert(mapping.field.clone(), value.clone());
                }
                None => warnings.push(
                    Diagnostic::warning(format!(
                        "template '{}' has no mapping for this property - property will be ignored",
                        self.name
                    ))
                    .with_property(property)
                    .with_context(value.to_string()),
                ),
            }
        }
        (components, warnings)
    }
}

impl Config for EntityTemplate {}

impl World {
    /// Spawn a detached entity from `template`
    ///
    /// Components that cannot be created are reported as fatal diagnostics
    /// and skipped; the rest of the entity is still built.
    pub fn spawn_template(
        &mut self,
        registry: &ComponentRegistry,
        template: &EntityTemplate,
        properties: &UserConfig,
        extra: &[(String, UserConfig)],
    ) -> EntityId {
        let id = self.spawn(template.name.clone());
        let (components, warnings) = template.plan(properties, extra);
        self.diagnostics.extend(warnings);

        for (name, config) in &components {
            match registry.create(name, config) {
                Ok(instance) => {
                    if let Err(error) = self.add_component(id, instance) {
                        log::error!("cannot attach '{name}': {error}");
                    }
                }
                Err(error) => {
                    self.report(Diagnostic::fatal(error.to_string()).with_component(name.clone()));
                }
            }
        }
        id
    }
}
