//! Component trait and component instances
//!
//! A component is a behavior unit with one reactive state resolved from its
//! schema. Hooks receive a [`ComponentContext`] that can read and write
//! state and notify dependents, but cannot drive lifecycle transitions.

use super::{
    state::{FieldChange, ReactiveState, StateError},
    world::World,
    EntityId,
};
use crate::events::{DispatchReport, Event};
use crate::foundation::diagnostics::Diagnostic;
use crate::schema::{resolve, CanonicalConfig, Schema, SchemaError, UserConfig, Value};
use std::{any::Any, cell::RefCell, collections::VecDeque, fmt, rc::Rc};

/// Component type name, unique per entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ComponentType(&'static str);

impl ComponentType {
    /// Create a type name
    pub const fn new(name: &'static str) -> Self {
        Self(name)
    }

    /// The type name
    pub const fn name(self) -> &'static str {
        self.0
    }
}

impl fmt::Display for ComponentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

/// Address of a component in the world
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ComponentRef {
    /// Owning entity
    pub entity: EntityId,
    /// Component type on that entity
    pub component: ComponentType,
}

impl ComponentRef {
    /// Create a reference
    pub const fn new(entity: EntityId, component: ComponentType) -> Self {
        Self { entity, component }
    }
}

/// Downcasting support for trait objects
pub trait AsAny {
    /// Borrow as [`Any`]
    fn as_any(&self) -> &dyn Any;
    /// Mutably borrow as [`Any`]
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Behavior attached to an entity
///
/// Every hook has a no-op default. Overrides of [`Component::update`] must
/// call [`ComponentContext::notify_dependents`] to keep dependents informed.
#[allow(unused_variables)]
pub trait Component: AsAny + 'static {
    /// Type name of this component
    fn component_type(&self) -> ComponentType;

    /// Schema the user configuration is resolved against
    fn schema(&self) -> Schema {
        Schema::new()
    }

    /// Capabilities this component depends on
    fn dependencies(&self) -> &'static [ComponentType] {
        &[]
    }

    /// Capabilities provided in addition to the component's own type
    fn capabilities(&self) -> &'static [ComponentType] {
        &[]
    }

    /// The owning entity became part of the live scene
    fn added(&mut self, ctx: &mut ComponentContext<'_>) {}

    /// The owning entity connected to its output surface
    fn connected(&mut self, ctx: &mut ComponentContext<'_>) {}

    /// The owning entity disconnected; may run without a prior `connected`
    fn disconnected(&mut self, ctx: &mut ComponentContext<'_>) {}

    /// Per-frame updates start
    fn play(&mut self, ctx: &mut ComponentContext<'_>) {}

    /// Per-frame updates stop
    fn pause(&mut self, ctx: &mut ComponentContext<'_>) {}

    /// First per-frame callback
    fn tick(&mut self, ctx: &mut ComponentContext<'_>, time: f64, delta: f64) {}

    /// Second per-frame callback
    fn tock(&mut self, ctx: &mut ComponentContext<'_>, time: f64, delta: f64) {}

    /// A field of this component's state was written
    fn update(&mut self, ctx: &mut ComponentContext<'_>, change: &FieldChange) {
        ctx.notify_dependents(change);
    }

    /// A provider of `capability` is available on the entity
    fn dependency_added(
        &mut self,
        ctx: &mut ComponentContext<'_>,
        capability: ComponentType,
        state: &CanonicalConfig,
    ) {
    }

    /// The provider of `capability` changed a field
    fn dependency_updated(
        &mut self,
        ctx: &mut ComponentContext<'_>,
        capability: ComponentType,
        change: &FieldChange,
    ) {
    }

    /// The provider of `capability` left the entity
    fn dependency_removed(&mut self, ctx: &mut ComponentContext<'_>, capability: ComponentType) {}
}

pub(crate) type ChangeRecorder = Rc<RefCell<VecDeque<FieldChange>>>;

/// A component with its resolved state, ready to attach
pub struct ComponentInstance {
    pub(crate) behavior: Box<dyn Component>,
    pub(crate) state: ReactiveState,
    pub(crate) changes: ChangeRecorder,
    pub(crate) warnings: Vec<Diagnostic>,
}

impl ComponentInstance {
    /// Resolve the component's schema with an empty user configuration
    pub fn new<C: Component>(behavior: C) -> Result<Self, SchemaError> {
        Self::with_config(behavior, &UserConfig::new())
    }

    /// Resolve the component's schema against `user`
    pub fn with_config<C: Component>(behavior: C, user: &UserConfig) -> Result<Self, SchemaError> {
        Self::from_boxed(Box::new(behavior), user)
    }

    /// Resolve a boxed component's schema against `user`
    pub fn from_boxed(behavior: Box<dyn Component>, user: &UserConfig) -> Result<Self, SchemaError> {
        let component_type = behavior.component_type();
        let resolution = resolve(component_type.name(), user, &behavior.schema())?;

        let changes: ChangeRecorder = Rc::default();
        let recorder = Rc::clone(&changes);
        let state = ReactiveState::wrap(resolution.config, move |change| {
            recorder.borrow_mut().push_back(change.clone());
        });

        Ok(Self {
            behavior,
            state,
            changes,
            warnings: resolution.warnings,
        })
    }

    /// Type name of the wrapped component
    pub fn component_type(&self) -> ComponentType {
        self.behavior.component_type()
    }

    /// Resolved state
    pub fn state(&self) -> &ReactiveState {
        &self.state
    }

    /// Warnings raised while resolving the configuration
    pub fn warnings(&self) -> &[Diagnostic] {
        &self.warnings
    }
}

impl fmt::Debug for ComponentInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentInstance")
            .field("component_type", &self.component_type())
            .field("state", &self.state)
            .field("warnings", &self.warnings.len())
            .finish()
    }
}

/// Handle given to component hooks
pub struct ComponentContext<'w> {
    world: &'w mut World,
    entity: EntityId,
    component: ComponentType,
}

impl<'w> ComponentContext<'w> {
    pub(crate) fn new(world: &'w mut World, entity: EntityId, component: ComponentType) -> Self {
        Self {
            world,
            entity,
            component,
        }
    }

    /// Owning entity
    pub fn entity(&self) -> EntityId {
        self.entity
    }

    /// This component's type
    pub fn component_type(&self) -> ComponentType {
        self.component
    }

    /// Read one of this component's fields
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.state().and_then(|state| state.get(field))
    }

    /// This component's state
    pub fn state(&self) -> Option<&CanonicalConfig> {
        self.world.component_state(self.entity, self.component)
    }

    /// Write one of this component's fields
    ///
    /// The resulting `update` runs once the current hook returns.
    pub fn set(&mut self, field: &str, value: impl Into<Value>) -> Result<(), StateError> {
        self.world.set_field(self.entity, self.component, field, value)
    }

    /// State of the sibling providing `capability`
    pub fn sibling(&self, capability: ComponentType) -> Option<&CanonicalConfig> {
        let provider = self.world.provider_of(self.entity, capability)?;
        self.world.component_state(self.entity, provider)
    }

    /// Forward `change` to every dependent of this component's capabilities
    pub fn notify_dependents(&mut self, change: &FieldChange) {
        self.world.notify_dependents(self.entity, self.component, change);
    }

    /// Dispatch `event` starting at the owning entity
    pub fn dispatch(&mut self, event: &Event) -> DispatchReport {
        self.world.dispatch(self.entity, event)
    }

    /// Record a warning attributed to this component
    pub fn warn(&mut self, message: impl Into<String>) {
        self.world
            .report(Diagnostic::warning(message).with_component(self.component.name()));
    }

    /// Lifecycle flags of the owning entity
    pub fn lifecycle(&self) -> super::LifecycleFlags {
        self.world
            .entity(self.entity)
            .map(super::Entity::flags)
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::PropertyDescriptor;

    struct Dial;

    impl Component for Dial {
        fn component_type(&self) -> ComponentType {
            ComponentType::new("Dial")
        }

        fn schema(&self) -> Schema {
            Schema::new().property("level", PropertyDescriptor::number(5.0).range(0.0, 10.0))
        }
    }

    struct Broken;

    impl Component for Broken {
        fn component_type(&self) -> ComponentType {
            ComponentType::new("Broken")
        }

        fn schema(&self) -> Schema {
            Schema::new().property("mystery", PropertyDescriptor::new())
        }
    }

    #[test]
    fn test_instance_resolves_schema() {
        let instance = ComponentInstance::with_config(Dial, &UserConfig::new().with("level", 12))
            .expect("schema is valid");
        assert_eq!(instance.component_type(), ComponentType::new("Dial"));
        assert_eq!(instance.state().get("level"), Some(&Value::Number(10.0)));
        assert!(instance.warnings().is_empty());
    }

    #[test]
    fn test_instance_records_changes() {
        let mut instance = ComponentInstance::new(Dial).expect("schema is valid");
        instance.state.set("level", 7.0).expect("level exists");
        assert_eq!(instance.changes.borrow().len(), 1);
    }

    #[test]
    fn test_schema_error_aborts_construction() {
        assert!(matches!(
            ComponentInstance::new(Broken),
            Err(SchemaError::NoDerivableKind { .. })
        ));
    }

    #[test]
    fn test_downcast_through_trait_object() {
        let boxed: Box<dyn Component> = Box::new(Dial);
        assert!((*boxed).as_any().downcast_ref::<Dial>().is_some());
    }
}
