//! Systems
//!
//! A system lives on an entity and follows that entity's lifecycle. Its
//! base behavior registers every component whose type is in
//! [`System::autoregister`] when a `ComponentAdded` event bubbles up to it,
//! and unregisters it on `ComponentRemoved`. Matched events stop there.

use super::{
    component::{ComponentRef, ComponentType},
    state::StateError,
    world::World,
    EntityId,
};
use crate::schema::{CanonicalConfig, Value};
use std::fmt;

/// System type name, unique per entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SystemType(&'static str);

impl SystemType {
    /// Create a type name
    pub const fn new(name: &'static str) -> Self {
        Self(name)
    }

    /// The type name
    pub const fn name(self) -> &'static str {
        self.0
    }
}

impl fmt::Display for SystemType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

/// Behavior spanning many components
#[allow(unused_variables)]
pub trait System: super::component::AsAny + 'static {
    /// Type name of this system
    fn system_type(&self) -> SystemType;

    /// Component types registered automatically
    fn autoregister(&self) -> &'static [ComponentType] {
        &[]
    }

    /// The owning entity became part of the live scene
    fn added(&mut self, ctx: &mut SystemContext<'_>) {}

    /// The owning entity left the live scene
    fn removed(&mut self, ctx: &mut SystemContext<'_>) {}

    /// The owning entity connected
    fn connected(&mut self, ctx: &mut SystemContext<'_>) {}

    /// The owning entity disconnected
    fn disconnected(&mut self, ctx: &mut SystemContext<'_>) {}

    /// Per-frame updates start
    fn play(&mut self, ctx: &mut SystemContext<'_>) {}

    /// Per-frame updates stop
    fn pause(&mut self, ctx: &mut SystemContext<'_>) {}

    /// First per-frame callback, after the entity's components
    fn tick(&mut self, ctx: &mut SystemContext<'_>, time: f64, delta: f64) {}

    /// Second per-frame callback, after the entity's components
    fn tock(&mut self, ctx: &mut SystemContext<'_>, time: f64, delta: f64) {}

    /// A component was registered with this system
    fn registered(&mut self, ctx: &mut SystemContext<'_>, component: ComponentRef) {}

    /// A component was unregistered from this system
    fn unregistered(&mut self, ctx: &mut SystemContext<'_>, component: ComponentRef) {}
}

/// Handle given to system hooks
pub struct SystemContext<'w> {
    world: &'w mut World,
    entity: EntityId,
    system: SystemType,
}

impl<'w> SystemContext<'w> {
    pub(crate) fn new(world: &'w mut World, entity: EntityId, system: SystemType) -> Self {
        Self {
            world,
            entity,
            system,
        }
    }

    /// Entity owning this system
    pub fn entity(&self) -> EntityId {
        self.entity
    }

    /// This system's type
    pub fn system_type(&self) -> SystemType {
        self.system
    }

    /// Components currently registered, in registration order
    pub fn registered(&self) -> Vec<ComponentRef> {
        self.world.registered_components(self.entity, self.system)
    }

    /// State of a component anywhere in the world
    pub fn component_state(&self, component: ComponentRef) -> Option<&CanonicalConfig> {
        self.world
            .component_state(component.entity, component.component)
    }

    /// Write a component field
    pub fn set(
        &mut self,
        component: ComponentRef,
        field: &str,
        value: impl Into<Value>,
    ) -> Result<(), StateError> {
        self.world
            .set_field(component.entity, component.component, field, value)
    }

    /// Register a component manually; returns `false` for duplicates
    pub fn register(&mut self, component: ComponentRef) -> bool {
        self.world.register_component(self.entity, self.system, component)
    }

    /// Unregister a component manually; returns `false` if it was not registered
    pub fn unregister(&mut self, component: ComponentRef) -> bool {
        self.world.unregister_component(self.entity, self.system, component)
    }
}
