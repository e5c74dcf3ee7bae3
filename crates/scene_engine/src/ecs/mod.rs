//! Entity-Component-System implementation
//!
//! Entities form a tree owned by the [`World`]. Each entity holds at most
//! one component per type, a dependency graph over those components, its
//! systems and event listeners, and the lifecycle flags driven by
//! [`World::added`], [`World::connected`] and [`World::play`].

pub mod component;
pub mod dependency;
pub mod entity;
pub mod lifecycle;
pub mod registry;
pub mod state;
pub mod system;
pub mod world;

pub use component::{AsAny, Component, ComponentContext, ComponentInstance, ComponentRef, ComponentType};
pub use dependency::DependencyGraph;
pub use entity::{Entity, EntityId};
pub use lifecycle::LifecycleFlags;
pub use registry::{ComponentRegistry, EntityTemplate, PropertyMapping, RegistryError};
pub use state::{FieldChange, ReactiveState, StateError};
pub use system::{System, SystemContext, SystemType};
pub use world::{World, WorldError};

#[cfg(test)]
mod tests;
