//! # Scene Engine
//!
//! Declarative scene graph core: entities assembled from schema-validated
//! components that react to each other's state.
//!
//! ## Features
//!
//! - **Schema Resolution**: Partial user configuration is defaulted, coerced and validated
//! - **Reactive State**: Every accepted field write raises exactly one change notification
//! - **Dependency Propagation**: Components hear about sibling providers being added, updated and removed
//! - **Lifecycle State Machine**: Idempotent `added`/`connected`/`playing` transitions over the entity tree
//! - **Event Dispatch**: Per-entity listeners with opt-in bubbling
//!
//! ## Quick Start
//!
//! ```rust
//! use scene_engine::prelude::*;
//!
//! struct Spin;
//!
//! impl Component for Spin {
//!     fn component_type(&self) -> ComponentType {
//!         ComponentType::new("Spin")
//!     }
//!
//!     fn schema(&self) -> Schema {
//!         Schema::new().property("speed", PropertyDescriptor::number(1.0).range(0.0, 10.0))
//!     }
//! }
//!
//! let mut world = World::new();
//! let root = world.root();
//! let spinner = world.spawn("spinner");
//! world.add_component(spinner, ComponentInstance::new(Spin)?)?;
//! world.attach(spinner, root)?;
//! world.added(root);
//! world.set_field(spinner, ComponentType::new("Spin"), "speed", 4.0)?;
//! world.frame(0.016);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod config;
pub mod ecs;
pub mod events;
pub mod foundation;
pub mod schema;

/// Common imports for engine users
pub mod prelude {
    pub use crate::{
        config::{Config, ConfigError, ConfigFormat, SceneConfig},
        ecs::{
            Component, ComponentContext, ComponentInstance, ComponentRef, ComponentRegistry,
            ComponentType, DependencyGraph, Entity, EntityId, EntityTemplate, FieldChange,
            LifecycleFlags, PropertyMapping, ReactiveState, RegistryError, StateError, System,
            SystemContext, SystemType, World, WorldError,
        },
        events::{
            DispatchContext, DispatchReport, Event, EventArg, EventHandler, EventType, ListenerId,
        },
        foundation::{
            color::Color,
            diagnostics::{Diagnostic, DiagnosticLog, Severity},
            time::FrameClock,
        },
        schema::{
            resolve, CanonicalConfig, PropertyDescriptor, Resolution, Schema, SchemaError,
            UserConfig, Value, ValueKind,
        },
    };
}
