//! Entity implementation

use super::{
    component::{ChangeRecorder, Component, ComponentInstance, ComponentRef, ComponentType},
    dependency::DependencyGraph,
    lifecycle::LifecycleFlags,
    state::{FieldChange, ReactiveState},
    system::{System, SystemType},
};
use crate::events::{EventHandler, EventType, ListenerId};
use std::collections::VecDeque;

slotmap::new_key_type! {
    /// Entity identifier
    pub struct EntityId;
}

/// Pending delivery to a component
#[derive(Debug, Clone)]
pub(crate) enum Notification {
    Update(FieldChange),
    DependencyAdded(ComponentType),
    DependencyUpdated(ComponentType, FieldChange),
    DependencyRemoved(ComponentType),
}

/// Attached component
pub(crate) struct ComponentSlot {
    pub(crate) component_type: ComponentType,
    pub(crate) provides: Vec<ComponentType>,
    pub(crate) dependencies: &'static [ComponentType],
    /// Taken while one of the component's hooks runs
    pub(crate) behavior: Option<Box<dyn Component>>,
    pub(crate) state: ReactiveState,
    pub(crate) changes: ChangeRecorder,
    pub(crate) deferred: VecDeque<Notification>,
}

impl ComponentSlot {
    pub(crate) fn new(instance: ComponentInstance) -> Self {
        let ComponentInstance {
            behavior,
            state,
            changes,
            ..
        } = instance;
        let component_type = behavior.component_type();
        let mut provides = vec![component_type];
        provides.extend(
            behavior
                .capabilities()
                .iter()
                .copied()
                .filter(|capability| *capability != component_type),
        );

        Self {
            component_type,
            provides,
            dependencies: behavior.dependencies(),
            behavior: Some(behavior),
            state,
            changes,
            deferred: VecDeque::new(),
        }
    }

    pub(crate) fn provides(&self, capability: ComponentType) -> bool {
        self.provides.contains(&capability)
    }

    /// Move recorded state changes into the delivery queue
    pub(crate) fn collect_changes(&mut self) {
        let changes: Vec<_> = self.changes.borrow_mut().drain(..).collect();
        self.deferred
            .extend(changes.into_iter().map(Notification::Update));
    }
}

/// Attached system
pub(crate) struct SystemSlot {
    pub(crate) system_type: SystemType,
    pub(crate) autoregister: &'static [ComponentType],
    pub(crate) behavior: Option<Box<dyn System>>,
    pub(crate) registered: Vec<ComponentRef>,
    pub(crate) listeners: Vec<ListenerId>,
}

pub(crate) enum ListenerKind {
    Handler(Box<dyn EventHandler>),
    System(SystemType),
}

pub(crate) struct ListenerEntry {
    pub(crate) id: ListenerId,
    pub(crate) event_type: EventType,
    pub(crate) kind: ListenerKind,
}

/// Scene-graph node
pub struct Entity {
    pub(crate) name: String,
    pub(crate) parent: Option<EntityId>,
    pub(crate) children: Vec<EntityId>,
    pub(crate) components: Vec<ComponentSlot>,
    pub(crate) graph: DependencyGraph,
    pub(crate) systems: Vec<SystemSlot>,
    pub(crate) listeners: Vec<ListenerEntry>,
    pub(crate) flags: LifecycleFlags,
}

impl Entity {
    pub(crate) fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parent: None,
            children: Vec::new(),
            components: Vec::new(),
            graph: DependencyGraph::new(),
            systems: Vec::new(),
            listeners: Vec::new(),
            flags: LifecycleFlags::empty(),
        }
    }

    /// Entity name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Parent entity, if attached
    pub fn parent(&self) -> Option<EntityId> {
        self.parent
    }

    /// Child entities in attach order
    pub fn children(&self) -> &[EntityId] {
        &self.children
    }

    /// Lifecycle flags
    pub fn flags(&self) -> LifecycleFlags {
        self.flags
    }

    /// Whether the entity is part of the live scene
    pub fn is_added(&self) -> bool {
        self.flags.contains(LifecycleFlags::ADDED)
    }

    /// Whether the entity is connected
    pub fn is_connected(&self) -> bool {
        self.flags.contains(LifecycleFlags::CONNECTED)
    }

    /// Whether the entity receives per-frame updates
    pub fn is_playing(&self) -> bool {
        self.flags.contains(LifecycleFlags::PLAYING)
    }

    /// Attached component types in attach order
    pub fn component_types(&self) -> Vec<ComponentType> {
        self.components.iter().map(|slot| slot.component_type).collect()
    }

    /// Whether a component of type `component` is attached
    pub fn has_component(&self, component: ComponentType) -> bool {
        self.slot(component).is_some()
    }

    /// Attached system types in attach order
    pub fn system_types(&self) -> Vec<SystemType> {
        self.systems.iter().map(|slot| slot.system_type).collect()
    }

    /// Dependency graph of the attached components
    pub fn graph(&self) -> &DependencyGraph {
        &self.graph
    }

    /// First attached component providing `capability`
    pub fn provider_of(&self, capability: ComponentType) -> Option<ComponentType> {
        self.components
            .iter()
            .find(|slot| slot.provides(capability))
            .map(|slot| slot.component_type)
    }

    /// Capabilities for which `component` is the resolved provider
    pub(crate) fn resolved_capabilities(&self, component: ComponentType) -> Vec<ComponentType> {
        self.slot(component)
            .map(|slot| {
                slot.provides
                    .iter()
                    .copied()
                    .filter(|capability| self.provider_of(*capability) == Some(component))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Attached dependents of `capability`, excluding `except`
    pub(crate) fn attached_dependents(
        &self,
        capability: ComponentType,
        except: ComponentType,
    ) -> Vec<ComponentType> {
        self.graph
            .dependents_of(capability)
            .iter()
            .copied()
            .filter(|dependent| *dependent != except && self.has_component(*dependent))
            .collect()
    }

    pub(crate) fn slot(&self, component: ComponentType) -> Option<&ComponentSlot> {
        self.components
            .iter()
            .find(|slot| slot.component_type == component)
    }

    pub(crate) fn slot_mut(&mut self, component: ComponentType) -> Option<&mut ComponentSlot> {
        self.components
            .iter_mut()
            .find(|slot| slot.component_type == component)
    }

    pub(crate) fn system_slot_mut(&mut self, system: SystemType) -> Option<&mut SystemSlot> {
        self.systems
            .iter_mut()
            .find(|slot| slot.system_type == system)
    }
}

impl std::fmt::Debug for Entity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Entity")
            .field("name", &self.name)
            .field("parent", &self.parent)
            .field("children", &self.children)
            .field("components", &self.component_types())
            .field("systems", &self.system_types())
            .field("flags", &self.flags)
            .finish_non_exhaustive()
    }
}
