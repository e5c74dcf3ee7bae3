//! ECS World implementation
//!
//! The world owns every entity in a slot map arena together with the
//! diagnostic log and the frame clock. Component hooks run with the
//! component's behavior taken out of its slot; notifications addressed to
//! a component whose hook is running are queued on the slot and delivered,
//! in order, as soon as that hook returns.

use super::{
    component::{Component, ComponentContext, ComponentInstance, ComponentRef, ComponentType},
    entity::{ComponentSlot, Entity, EntityId, ListenerEntry, ListenerKind, Notification, SystemSlot},
    lifecycle::{LifecycleFlags, Transition},
    state::{FieldChange, StateError},
    system::{System, SystemContext, SystemType},
};
use crate::config::SceneConfig;
use crate::events::{DispatchContext, DispatchReport, Event, EventArg, EventHandler, EventType, ListenerId};
use crate::foundation::{
    diagnostics::{Diagnostic, DiagnosticLog},
    time::FrameClock,
};
use crate::schema::{CanonicalConfig, Value};
use slotmap::SlotMap;

/// Errors raised by entity tree operations
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum WorldError {
    /// The entity id is stale or was never issued
    #[error("entity {0:?} does not exist")]
    MissingEntity(EntityId),

    /// The parent is the child itself or one of its descendants
    #[error("cannot attach entity {child:?} below its own descendant {parent:?}")]
    CyclicAttach {
        /// Entity being attached
        child: EntityId,
        /// Requested parent
        parent: EntityId,
    },

    /// The root cannot be attached, detached or despawned
    #[error("operation not permitted on the root entity")]
    RootEntity,
}

/// Scene world containing every entity
pub struct World {
    pub(crate) entities: SlotMap<EntityId, Entity>,
    root: EntityId,
    pub(crate) diagnostics: DiagnosticLog,
    clock: FrameClock,
    next_listener: u64,
}

impl World {
    /// Create a world with the default scene configuration
    pub fn new() -> Self {
        Self::with_config(&SceneConfig::default())
    }

    /// Create a world whose diagnostics follow `config`
    pub fn with_config(config: &SceneConfig) -> Self {
        Self::with_diagnostics(config.diagnostic_log())
    }

    /// Create a world reporting into `diagnostics`
    pub fn with_diagnostics(diagnostics: DiagnosticLog) -> Self {
        let mut entities = SlotMap::with_key();
        let root = entities.insert(Entity::new("root"));
        Self {
            entities,
            root,
            diagnostics,
            clock: FrameClock::new(),
            next_listener: 0,
        }
    }

    /// The root entity
    pub fn root(&self) -> EntityId {
        self.root
    }

    /// Look up an entity
    pub fn entity(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(id)
    }

    /// Whether `id` refers to a live entity
    pub fn contains(&self, id: EntityId) -> bool {
        self.entities.contains_key(id)
    }

    /// Number of live entities, root included
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Whether only the root exists
    pub fn is_empty(&self) -> bool {
        self.entities.len() <= 1
    }

    /// Diagnostics raised so far
    pub fn diagnostics(&self) -> &DiagnosticLog {
        &self.diagnostics
    }

    /// Mutable access to the diagnostic log
    pub fn diagnostics_mut(&mut self) -> &mut DiagnosticLog {
        &mut self.diagnostics
    }

    /// Record a diagnostic
    pub fn report(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    /// Frame clock driven by [`World::frame`]
    pub fn clock(&self) -> &FrameClock {
        &self.clock
    }

    /// Run one frame: `tick` then `tock` on the root; returns the delta
    pub fn frame(&mut self, time: f64) -> f64 {
        let delta = self.clock.advance(time);
        let root = self.root;
        self.tick(root, time, delta);
        self.tock(root, time, delta);
        delta
    }

    // ---------------------------------------------------------------------
    // Entity tree
    // ---------------------------------------------------------------------

    /// Create a detached entity
    pub fn spawn(&mut self, name: impl Into<String>) -> EntityId {
        let entity = Entity::new(name);
        log::debug!("spawned entity '{}'", entity.name);
        self.entities.insert(entity)
    }

    /// Attach `child` below `parent`
    ///
    /// The child is detached from its previous parent first, then caught up
    /// to the parent's `added`, `connected` and `playing` flags.
    pub fn attach(&mut self, child: EntityId, parent: EntityId) -> Result<(), WorldError> {
        let previous = self.entities.get(child).ok_or(WorldError::MissingEntity(child))?.parent;
        let flags = self.entities.get(parent).ok_or(WorldError::MissingEntity(parent))?.flags;
        if child == self.root {
            return Err(WorldError::RootEntity);
        }
        if self.is_ancestor_or_self(child, parent) {
            return Err(WorldError::CyclicAttach { child, parent });
        }
        if previous == Some(parent) {
            return Ok(());
        }
        if previous.is_some() {
            self.detach(child)?;
        }

        if let Some(entity) = self.entities.get_mut(parent) {
            entity.children.push(child);
        }
        if let Some(entity) = self.entities.get_mut(child) {
            entity.parent = Some(parent);
            log::debug!("attached entity '{}'", entity.name);
        }

        if flags.contains(LifecycleFlags::ADDED) {
            self.transition(child, Transition::Added, false);
        }
        if flags.contains(LifecycleFlags::CONNECTED) {
            self.transition(child, Transition::Connected, false);
        }
        if flags.contains(LifecycleFlags::PLAYING) {
            self.transition(child, Transition::Play, false);
        }
        Ok(())
    }

    /// Detach `child` from its parent
    ///
    /// The subtree is paused, disconnected and leaves the live scene before
    /// it is unlinked, so removal events still bubble through the old parent.
    pub fn detach(&mut self, child: EntityId) -> Result<(), WorldError> {
        if child == self.root {
            return Err(WorldError::RootEntity);
        }
        let Some(parent) = self.entities.get(child).ok_or(WorldError::MissingEntity(child))?.parent
        else {
            return Ok(());
        };

        self.transition(child, Transition::Pause, false);
        self.transition(child, Transition::Disconnected, false);
        self.transition(child, Transition::Removed, false);

        if let Some(entity) = self.entities.get_mut(parent) {
            entity.children.retain(|existing| *existing != child);
        }
        if let Some(entity) = self.entities.get_mut(child) {
            entity.parent = None;
            log::debug!("detached entity '{}'", entity.name);
        }
        Ok(())
    }

    /// Tear down, detach and free an entity and its whole subtree
    ///
    /// The subtree is paused, disconnected and leaves the live scene even
    /// when it has no parent; the freed nodes get no further hooks.
    pub fn despawn(&mut self, id: EntityId) -> Result<(), WorldError> {
        if id == self.root {
            return Err(WorldError::RootEntity);
        }
        if !self.contains(id) {
            return Err(WorldError::MissingEntity(id));
        }
        self.transition(id, Transition::Pause, false);
        self.transition(id, Transition::Disconnected, false);
        self.transition(id, Transition::Removed, false);
        self.detach(id)?;

        let mut pending = vec![id];
        while let Some(node) = pending.pop() {
            if let Some(entity) = self.entities.remove(node) {
                log::debug!("despawned entity '{}'", entity.name);
                pending.extend(entity.children);
            }
        }
        Ok(())
    }

    fn is_ancestor_or_self(&self, ancestor: EntityId, node: EntityId) -> bool {
        let mut current = Some(node);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.entities.get(id).and_then(Entity::parent);
        }
        false
    }

    // ---------------------------------------------------------------------
    // Components
    // ---------------------------------------------------------------------

    /// Attach a component to an entity
    ///
    /// A component of the same type is removed first, with a warning. The
    /// dependency graph is updated and the component is caught up to the
    /// entity's lifecycle flags.
    pub fn add_component(
        &mut self,
        id: EntityId,
        mut instance: ComponentInstance,
    ) -> Result<(), WorldError> {
        let entity = self.entities.get(id).ok_or(WorldError::MissingEntity(id))?;
        let component = instance.component_type();
        if entity.has_component(component) {
            let message = format!(
                "entity '{}' already has this component - replacing it",
                entity.name
            );
            self.report(Diagnostic::warning(message).with_component(component.name()));
            self.remove_component(id, component);
        }
        self.diagnostics.extend(std::mem::take(&mut instance.warnings));

        let slot = ComponentSlot::new(instance);
        let dependencies = slot.dependencies;
        let provides = slot.provides.clone();
        let flags = {
            let entity = self.entities.get_mut(id).ok_or(WorldError::MissingEntity(id))?;
            entity.components.push(slot);
            entity.graph.register(component, dependencies);
            log::debug!("added component {component} to entity '{}'", entity.name);
            entity.flags
        };

        for capability in dependencies {
            let available = self
                .provider_of(id, *capability)
                .is_some_and(|provider| provider != component);
            if available {
                self.notify(id, component, Notification::DependencyAdded(*capability));
            }
        }
        for capability in provides {
            let waiting = match self.entities.get(id) {
                Some(entity) if entity.provider_of(capability) == Some(component) => {
                    entity.attached_dependents(capability, component)
                }
                _ => continue,
            };
            for dependent in waiting {
                self.notify(id, dependent, Notification::DependencyAdded(capability));
            }
        }

        self.catch_up_component(id, component, flags);
        Ok(())
    }

    /// Detach a component, returning its behavior
    ///
    /// Dependents of the capabilities it provided are told it left and,
    /// when another sibling now provides them, about the replacement.
    pub fn remove_component(
        &mut self,
        id: EntityId,
        component: ComponentType,
    ) -> Option<Box<dyn Component>> {
        let entity = self.entities.get(id)?;
        if !entity.has_component(component) {
            return None;
        }
        if entity.is_added() {
            self.dispatch_component_event(id, component, EventType::ComponentRemoved);
        }
        self.call_component(id, component, |behavior, ctx| behavior.disconnected(ctx));

        let entity = self.entities.get_mut(id)?;
        let released = entity.resolved_capabilities(component);
        let index = entity
            .components
            .iter()
            .position(|slot| slot.component_type == component)?;
        let slot = entity.components.remove(index);
        entity.graph.unregister(component);
        log::debug!("removed component {component} from entity '{}'", entity.name);

        for capability in released {
            let Some(entity) = self.entities.get(id) else {
                break;
            };
            let dependents = entity.attached_dependents(capability, component);
            let replaced = entity.provider_of(capability).is_some();
            for dependent in dependents {
                self.notify(id, dependent, Notification::DependencyRemoved(capability));
                if replaced {
                    self.notify(id, dependent, Notification::DependencyAdded(capability));
                }
            }
        }
        slot.behavior
    }

    /// State of a component
    pub fn component_state(&self, id: EntityId, component: ComponentType) -> Option<&CanonicalConfig> {
        self.entities
            .get(id)?
            .slot(component)
            .map(|slot| slot.state.values())
    }

    /// Borrow the first component of concrete type `C`
    ///
    /// Returns `None` while that component's own hook is running.
    pub fn component<C: Component>(&self, id: EntityId) -> Option<&C> {
        self.entities.get(id)?.components.iter().find_map(|slot| {
            slot.behavior
                .as_deref()
                .and_then(|behavior| behavior.as_any().downcast_ref::<C>())
        })
    }

    /// Attached component providing `capability`
    pub fn provider_of(&self, id: EntityId, capability: ComponentType) -> Option<ComponentType> {
        self.entities.get(id)?.provider_of(capability)
    }

    /// Attached dependents linked to a live provider of `capability`
    ///
    /// Empty when nothing on the entity provides `capability`, even though
    /// the graph keeps the entry while dependents still declare it.
    pub fn linked_dependents(&self, id: EntityId, capability: ComponentType) -> Vec<ComponentType> {
        match self.entities.get(id) {
            Some(entity) => match entity.provider_of(capability) {
                Some(provider) => entity.attached_dependents(capability, provider),
                None => Vec::new(),
            },
            None => Vec::new(),
        }
    }

    /// Write a component field
    ///
    /// On success the component's `update` runs once, immediately or, if
    /// one of its hooks is running, when that hook returns. Failed writes
    /// are recorded as error diagnostics.
    pub fn set_field(
        &mut self,
        id: EntityId,
        component: ComponentType,
        field: &str,
        value: impl Into<Value>,
    ) -> Result<(), StateError> {
        let Some(slot) = self.entities.get_mut(id).and_then(|entity| entity.slot_mut(component)) else {
            let error = StateError::MissingComponent {
                component: component.name().to_string(),
            };
            self.diagnostics
                .push(Diagnostic::error(error.to_string()).with_property(field));
            return Err(error);
        };
        if let Err(error) = slot.state.set(field, value) {
            self.diagnostics.push(
                Diagnostic::error(format!("cannot write state: {error}"))
                    .with_component(component.name())
                    .with_property(field),
            );
            return Err(error);
        }
        slot.collect_changes();
        self.drain(id, component);
        Ok(())
    }

    /// Fan `change` out to the dependents of every capability `component`
    /// currently provides; no-op writes are not forwarded
    pub(crate) fn notify_dependents(
        &mut self,
        id: EntityId,
        component: ComponentType,
        change: &FieldChange,
    ) {
        if change.is_noop() {
            return;
        }
        let Some(entity) = self.entities.get(id) else {
            return;
        };
        let targets: Vec<_> = entity
            .resolved_capabilities(component)
            .into_iter()
            .flat_map(|capability| {
                entity
                    .attached_dependents(capability, component)
                    .into_iter()
                    .map(move |dependent| (capability, dependent))
            })
            .collect();
        for (capability, dependent) in targets {
            self.notify(
                id,
                dependent,
                Notification::DependencyUpdated(capability, change.clone()),
            );
        }
    }

    fn notify(&mut self, id: EntityId, component: ComponentType, notification: Notification) {
        if let Some(slot) = self.entities.get_mut(id).and_then(|entity| entity.slot_mut(component)) {
            slot.deferred.push_back(notification);
            self.drain(id, component);
        }
    }

    /// Deliver queued notifications unless one of the component's hooks is running
    fn drain(&mut self, id: EntityId, component: ComponentType) {
        loop {
            let Some(slot) = self.entities.get_mut(id).and_then(|entity| entity.slot_mut(component)) else {
                return;
            };
            if slot.behavior.is_none() {
                return;
            }
            let Some(notification) = slot.deferred.pop_front() else {
                return;
            };
            self.deliver(id, component, notification);
        }
    }

    fn deliver(&mut self, id: EntityId, component: ComponentType, notification: Notification) {
        match notification {
            Notification::Update(change) => {
                self.invoke_component(id, component, |behavior, ctx| behavior.update(ctx, &change));
            }
            Notification::DependencyAdded(capability) => {
                let Some(state) = self
                    .provider_of(id, capability)
                    .and_then(|provider| self.component_state(id, provider))
                    .cloned()
                else {
                    log::debug!("provider of {capability} left before {component} was notified");
                    return;
                };
                self.invoke_component(id, component, |behavior, ctx| {
                    behavior.dependency_added(ctx, capability, &state);
                });
            }
            Notification::DependencyUpdated(capability, change) => {
                self.invoke_component(id, component, |behavior, ctx| {
                    behavior.dependency_updated(ctx, capability, &change);
                });
            }
            Notification::DependencyRemoved(capability) => {
                self.invoke_component(id, component, |behavior, ctx| {
                    behavior.dependency_removed(ctx, capability);
                });
            }
        }
    }

    /// Run `hook` with the component's behavior taken out of its slot
    fn invoke_component<R>(
        &mut self,
        id: EntityId,
        component: ComponentType,
        hook: impl FnOnce(&mut dyn Component, &mut ComponentContext<'_>) -> R,
    ) -> Option<R> {
        let mut behavior = self
            .entities
            .get_mut(id)?
            .slot_mut(component)?
            .behavior
            .take()?;
        let result = hook(behavior.as_mut(), &mut ComponentContext::new(self, id, component));
        if let Some(slot) = self.entities.get_mut(id).and_then(|entity| entity.slot_mut(component)) {
            slot.behavior = Some(behavior);
        }
        Some(result)
    }

    /// Run a hook, then deliver whatever it queued for the component
    pub(crate) fn call_component(
        &mut self,
        id: EntityId,
        component: ComponentType,
        hook: impl FnOnce(&mut dyn Component, &mut ComponentContext<'_>),
    ) {
        if self.invoke_component(id, component, hook).is_some() {
            self.drain(id, component);
        }
    }

    pub(crate) fn dispatch_component_event(
        &mut self,
        id: EntityId,
        component: ComponentType,
        event_type: EventType,
    ) -> DispatchReport {
        let event = Event::bubbling(event_type)
            .with_arg("component", EventArg::Component(ComponentRef::new(id, component)));
        self.dispatch(id, &event)
    }

    // ---------------------------------------------------------------------
    // Systems
    // ---------------------------------------------------------------------

    /// Attach a system to an entity
    pub fn add_system<S: System>(&mut self, id: EntityId, system: S) -> Result<(), WorldError> {
        self.add_boxed_system(id, Box::new(system))
    }

    /// Attach a boxed system to an entity
    ///
    /// A system of the same type is removed first, with a warning.
    pub fn add_boxed_system(&mut self, id: EntityId, system: Box<dyn System>) -> Result<(), WorldError> {
        let entity = self.entities.get(id).ok_or(WorldError::MissingEntity(id))?;
        let system_type = system.system_type();
        if entity.systems.iter().any(|slot| slot.system_type == system_type) {
            let message = format!(
                "entity '{}' already has system {system_type} - replacing it",
                entity.name
            );
            self.report(Diagnostic::warning(message));
            self.remove_system(id, system_type);
        }

        let listeners = vec![
            self.insert_listener(id, EventType::ComponentAdded, ListenerKind::System(system_type))?,
            self.insert_listener(id, EventType::ComponentRemoved, ListenerKind::System(system_type))?,
        ];
        let entity = self.entities.get_mut(id).ok_or(WorldError::MissingEntity(id))?;
        entity.systems.push(SystemSlot {
            system_type,
            autoregister: system.autoregister(),
            behavior: Some(system),
            registered: Vec::new(),
            listeners,
        });
        log::debug!("added system {system_type} to entity '{}'", entity.name);

        let flags = entity.flags;
        self.catch_up_system(id, system_type, flags);
        Ok(())
    }

    /// Detach a system, returning its behavior
    ///
    /// The system is paused and disconnected as far as the entity's flags
    /// require, every registered component is unregistered, then `removed`
    /// runs if the entity is added.
    pub fn remove_system(&mut self, id: EntityId, system: SystemType) -> Option<Box<dyn System>> {
        let entity = self.entities.get(id)?;
        if !entity.system_types().contains(&system) {
            return None;
        }
        let flags = entity.flags;
        if flags.contains(LifecycleFlags::PLAYING) {
            self.call_system(id, system, |behavior, ctx| behavior.pause(ctx));
        }
        if flags.contains(LifecycleFlags::CONNECTED) {
            self.call_system(id, system, |behavior, ctx| behavior.disconnected(ctx));
        }
        for component in self.registered_components(id, system) {
            self.unregister_component(id, system, component);
        }
        if flags.contains(LifecycleFlags::ADDED) {
            self.call_system(id, system, |behavior, ctx| behavior.removed(ctx));
        }

        let entity = self.entities.get_mut(id)?;
        let index = entity
            .systems
            .iter()
            .position(|slot| slot.system_type == system)?;
        let slot = entity.systems.remove(index);
        entity
            .listeners
            .retain(|listener| !slot.listeners.contains(&listener.id));
        slot.behavior
    }

    /// Borrow the first system of concrete type `S`
    pub fn system<S: System>(&self, id: EntityId) -> Option<&S> {
        self.entities.get(id)?.systems.iter().find_map(|slot| {
            slot.behavior
                .as_deref()
                .and_then(|behavior| behavior.as_any().downcast_ref::<S>())
        })
    }

    /// Components registered with a system, in registration order
    pub fn registered_components(&self, id: EntityId, system: SystemType) -> Vec<ComponentRef> {
        self.entities
            .get(id)
            .and_then(|entity| entity.systems.iter().find(|slot| slot.system_type == system))
            .map(|slot| slot.registered.clone())
            .unwrap_or_default()
    }

    /// Register `component` with a system; duplicates are reported and ignored
    ///
    /// The system's `registered` hook is skipped when the request comes from
    /// one of that system's own hooks.
    pub fn register_component(
        &mut self,
        id: EntityId,
        system: SystemType,
        component: ComponentRef,
    ) -> bool {
        let Some(slot) = self.entities.get_mut(id).and_then(|entity| entity.system_slot_mut(system)) else {
            return false;
        };
        if slot.registered.contains(&component) {
            self.report(Diagnostic::warning(format!(
                "component is already registered with system {system}"
            ))
            .with_component(component.component.name()));
            return false;
        }
        slot.registered.push(component);
        self.call_system(id, system, |behavior, ctx| behavior.registered(ctx, component));
        true
    }

    /// Unregister `component` from a system; unknown components are reported
    pub fn unregister_component(
        &mut self,
        id: EntityId,
        system: SystemType,
        component: ComponentRef,
    ) -> bool {
        let Some(slot) = self.entities.get_mut(id).and_then(|entity| entity.system_slot_mut(system)) else {
            return false;
        };
        let Some(index) = slot.registered.iter().position(|existing| *existing == component) else {
            self.report(Diagnostic::warning(format!(
                "component is not registered with system {system}"
            ))
            .with_component(component.component.name()));
            return false;
        };
        slot.registered.remove(index);
        self.call_system(id, system, |behavior, ctx| behavior.unregistered(ctx, component));
        true
    }

    pub(crate) fn call_system(
        &mut self,
        id: EntityId,
        system: SystemType,
        hook: impl FnOnce(&mut dyn System, &mut SystemContext<'_>),
    ) {
        let Some(mut behavior) = self
            .entities
            .get_mut(id)
            .and_then(|entity| entity.system_slot_mut(system))
            .and_then(|slot| slot.behavior.take())
        else {
            return;
        };
        hook(behavior.as_mut(), &mut SystemContext::new(self, id, system));
        if let Some(slot) = self.entities.get_mut(id).and_then(|entity| entity.system_slot_mut(system)) {
            slot.behavior = Some(behavior);
        }
    }

    /// Base system behavior for component events
    fn system_event(
        &mut self,
        id: EntityId,
        system: SystemType,
        event: &Event,
        ctx: &mut DispatchContext,
    ) {
        let Some(component) = event.component() else {
            return;
        };
        let matches = self
            .entities
            .get_mut(id)
            .and_then(|entity| entity.system_slot_mut(system))
            .is_some_and(|slot| slot.autoregister.contains(&component.component));
        if !matches {
            return;
        }
        match event.event_type {
            EventType::ComponentAdded => {
                self.register_component(id, system, component);
            }
            EventType::ComponentRemoved => {
                self.unregister_component(id, system, component);
            }
            EventType::Custom(_) => return,
        }
        ctx.stop_propagation();
    }

    // ---------------------------------------------------------------------
    // Events
    // ---------------------------------------------------------------------

    /// Register a listener on an entity
    pub fn add_listener(
        &mut self,
        id: EntityId,
        event_type: EventType,
        handler: impl EventHandler + 'static,
    ) -> Result<ListenerId, WorldError> {
        self.insert_listener(id, event_type, ListenerKind::Handler(Box::new(handler)))
    }

    /// Remove a listener; returns `false` if it was not registered on `id`
    pub fn remove_listener(&mut self, id: EntityId, listener: ListenerId) -> bool {
        let Some(entity) = self.entities.get_mut(id) else {
            return false;
        };
        let before = entity.listeners.len();
        entity.listeners.retain(|entry| entry.id != listener);
        entity.listeners.len() != before
    }

    fn insert_listener(
        &mut self,
        id: EntityId,
        event_type: EventType,
        kind: ListenerKind,
    ) -> Result<ListenerId, WorldError> {
        let entity = self.entities.get_mut(id).ok_or(WorldError::MissingEntity(id))?;
        let listener = ListenerId(self.next_listener);
        self.next_listener += 1;
        entity.listeners.push(ListenerEntry {
            id: listener,
            event_type,
            kind,
        });
        Ok(listener)
    }

    /// Dispatch `event` on `target`
    ///
    /// Listeners for the event type run in registration order. Bubbling
    /// events continue at the parent unless a listener stopped propagation.
    pub fn dispatch(&mut self, target: EntityId, event: &Event) -> DispatchReport {
        let mut report = DispatchReport::default();
        let mut ctx = DispatchContext::new(target);
        let mut current = Some(target);

        while let Some(node) = current {
            let Some(entity) = self.entities.get(node) else {
                break;
            };
            ctx.set_current(node);
            report.visited.push(node);

            let listeners: Vec<ListenerId> = entity
                .listeners
                .iter()
                .filter(|entry| entry.event_type == event.event_type)
                .map(|entry| entry.id)
                .collect();
            for listener in listeners {
                if self.run_listener(node, listener, event, &mut ctx) {
                    report.delivered += 1;
                }
            }

            if ctx.is_propagation_stopped() {
                report.stopped_at = Some(node);
                break;
            }
            if !event.bubbles {
                break;
            }
            current = self.entities.get(node).and_then(Entity::parent);
        }
        report
    }

    fn run_listener(
        &mut self,
        node: EntityId,
        listener: ListenerId,
        event: &Event,
        ctx: &mut DispatchContext,
    ) -> bool {
        let Some(entry) = self
            .entities
            .get_mut(node)
            .and_then(|entity| entity.listeners.iter_mut().find(|entry| entry.id == listener))
        else {
            return false;
        };
        let system = match &mut entry.kind {
            ListenerKind::Handler(handler) => {
                handler.on_event(event, ctx);
                None
            }
            ListenerKind::System(system) => Some(*system),
        };
        if let Some(system) = system {
            self.system_event(node, system, event, ctx);
        }
        true
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for World {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("World")
            .field("entities", &self.entities.len())
            .field("root", &self.root)
            .field("diagnostics", &self.diagnostics.len())
            .field("clock", &self.clock)
            .finish_non_exhaustive()
    }
}
