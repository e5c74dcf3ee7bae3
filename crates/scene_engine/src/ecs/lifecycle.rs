//! Entity lifecycle state machine
//!
//! Gated transitions run on the entity's components, then its systems,
//! then its children, depth-first. A transition whose flag is already in
//! the target state is a no-op; calling it directly on such an entity is
//! reported as a warning, while children already in that state are
//! skipped silently during propagation.

use super::{component::ComponentType, system::SystemType, world::World, EntityId};
use crate::events::EventType;
use crate::foundation::diagnostics::Diagnostic;
use bitflags::bitflags;
use std::fmt;

bitflags! {
    /// Independent lifecycle flags of an entity
    ///
    /// `PLAYING` normally implies `CONNECTED`, but this is not enforced.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct LifecycleFlags: u8 {
        /// Part of the live scene
        const ADDED = 1 << 0;
        /// Connected to its output surface
        const CONNECTED = 1 << 1;
        /// Receiving per-frame updates
        const PLAYING = 1 << 2;
    }
}

/// A gated lifecycle transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Transition {
    Added,
    Removed,
    Connected,
    Disconnected,
    Play,
    Pause,
}

impl Transition {
    pub(crate) const fn flag(self) -> LifecycleFlags {
        match self {
            Self::Added | Self::Removed => LifecycleFlags::ADDED,
            Self::Connected | Self::Disconnected => LifecycleFlags::CONNECTED,
            Self::Play | Self::Pause => LifecycleFlags::PLAYING,
        }
    }

    /// Whether the transition sets its flag (rather than clearing it)
    pub(crate) const fn sets(self) -> bool {
        matches!(self, Self::Added | Self::Connected | Self::Play)
    }

    pub(crate) fn is_satisfied(self, flags: LifecycleFlags) -> bool {
        flags.contains(self.flag()) == self.sets()
    }

    pub(crate) fn apply(self, flags: &mut LifecycleFlags) {
        flags.set(self.flag(), self.sets());
    }

    /// State reached after the transition
    pub(crate) const fn state_name(self) -> &'static str {
        match self {
            Self::Added => "added",
            Self::Removed => "removed",
            Self::Connected => "connected",
            Self::Disconnected => "disconnected",
            Self::Play => "playing",
            Self::Pause => "paused",
        }
    }
}

impl fmt::Display for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.state_name())
    }
}

impl World {
    /// Bring the entity subtree into the live scene
    ///
    /// Each component's `added` hook is followed by a bubbling
    /// `ComponentAdded` event. Returns `false` if the entity was already added.
    pub fn added(&mut self, id: EntityId) -> bool {
        self.transition(id, Transition::Added, true)
    }

    /// Connect the entity subtree
    pub fn connected(&mut self, id: EntityId) -> bool {
        self.transition(id, Transition::Connected, true)
    }

    /// Disconnect the entity subtree
    pub fn disconnected(&mut self, id: EntityId) -> bool {
        self.transition(id, Transition::Disconnected, true)
    }

    /// Start per-frame updates on the entity subtree
    pub fn play(&mut self, id: EntityId) -> bool {
        self.transition(id, Transition::Play, true)
    }

    /// Stop per-frame updates on the entity subtree
    pub fn pause(&mut self, id: EntityId) -> bool {
        self.transition(id, Transition::Pause, true)
    }

    /// First per-frame callback for the subtree; not gated by any flag
    pub fn tick(&mut self, id: EntityId, time: f64, delta: f64) {
        let Some((components, systems, children)) = self.members(id) else {
            return;
        };
        for component in components {
            self.call_component(id, component, |behavior, ctx| behavior.tick(ctx, time, delta));
        }
        for system in systems {
            self.call_system(id, system, |behavior, ctx| behavior.tick(ctx, time, delta));
        }
        for child in children {
            self.tick(child, time, delta);
        }
    }

    /// Second per-frame callback for the subtree; not gated by any flag
    pub fn tock(&mut self, id: EntityId, time: f64, delta: f64) {
        let Some((components, systems, children)) = self.members(id) else {
            return;
        };
        for component in components {
            self.call_component(id, component, |behavior, ctx| behavior.tock(ctx, time, delta));
        }
        for system in systems {
            self.call_system(id, system, |behavior, ctx| behavior.tock(ctx, time, delta));
        }
        for child in children {
            self.tock(child, time, delta);
        }
    }

    pub(crate) fn transition(&mut self, id: EntityId, transition: Transition, direct: bool) -> bool {
        let Some(entity) = self.entities.get_mut(id) else {
            log::warn!("lifecycle transition to {transition} on a missing entity");
            return false;
        };
        if transition.is_satisfied(entity.flags) {
            if direct {
                let message = format!("entity '{}' is already {transition}", entity.name);
                self.report(Diagnostic::warning(message));
            }
            return false;
        }
        transition.apply(&mut entity.flags);
        log::debug!("entity '{}' {transition}", entity.name);

        let Some((components, systems, children)) = self.members(id) else {
            return true;
        };
        for component in components {
            self.component_transition(id, component, transition);
        }
        for system in systems {
            self.system_transition(id, system, transition);
        }
        for child in children {
            self.transition(child, transition, false);
        }
        true
    }

    /// Run the hooks a newly attached component missed
    pub(crate) fn catch_up_component(&mut self, id: EntityId, component: ComponentType, flags: LifecycleFlags) {
        if flags.contains(LifecycleFlags::ADDED) {
            self.component_transition(id, component, Transition::Added);
        }
        if flags.contains(LifecycleFlags::CONNECTED) {
            self.component_transition(id, component, Transition::Connected);
        }
        if flags.contains(LifecycleFlags::PLAYING) {
            self.component_transition(id, component, Transition::Play);
        }
    }

    /// Run the hooks a newly attached system missed
    pub(crate) fn catch_up_system(&mut self, id: EntityId, system: SystemType, flags: LifecycleFlags) {
        if flags.contains(LifecycleFlags::ADDED) {
            self.system_transition(id, system, Transition::Added);
        }
        if flags.contains(LifecycleFlags::CONNECTED) {
            self.system_transition(id, system, Transition::Connected);
        }
        if flags.contains(LifecycleFlags::PLAYING) {
            self.system_transition(id, system, Transition::Play);
        }
    }

    fn component_transition(&mut self, id: EntityId, component: ComponentType, transition: Transition) {
        match transition {
            Transition::Added => {
                self.call_component(id, component, |behavior, ctx| behavior.added(ctx));
                self.dispatch_component_event(id, component, EventType::ComponentAdded);
            }
            Transition::Removed => {
                self.dispatch_component_event(id, component, EventType::ComponentRemoved);
            }
            Transition::Connected => {
                self.call_component(id, component, |behavior, ctx| behavior.connected(ctx));
            }
            Transition::Disconnected => {
                self.call_component(id, component, |behavior, ctx| behavior.disconnected(ctx));
            }
            Transition::Play => {
                self.call_component(id, component, |behavior, ctx| behavior.play(ctx));
            }
            Transition::Pause => {
                self.call_component(id, component, |behavior, ctx| behavior.pause(ctx));
            }
        }
    }

    fn system_transition(&mut self, id: EntityId, system: SystemType, transition: Transition) {
        self.call_system(id, system, |behavior, ctx| match transition {
            Transition::Added => behavior.added(ctx),
            Transition::Removed => behavior.removed(ctx),
            Transition::Connected => behavior.connected(ctx),
            Transition::Disconnected => behavior.disconnected(ctx),
            Transition::Play => behavior.play(ctx),
            Transition::Pause => behavior.pause(ctx),
        });
    }

    /// Snapshot of the entity's components, systems and children
    fn members(&self, id: EntityId) -> Option<(Vec<ComponentType>, Vec<SystemType>, Vec<EntityId>)> {
        let entity = self.entities.get(id)?;
        Some((
            entity.component_types(),
            entity.system_types(),
            entity.children.clone(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transitions_are_idempotent_on_flags() {
        let mut flags = LifecycleFlags::empty();
        assert!(!Transition::Added.is_satisfied(flags));
        Transition::Added.apply(&mut flags);
        assert!(Transition::Added.is_satisfied(flags));
        assert!(!Transition::Removed.is_satisfied(flags));

        Transition::Removed.apply(&mut flags);
        assert!(flags.is_empty());
        assert!(Transition::Pause.is_satisfied(flags));
        assert!(Transition::Disconnected.is_satisfied(flags));
    }

    #[test]
    fn test_flags_are_independent() {
        let mut flags = LifecycleFlags::empty();
        Transition::Play.apply(&mut flags);
        assert!(flags.contains(LifecycleFlags::PLAYING));
        assert!(!flags.contains(LifecycleFlags::CONNECTED));
        assert_eq!(Transition::Play.to_string(), "playing");
    }
}
