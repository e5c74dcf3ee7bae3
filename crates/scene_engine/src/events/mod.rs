//! Scene events
//!
//! Key principles:
//! - Key-value arguments (no order dependency)
//! - Listeners are registered per entity and per event type
//! - Opt-in bubbling towards the root
//! - Cancellation lives on the [`DispatchContext`], never on the event

use crate::ecs::{ComponentRef, EntityId};
use crate::schema::Value;
use std::collections::HashMap;

/// Event type identification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventType {
    /// A component finished its `added` hook
    ComponentAdded,
    /// A component is leaving an added entity
    ComponentRemoved,
    /// Application-defined event
    Custom(&'static str),
}

/// Variant for type-safe event arguments
#[derive(Debug, Clone, PartialEq)]
pub enum EventArg {
    /// Component the event concerns
    Component(ComponentRef),
    /// Entity the event concerns
    Entity(EntityId),
    /// Arbitrary configuration value
    Value(Value),
}

/// Event with type ID and key-value arguments
#[derive(Debug, Clone)]
pub struct Event {
    /// Type of event
    pub event_type: EventType,
    /// Whether the event continues to the parent after the target
    pub bubbles: bool,
    args: HashMap<&'static str, EventArg>,
}

impl Event {
    /// Create a non-bubbling event
    pub fn new(event_type: EventType) -> Self {
        Self {
            event_type,
            bubbles: false,
            args: HashMap::new(),
        }
    }

    /// Create a bubbling event
    pub fn bubbling(event_type: EventType) -> Self {
        Self {
            bubbles: true,
            ..Self::new(event_type)
        }
    }

    /// Add an argument to the event (builder pattern)
    pub fn with_arg(mut self, key: &'static str, value: EventArg) -> Self {
        self.args.insert(key, value);
        self
    }

    /// Get an argument by key
    pub fn get_arg(&self, key: &str) -> Option<&EventArg> {
        self.args.get(key)
    }

    /// Get the `component` argument if present
    pub fn component(&self) -> Option<ComponentRef> {
        if let Some(EventArg::Component(component)) = self.get_arg("component") {
            Some(*component)
        } else {
            None
        }
    }

    /// Get a value argument if present
    pub fn value(&self, key: &str) -> Option<&Value> {
        if let Some(EventArg::Value(value)) = self.get_arg(key) {
            Some(value)
        } else {
            None
        }
    }
}

/// Per-dispatch state handed to every listener
#[derive(Debug)]
pub struct DispatchContext {
    target: EntityId,
    current: EntityId,
    stopped: bool,
}

impl DispatchContext {
    pub(crate) fn new(target: EntityId) -> Self {
        Self {
            target,
            current: target,
            stopped: false,
        }
    }

    pub(crate) fn set_current(&mut self, current: EntityId) {
        self.current = current;
    }

    /// Entity the event was dispatched on
    pub fn target(&self) -> EntityId {
        self.target
    }

    /// Entity whose listeners are running
    pub fn current(&self) -> EntityId {
        self.current
    }

    /// Prevent the event from bubbling past the current entity
    ///
    /// Remaining listeners on the current entity still run.
    pub fn stop_propagation(&mut self) {
        self.stopped = true;
    }

    /// Whether a listener stopped propagation
    pub fn is_propagation_stopped(&self) -> bool {
        self.stopped
    }
}

/// Outcome of a dispatch
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DispatchReport {
    /// Number of listener invocations
    pub delivered: usize,
    /// Entities visited, target first
    pub visited: Vec<EntityId>,
    /// Entity on which propagation was stopped
    pub stopped_at: Option<EntityId>,
}

/// Event listener
pub trait EventHandler {
    /// Handle an event
    fn on_event(&mut self, event: &Event, ctx: &mut DispatchContext);
}

impl<F> EventHandler for F
where
    F: FnMut(&Event, &mut DispatchContext),
{
    fn on_event(&mut self, event: &Event, ctx: &mut DispatchContext) {
        self(event, ctx);
    }
}

/// Handle returned when a listener is registered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(pub(crate) u64);
