//! Scenario tests for the world, shared fixtures
//!
//! [`Probe`] components and [`Tracker`] systems append one line per hook
//! invocation to a shared journal so tests can assert on exact ordering.

mod dependencies;

use crate::ecs::{
    Component, ComponentContext, ComponentInstance, ComponentRef, ComponentType, EntityId,
    FieldChange, System, SystemContext, SystemType, World,
};
use crate::schema::{CanonicalConfig, PropertyDescriptor, Schema};
use std::{cell::RefCell, rc::Rc};

pub(super) type Journal = Rc<RefCell<Vec<String>>>;

pub(super) fn journal() -> Journal {
    Rc::new(RefCell::new(Vec::new()))
}

/// Remove and return everything recorded so far
pub(super) fn drain(journal: &Journal) -> Vec<String> {
    journal.borrow_mut().drain(..).collect()
}

/// Recorded lines starting with `prefix`
pub(super) fn lines(journal: &Journal, prefix: &str) -> Vec<String> {
    journal
        .borrow()
        .iter()
        .filter(|line| line.starts_with(prefix))
        .cloned()
        .collect()
}

pub(super) const A: ComponentType = ComponentType::new("A");
pub(super) const B: ComponentType = ComponentType::new("B");
pub(super) const C: ComponentType = ComponentType::new("C");
pub(super) const SHAPE: ComponentType = ComponentType::new("Shape");

/// Component with a single numeric field `x` (default 1) that journals its hooks
pub(super) struct Probe {
    name: &'static str,
    journal: Journal,
    dependencies: &'static [ComponentType],
    capabilities: &'static [ComponentType],
    /// Write `x` from inside the `added` hook
    write_on_added: Option<f64>,
    /// Copy every dependency update into the own `x`
    relay: bool,
}

impl Probe {
    pub(super) fn new(name: &'static str, journal: &Journal) -> Self {
        Self {
            name,
            journal: Rc::clone(journal),
            dependencies: &[],
            capabilities: &[],
            write_on_added: None,
            relay: false,
        }
    }

    pub(super) fn depends_on(mut self, dependencies: &'static [ComponentType]) -> Self {
        self.dependencies = dependencies;
        self
    }

    pub(super) fn provides(mut self, capabilities: &'static [ComponentType]) -> Self {
        self.capabilities = capabilities;
        self
    }

    pub(super) fn write_on_added(mut self, value: f64) -> Self {
        self.write_on_added = Some(value);
        self
    }

    pub(super) fn relay(mut self) -> Self {
        self.relay = true;
        self
    }

    pub(super) fn instance(self) -> ComponentInstance {
        ComponentInstance::new(self).expect("probe schema is valid")
    }

    fn record(&self, line: String) {
        self.journal.borrow_mut().push(format!("{}.{line}", self.name));
    }
}

impl Component for Probe {
    fn component_type(&self) -> ComponentType {
        ComponentType::new(self.name)
    }

    fn schema(&self) -> Schema {
        Schema::new().property("x", PropertyDescriptor::number(1.0))
    }

    fn dependencies(&self) -> &'static [ComponentType] {
        self.dependencies
    }

    fn capabilities(&self) -> &'static [ComponentType] {
        self.capabilities
    }

    fn added(&mut self, ctx: &mut ComponentContext<'_>) {
        self.record("added".to_string());
        if let Some(value) = self.write_on_added {
            ctx.set("x", value).expect("x exists");
            self.record("added returns".to_string());
        }
    }

    fn connected(&mut self, _ctx: &mut ComponentContext<'_>) {
        self.record("connected".to_string());
    }

    fn disconnected(&mut self, _ctx: &mut ComponentContext<'_>) {
        self.record("disconnected".to_string());
    }

    fn play(&mut self, _ctx: &mut ComponentContext<'_>) {
        self.record("play".to_string());
    }

    fn pause(&mut self, _ctx: &mut ComponentContext<'_>) {
        self.record("pause".to_string());
    }

    fn tick(&mut self, _ctx: &mut ComponentContext<'_>, time: f64, delta: f64) {
        self.record(format!("tick {time} {delta}"));
    }

    fn tock(&mut self, _ctx: &mut ComponentContext<'_>, time: f64, delta: f64) {
        self.record(format!("tock {time} {delta}"));
    }

    fn update(&mut self, ctx: &mut ComponentContext<'_>, change: &FieldChange) {
        self.record(format!(
            "update {} {}->{}",
            change.field, change.previous, change.current
        ));
        ctx.notify_dependents(change);
    }

    fn dependency_added(
        &mut self,
        _ctx: &mut ComponentContext<'_>,
        capability: ComponentType,
        state: &CanonicalConfig,
    ) {
        let x = state.get("x").map(ToString::to_string).unwrap_or_default();
        self.record(format!("dependency_added {capability} x={x}"));
    }

    fn dependency_updated(
        &mut self,
        ctx: &mut ComponentContext<'_>,
        capability: ComponentType,
        change: &FieldChange,
    ) {
        self.record(format!(
            "dependency_updated {capability} {} {}->{}",
            change.field, change.previous, change.current
        ));
        if self.relay {
            ctx.set("x", change.current.clone()).expect("x exists");
        }
    }

    fn dependency_removed(&mut self, _ctx: &mut ComponentContext<'_>, capability: ComponentType) {
        self.record(format!("dependency_removed {capability}"));
    }
}

/// System that journals its hooks and autoregisters the given types
pub(super) struct Tracker {
    journal: Journal,
    filter: &'static [ComponentType],
}

impl Tracker {
    pub(super) const TYPE: SystemType = SystemType::new("Tracker");

    pub(super) fn new(journal: &Journal, filter: &'static [ComponentType]) -> Self {
        Self {
            journal: Rc::clone(journal),
            filter,
        }
    }

    fn record(&self, line: String) {
        self.journal.borrow_mut().push(format!("Tracker.{line}"));
    }
}

impl System for Tracker {
    fn system_type(&self) -> SystemType {
        Self::TYPE
    }

    fn autoregister(&self) -> &'static [ComponentType] {
        self.filter
    }

    fn added(&mut self, _ctx: &mut SystemContext<'_>) {
        self.record("added".to_string());
    }

    fn removed(&mut self, _ctx: &mut SystemContext<'_>) {
        self.record("removed".to_string());
    }

    fn connected(&mut self, _ctx: &mut SystemContext<'_>) {
        self.record("connected".to_string());
    }

    fn disconnected(&mut self, _ctx: &mut SystemContext<'_>) {
        self.record("disconnected".to_string());
    }

    fn play(&mut self, _ctx: &mut SystemContext<'_>) {
        self.record("play".to_string());
    }

    fn pause(&mut self, _ctx: &mut SystemContext<'_>) {
        self.record("pause".to_string());
    }

    fn tick(&mut self, _ctx: &mut SystemContext<'_>, time: f64, _delta: f64) {
        self.record(format!("tick {time}"));
    }

    fn registered(&mut self, _ctx: &mut SystemContext<'_>, component: ComponentRef) {
        self.record(format!("registered {}", component.component));
    }

    fn unregistered(&mut self, _ctx: &mut SystemContext<'_>, component: ComponentRef) {
        self.record(format!("unregistered {}", component.component));
    }
}

/// Spawn a named entity and attach it below `parent`
pub(super) fn child_of(world: &mut World, parent: EntityId, name: &str) -> EntityId {
    let id = world.spawn(name);
    world.attach(id, parent).expect("attach succeeds");
    id
}
