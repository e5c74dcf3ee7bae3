//! Dependency propagation between sibling components

use super::*;
use crate::foundation::diagnostics::Severity;
use crate::schema::Value;

fn entity_with(world: &mut World, probes: Vec<Probe>) -> EntityId {
    let id = world.spawn("probe");
    for probe in probes {
        world.add_component(id, probe.instance()).expect("entity exists");
    }
    id
}

#[test]
fn test_provider_attached_after_dependent_notifies_once() {
    let log = journal();
    let mut world = World::new();
    let id = entity_with(&mut world, vec![Probe::new("B", &log).depends_on(&[A])]);
    assert!(drain(&log).is_empty());

    world.add_component(id, Probe::new("A", &log).instance()).expect("entity exists");

    assert_eq!(drain(&log), vec!["B.dependency_added A x=1"]);
    assert_eq!(world.linked_dependents(id, A), vec![B]);
}

#[test]
fn test_dependent_learns_of_existing_provider() {
    let log = journal();
    let mut world = World::new();
    let id = entity_with(&mut world, vec![Probe::new("A", &log)]);
    world.set_field(id, A, "x", 4.0).expect("x exists");
    drain(&log);

    world
        .add_component(id, Probe::new("B", &log).depends_on(&[A]).instance())
        .expect("entity exists");

    assert_eq!(drain(&log), vec!["B.dependency_added A x=4"]);
}

#[test]
fn test_field_change_fans_out_once() {
    let log = journal();
    let mut world = World::new();
    let id = entity_with(
        &mut world,
        vec![
            Probe::new("B", &log).depends_on(&[A]),
            Probe::new("C", &log).depends_on(&[A]),
            Probe::new("A", &log),
        ],
    );
    drain(&log);

    world.set_field(id, A, "x", 2.0).expect("x exists");

    assert_eq!(
        drain(&log),
        vec![
            "A.update x 1->2",
            "B.dependency_updated A x 1->2",
            "C.dependency_updated A x 1->2",
        ]
    );
}

#[test]
fn test_equal_write_updates_without_fan_out() {
    let log = journal();
    let mut world = World::new();
    let id = entity_with(
        &mut world,
        vec![Probe::new("A", &log), Probe::new("B", &log).depends_on(&[A])],
    );
    world.set_field(id, A, "x", 2.0).expect("x exists");
    drain(&log);

    world.set_field(id, A, "x", 2.0).expect("x exists");

    assert_eq!(drain(&log), vec!["A.update x 2->2"]);
}

#[test]
fn test_removing_provider_notifies_and_unlinks() {
    let log = journal();
    let mut world = World::new();
    let id = entity_with(
        &mut world,
        vec![Probe::new("B", &log).depends_on(&[A]), Probe::new("A", &log)],
    );
    drain(&log);

    let removed = world.remove_component(id, A);

    assert!(removed.is_some());
    assert_eq!(
        drain(&log),
        vec!["A.disconnected", "B.dependency_removed A"]
    );
    assert_eq!(world.provider_of(id, A), None);
    assert!(world.linked_dependents(id, A).is_empty());
    let graph = world.entity(id).map(|entity| entity.graph().clone()).expect("entity exists");
    assert_eq!(graph.dependents_of(A), &[B]);

    world.set_field(id, B, "x", 3.0).expect("x exists");
    assert_eq!(lines(&log, "B.dependency"), Vec::<String>::new());
}

#[test]
fn test_removing_last_dependent_drops_graph_entry() {
    let log = journal();
    let mut world = World::new();
    let id = entity_with(
        &mut world,
        vec![Probe::new("A", &log), Probe::new("B", &log).depends_on(&[A])],
    );

    world.remove_component(id, B);

    let entity = world.entity(id).expect("entity exists");
    assert!(!entity.graph().contains(A));
    assert!(entity.graph().is_empty());
}

#[test]
fn test_capability_resolves_to_first_provider() {
    let log = journal();
    let mut world = World::new();
    let id = entity_with(
        &mut world,
        vec![
            Probe::new("C", &log).depends_on(&[SHAPE]),
            Probe::new("A", &log).provides(&[SHAPE]),
            Probe::new("B", &log).provides(&[SHAPE]),
        ],
    );
    assert_eq!(drain(&log), vec!["C.dependency_added Shape x=1"]);
    assert_eq!(world.provider_of(id, SHAPE), Some(A));

    world.set_field(id, B, "x", 9.0).expect("x exists");
    assert_eq!(drain(&log), vec!["B.update x 1->9"]);

    world.remove_component(id, A);
    assert_eq!(
        drain(&log),
        vec![
            "A.disconnected",
            "C.dependency_removed Shape",
            "C.dependency_added Shape x=9",
        ]
    );
    assert_eq!(world.provider_of(id, SHAPE), Some(B));
}

#[test]
fn test_write_inside_hook_is_delivered_after_it_returns() {
    let log = journal();
    let mut world = World::new();
    let root = world.root();
    let id = child_of(&mut world, root, "probe");
    world
        .add_component(id, Probe::new("A", &log).write_on_added(5.0).instance())
        .expect("entity exists");
    world
        .add_component(id, Probe::new("B", &log).depends_on(&[A]).instance())
        .expect("entity exists");
    drain(&log);

    world.added(root);

    assert_eq!(
        drain(&log),
        vec![
            "A.added",
            "A.added returns",
            "A.update x 1->5",
            "B.dependency_updated A x 1->5",
            "B.added",
        ]
    );
}

#[test]
fn test_updates_relay_through_chains() {
    let log = journal();
    let mut world = World::new();
    let id = entity_with(
        &mut world,
        vec![
            Probe::new("A", &log),
            Probe::new("B", &log).depends_on(&[A]).relay(),
            Probe::new("C", &log).depends_on(&[B]),
        ],
    );
    drain(&log);

    world.set_field(id, A, "x", 7.0).expect("x exists");

    assert_eq!(
        drain(&log),
        vec![
            "A.update x 1->7",
            "B.dependency_updated A x 1->7",
            "B.update x 1->7",
            "C.dependency_updated B x 1->7",
        ]
    );
    assert_eq!(
        world.component_state(id, C).and_then(|state| state.get("x")),
        Some(&Value::Number(1.0))
    );
}

#[test]
fn test_unknown_field_write_is_an_error_diagnostic() {
    let log = journal();
    let mut world = World::new();
    let id = entity_with(&mut world, vec![Probe::new("A", &log)]);
    drain(&log);

    assert!(world.set_field(id, A, "y", 1.0).is_err());
    assert!(world.set_field(id, B, "x", 1.0).is_err());

    assert!(drain(&log).is_empty());
    assert_eq!(world.diagnostics().with_severity(Severity::Error).count(), 2);
}

#[test]
fn test_component_downcast() {
    let log = journal();
    let mut world = World::new();
    let id = entity_with(&mut world, vec![Probe::new("A", &log).relay()]);

    let probe = world.component::<Probe>(id).expect("probe attached");
    assert!(probe.relay);
}
