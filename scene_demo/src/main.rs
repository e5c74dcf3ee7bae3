//! Scene demo application
//!
//! Builds a small scene of outlined primitives from templates, drives a
//! few frames and reports the diagnostics raised along the way.
//!
//! Usage: `scene_demo [scene.toml|scene.ron]`

mod components;

use components::{primitive_template, registry, ShapeCounter, SHAPE, SPINNER};
use scene_engine::foundation::logging;
use scene_engine::prelude::*;

const FRAMES: u32 = 5;
const FRAME_TIME: f64 = 1.0 / 60.0;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = match std::env::args().nth(1) {
        Some(path) => SceneConfig::load_from_file(&path)?,
        None => SceneConfig::default(),
    };
    logging::init_with_level(&config.log_level);

    log::info!("Starting scene demo");

    let result = run(&config);
    match result {
        Ok(()) => {
            log::info!("Scene demo completed successfully");
            Ok(())
        }
        Err(e) => {
            log::error!("Scene demo failed: {e}");
            Err(e)
        }
    }
}

fn run(config: &SceneConfig) -> Result<(), Box<dyn std::error::Error>> {
    let registry = registry();
    let template = primitive_template();
    let mut world = World::with_config(config);
    let root = world.root();
    world.add_system(root, ShapeCounter::default())?;

    let ball = world.spawn_template(
        &registry,
        &template,
        &UserConfig::new()
            .with("primitive", "sphere")
            .with("radius", 2.0)
            .with("color", "#4682b4"),
        &[("spinner".to_string(), UserConfig::new().with("speed", 3))],
    );
    // "radius" is skipped for boxes and "size" has no mapping
    let crate_box = world.spawn_template(
        &registry,
        &template,
        &UserConfig::new()
            .with("primitive", "box")
            .with("radius", 5.0)
            .with("size", "large"),
        &[],
    );

    world.attach(ball, root)?;
    world.attach(crate_box, root)?;
    world.added(root);
    world.connected(root);
    world.play(root);

    for frame in 0..FRAMES {
        world.frame(f64::from(frame) * FRAME_TIME);
    }

    world.set_field(ball, SHAPE, "radius", 3.0)?;
    world.pause(root);
    world.detach(crate_box)?;

    if let Some(angle) = world
        .component_state(ball, SPINNER)
        .and_then(|state| state.get("angle"))
    {
        log::info!("ball turned to {angle}");
    }
    log::info!(
        "{} shapes still registered",
        world.registered_components(root, ShapeCounter::TYPE).len()
    );

    let diagnostics = world.diagnostics();
    log::info!(
        "{} diagnostics raised ({} warnings)",
        diagnostics.len(),
        diagnostics.warning_count()
    );
    for diagnostic in diagnostics.records() {
        log::info!("  {diagnostic}");
    }
    Ok(())
}
