//! Demo components and systems

use scene_engine::prelude::*;

/// Capability provided by every shape
pub const SHAPE: ComponentType = ComponentType::new("Shape");
/// Outline component type
pub const OUTLINE: ComponentType = ComponentType::new("Outline");
/// Spinner component type
pub const SPINNER: ComponentType = ComponentType::new("Spinner");

/// Geometric primitive; `radius` only applies to spheres
pub struct Shape;

impl Component for Shape {
    fn component_type(&self) -> ComponentType {
        SHAPE
    }

    fn schema(&self) -> Schema {
        Schema::new()
            .property("primitive", PropertyDescriptor::one_of(["box", "sphere", "plane"]))
            .property("width", PropertyDescriptor::number(1.0).with_min(0.0))
            .property(
                "radius",
                PropertyDescriptor::number(1.0)
                    .with_min(0.0)
                    .requires("primitive", "sphere"),
            )
            .property("color", PropertyDescriptor::color(Color::default()))
    }
}

/// Extent of a shape's bounding outline
fn extent(shape: &CanonicalConfig) -> f64 {
    shape
        .get("radius")
        .or_else(|| shape.get("width"))
        .and_then(Value::as_number)
        .unwrap_or_default()
}

/// Outline drawn around the entity's shape
///
/// Keeps its `extent` field in sync with the shape it depends on.
pub struct Outline;

impl Outline {
    fn resize(ctx: &mut ComponentContext<'_>, shape_extent: f64) {
        let thickness = ctx.get("thickness").and_then(Value::as_number).unwrap_or_default();
        if let Err(error) = ctx.set("extent", shape_extent + thickness) {
            ctx.warn(format!("cannot resize outline: {error}"));
        }
    }
}

impl Component for Outline {
    fn component_type(&self) -> ComponentType {
        OUTLINE
    }

    fn schema(&self) -> Schema {
        Schema::new()
            .property("thickness", PropertyDescriptor::number(0.05).range(0.0, 1.0))
            .property("color", PropertyDescriptor::color(Color::from_hex(0x000000)))
            .property("extent", PropertyDescriptor::number(0.0).with_min(0.0))
    }

    fn dependencies(&self) -> &'static [ComponentType] {
        &[SHAPE]
    }

    fn dependency_added(
        &mut self,
        ctx: &mut ComponentContext<'_>,
        capability: ComponentType,
        state: &CanonicalConfig,
    ) {
        log::info!(
            "outline tracking {capability} ({})",
            state.get("primitive").map(ToString::to_string).unwrap_or_default()
        );
        Self::resize(ctx, extent(state));
    }

    fn dependency_updated(
        &mut self,
        ctx: &mut ComponentContext<'_>,
        _capability: ComponentType,
        change: &FieldChange,
    ) {
        if change.field == "radius" || change.field == "width" {
            let shape_extent = change.current.as_number().unwrap_or_default();
            Self::resize(ctx, shape_extent);
        }
    }

    fn dependency_removed(&mut self, ctx: &mut ComponentContext<'_>, capability: ComponentType) {
        log::info!("outline lost its {capability}");
        Self::resize(ctx, 0.0);
    }
}

/// Rotates at `speed` turns per second while playing
#[derive(Default)]
pub struct Spinner {
    playing: bool,
}

impl Component for Spinner {
    fn component_type(&self) -> ComponentType {
        SPINNER
    }

    fn schema(&self) -> Schema {
        Schema::new()
            .property("speed", PropertyDescriptor::number(1.0).range(0.0, 10.0))
            .property("angle", PropertyDescriptor::number(0.0))
    }

    fn play(&mut self, _ctx: &mut ComponentContext<'_>) {
        self.playing = true;
    }

    fn pause(&mut self, _ctx: &mut ComponentContext<'_>) {
        self.playing = false;
    }

    fn tick(&mut self, ctx: &mut ComponentContext<'_>, _time: f64, delta: f64) {
        if !self.playing {
            return;
        }
        let speed = ctx.get("speed").and_then(Value::as_number).unwrap_or_default();
        let angle = ctx.get("angle").and_then(Value::as_number).unwrap_or_default();
        let turned = (angle + speed * delta).rem_euclid(1.0);
        if let Err(error) = ctx.set("angle", turned) {
            ctx.warn(format!("cannot spin: {error}"));
        }
    }
}

/// Keeps track of every shape in its subtree
#[derive(Default)]
pub struct ShapeCounter {
    frames: u64,
}

impl ShapeCounter {
    /// System type name
    pub const TYPE: SystemType = SystemType::new("ShapeCounter");
}

impl System for ShapeCounter {
    fn system_type(&self) -> SystemType {
        Self::TYPE
    }

    fn autoregister(&self) -> &'static [ComponentType] {
        &[SHAPE]
    }

    fn registered(&mut self, ctx: &mut SystemContext<'_>, component: ComponentRef) {
        let primitive = ctx
            .component_state(component)
            .and_then(|state| state.get("primitive"))
            .map(ToString::to_string)
            .unwrap_or_default();
        log::info!("counting {primitive} ({} shapes)", ctx.registered().len());
    }

    fn unregistered(&mut self, ctx: &mut SystemContext<'_>, _component: ComponentRef) {
        log::info!("shape left the scene ({} shapes)", ctx.registered().len());
    }

    fn tock(&mut self, ctx: &mut SystemContext<'_>, time: f64, _delta: f64) {
        self.frames += 1;
        log::debug!(
            "frame {} at {time:.3}s: {} shapes",
            self.frames,
            ctx.registered().len()
        );
    }
}

/// Registry with every demo component
pub fn registry() -> ComponentRegistry {
    let mut registry = ComponentRegistry::new();
    registry
        .register("shape", || Shape)
        .register("outline", || Outline)
        .register("spinner", Spinner::default);
    registry
}

/// Outlined primitive whose shape is configured through template properties
pub fn primitive_template() -> EntityTemplate {
    EntityTemplate::new("primitive")
        .with_component("shape", UserConfig::new())
        .with_component("outline", UserConfig::new())
        .with_mapping("primitive", "shape", "primitive")
        .with_mapping("radius", "shape", "radius")
        .with_mapping("width", "shape", "width")
        .with_mapping("color", "shape", "color")
        .with_mapping("outline", "outline", "thickness")
}
