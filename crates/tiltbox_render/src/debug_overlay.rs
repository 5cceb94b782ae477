//! Physics debug overlay
//!
//! Draws the raw physics geometry from a [`WorldSnapshot`] through any
//! [`DebugDraw`] implementation. The overlay only reads the snapshot.

use bitflags::bitflags;
use tiltbox_math::{Isometry2, Vec2};
use tiltbox_physics::{BodyType, ShapeOutline, WorldSnapshot};

/// Linear RGBA colour
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    pub const RED: Self = Self::rgb(1.0, 0.0, 0.0);
    pub const GREEN: Self = Self::rgb(0.0, 1.0, 0.0);

    pub fn to_array(self) -> [f32; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

/// Drawing primitives the overlay needs
///
/// Coordinates are world metres.
pub trait DebugDraw {
    /// Closed polygon outline
    fn draw_polygon(&mut self, vertices: &[Vec2], color: Color);
    /// Filled polygon
    fn draw_solid_polygon(&mut self, vertices: &[Vec2], color: Color);
    fn draw_circle(&mut self, center: Vec2, radius: f32, color: Color);
    /// Filled circle with a radius line along `axis`
    fn draw_solid_circle(&mut self, center: Vec2, radius: f32, axis: Vec2, color: Color);
    fn draw_segment(&mut self, p1: Vec2, p2: Vec2, color: Color);
    /// Local x axis in red and y axis in green
    fn draw_transform(&mut self, xf: &Isometry2);
    fn draw_point(&mut self, p: Vec2, size: f32, color: Color);
}

bitflags! {
    /// What the overlay draws
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct DebugDrawFlags: u8 {
        /// Body shapes
        const SHAPES = 1 << 0;
        /// Bounding boxes
        const AABBS = 1 << 1;
        /// Centre of mass frames
        const CENTER_OF_MASS = 1 << 2;
        /// Contact points and normals
        const CONTACTS = 1 << 3;
    }
}

impl Default for DebugDrawFlags {
    fn default() -> Self {
        DebugDrawFlags::SHAPES
    }
}

const STATIC_COLOR: Color = Color::rgb(0.5, 0.9, 0.5);
const KINEMATIC_COLOR: Color = Color::rgb(0.5, 0.5, 0.9);
const DYNAMIC_COLOR: Color = Color::rgb(0.9, 0.7, 0.7);
const AABB_COLOR: Color = Color::rgb(0.9, 0.3, 0.9);
const CONTACT_COLOR: Color = Color::rgb(0.3, 0.95, 0.3);
const NORMAL_COLOR: Color = Color::rgb(0.9, 0.9, 0.3);

/// Length of drawn contact normals in metres
const NORMAL_LENGTH: f32 = 0.3;

/// Shape colour for a body type
pub fn body_color(body_type: BodyType) -> Color {
    match body_type {
        BodyType::Static => STATIC_COLOR,
        BodyType::Kinematic => KINEMATIC_COLOR,
        BodyType::Dynamic => DYNAMIC_COLOR,
    }
}

/// Optional diagnostic renderer over the physics world
#[derive(Clone, Debug, Default)]
pub struct DebugOverlay {
    pub enabled: bool,
    pub flags: DebugDrawFlags,
}

impl DebugOverlay {
    pub fn new(enabled: bool, flags: DebugDrawFlags) -> Self {
        Self { enabled, flags }
    }

    pub fn toggle(&mut self) -> bool {
        self.enabled = !self.enabled;
        self.enabled
    }

    /// Draw the snapshot; does nothing while disabled
    pub fn render(&self, snapshot: &WorldSnapshot, draw: &mut dyn DebugDraw) {
        if !self.enabled {
            return;
        }

        if self.flags.contains(DebugDrawFlags::SHAPES) {
            for body in &snapshot.bodies {
                let color = body_color(body.body_type);
                match &body.outline {
                    ShapeOutline::Circle { center, radius, axis } => {
                        draw.draw_solid_circle(*center, *radius, *axis, color)
                    }
                    ShapeOutline::Polygon { vertices } => draw.draw_solid_polygon(vertices, color),
                }
            }
        }

        if self.flags.contains(DebugDrawFlags::AABBS) {
            for body in &snapshot.bodies {
                draw.draw_polygon(&body.aabb.corners(), AABB_COLOR);
            }
        }

        if self.flags.contains(DebugDrawFlags::CENTER_OF_MASS) {
            for body in &snapshot.bodies {
                let xf = Isometry2 {
                    translation: body.center_of_mass,
                    rotation: body.transform.rotation,
                };
                draw.draw_transform(&xf);
            }
        }

        if self.flags.contains(DebugDrawFlags::CONTACTS) {
            for contact in &snapshot.contacts {
                draw.draw_point(contact.point, 0.1, CONTACT_COLOR);
                draw.draw_segment(
                    contact.point,
                    contact.point + contact.normal * NORMAL_LENGTH,
                    NORMAL_COLOR,
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tiltbox_physics::{BodyDef, PhysicsWorld, Shape, WorldConfig};

    /// Records calls by name
    #[derive(Default)]
    struct Recorder {
        calls: Vec<(&'static str, Color)>,
    }

    impl DebugDraw for Recorder {
        fn draw_polygon(&mut self, _: &[Vec2], color: Color) {
            self.calls.push(("polygon", color));
        }
        fn draw_solid_polygon(&mut self, _: &[Vec2], color: Color) {
            self.calls.push(("solid_polygon", color));
        }
        fn draw_circle(&mut self, _: Vec2, _: f32, color: Color) {
            self.calls.push(("circle", color));
        }
        fn draw_solid_circle(&mut self, _: Vec2, _: f32, _: Vec2, color: Color) {
            self.calls.push(("solid_circle", color));
        }
        fn draw_segment(&mut self, _: Vec2, _: Vec2, color: Color) {
            self.calls.push(("segment", color));
        }
        fn draw_transform(&mut self, _: &Isometry2) {
            self.calls.push(("transform", Color::RED));
        }
        fn draw_point(&mut self, _: Vec2, _: f32, color: Color) {
            self.calls.push(("point", color));
        }
    }

    fn resting_world() -> PhysicsWorld {
        let mut world = PhysicsWorld::new(WorldConfig::default()).unwrap();
        world.add_body(BodyDef::new_static(Shape::rect(5.0, 0.5), Vec2::ZERO));
        world.add_body(BodyDef::dynamic(Shape::circle(0.5), Vec2::new(0.0, 1.0)));
        world.step(1.0 / 60.0).unwrap();
        world
    }

    #[test]
    fn test_disabled_draws_nothing() {
        let overlay = DebugOverlay::new(false, DebugDrawFlags::all());
        let mut rec = Recorder::default();
        overlay.render(&resting_world().snapshot(), &mut rec);
        assert!(rec.calls.is_empty());
    }

    #[test]
    fn test_shapes_colored_by_body_type() {
        let overlay = DebugOverlay::new(true, DebugDrawFlags::SHAPES);
        let mut rec = Recorder::default();
        overlay.render(&resting_world().snapshot(), &mut rec);
        assert_eq!(rec.calls, vec![("solid_polygon", STATIC_COLOR), ("solid_circle", DYNAMIC_COLOR)]);
    }

    #[test]
    fn test_all_flags() {
        let world = resting_world();
        let snapshot = world.snapshot();
        assert!(!snapshot.contacts.is_empty());

        let overlay = DebugOverlay::new(true, DebugDrawFlags::all());
        let mut rec = Recorder::default();
        overlay.render(&snapshot, &mut rec);

        let count = |name: &str| rec.calls.iter().filter(|(n, _)| *n == name).count();
        assert_eq!(count("polygon"), 2);
        assert_eq!(count("transform"), 2);
        assert_eq!(count("point"), snapshot.contacts.len());
        assert_eq!(count("segment"), snapshot.contacts.len());
    }

    #[test]
    fn test_render_does_not_change_snapshot() {
        let snapshot = resting_world().snapshot();
        let copy = snapshot.clone();
        let overlay = DebugOverlay::new(true, DebugDrawFlags::all());
        overlay.render(&snapshot, &mut Recorder::default());
        assert_eq!(snapshot, copy);
    }

    #[test]
    fn test_toggle() {
        let mut overlay = DebugOverlay::default();
        assert!(!overlay.enabled);
        assert_eq!(overlay.flags, DebugDrawFlags::SHAPES);
        assert!(overlay.toggle());
        assert!(!overlay.toggle());
    }
}
