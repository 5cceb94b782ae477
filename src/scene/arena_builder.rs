//! ArenaBuilder - Static boundary construction
//!
//! Encloses the visible area `[0, width] x [0, height]` (metres) in static
//! box walls so spawned bodies stay on screen.

use tiltbox_math::Vec2;
use tiltbox_physics::{BodyDef, BodyKey, PhysicsMaterial, PhysicsWorld, Shape};

/// Builder for the static walls around the play area
///
/// # Example
/// ```ignore
/// let walls = ArenaBuilder::new(Vec2::new(32.0, 24.0))
///     .with_wall_thickness(1.0)
///     .build(&mut world);
/// ```
#[derive(Clone, Debug)]
pub struct ArenaBuilder {
    size: Vec2,
    thickness: f32,
    material: PhysicsMaterial,
    ceiling: bool,
}

impl ArenaBuilder {
    pub fn new(size: Vec2) -> Self {
        Self {
            size,
            thickness: 1.0,
            material: PhysicsMaterial::default(),
            ceiling: true,
        }
    }

    pub fn with_wall_thickness(mut self, thickness: f32) -> Self {
        self.thickness = thickness.max(0.01);
        self
    }

    pub fn with_material(mut self, material: PhysicsMaterial) -> Self {
        self.material = material;
        self
    }

    /// Leave the top open
    pub fn without_ceiling(mut self) -> Self {
        self.ceiling = false;
        self
    }

    /// Add the walls to `world`: ground, then left, right and ceiling
    pub fn build(&self, world: &mut PhysicsWorld) -> Vec<BodyKey> {
        let Vec2 { x: w, y: h } = self.size;
        let t = self.thickness * 0.5;

        // Inner faces sit on the arena edges; walls overlap at the corners
        let mut walls = vec![
            (Vec2::new(w * 0.5, -t), Vec2::new(w * 0.5 + 2.0 * t, t)),
            (Vec2::new(-t, h * 0.5), Vec2::new(t, h * 0.5 + 2.0 * t)),
            (Vec2::new(w + t, h * 0.5), Vec2::new(t, h * 0.5 + 2.0 * t)),
        ];
        if self.ceiling {
            walls.push((Vec2::new(w * 0.5, h + t), Vec2::new(w * 0.5 + 2.0 * t, t)));
        }

        let keys: Vec<BodyKey> = walls
            .into_iter()
            .map(|(center, half)| {
                world.add_body(
                    BodyDef::new_static(Shape::rect(half.x, half.y), center).with_material(self.material),
                )
            })
            .collect();

        log::debug!("Built arena {:.1}x{:.1} m with {} walls", w, h, keys.len());
        keys
    }
}
