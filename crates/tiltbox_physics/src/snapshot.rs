//! Read-only geometry copies of the world
//!
//! A snapshot holds everything a debug renderer needs without borrowing the
//! world, so drawing can never mutate simulation state.

use crate::body::{BodyKey, BodyType, RigidBody2D};
use crate::shapes::Shape;
use tiltbox_math::{Aabb2, Isometry2, Vec2};

/// A body's shape in world coordinates
#[derive(Clone, Debug, PartialEq)]
pub enum ShapeOutline {
    Circle {
        center: Vec2,
        radius: f32,
        /// Unit vector showing the body's rotation
        axis: Vec2,
    },
    Polygon {
        vertices: Vec<Vec2>,
    },
}

impl ShapeOutline {
    pub(crate) fn from_shape(shape: &Shape, xf: &Isometry2) -> Self {
        match shape {
            Shape::Circle(circle) => ShapeOutline::Circle {
                center: xf.apply(circle.center),
                radius: circle.radius,
                axis: xf.rotation.x_axis(),
            },
            Shape::Polygon(poly) => ShapeOutline::Polygon {
                vertices: poly.vertices().iter().map(|v| xf.apply(*v)).collect(),
            },
        }
    }
}

/// Geometry of one body
#[derive(Clone, Debug, PartialEq)]
pub struct BodyGeometry {
    pub key: BodyKey,
    pub body_type: BodyType,
    pub transform: Isometry2,
    pub center_of_mass: Vec2,
    pub outline: ShapeOutline,
    pub aabb: Aabb2,
}

impl BodyGeometry {
    pub(crate) fn from_body(key: BodyKey, body: &RigidBody2D) -> Self {
        let transform = body.transform();
        Self {
            key,
            body_type: body.body_type(),
            transform,
            center_of_mass: body.world_center(),
            outline: ShapeOutline::from_shape(body.shape(), &transform),
            aabb: body.aabb(),
        }
    }
}

/// A contact point from the last step
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ContactPoint {
    pub body_a: BodyKey,
    pub body_b: BodyKey,
    pub point: Vec2,
    /// Unit normal from body A to body B
    pub normal: Vec2,
    pub separation: f32,
}

/// Copy of all body geometry and contacts at one instant
#[derive(Clone, Debug, Default, PartialEq)]
pub struct WorldSnapshot {
    pub bodies: Vec<BodyGeometry>,
    pub contacts: Vec<ContactPoint>,
}

impl WorldSnapshot {
    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    /// Geometry for a specific body, if present
    pub fn body(&self, key: BodyKey) -> Option<&BodyGeometry> {
        self.bodies.iter().find(|b| b.key == key)
    }
}
