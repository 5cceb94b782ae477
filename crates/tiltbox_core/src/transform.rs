//! 2D Transform (position, rotation, scale)
//!
//! A Transform2D places a sprite in world space. Units are metres and
//! radians, the same as the physics world.

use serde::{Deserialize, Serialize};
use tiltbox_math::{Isometry2, Rot2, Vec2};

/// A 2D transform with position, rotation, and uniform scale
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Transform2D {
    /// Position in world space
    pub position: Vec2,
    /// Rotation in radians, counter-clockwise
    pub rotation: f32,
    /// Uniform scale factor
    pub scale: f32,
}

impl Default for Transform2D {
    fn default() -> Self {
        Self::identity()
    }
}

impl Transform2D {
    /// Create an identity transform
    pub fn identity() -> Self {
        Self {
            position: Vec2::ZERO,
            rotation: 0.0,
            scale: 1.0,
        }
    }

    /// Create a transform with just a position
    pub fn from_position(position: Vec2) -> Self {
        Self {
            position,
            ..Self::identity()
        }
    }

    /// Create a transform with position and rotation
    pub fn from_position_rotation(position: Vec2, rotation: f32) -> Self {
        Self {
            position,
            rotation,
            scale: 1.0,
        }
    }

    /// Same placement as a physics body transform
    pub fn from_isometry(iso: &Isometry2) -> Self {
        Self::from_position_rotation(iso.translation, iso.rotation.angle())
    }

    /// Transform a point from local space to world space
    ///
    /// Applies scale, then rotation, then translation.
    pub fn transform_point(&self, p: Vec2) -> Vec2 {
        Rot2::from_angle(self.rotation).rotate(p * self.scale) + self.position
    }

    /// Transform a direction (no translation)
    pub fn transform_direction(&self, d: Vec2) -> Vec2 {
        Rot2::from_angle(self.rotation).rotate(d * self.scale)
    }
}
