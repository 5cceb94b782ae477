//! Rigid 2D transform

use serde::{Serialize, Deserialize};
use crate::{Rot2, Vec2};

/// Rotation followed by translation
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Isometry2 {
    pub translation: Vec2,
    pub rotation: Rot2,
}

impl Isometry2 {
    pub const IDENTITY: Self = Self {
        translation: Vec2::ZERO,
        rotation: Rot2::IDENTITY,
    };

    /// Create an isometry from a translation and an angle in radians
    #[inline]
    pub fn new(translation: Vec2, angle: f32) -> Self {
        Self {
            translation,
            rotation: Rot2::from_angle(angle),
        }
    }

    /// Transform a point from local to world space
    #[inline]
    pub fn apply(&self, p: Vec2) -> Vec2 {
        self.rotation.rotate(p) + self.translation
    }

    /// Transform a point from world to local space
    #[inline]
    pub fn apply_inv(&self, p: Vec2) -> Vec2 {
        self.rotation.inv_rotate(p - self.translation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn test_apply_and_inverse() {
        let iso = Isometry2::new(Vec2::new(3.0, -1.0), FRAC_PI_2);
        let local = Vec2::new(1.0, 0.0);
        let world = iso.apply(local);
        assert!((world - Vec2::new(3.0, 0.0)).length() < 1e-5);
        assert!((iso.apply_inv(world) - local).length() < 1e-5);
    }

    #[test]
    fn test_identity() {
        let p = Vec2::new(4.0, 5.0);
        assert_eq!(Isometry2::IDENTITY.apply(p), p);
    }
}
