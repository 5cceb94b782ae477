//! 2D rotation stored as sine and cosine

use serde::{Serialize, Deserialize};
use crate::Vec2;

/// A rotation in the plane
///
/// Keeping the sine/cosine pair avoids recomputing trigonometry every time a
/// vector is rotated.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Rot2 {
    /// Sine of the angle
    pub s: f32,
    /// Cosine of the angle
    pub c: f32,
}

impl Default for Rot2 {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Rot2 {
    pub const IDENTITY: Self = Self { s: 0.0, c: 1.0 };

    /// Create a rotation from an angle in radians
    #[inline]
    pub fn from_angle(angle: f32) -> Self {
        let (s, c) = angle.sin_cos();
        Self { s, c }
    }

    /// The angle in radians, in `(-π, π]`
    #[inline]
    pub fn angle(&self) -> f32 {
        self.s.atan2(self.c)
    }

    /// Rotate a vector
    #[inline]
    pub fn rotate(&self, v: Vec2) -> Vec2 {
        Vec2::new(self.c * v.x - self.s * v.y, self.s * v.x + self.c * v.y)
    }

    /// Rotate a vector by the inverse rotation
    #[inline]
    pub fn inv_rotate(&self, v: Vec2) -> Vec2 {
        Vec2::new(self.c * v.x + self.s * v.y, -self.s * v.x + self.c * v.y)
    }

    /// Compose two rotations (`self` applied after `other`)
    #[inline]
    pub fn mul(&self, other: &Self) -> Self {
        Self {
            s: self.s * other.c + self.c * other.s,
            c: self.c * other.c - self.s * other.s,
        }
    }

    /// Rotated x-axis
    #[inline]
    pub fn x_axis(&self) -> Vec2 {
        Vec2::new(self.c, self.s)
    }

    /// Rotated y-axis
    #[inline]
    pub fn y_axis(&self) -> Vec2 {
        Vec2::new(-self.s, self.c)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    fn approx(a: Vec2, b: Vec2) -> bool {
        (a - b).length() < 1e-5
    }

    #[test]
    fn test_identity() {
        let v = Vec2::new(1.0, 2.0);
        assert_eq!(Rot2::IDENTITY.rotate(v), v);
        assert_eq!(Rot2::default(), Rot2::IDENTITY);
    }

    #[test]
    fn test_quarter_turn() {
        let r = Rot2::from_angle(FRAC_PI_2);
        assert!(approx(r.rotate(Vec2::X), Vec2::Y));
        assert!(approx(r.inv_rotate(Vec2::Y), Vec2::X));
        assert!((r.angle() - FRAC_PI_2).abs() < 1e-6);
    }

    #[test]
    fn test_compose() {
        let a = Rot2::from_angle(0.3);
        let b = Rot2::from_angle(0.5);
        let ab = a.mul(&b);
        assert!((ab.angle() - 0.8).abs() < 1e-5);
    }

    #[test]
    fn test_axes() {
        let r = Rot2::from_angle(FRAC_PI_2);
        assert!(approx(r.x_axis(), Vec2::Y));
        assert!(approx(r.y_axis(), -Vec2::X));
    }
}
