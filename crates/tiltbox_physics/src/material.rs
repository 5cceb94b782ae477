//! Physical material properties for collision response

use serde::{Serialize, Deserialize};

/// Physical material properties of a body's shape
///
/// Materials define how objects interact during collisions, including
/// friction (how much objects resist sliding), restitution (bounciness)
/// and density (mass per square metre).
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PhysicsMaterial {
    /// Friction coefficient (0.0 = ice, 1.0 = rubber)
    pub friction: f32,
    /// Restitution/bounciness (0.0 = no bounce, 1.0 = perfect bounce)
    pub restitution: f32,
    /// Density in kg/m²
    pub density: f32,
}

impl Default for PhysicsMaterial {
    fn default() -> Self {
        Self {
            friction: 0.3,
            restitution: 0.0,
            density: 1.0,
        }
    }
}

/// Named materials, selectable from config
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MaterialPreset {
    Ice,
    Rubber,
    Wood,
    Concrete,
}

impl MaterialPreset {
    pub fn material(self) -> PhysicsMaterial {
        match self {
            MaterialPreset::Ice => PhysicsMaterial::ICE,
            MaterialPreset::Rubber => PhysicsMaterial::RUBBER,
            MaterialPreset::Wood => PhysicsMaterial::WOOD,
            MaterialPreset::Concrete => PhysicsMaterial::CONCRETE,
        }
    }
}

impl From<MaterialPreset> for PhysicsMaterial {
    fn from(preset: MaterialPreset) -> Self {
        preset.material()
    }
}

/// Friction and restitution for one contact pair
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ContactMaterial {
    pub friction: f32,
    pub restitution: f32,
}

impl PhysicsMaterial {
    /// Ice-like material: very low friction, slight bounce
    pub const ICE: Self = Self {
        friction: 0.05,
        restitution: 0.1,
        density: 0.9,
    };

    /// Rubber-like material: high friction, very bouncy
    pub const RUBBER: Self = Self {
        friction: 0.9,
        restitution: 0.8,
        density: 1.1,
    };

    /// Wood-like material: moderate friction, low bounce
    pub const WOOD: Self = Self {
        friction: 0.5,
        restitution: 0.2,
        density: 0.7,
    };

    /// Concrete-like material: high friction, very low bounce
    pub const CONCRETE: Self = Self {
        friction: 0.7,
        restitution: 0.1,
        density: 2.4,
    };

    /// Create a new physics material
    ///
    /// Friction and restitution are clamped to [0.0, 1.0], density to >= 0.
    pub fn new(friction: f32, restitution: f32, density: f32) -> Self {
        Self {
            friction: friction.clamp(0.0, 1.0),
            restitution: restitution.clamp(0.0, 1.0),
            density: density.max(0.0),
        }
    }

    /// Combine two materials for collision response
    ///
    /// Uses geometric mean for friction and maximum for restitution
    /// (most bouncy surface wins).
    pub fn combine(&self, other: &Self) -> ContactMaterial {
        ContactMaterial {
            friction: (self.friction * other.friction).sqrt(),
            restitution: self.restitution.max(other.restitution),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_material() {
        let material = PhysicsMaterial::default();
        assert_eq!(material.friction, 0.3);
        assert_eq!(material.restitution, 0.0);
        assert_eq!(material.density, 1.0);
    }

    #[test]
    fn test_new_clamps_values() {
        let material = PhysicsMaterial::new(1.5, -0.5, -2.0);
        assert_eq!(material.friction, 1.0);
        assert_eq!(material.restitution, 0.0);
        assert_eq!(material.density, 0.0);
    }

    #[test]
    fn test_combine_geometric_mean_friction() {
        let combined = PhysicsMaterial::ICE.combine(&PhysicsMaterial::RUBBER);
        let expected_friction = (0.05_f32 * 0.9_f32).sqrt();
        assert!((combined.friction - expected_friction).abs() < 0.0001);
        assert_eq!(combined.restitution, 0.8);
    }

    #[test]
    fn test_combine_is_commutative() {
        let a = PhysicsMaterial::new(0.3, 0.5, 1.0);
        let b = PhysicsMaterial::new(0.7, 0.2, 1.0);
        let ab = a.combine(&b);
        let ba = b.combine(&a);
        assert!((ab.friction - ba.friction).abs() < 0.0001);
        assert_eq!(ab.restitution, ba.restitution);
    }

    #[test]
    fn test_presets() {
        assert_eq!(MaterialPreset::Ice.material(), PhysicsMaterial::ICE);
        assert_eq!(PhysicsMaterial::from(MaterialPreset::Concrete).density, 2.4);
        let wood: PhysicsMaterial = MaterialPreset::Wood.into();
        assert_eq!(wood.restitution, 0.2);
        assert!(MaterialPreset::Rubber.material().restitution > wood.restitution);
    }
}
