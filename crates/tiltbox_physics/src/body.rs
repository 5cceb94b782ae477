//! Rigid body types for 2D physics simulation

use crate::material::PhysicsMaterial;
use crate::shapes::Shape;
use serde::{Deserialize, Serialize};
use slotmap::new_key_type;
use tiltbox_math::{Aabb2, Isometry2, Rot2, Vec2};

// Define generational key type for rigid bodies
new_key_type! {
    /// Key to a rigid body in the physics world
    ///
    /// Uses generational indexing, so a key to a removed body never resolves
    /// to a body that later reuses the same slot.
    pub struct BodyKey;
}

/// How a body takes part in the simulation
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BodyType {
    /// Never moves, infinite mass
    Static,
    /// Moves with its set velocity, ignores forces and contacts
    Kinematic,
    /// Fully simulated
    #[default]
    Dynamic,
}

/// Construction parameters for a rigid body
#[derive(Clone, Debug)]
pub struct BodyDef {
    pub body_type: BodyType,
    /// World position of the body origin
    pub position: Vec2,
    /// Rotation in radians
    pub angle: f32,
    pub linear_velocity: Vec2,
    pub angular_velocity: f32,
    pub shape: Shape,
    pub material: PhysicsMaterial,
    pub gravity_scale: f32,
    pub linear_damping: f32,
    pub angular_damping: f32,
    /// Prevent the body from rotating
    pub fixed_rotation: bool,
}

impl BodyDef {
    fn with_type(body_type: BodyType, shape: Shape, position: Vec2) -> Self {
        Self {
            body_type,
            position,
            angle: 0.0,
            linear_velocity: Vec2::ZERO,
            angular_velocity: 0.0,
            shape,
            material: PhysicsMaterial::default(),
            gravity_scale: 1.0,
            linear_damping: 0.0,
            angular_damping: 0.0,
            fixed_rotation: false,
        }
    }

    /// A dynamic body at `position`
    pub fn dynamic(shape: Shape, position: Vec2) -> Self {
        Self::with_type(BodyType::Dynamic, shape, position)
    }

    /// A static body at `position`
    pub fn new_static(shape: Shape, position: Vec2) -> Self {
        Self::with_type(BodyType::Static, shape, position)
    }

    /// A kinematic body at `position`
    pub fn kinematic(shape: Shape, position: Vec2) -> Self {
        Self::with_type(BodyType::Kinematic, shape, position)
    }

    pub fn with_angle(mut self, angle: f32) -> Self {
        self.angle = angle;
        self
    }

    pub fn with_linear_velocity(mut self, velocity: Vec2) -> Self {
        self.linear_velocity = velocity;
        self
    }

    pub fn with_angular_velocity(mut self, omega: f32) -> Self {
        self.angular_velocity = omega;
        self
    }

    pub fn with_material(mut self, material: PhysicsMaterial) -> Self {
        self.material = material;
        self
    }

    pub fn with_gravity_scale(mut self, scale: f32) -> Self {
        self.gravity_scale = scale;
        self
    }

    /// Set linear and angular damping (clamped to >= 0)
    pub fn with_damping(mut self, linear: f32, angular: f32) -> Self {
        self.linear_damping = linear.max(0.0);
        self.angular_damping = angular.max(0.0);
        self
    }

    pub fn with_fixed_rotation(mut self, fixed: bool) -> Self {
        self.fixed_rotation = fixed;
        self
    }
}

/// A 2D rigid body with a single collision shape
///
/// `linear_velocity` is the velocity of the centre of mass. `position` is the
/// body origin, which differs from the centre of mass for offset shapes.
#[derive(Clone, Debug)]
pub struct RigidBody2D {
    /// World position of the body origin
    pub position: Vec2,
    /// Rotation in radians
    pub angle: f32,
    pub linear_velocity: Vec2,
    pub angular_velocity: f32,
    pub gravity_scale: f32,
    pub linear_damping: f32,
    pub angular_damping: f32,

    body_type: BodyType,
    shape: Shape,
    material: PhysicsMaterial,
    fixed_rotation: bool,
    mass: f32,
    inv_mass: f32,
    inertia: f32,
    inv_inertia: f32,
    local_center: Vec2,
    force: Vec2,
    torque: f32,
}

impl RigidBody2D {
    /// Build a body from its definition, computing mass properties
    pub fn from_def(def: BodyDef) -> Self {
        let mut body = Self {
            position: def.position,
            angle: def.angle,
            linear_velocity: def.linear_velocity,
            angular_velocity: def.angular_velocity,
            gravity_scale: def.gravity_scale,
            linear_damping: def.linear_damping,
            angular_damping: def.angular_damping,
            body_type: def.body_type,
            shape: def.shape,
            material: def.material,
            fixed_rotation: def.fixed_rotation,
            mass: 0.0,
            inv_mass: 0.0,
            inertia: 0.0,
            inv_inertia: 0.0,
            local_center: Vec2::ZERO,
            force: Vec2::ZERO,
            torque: 0.0,
        };
        if body.body_type == BodyType::Static {
            body.linear_velocity = Vec2::ZERO;
            body.angular_velocity = 0.0;
        }
        body.reset_mass_data();
        body
    }

    fn reset_mass_data(&mut self) {
        self.mass = 0.0;
        self.inv_mass = 0.0;
        self.inertia = 0.0;
        self.inv_inertia = 0.0;
        self.local_center = Vec2::ZERO;

        if self.body_type != BodyType::Dynamic {
            return;
        }

        let data = self.shape.compute_mass(self.material.density);
        if data.mass > 0.0 {
            self.mass = data.mass;
            self.local_center = data.center;
        } else {
            // Zero-density dynamic bodies still need to fall
            self.mass = 1.0;
        }
        self.inv_mass = 1.0 / self.mass;

        if data.inertia > 0.0 && !self.fixed_rotation {
            // Inertia about the centre of mass
            self.inertia = data.inertia - self.mass * self.local_center.dot(self.local_center);
            if self.inertia > 0.0 {
                self.inv_inertia = 1.0 / self.inertia;
            } else {
                self.inertia = 0.0;
            }
        }
    }

    pub fn body_type(&self) -> BodyType {
        self.body_type
    }

    pub fn is_dynamic(&self) -> bool {
        self.body_type == BodyType::Dynamic
    }

    pub fn is_static(&self) -> bool {
        self.body_type == BodyType::Static
    }

    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    pub fn material(&self) -> &PhysicsMaterial {
        &self.material
    }

    pub fn mass(&self) -> f32 {
        self.mass
    }

    pub fn inv_mass(&self) -> f32 {
        self.inv_mass
    }

    /// Rotational inertia about the centre of mass
    pub fn inertia(&self) -> f32 {
        self.inertia
    }

    pub fn inv_inertia(&self) -> f32 {
        self.inv_inertia
    }

    pub fn fixed_rotation(&self) -> bool {
        self.fixed_rotation
    }

    /// Centre of mass in body-local coordinates
    pub fn local_center(&self) -> Vec2 {
        self.local_center
    }

    /// Centre of mass in world coordinates
    pub fn world_center(&self) -> Vec2 {
        self.transform().apply(self.local_center)
    }

    /// Body-to-world transform
    pub fn transform(&self) -> Isometry2 {
        Isometry2::new(self.position, self.angle)
    }

    /// World-space bounds of the body's shape
    pub fn aabb(&self) -> Aabb2 {
        self.shape.compute_aabb(&self.transform())
    }

    /// True when position, angle and velocities are all finite
    pub fn is_finite(&self) -> bool {
        self.position.is_finite()
            && self.angle.is_finite()
            && self.linear_velocity.is_finite()
            && self.angular_velocity.is_finite()
    }

    /// Teleport the body origin
    pub fn set_transform(&mut self, position: Vec2, angle: f32) {
        self.position = position;
        self.angle = angle;
    }

    /// Accumulate a force at the centre of mass for the next step
    pub fn apply_force(&mut self, force: Vec2) {
        if self.is_dynamic() {
            self.force += force;
        }
    }

    /// Accumulate a torque for the next step
    pub fn apply_torque(&mut self, torque: f32) {
        if self.is_dynamic() {
            self.torque += torque;
        }
    }

    /// Apply an impulse at a world point, changing velocity immediately
    pub fn apply_linear_impulse(&mut self, impulse: Vec2, point: Vec2) {
        if !self.is_dynamic() {
            return;
        }
        self.linear_velocity += impulse * self.inv_mass;
        self.angular_velocity += self.inv_inertia * (point - self.world_center()).cross(impulse);
    }

    pub(crate) fn force(&self) -> Vec2 {
        self.force
    }

    pub(crate) fn torque(&self) -> f32 {
        self.torque
    }

    pub(crate) fn clear_forces(&mut self) {
        self.force = Vec2::ZERO;
        self.torque = 0.0;
    }

    /// Place the body so that its centre of mass sits at `center`
    pub(crate) fn set_center_and_angle(&mut self, center: Vec2, angle: f32) {
        self.angle = angle;
        self.position = center - Rot2::from_angle(angle).rotate(self.local_center);
    }
}
