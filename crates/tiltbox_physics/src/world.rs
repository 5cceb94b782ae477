//! Physics world and simulation

use std::collections::HashMap;

use crate::body::{BodyDef, BodyKey, RigidBody2D};
use crate::collision::{collide_shapes, Manifold, WorldManifold};
use crate::error::PhysicsError;
use crate::settings::{MAX_ROTATION, MAX_TRANSLATION};
use crate::snapshot::{BodyGeometry, ContactPoint, WorldSnapshot};
use crate::solver::{Contact, ContactSolver, SolverBody};
use serde::{Deserialize, Serialize};
use slotmap::SlotMap;
use tiltbox_math::{Aabb2, Vec2};

/// Configuration for the physics simulation
///
/// Only gravity can change after the world is created.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WorldConfig {
    /// Gravity acceleration in m/s²
    pub gravity: Vec2,
    /// Fixed step size in seconds
    pub time_step: f32,
    pub velocity_iterations: u32,
    pub position_iterations: u32,
    /// Reuse last step's contact impulses as the solver's first guess
    pub warm_starting: bool,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            gravity: Vec2::new(0.0, -10.0),
            time_step: 1.0 / 60.0,
            velocity_iterations: 8,
            position_iterations: 3,
            warm_starting: true,
        }
    }
}

impl WorldConfig {
    /// Create a config with the given gravity and default solver settings
    pub fn new(gravity: Vec2) -> Self {
        Self {
            gravity,
            ..Default::default()
        }
    }

    pub fn with_time_step(mut self, time_step: f32) -> Self {
        self.time_step = time_step;
        self
    }

    pub fn with_iterations(mut self, velocity: u32, position: u32) -> Self {
        self.velocity_iterations = velocity;
        self.position_iterations = position;
        self
    }

    pub fn with_warm_starting(mut self, enabled: bool) -> Self {
        self.warm_starting = enabled;
        self
    }

    /// Check the config describes a world that can be stepped
    pub fn validate(&self) -> Result<(), PhysicsError> {
        if !self.gravity.is_finite() {
            return Err(PhysicsError::InvalidConfig(format!(
                "gravity must be finite, got {:?}",
                self.gravity
            )));
        }
        if !self.time_step.is_finite() || self.time_step <= 0.0 {
            return Err(PhysicsError::InvalidConfig(format!(
                "time_step must be positive, got {}",
                self.time_step
            )));
        }
        if self.velocity_iterations == 0 || self.position_iterations == 0 {
            return Err(PhysicsError::InvalidConfig(
                "iteration counts must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// The physics world containing all rigid bodies
pub struct PhysicsWorld {
    /// All rigid bodies in the world (using generational keys)
    bodies: SlotMap<BodyKey, RigidBody2D>,
    config: WorldConfig,
    /// Manifolds from the last step, keyed by body pair, for warm starting
    manifolds: HashMap<(BodyKey, BodyKey), Manifold>,
    /// World-space contact points from the last step
    contacts: Vec<ContactPoint>,
    /// Size of the last step, used to rescale warm-start impulses
    prev_dt: f32,
}

impl PhysicsWorld {
    /// Create an empty world
    pub fn new(config: WorldConfig) -> Result<Self, PhysicsError> {
        config.validate()?;
        log::debug!(
            "Physics world created: gravity {:?}, step {:.4}s, iterations {}/{}",
            config.gravity,
            config.time_step,
            config.velocity_iterations,
            config.position_iterations
        );
        Ok(Self {
            bodies: SlotMap::with_key(),
            prev_dt: config.time_step,
            config,
            manifolds: HashMap::new(),
            contacts: Vec::new(),
        })
    }

    /// Add a body to the world and return its key
    pub fn add_body(&mut self, def: BodyDef) -> BodyKey {
        self.bodies.insert(RigidBody2D::from_def(def))
    }

    /// Remove a body from the world and return it
    pub fn remove_body(&mut self, key: BodyKey) -> Result<RigidBody2D, PhysicsError> {
        let body = self.bodies.remove(key).ok_or(PhysicsError::InvalidHandle(key))?;
        self.manifolds.retain(|(a, b), _| *a != key && *b != key);
        self.contacts.retain(|c| c.body_a != key && c.body_b != key);
        Ok(body)
    }

    /// Get an immutable reference to a body by key
    pub fn get_body(&self, key: BodyKey) -> Option<&RigidBody2D> {
        self.bodies.get(key)
    }

    /// Get a mutable reference to a body by key
    pub fn get_body_mut(&mut self, key: BodyKey) -> Option<&mut RigidBody2D> {
        self.bodies.get_mut(key)
    }

    pub fn contains(&self, key: BodyKey) -> bool {
        self.bodies.contains_key(key)
    }

    /// Get the number of bodies in the world
    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    /// Iterate over all body keys
    pub fn body_keys(&self) -> impl Iterator<Item = BodyKey> + '_ {
        self.bodies.keys()
    }

    /// Iterate over all bodies with their keys
    pub fn iter(&self) -> impl Iterator<Item = (BodyKey, &RigidBody2D)> + '_ {
        self.bodies.iter()
    }

    pub fn gravity(&self) -> Vec2 {
        self.config.gravity
    }

    /// Change gravity for subsequent steps
    ///
    /// Non-finite values are ignored.
    pub fn set_gravity(&mut self, gravity: Vec2) {
        if !gravity.is_finite() {
            log::warn!("Ignoring non-finite gravity {:?}", gravity);
            return;
        }
        self.config.gravity = gravity;
    }

    pub fn config(&self) -> &WorldConfig {
        &self.config
    }

    /// Contact points found during the last step
    pub fn contacts(&self) -> &[ContactPoint] {
        &self.contacts
    }

    /// Copy the current geometry for debug drawing
    pub fn snapshot(&self) -> WorldSnapshot {
        WorldSnapshot {
            bodies: self
                .bodies
                .iter()
                .map(|(key, body)| BodyGeometry::from_body(key, body))
                .collect(),
            contacts: self.contacts.clone(),
        }
    }

    /// Step the physics simulation forward by dt seconds
    ///
    /// This performs:
    /// 1. Force and gravity integration into velocities
    /// 2. Broad and narrow phase collision detection
    /// 3. Velocity constraint solving
    /// 4. Position integration
    /// 5. Position constraint solving
    pub fn step(&mut self, dt: f32) -> Result<(), PhysicsError> {
        if !dt.is_finite() || dt <= 0.0 {
            return Err(PhysicsError::InvalidTimeStep(dt));
        }

        let keys: Vec<BodyKey> = self.bodies.keys().collect();
        let gravity = self.config.gravity;

        // Phase 1: Integrate velocities
        let mut solver_bodies: Vec<SolverBody> = keys
            .iter()
            .map(|&key| {
                let body = &self.bodies[key];
                let mut v = body.linear_velocity;
                let mut w = body.angular_velocity;
                if body.is_dynamic() {
                    v += (gravity * body.gravity_scale + body.force() * body.inv_mass()) * dt;
                    w += dt * body.inv_inertia() * body.torque();
                    v *= 1.0 / (1.0 + dt * body.linear_damping);
                    w *= 1.0 / (1.0 + dt * body.angular_damping);
                }
                SolverBody {
                    c: body.world_center(),
                    a: body.angle,
                    v,
                    w,
                    inv_mass: body.inv_mass(),
                    inv_inertia: body.inv_inertia(),
                    local_center: body.local_center(),
                }
            })
            .collect();

        // Phase 2: Collision detection
        let (mut contacts, pairs) = self.find_contacts(&keys, dt);

        // Phase 3-5: Solve
        {
            let mut solver = ContactSolver::new(&mut contacts, &solver_bodies);
            if self.config.warm_starting {
                solver.warm_start(&mut solver_bodies);
            }
            for _ in 0..self.config.velocity_iterations {
                solver.solve_velocity_constraints(&mut solver_bodies);
            }
            solver.store_impulses();

            for (key, sb) in keys.iter().zip(solver_bodies.iter_mut()) {
                if self.bodies[*key].is_static() {
                    continue;
                }
                integrate_position(sb, dt);
            }

            for _ in 0..self.config.position_iterations {
                if solver.solve_position_constraints(&mut solver_bodies) {
                    break;
                }
            }
        }

        // Write results back to the bodies
        for (key, sb) in keys.iter().zip(&solver_bodies) {
            let body = &mut self.bodies[*key];
            body.clear_forces();
            if body.is_static() {
                continue;
            }
            body.set_center_and_angle(sb.c, sb.a);
            body.linear_velocity = sb.v;
            body.angular_velocity = sb.w;
        }

        self.store_contacts(&contacts, &pairs);
        self.prev_dt = dt;

        for key in keys {
            if !self.bodies[key].is_finite() {
                log::error!("Body {:?} has a non-finite state after step", key);
                return Err(PhysicsError::SimulationInstability { body: key });
            }
        }
        Ok(())
    }

    /// Find touching pairs in deterministic key order
    fn find_contacts(&self, keys: &[BodyKey], dt: f32) -> (Vec<Contact>, Vec<(BodyKey, BodyKey)>) {
        let aabbs: Vec<Aabb2> = keys.iter().map(|&k| self.bodies[k].aabb()).collect();
        let dt_ratio = dt / self.prev_dt;

        let mut contacts = Vec::new();
        let mut pairs = Vec::new();

        for i in 0..keys.len() {
            for j in (i + 1)..keys.len() {
                let (key_a, key_b) = (keys[i], keys[j]);
                let body_a = &self.bodies[key_a];
                let body_b = &self.bodies[key_b];

                // At least one body must respond to the contact
                if !body_a.is_dynamic() && !body_b.is_dynamic() {
                    continue;
                }
                if !aabbs[i].overlaps(&aabbs[j]) {
                    continue;
                }

                let mut manifold = collide_shapes(
                    body_a.shape(),
                    &body_a.transform(),
                    body_b.shape(),
                    &body_b.transform(),
                );
                if !manifold.is_touching() {
                    continue;
                }

                if self.config.warm_starting {
                    if let Some(old) = self.manifolds.get(&(key_a, key_b)) {
                        for point in manifold.points[..manifold.point_count].iter_mut() {
                            if let Some(prev) = old.points().iter().find(|p| p.id == point.id) {
                                point.normal_impulse = prev.normal_impulse * dt_ratio;
                                point.tangent_impulse = prev.tangent_impulse * dt_ratio;
                            }
                        }
                    }
                }

                let material = body_a.material().combine(body_b.material());
                contacts.push(Contact {
                    index_a: i,
                    index_b: j,
                    manifold,
                    friction: material.friction,
                    restitution: material.restitution,
                    radius_a: body_a.shape().radius(),
                    radius_b: body_b.shape().radius(),
                });
                pairs.push((key_a, key_b));
            }
        }

        (contacts, pairs)
    }

    /// Keep manifolds for warm starting and world points for debug drawing
    fn store_contacts(&mut self, contacts: &[Contact], pairs: &[(BodyKey, BodyKey)]) {
        self.manifolds.clear();
        self.contacts.clear();

        for (contact, &(key_a, key_b)) in contacts.iter().zip(pairs) {
            let body_a = &self.bodies[key_a];
            let body_b = &self.bodies[key_b];
            let wm = WorldManifold::new(
                &contact.manifold,
                &body_a.transform(),
                contact.radius_a,
                &body_b.transform(),
                contact.radius_b,
            );
            for i in 0..contact.manifold.point_count {
                self.contacts.push(ContactPoint {
                    body_a: key_a,
                    body_b: key_b,
                    point: wm.points[i],
                    normal: wm.normal,
                    separation: wm.separations[i],
                });
            }
            self.manifolds.insert((key_a, key_b), contact.manifold);
        }
    }
}

/// Advance a body's position, limiting the motion per step
fn integrate_position(body: &mut SolverBody, dt: f32) {
    let translation = body.v * dt;
    if translation.length_squared() > MAX_TRANSLATION * MAX_TRANSLATION {
        body.v *= MAX_TRANSLATION / translation.length();
    }

    let rotation = dt * body.w;
    if rotation * rotation > MAX_ROTATION * MAX_ROTATION {
        body.w *= MAX_ROTATION / rotation.abs();
    }

    body.c += body.v * dt;
    body.a += dt * body.w;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::body::BodyType;
    use crate::material::PhysicsMaterial;
    use crate::shapes::Shape;

    const DT: f32 = 1.0 / 60.0;

    fn world() -> PhysicsWorld {
        PhysicsWorld::new(WorldConfig::default()).unwrap()
    }

    fn add_ground(world: &mut PhysicsWorld) -> BodyKey {
        world.add_body(BodyDef::new_static(Shape::rect(10.0, 0.5), Vec2::ZERO))
    }

    #[test]
    fn test_world_config_default() {
        let config = WorldConfig::default();
        assert_eq!(config.gravity, Vec2::new(0.0, -10.0));
        assert!((config.time_step - 1.0 / 60.0).abs() < 1e-9);
        assert_eq!(config.velocity_iterations, 8);
        assert_eq!(config.position_iterations, 3);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_config_rejected() {
        let bad_step = WorldConfig::default().with_time_step(0.0);
        assert!(matches!(PhysicsWorld::new(bad_step), Err(PhysicsError::InvalidConfig(_))));

        let bad_gravity = WorldConfig::new(Vec2::new(f32::NAN, 0.0));
        assert!(matches!(PhysicsWorld::new(bad_gravity), Err(PhysicsError::InvalidConfig(_))));

        let bad_iterations = WorldConfig::default().with_iterations(0, 3);
        assert!(matches!(PhysicsWorld::new(bad_iterations), Err(PhysicsError::InvalidConfig(_))));
    }

    #[test]
    fn test_invalid_time_step() {
        let mut world = world();
        assert_eq!(world.step(0.0), Err(PhysicsError::InvalidTimeStep(0.0)));
        assert!(matches!(world.step(f32::NAN), Err(PhysicsError::InvalidTimeStep(_))));
        assert!(world.step(-DT).is_err());
    }

    #[test]
    fn test_world_add_and_remove_body() {
        let mut world = world();
        let key = world.add_body(BodyDef::dynamic(Shape::circle(0.5), Vec2::new(1.0, 2.0)));
        assert_eq!(world.body_count(), 1);
        assert!(world.contains(key));
        assert_eq!(world.get_body(key).unwrap().position, Vec2::new(1.0, 2.0));

        let removed = world.remove_body(key).unwrap();
        assert_eq!(removed.position, Vec2::new(1.0, 2.0));
        assert_eq!(world.body_count(), 0);
    }

    #[test]
    fn test_stale_key_returns_none() {
        let mut world = world();
        let key1 = world.add_body(BodyDef::dynamic(Shape::circle(0.5), Vec2::ZERO));
        world.remove_body(key1).unwrap();

        // The new body may reuse the slot, but the old key must not see it
        let key2 = world.add_body(BodyDef::dynamic(Shape::circle(0.5), Vec2::new(5.0, 5.0)));
        assert!(world.get_body(key1).is_none());
        assert!(world.get_body(key2).is_some());
        assert_eq!(world.remove_body(key1).unwrap_err(), PhysicsError::InvalidHandle(key1));
    }

    #[test]
    fn test_free_fall() {
        let mut world = world();
        let key = world.add_body(BodyDef::dynamic(Shape::circle(0.5), Vec2::new(0.0, 10.0)));

        for _ in 0..60 {
            world.step(DT).unwrap();
        }

        // Semi-implicit Euler: fall = g h² n(n+1)/2
        let body = world.get_body(key).unwrap();
        let fall = 10.0 - body.position.y;
        let expected = 10.0 * DT * DT * (60.0 * 61.0) / 2.0;
        assert!((fall - expected).abs() < 1e-3, "fall {} expected {}", fall, expected);
        // Close to the analytic ½gt²
        assert!((fall - 5.0).abs() < 0.1);
        assert!((body.linear_velocity.y + 10.0).abs() < 1e-3);
        assert_eq!(body.position.x, 0.0);
    }

    #[test]
    fn test_gravity_change_affects_later_steps_only() {
        let mut world = world();
        let key = world.add_body(BodyDef::dynamic(Shape::circle(0.5), Vec2::ZERO));

        world.step(DT).unwrap();
        let v_before = world.get_body(key).unwrap().linear_velocity;
        assert!((v_before.y + 10.0 * DT).abs() < 1e-6);

        world.set_gravity(Vec2::new(10.0, 0.0));
        // Nothing moves until the next step
        assert_eq!(world.get_body(key).unwrap().linear_velocity, v_before);

        world.step(DT).unwrap();
        let v_after = world.get_body(key).unwrap().linear_velocity;
        assert!((v_after.x - 10.0 * DT).abs() < 1e-6);
        assert!((v_after.y - v_before.y).abs() < 1e-6);
    }

    #[test]
    fn test_set_gravity_ignores_non_finite() {
        let mut world = world();
        world.set_gravity(Vec2::new(f32::INFINITY, 0.0));
        assert_eq!(world.gravity(), Vec2::new(0.0, -10.0));
    }

    #[test]
    fn test_static_body_does_not_move() {
        let mut world = world();
        let ground = add_ground(&mut world);
        for _ in 0..10 {
            world.step(DT).unwrap();
        }
        assert_eq!(world.get_body(ground).unwrap().position, Vec2::ZERO);
    }

    #[test]
    fn test_kinematic_body_ignores_gravity() {
        let mut world = world();
        let key = world.add_body(
            BodyDef::kinematic(Shape::rect(1.0, 0.2), Vec2::ZERO).with_linear_velocity(Vec2::new(1.0, 0.0)),
        );
        for _ in 0..60 {
            world.step(DT).unwrap();
        }
        let body = world.get_body(key).unwrap();
        assert_eq!(body.body_type(), BodyType::Kinematic);
        assert!((body.position.x - 1.0).abs() < 1e-3);
        assert_eq!(body.position.y, 0.0);
    }

    #[test]
    fn test_box_comes_to_rest_on_ground() {
        let mut world = world();
        add_ground(&mut world);
        let key = world.add_body(BodyDef::dynamic(Shape::rect(0.5, 0.5), Vec2::new(0.0, 3.0)));

        for _ in 0..180 {
            world.step(DT).unwrap();
        }

        let body = world.get_body(key).unwrap();
        // Ground top is at 0.5, box half height 0.5
        assert!((body.position.y - 1.0).abs() < 0.05, "resting y = {}", body.position.y);
        assert!(body.linear_velocity.length() < 0.05);
        assert!(body.angle.abs() < 0.05);
        assert!(!world.contacts().is_empty());
    }

    #[test]
    fn test_circle_rests_on_ground() {
        let mut world = world();
        add_ground(&mut world);
        let key = world.add_body(BodyDef::dynamic(Shape::circle(0.5), Vec2::new(0.0, 2.0)));
        for _ in 0..180 {
            world.step(DT).unwrap();
        }
        let body = world.get_body(key).unwrap();
        assert!((body.position.y - 1.0).abs() < 0.05);
    }

    #[test]
    fn test_bouncy_ball_rebounds() {
        let mut world = world();
        let ground = world.add_body(
            BodyDef::new_static(Shape::rect(10.0, 0.5), Vec2::ZERO).with_material(PhysicsMaterial::RUBBER),
        );
        let ball = world.add_body(
            BodyDef::dynamic(Shape::circle(0.25), Vec2::new(0.0, 3.0)).with_material(PhysicsMaterial::RUBBER),
        );
        let mut went_up = false;
        for _ in 0..120 {
            world.step(DT).unwrap();
            if world.get_body(ball).unwrap().linear_velocity.y > 1.0 {
                went_up = true;
            }
        }
        assert!(went_up);
        assert!(world.contains(ground));
    }

    #[test]
    fn test_remove_body_clears_contacts() {
        let mut world = world();
        add_ground(&mut world);
        let key = world.add_body(BodyDef::dynamic(Shape::rect(0.5, 0.5), Vec2::new(0.0, 1.0)));
        world.step(DT).unwrap();
        assert!(!world.contacts().is_empty());

        world.remove_body(key).unwrap();
        assert!(world.contacts().is_empty());
        world.step(DT).unwrap();
    }

    fn build_pile() -> PhysicsWorld {
        let mut world = world();
        add_ground(&mut world);
        for i in 0..6 {
            let x = (i as f32) * 0.3 - 0.8;
            let y = 1.5 + i as f32 * 1.1;
            let shape = if i % 2 == 0 { Shape::rect(0.5, 0.5) } else { Shape::circle(0.4) };
            world.add_body(BodyDef::dynamic(shape, Vec2::new(x, y)).with_angle(0.1 * i as f32));
        }
        world
    }

    #[test]
    fn test_determinism() {
        let mut a = build_pile();
        let mut b = build_pile();
        for step in 0..240 {
            if step == 100 {
                a.set_gravity(Vec2::new(3.0, -8.0));
                b.set_gravity(Vec2::new(3.0, -8.0));
            }
            a.step(DT).unwrap();
            b.step(DT).unwrap();
        }
        for ((ka, ba), (kb, bb)) in a.iter().zip(b.iter()) {
            assert_eq!(ka, kb);
            assert_eq!(ba.position.x.to_bits(), bb.position.x.to_bits());
            assert_eq!(ba.position.y.to_bits(), bb.position.y.to_bits());
            assert_eq!(ba.angle.to_bits(), bb.angle.to_bits());
        }
    }

    #[test]
    fn test_instability_reported() {
        let mut world = world();
        let key = world.add_body(BodyDef::dynamic(Shape::circle(0.5), Vec2::ZERO));
        world.get_body_mut(key).unwrap().linear_velocity = Vec2::new(f32::NAN, 0.0);
        assert_eq!(world.step(DT), Err(PhysicsError::SimulationInstability { body: key }));
    }

    #[test]
    fn test_snapshot_matches_world() {
        let mut world = world();
        let ground = add_ground(&mut world);
        let crate_key = world.add_body(BodyDef::dynamic(Shape::rect(0.5, 0.5), Vec2::new(0.0, 1.0)));
        world.step(DT).unwrap();

        let snapshot = world.snapshot();
        assert_eq!(snapshot.bodies.len(), 2);
        assert_eq!(snapshot.body(ground).unwrap().body_type, BodyType::Static);

        let geom = snapshot.body(crate_key).unwrap();
        let body = world.get_body(crate_key).unwrap();
        assert_eq!(geom.transform.translation, body.position);
        match &geom.outline {
            crate::snapshot::ShapeOutline::Polygon { vertices } => assert_eq!(vertices.len(), 4),
            other => panic!("unexpected outline {:?}", other),
        }
        assert_eq!(snapshot.contacts.len(), world.contacts().len());
    }
}
