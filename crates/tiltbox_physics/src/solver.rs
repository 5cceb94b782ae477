//! Sequential impulse contact solver
//!
//! Works on a flat array of [`SolverBody`] copies in centre-of-mass
//! coordinates. The world copies results back to its bodies after the step.

use crate::collision::{Manifold, ManifoldKind, WorldManifold};
use crate::settings::{BAUMGARTE, LINEAR_SLOP, MAX_LINEAR_CORRECTION, MAX_MANIFOLD_POINTS, VELOCITY_THRESHOLD};
use tiltbox_math::{Isometry2, Rot2, Vec2};

/// Body state used while solving
#[derive(Clone, Copy, Debug)]
pub(crate) struct SolverBody {
    /// World centre of mass
    pub c: Vec2,
    /// Angle
    pub a: f32,
    pub v: Vec2,
    pub w: f32,
    pub inv_mass: f32,
    pub inv_inertia: f32,
    pub local_center: Vec2,
}

impl SolverBody {
    /// Transform of the body origin for the current centre and angle
    pub fn transform(&self) -> Isometry2 {
        let rotation = Rot2::from_angle(self.a);
        Isometry2 {
            translation: self.c - rotation.rotate(self.local_center),
            rotation,
        }
    }
}

/// A touching pair handed to the solver
#[derive(Clone, Debug)]
pub(crate) struct Contact {
    pub index_a: usize,
    pub index_b: usize,
    pub manifold: Manifold,
    pub friction: f32,
    pub restitution: f32,
    pub radius_a: f32,
    pub radius_b: f32,
}

#[derive(Clone, Copy, Debug, Default)]
struct VelocityPoint {
    r_a: Vec2,
    r_b: Vec2,
    normal_impulse: f32,
    tangent_impulse: f32,
    normal_mass: f32,
    tangent_mass: f32,
    velocity_bias: f32,
}

#[derive(Clone, Debug)]
struct ContactConstraint {
    points: [VelocityPoint; MAX_MANIFOLD_POINTS],
    point_count: usize,
    normal: Vec2,
    index_a: usize,
    index_b: usize,
    inv_mass_a: f32,
    inv_mass_b: f32,
    inv_i_a: f32,
    inv_i_b: f32,
    friction: f32,
    restitution: f32,
}

pub(crate) struct ContactSolver<'a> {
    contacts: &'a mut [Contact],
    constraints: Vec<ContactConstraint>,
}

impl<'a> ContactSolver<'a> {
    /// Build velocity constraints from the current manifolds
    ///
    /// Impulses already stored in the manifolds are used as the starting
    /// guess; zero them beforehand to disable warm starting.
    pub fn new(contacts: &'a mut [Contact], bodies: &[SolverBody]) -> Self {
        let mut constraints = Vec::with_capacity(contacts.len());

        for contact in contacts.iter() {
            let body_a = &bodies[contact.index_a];
            let body_b = &bodies[contact.index_b];
            let manifold = &contact.manifold;

            let wm = WorldManifold::new(
                manifold,
                &body_a.transform(),
                contact.radius_a,
                &body_b.transform(),
                contact.radius_b,
            );

            let mut constraint = ContactConstraint {
                points: [VelocityPoint::default(); MAX_MANIFOLD_POINTS],
                point_count: manifold.point_count,
                normal: wm.normal,
                index_a: contact.index_a,
                index_b: contact.index_b,
                inv_mass_a: body_a.inv_mass,
                inv_mass_b: body_b.inv_mass,
                inv_i_a: body_a.inv_inertia,
                inv_i_b: body_b.inv_inertia,
                friction: contact.friction,
                restitution: contact.restitution,
            };

            let tangent = Vec2::cross_vec_scalar(wm.normal, 1.0);
            for j in 0..manifold.point_count {
                let vp = &mut constraint.points[j];
                vp.normal_impulse = manifold.points[j].normal_impulse;
                vp.tangent_impulse = manifold.points[j].tangent_impulse;
                vp.r_a = wm.points[j] - body_a.c;
                vp.r_b = wm.points[j] - body_b.c;

                let rn_a = vp.r_a.cross(wm.normal);
                let rn_b = vp.r_b.cross(wm.normal);
                let k_normal = body_a.inv_mass
                    + body_b.inv_mass
                    + body_a.inv_inertia * rn_a * rn_a
                    + body_b.inv_inertia * rn_b * rn_b;
                vp.normal_mass = if k_normal > 0.0 { 1.0 / k_normal } else { 0.0 };

                let rt_a = vp.r_a.cross(tangent);
                let rt_b = vp.r_b.cross(tangent);
                let k_tangent = body_a.inv_mass
                    + body_b.inv_mass
                    + body_a.inv_inertia * rt_a * rt_a
                    + body_b.inv_inertia * rt_b * rt_b;
                vp.tangent_mass = if k_tangent > 0.0 { 1.0 / k_tangent } else { 0.0 };

                // Restitution only for real impacts
                let v_rel = wm.normal.dot(
                    body_b.v + Vec2::cross_scalar_vec(body_b.w, vp.r_b)
                        - body_a.v
                        - Vec2::cross_scalar_vec(body_a.w, vp.r_a),
                );
                if v_rel < -VELOCITY_THRESHOLD {
                    vp.velocity_bias = -contact.restitution * v_rel;
                }
            }

            constraints.push(constraint);
        }

        Self { contacts, constraints }
    }

    /// Apply the previous step's impulses
    pub fn warm_start(&self, bodies: &mut [SolverBody]) {
        for vc in &self.constraints {
            let tangent = Vec2::cross_vec_scalar(vc.normal, 1.0);
            let mut a = bodies[vc.index_a];
            let mut b = bodies[vc.index_b];

            for vp in &vc.points[..vc.point_count] {
                let p = vc.normal * vp.normal_impulse + tangent * vp.tangent_impulse;
                a.w -= vc.inv_i_a * vp.r_a.cross(p);
                a.v -= p * vc.inv_mass_a;
                b.w += vc.inv_i_b * vp.r_b.cross(p);
                b.v += p * vc.inv_mass_b;
            }

            bodies[vc.index_a].v = a.v;
            bodies[vc.index_a].w = a.w;
            bodies[vc.index_b].v = b.v;
            bodies[vc.index_b].w = b.w;
        }
    }

    /// One velocity iteration: friction first, then non-penetration
    pub fn solve_velocity_constraints(&mut self, bodies: &mut [SolverBody]) {
        for vc in self.constraints.iter_mut() {
            let normal = vc.normal;
            let tangent = Vec2::cross_vec_scalar(normal, 1.0);
            let (m_a, i_a, m_b, i_b) = (vc.inv_mass_a, vc.inv_i_a, vc.inv_mass_b, vc.inv_i_b);

            let mut v_a = bodies[vc.index_a].v;
            let mut w_a = bodies[vc.index_a].w;
            let mut v_b = bodies[vc.index_b].v;
            let mut w_b = bodies[vc.index_b].w;

            // Friction depends on the normal impulse, so solve it first
            for vp in vc.points[..vc.point_count].iter_mut() {
                let dv = v_b + Vec2::cross_scalar_vec(w_b, vp.r_b)
                    - v_a
                    - Vec2::cross_scalar_vec(w_a, vp.r_a);
                let vt = dv.dot(tangent);
                let lambda = vp.tangent_mass * (-vt);

                let max_friction = vc.friction * vp.normal_impulse;
                let new_impulse = (vp.tangent_impulse + lambda).clamp(-max_friction, max_friction);
                let lambda = new_impulse - vp.tangent_impulse;
                vp.tangent_impulse = new_impulse;

                let p = tangent * lambda;
                v_a -= p * m_a;
                w_a -= i_a * vp.r_a.cross(p);
                v_b += p * m_b;
                w_b += i_b * vp.r_b.cross(p);
            }

            for vp in vc.points[..vc.point_count].iter_mut() {
                let dv = v_b + Vec2::cross_scalar_vec(w_b, vp.r_b)
                    - v_a
                    - Vec2::cross_scalar_vec(w_a, vp.r_a);
                let vn = dv.dot(normal);
                let lambda = -vp.normal_mass * (vn - vp.velocity_bias);

                // Accumulated impulse stays non-negative
                let new_impulse = (vp.normal_impulse + lambda).max(0.0);
                let lambda = new_impulse - vp.normal_impulse;
                vp.normal_impulse = new_impulse;

                let p = normal * lambda;
                v_a -= p * m_a;
                w_a -= i_a * vp.r_a.cross(p);
                v_b += p * m_b;
                w_b += i_b * vp.r_b.cross(p);
            }

            bodies[vc.index_a].v = v_a;
            bodies[vc.index_a].w = w_a;
            bodies[vc.index_b].v = v_b;
            bodies[vc.index_b].w = w_b;
        }
    }

    /// Copy accumulated impulses back into the manifolds
    pub fn store_impulses(&mut self) {
        for (contact, vc) in self.contacts.iter_mut().zip(&self.constraints) {
            for j in 0..vc.point_count {
                contact.manifold.points[j].normal_impulse = vc.points[j].normal_impulse;
                contact.manifold.points[j].tangent_impulse = vc.points[j].tangent_impulse;
            }
        }
    }

    /// One position iteration; returns true once overlap is within tolerance
    pub fn solve_position_constraints(&self, bodies: &mut [SolverBody]) -> bool {
        let mut min_separation = 0.0_f32;

        for contact in self.contacts.iter() {
            let ia = contact.index_a;
            let ib = contact.index_b;
            let m_a = bodies[ia].inv_mass;
            let i_a = bodies[ia].inv_inertia;
            let m_b = bodies[ib].inv_mass;
            let i_b = bodies[ib].inv_inertia;

            for j in 0..contact.manifold.point_count {
                let xf_a = bodies[ia].transform();
                let xf_b = bodies[ib].transform();
                let (normal, point, separation) = position_manifold(contact, &xf_a, &xf_b, j);

                let r_a = point - bodies[ia].c;
                let r_b = point - bodies[ib].c;

                min_separation = min_separation.min(separation);

                // Leave a little overlap so contacts persist
                let c = (BAUMGARTE * (separation + LINEAR_SLOP)).clamp(-MAX_LINEAR_CORRECTION, 0.0);

                let rn_a = r_a.cross(normal);
                let rn_b = r_b.cross(normal);
                let k = m_a + m_b + i_a * rn_a * rn_a + i_b * rn_b * rn_b;
                let impulse = if k > 0.0 { -c / k } else { 0.0 };
                let p = normal * impulse;

                bodies[ia].c -= p * m_a;
                bodies[ia].a -= i_a * r_a.cross(p);
                bodies[ib].c += p * m_b;
                bodies[ib].a += i_b * r_b.cross(p);
            }
        }

        min_separation >= -3.0 * LINEAR_SLOP
    }
}

/// Normal, contact point and separation of one manifold point at the
/// current solver positions
fn position_manifold(contact: &Contact, xf_a: &Isometry2, xf_b: &Isometry2, index: usize) -> (Vec2, Vec2, f32) {
    let m = &contact.manifold;
    let radius = contact.radius_a + contact.radius_b;
    match m.kind {
        ManifoldKind::Circles => {
            let point_a = xf_a.apply(m.local_point);
            let point_b = xf_b.apply(m.points[0].local_point);
            let delta = point_b - point_a;
            let normal = if delta.length_squared() > f32::EPSILON * f32::EPSILON {
                delta.normalized()
            } else {
                Vec2::X
            };
            (normal, (point_a + point_b) * 0.5, delta.dot(normal) - radius)
        }
        ManifoldKind::FaceA => {
            let normal = xf_a.rotation.rotate(m.local_normal);
            let plane_point = xf_a.apply(m.local_point);
            let clip_point = xf_b.apply(m.points[index].local_point);
            (normal, clip_point, (clip_point - plane_point).dot(normal) - radius)
        }
        ManifoldKind::FaceB => {
            let normal = xf_b.rotation.rotate(m.local_normal);
            let plane_point = xf_b.apply(m.local_point);
            let clip_point = xf_a.apply(m.points[index].local_point);
            // Flip so the normal points from A to B
            (-normal, clip_point, (clip_point - plane_point).dot(normal) - radius)
        }
    }
}
