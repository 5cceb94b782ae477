//! Collision shapes for 2D physics
//!
//! Shapes are stored in body-local coordinates. World placement comes from
//! the owning body's transform.

use std::f32::consts::PI;

use tiltbox_math::{Aabb2, Isometry2, Rot2, Vec2};

use crate::error::PhysicsError;
use crate::settings::{MAX_POLYGON_VERTICES, POLYGON_RADIUS};

/// Mass properties computed from a shape and a density
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct MassData {
    /// Mass in kilograms
    pub mass: f32,
    /// Centre of mass in body-local coordinates
    pub center: Vec2,
    /// Rotational inertia about the body origin
    pub inertia: f32,
}

/// A circle defined by local center and radius
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Circle {
    pub center: Vec2,
    pub radius: f32,
}

impl Circle {
    /// Create a circle centred on the body origin
    pub fn new(radius: f32) -> Self {
        Self {
            center: Vec2::ZERO,
            radius,
        }
    }

    /// Create a circle offset from the body origin
    pub fn with_center(center: Vec2, radius: f32) -> Self {
        Self { center, radius }
    }
}

/// A convex polygon with counter-clockwise winding
#[derive(Clone, Debug, PartialEq)]
pub struct Polygon {
    vertices: Vec<Vec2>,
    normals: Vec<Vec2>,
    centroid: Vec2,
}

impl Polygon {
    /// Create a convex polygon from 3..=8 points
    ///
    /// Clockwise input is reversed. Non-convex, degenerate or non-finite
    /// input is rejected.
    pub fn new(points: &[Vec2]) -> Result<Self, PhysicsError> {
        let n = points.len();
        if !(3..=MAX_POLYGON_VERTICES).contains(&n) {
            return Err(PhysicsError::InvalidShape(format!(
                "polygon needs 3 to {} vertices, got {}",
                MAX_POLYGON_VERTICES, n
            )));
        }
        if points.iter().any(|p| !p.is_finite()) {
            return Err(PhysicsError::InvalidShape("non-finite vertex".to_string()));
        }

        let mut vertices = points.to_vec();
        if signed_area(&vertices) < 0.0 {
            vertices.reverse();
        }
        if signed_area(&vertices) <= f32::EPSILON {
            return Err(PhysicsError::InvalidShape("polygon has no area".to_string()));
        }

        let mut normals = Vec::with_capacity(n);
        for i in 0..n {
            let v1 = vertices[i];
            let v2 = vertices[(i + 1) % n];
            let edge = v2 - v1;
            if edge.length_squared() <= f32::EPSILON * f32::EPSILON {
                return Err(PhysicsError::InvalidShape("repeated vertex".to_string()));
            }
            // Every other vertex must lie on the inner side of this edge
            for (j, &v) in vertices.iter().enumerate() {
                if j == i || j == (i + 1) % n {
                    continue;
                }
                if edge.cross(v - v1) < 0.0 {
                    return Err(PhysicsError::InvalidShape("polygon is not convex".to_string()));
                }
            }
            normals.push(Vec2::cross_vec_scalar(edge, 1.0).normalized());
        }

        let centroid = compute_centroid(&vertices);
        Ok(Self {
            vertices,
            normals,
            centroid,
        })
    }

    /// Axis-aligned box centred on the body origin
    pub fn new_box(half_width: f32, half_height: f32) -> Self {
        let hx = half_width.abs();
        let hy = half_height.abs();
        Self {
            vertices: vec![
                Vec2::new(-hx, -hy),
                Vec2::new(hx, -hy),
                Vec2::new(hx, hy),
                Vec2::new(-hx, hy),
            ],
            normals: vec![Vec2::new(0.0, -1.0), Vec2::X, Vec2::Y, Vec2::new(-1.0, 0.0)],
            centroid: Vec2::ZERO,
        }
    }

    /// Box with the given local centre and rotation
    pub fn new_oriented_box(half_width: f32, half_height: f32, center: Vec2, angle: f32) -> Self {
        let mut poly = Self::new_box(half_width, half_height);
        let xf = Isometry2::new(center, angle);
        let rot = Rot2::from_angle(angle);
        for v in poly.vertices.iter_mut() {
            *v = xf.apply(*v);
        }
        for n in poly.normals.iter_mut() {
            *n = rot.rotate(*n);
        }
        poly.centroid = center;
        poly
    }

    /// Vertices in body-local coordinates
    pub fn vertices(&self) -> &[Vec2] {
        &self.vertices
    }

    /// Outward edge normals; `normals()[i]` belongs to edge `i -> i+1`
    pub fn normals(&self) -> &[Vec2] {
        &self.normals
    }

    /// Area centroid in body-local coordinates
    pub fn centroid(&self) -> Vec2 {
        self.centroid
    }

    /// Number of vertices
    pub fn count(&self) -> usize {
        self.vertices.len()
    }
}

fn signed_area(vertices: &[Vec2]) -> f32 {
    let n = vertices.len();
    let mut area = 0.0;
    for i in 0..n {
        area += vertices[i].cross(vertices[(i + 1) % n]);
    }
    area * 0.5
}

fn compute_centroid(vertices: &[Vec2]) -> Vec2 {
    let origin = vertices[0];
    let mut center = Vec2::ZERO;
    let mut area = 0.0;
    const INV3: f32 = 1.0 / 3.0;

    for i in 1..vertices.len() - 1 {
        let e1 = vertices[i] - origin;
        let e2 = vertices[i + 1] - origin;
        let triangle_area = 0.5 * e1.cross(e2);
        area += triangle_area;
        center += (e1 + e2) * (triangle_area * INV3);
    }

    center * (1.0 / area) + origin
}

/// A collision shape attached to a body
#[derive(Clone, Debug, PartialEq)]
pub enum Shape {
    Circle(Circle),
    Polygon(Polygon),
}

impl Shape {
    /// Circle centred on the body origin
    pub fn circle(radius: f32) -> Self {
        Shape::Circle(Circle::new(radius))
    }

    /// Box centred on the body origin
    pub fn rect(half_width: f32, half_height: f32) -> Self {
        Shape::Polygon(Polygon::new_box(half_width, half_height))
    }

    /// Collision radius (circle radius, or the polygon skin)
    pub fn radius(&self) -> f32 {
        match self {
            Shape::Circle(c) => c.radius,
            Shape::Polygon(_) => POLYGON_RADIUS,
        }
    }

    /// Compute mass, centre of mass and inertia about the body origin
    pub fn compute_mass(&self, density: f32) -> MassData {
        match self {
            Shape::Circle(circle) => {
                let r2 = circle.radius * circle.radius;
                let mass = density * PI * r2;
                MassData {
                    mass,
                    center: circle.center,
                    inertia: mass * (0.5 * r2 + circle.center.dot(circle.center)),
                }
            }
            Shape::Polygon(poly) => polygon_mass(poly, density),
        }
    }

    /// World-space bounding box under the given transform
    pub fn compute_aabb(&self, xf: &Isometry2) -> Aabb2 {
        match self {
            Shape::Circle(circle) => {
                let p = xf.apply(circle.center);
                Aabb2::from_center_half_extents(p, Vec2::splat(circle.radius))
            }
            Shape::Polygon(poly) => {
                let mut aabb = Aabb2::new(xf.apply(poly.vertices[0]), xf.apply(poly.vertices[0]));
                for &v in &poly.vertices[1..] {
                    let w = xf.apply(v);
                    aabb.min = aabb.min.min_components(w);
                    aabb.max = aabb.max.max_components(w);
                }
                aabb.expanded(POLYGON_RADIUS)
            }
        }
    }

    /// Check if a world point lies inside the shape
    pub fn test_point(&self, xf: &Isometry2, point: Vec2) -> bool {
        let local = xf.apply_inv(point);
        match self {
            Shape::Circle(circle) => (local - circle.center).length_squared() <= circle.radius * circle.radius,
            Shape::Polygon(poly) => poly
                .normals
                .iter()
                .zip(&poly.vertices)
                .all(|(n, v)| n.dot(local - *v) <= 0.0),
        }
    }
}

fn polygon_mass(poly: &Polygon, density: f32) -> MassData {
    // Triangle fan from the first vertex keeps the sums well conditioned
    let s = poly.vertices[0];
    let n = poly.vertices.len();
    const INV3: f32 = 1.0 / 3.0;

    let mut center = Vec2::ZERO;
    let mut area = 0.0;
    let mut inertia = 0.0;

    for i in 0..n {
        let e1 = poly.vertices[i] - s;
        let e2 = poly.vertices[(i + 1) % n] - s;
        let d = e1.cross(e2);

        let triangle_area = 0.5 * d;
        area += triangle_area;
        center += (e1 + e2) * (triangle_area * INV3);

        let intx2 = e1.x * e1.x + e2.x * e1.x + e2.x * e2.x;
        let inty2 = e1.y * e1.y + e2.y * e1.y + e2.y * e2.y;
        inertia += (0.25 * INV3 * d) * (intx2 + inty2);
    }

    let mass = density * area;
    let local_center = center * (1.0 / area);
    let mass_center = local_center + s;

    MassData {
        mass,
        center: mass_center,
        // Shift from the fan origin to the body origin
        inertia: density * inertia
            + mass * (mass_center.dot(mass_center) - local_center.dot(local_center)),
    }
}
