//! Narrow phase collision detection
//!
//! Each test produces a [`Manifold`] in local coordinates so contact points
//! can be matched between steps. [`WorldManifold`] evaluates it in world
//! space for the solver and for debug drawing.
//!
//! Conventions: the manifold normal points from shape A to shape B, and
//! a negative separation means penetration.

use crate::settings::{LINEAR_SLOP, MAX_MANIFOLD_POINTS, POLYGON_RADIUS};
use crate::shapes::{Circle, Polygon, Shape};
use tiltbox_math::{Isometry2, Vec2};

/// Which part of a shape a contact point came from
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum FeatureType {
    #[default]
    Vertex,
    Face,
}

/// Identifies the features that produced a contact point
///
/// Used to carry accumulated impulses from one step to the next.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct ContactFeature {
    pub index_a: u8,
    pub index_b: u8,
    pub type_a: FeatureType,
    pub type_b: FeatureType,
}

impl ContactFeature {
    /// Swap the A and B sides
    pub fn flipped(self) -> Self {
        Self {
            index_a: self.index_b,
            index_b: self.index_a,
            type_a: self.type_b,
            type_b: self.type_a,
        }
    }
}

/// How the manifold's local data is interpreted
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ManifoldKind {
    /// `local_point` is circle A's centre, the point is circle B's centre
    #[default]
    Circles,
    /// Reference face on shape A
    FaceA,
    /// Reference face on shape B
    FaceB,
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ManifoldPoint {
    /// Meaning depends on the manifold kind:
    /// - Circles: centre of circle B
    /// - FaceA: clip point on B, in B's frame
    /// - FaceB: clip point on A, in A's frame
    pub local_point: Vec2,
    pub normal_impulse: f32,
    pub tangent_impulse: f32,
    pub id: ContactFeature,
}

/// Contact points between two convex shapes, in local coordinates
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Manifold {
    pub points: [ManifoldPoint; MAX_MANIFOLD_POINTS],
    pub point_count: usize,
    /// Reference face normal, unused for `Circles`
    pub local_normal: Vec2,
    /// Reference point, meaning depends on the kind
    pub local_point: Vec2,
    pub kind: ManifoldKind,
}

impl Manifold {
    /// True when the shapes are touching
    pub fn is_touching(&self) -> bool {
        self.point_count > 0
    }

    /// The live contact points
    pub fn points(&self) -> &[ManifoldPoint] {
        &self.points[..self.point_count]
    }
}

/// A manifold evaluated in world space
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct WorldManifold {
    /// Unit normal from A to B
    pub normal: Vec2,
    /// Contact points, midway between the two surfaces
    pub points: [Vec2; MAX_MANIFOLD_POINTS],
    /// Negative when overlapping
    pub separations: [f32; MAX_MANIFOLD_POINTS],
}

impl WorldManifold {
    pub fn new(
        manifold: &Manifold,
        xf_a: &Isometry2,
        radius_a: f32,
        xf_b: &Isometry2,
        radius_b: f32,
    ) -> Self {
        let mut wm = WorldManifold::default();
        if manifold.point_count == 0 {
            return wm;
        }

        match manifold.kind {
            ManifoldKind::Circles => {
                wm.normal = Vec2::X;
                let point_a = xf_a.apply(manifold.local_point);
                let point_b = xf_b.apply(manifold.points[0].local_point);
                if (point_b - point_a).length_squared() > f32::EPSILON * f32::EPSILON {
                    wm.normal = (point_b - point_a).normalized();
                }
                let c_a = point_a + wm.normal * radius_a;
                let c_b = point_b - wm.normal * radius_b;
                wm.points[0] = (c_a + c_b) * 0.5;
                wm.separations[0] = (c_b - c_a).dot(wm.normal);
            }
            ManifoldKind::FaceA => {
                wm.normal = xf_a.rotation.rotate(manifold.local_normal);
                let plane_point = xf_a.apply(manifold.local_point);
                for i in 0..manifold.point_count {
                    let clip_point = xf_b.apply(manifold.points[i].local_point);
                    let c_a = clip_point
                        + wm.normal * (radius_a - (clip_point - plane_point).dot(wm.normal));
                    let c_b = clip_point - wm.normal * radius_b;
                    wm.points[i] = (c_a + c_b) * 0.5;
                    wm.separations[i] = (c_b - c_a).dot(wm.normal);
                }
            }
            ManifoldKind::FaceB => {
                wm.normal = xf_b.rotation.rotate(manifold.local_normal);
                let plane_point = xf_b.apply(manifold.local_point);
                for i in 0..manifold.point_count {
                    let clip_point = xf_a.apply(manifold.points[i].local_point);
                    let c_b = clip_point
                        + wm.normal * (radius_b - (clip_point - plane_point).dot(wm.normal));
                    let c_a = clip_point - wm.normal * radius_a;
                    wm.points[i] = (c_a + c_b) * 0.5;
                    wm.separations[i] = (c_a - c_b).dot(wm.normal);
                }
                // Keep the A-to-B convention
                wm.normal = -wm.normal;
            }
        }
        wm
    }
}

/// Compute the manifold between any two shapes
///
/// Returns a manifold with `point_count == 0` when they do not touch.
pub fn collide_shapes(shape_a: &Shape, xf_a: &Isometry2, shape_b: &Shape, xf_b: &Isometry2) -> Manifold {
    match (shape_a, shape_b) {
        (Shape::Circle(a), Shape::Circle(b)) => collide_circles(a, xf_a, b, xf_b),
        (Shape::Polygon(a), Shape::Circle(b)) => collide_polygon_circle(a, xf_a, b, xf_b),
        (Shape::Circle(a), Shape::Polygon(b)) => {
            // The polygon's reference face lives on B, the rest of the data
            // reads the same way
            let mut manifold = collide_polygon_circle(b, xf_b, a, xf_a);
            if manifold.kind == ManifoldKind::FaceA {
                manifold.kind = ManifoldKind::FaceB;
            }
            manifold
        }
        (Shape::Polygon(a), Shape::Polygon(b)) => collide_polygons(a, xf_a, b, xf_b),
    }
}

pub fn collide_circles(circle_a: &Circle, xf_a: &Isometry2, circle_b: &Circle, xf_b: &Isometry2) -> Manifold {
    let mut manifold = Manifold::default();

    let p_a = xf_a.apply(circle_a.center);
    let p_b = xf_b.apply(circle_b.center);
    let radius = circle_a.radius + circle_b.radius;
    if (p_b - p_a).length_squared() > radius * radius {
        return manifold;
    }

    manifold.kind = ManifoldKind::Circles;
    manifold.local_point = circle_a.center;
    manifold.local_normal = Vec2::ZERO;
    manifold.point_count = 1;
    manifold.points[0].local_point = circle_b.center;
    manifold
}

pub fn collide_polygon_circle(poly_a: &Polygon, xf_a: &Isometry2, circle_b: &Circle, xf_b: &Isometry2) -> Manifold {
    let mut manifold = Manifold::default();

    // Circle centre in the polygon's frame
    let c = xf_b.apply(circle_b.center);
    let c_local = xf_a.apply_inv(c);

    let vertices = poly_a.vertices();
    let normals = poly_a.normals();
    let radius = POLYGON_RADIUS + circle_b.radius;

    let mut normal_index = 0;
    let mut separation = f32::MIN;
    for (i, (n, v)) in normals.iter().zip(vertices).enumerate() {
        let s = n.dot(c_local - *v);
        if s > radius {
            return manifold;
        }
        if s > separation {
            separation = s;
            normal_index = i;
        }
    }

    let v1 = vertices[normal_index];
    let v2 = vertices[(normal_index + 1) % vertices.len()];

    manifold.kind = ManifoldKind::FaceA;
    manifold.point_count = 1;
    manifold.points[0].local_point = circle_b.center;

    // Centre inside the polygon
    if separation < f32::EPSILON {
        manifold.local_normal = normals[normal_index];
        manifold.local_point = (v1 + v2) * 0.5;
        return manifold;
    }

    // Voronoi regions of the closest edge
    let u1 = (c_local - v1).dot(v2 - v1);
    let u2 = (c_local - v2).dot(v1 - v2);
    if u1 <= 0.0 {
        if (c_local - v1).length_squared() > radius * radius {
            return Manifold::default();
        }
        manifold.local_normal = (c_local - v1).normalized();
        manifold.local_point = v1;
    } else if u2 <= 0.0 {
        if (c_local - v2).length_squared() > radius * radius {
            return Manifold::default();
        }
        manifold.local_normal = (c_local - v2).normalized();
        manifold.local_point = v2;
    } else {
        let face_center = (v1 + v2) * 0.5;
        if (c_local - face_center).dot(normals[normal_index]) > radius {
            return Manifold::default();
        }
        manifold.local_normal = normals[normal_index];
        manifold.local_point = face_center;
    }
    manifold
}

#[derive(Clone, Copy, Debug, Default)]
struct ClipVertex {
    v: Vec2,
    id: ContactFeature,
}

/// Find the edge of `poly1` with the largest separation from `poly2`
fn find_max_separation(poly1: &Polygon, xf1: &Isometry2, poly2: &Polygon, xf2: &Isometry2) -> (usize, f32) {
    let mut best_index = 0;
    let mut max_separation = f32::MIN;

    for (i, (n1, v1)) in poly1.normals().iter().zip(poly1.vertices()).enumerate() {
        // Edge of poly1 in poly2's frame
        let n = xf2.rotation.inv_rotate(xf1.rotation.rotate(*n1));
        let v = xf2.apply_inv(xf1.apply(*v1));

        let si = poly2
            .vertices()
            .iter()
            .map(|v2| n.dot(*v2 - v))
            .fold(f32::MAX, f32::min);

        if si > max_separation {
            max_separation = si;
            best_index = i;
        }
    }
    (best_index, max_separation)
}

/// The edge of `poly2` most anti-parallel to the reference edge of `poly1`
fn find_incident_edge(
    poly1: &Polygon,
    xf1: &Isometry2,
    edge1: usize,
    poly2: &Polygon,
    xf2: &Isometry2,
) -> [ClipVertex; 2] {
    let normal1 = xf2.rotation.inv_rotate(xf1.rotation.rotate(poly1.normals()[edge1]));

    let mut index = 0;
    let mut min_dot = f32::MAX;
    for (i, n2) in poly2.normals().iter().enumerate() {
        let dot = normal1.dot(*n2);
        if dot < min_dot {
            min_dot = dot;
            index = i;
        }
    }

    let i1 = index;
    let i2 = (i1 + 1) % poly2.count();
    let vertices2 = poly2.vertices();
    [
        ClipVertex {
            v: xf2.apply(vertices2[i1]),
            id: ContactFeature {
                index_a: edge1 as u8,
                index_b: i1 as u8,
                type_a: FeatureType::Face,
                type_b: FeatureType::Vertex,
            },
        },
        ClipVertex {
            v: xf2.apply(vertices2[i2]),
            id: ContactFeature {
                index_a: edge1 as u8,
                index_b: i2 as u8,
                type_a: FeatureType::Face,
                type_b: FeatureType::Vertex,
            },
        },
    ]
}

/// Sutherland-Hodgman clipping of a segment against a half-plane
fn clip_segment_to_line(
    v_in: &[ClipVertex; 2],
    normal: Vec2,
    offset: f32,
    vertex_index_a: usize,
) -> ([ClipVertex; 2], usize) {
    let mut v_out = [ClipVertex::default(); 2];
    let mut count = 0;

    let d0 = normal.dot(v_in[0].v) - offset;
    let d1 = normal.dot(v_in[1].v) - offset;

    if d0 <= 0.0 {
        v_out[count] = v_in[0];
        count += 1;
    }
    if d1 <= 0.0 {
        v_out[count] = v_in[1];
        count += 1;
    }

    // Points on opposite sides: add the intersection
    if d0 * d1 < 0.0 && count < 2 {
        let interp = d0 / (d0 - d1);
        v_out[count] = ClipVertex {
            v: v_in[0].v + (v_in[1].v - v_in[0].v) * interp,
            id: ContactFeature {
                index_a: vertex_index_a as u8,
                index_b: v_in[0].id.index_b,
                type_a: FeatureType::Vertex,
                type_b: FeatureType::Face,
            },
        };
        count += 1;
    }

    (v_out, count)
}

/// Polygon/polygon manifold by separating axis and reference-face clipping
pub fn collide_polygons(poly_a: &Polygon, xf_a: &Isometry2, poly_b: &Polygon, xf_b: &Isometry2) -> Manifold {
    let mut manifold = Manifold::default();
    let total_radius = 2.0 * POLYGON_RADIUS;

    let (edge_a, separation_a) = find_max_separation(poly_a, xf_a, poly_b, xf_b);
    if separation_a > total_radius {
        return manifold;
    }

    let (edge_b, separation_b) = find_max_separation(poly_b, xf_b, poly_a, xf_a);
    if separation_b > total_radius {
        return manifold;
    }

    // Prefer face A unless B is clearly better, avoids flip-flopping
    let tolerance = 0.1 * LINEAR_SLOP;
    let (poly1, xf1, poly2, xf2, edge1, flip) = if separation_b > separation_a + tolerance {
        manifold.kind = ManifoldKind::FaceB;
        (poly_b, xf_b, poly_a, xf_a, edge_b, true)
    } else {
        manifold.kind = ManifoldKind::FaceA;
        (poly_a, xf_a, poly_b, xf_b, edge_a, false)
    };

    let incident_edge = find_incident_edge(poly1, xf1, edge1, poly2, xf2);

    let vertices1 = poly1.vertices();
    let iv1 = edge1;
    let iv2 = (edge1 + 1) % vertices1.len();

    let mut v11 = vertices1[iv1];
    let mut v12 = vertices1[iv2];

    let local_tangent = (v12 - v11).normalized();
    let local_normal = Vec2::cross_vec_scalar(local_tangent, 1.0);
    let plane_point = (v11 + v12) * 0.5;

    let tangent = xf1.rotation.rotate(local_tangent);
    let normal = Vec2::cross_vec_scalar(tangent, 1.0);

    v11 = xf1.apply(v11);
    v12 = xf1.apply(v12);

    let front_offset = normal.dot(v11);
    let side_offset1 = -tangent.dot(v11) + total_radius;
    let side_offset2 = tangent.dot(v12) + total_radius;

    // Clip the incident edge against the reference edge's side planes
    let (clip_points1, count) = clip_segment_to_line(&incident_edge, -tangent, side_offset1, iv1);
    if count < 2 {
        return manifold;
    }
    let (clip_points2, count) = clip_segment_to_line(&clip_points1, tangent, side_offset2, iv2);
    if count < 2 {
        return manifold;
    }

    manifold.local_normal = local_normal;
    manifold.local_point = plane_point;

    let mut point_count = 0;
    for clip in clip_points2.iter() {
        let separation = normal.dot(clip.v) - front_offset;
        if separation <= total_radius {
            let cp = &mut manifold.points[point_count];
            cp.local_point = xf2.apply_inv(clip.v);
            cp.id = if flip { clip.id.flipped() } else { clip.id };
            point_count += 1;
        }
    }
    manifold.point_count = point_count;
    manifold
}

#[cfg(test)]
mod tests {
    use super::*;

    fn world(shape_a: &Shape, xf_a: &Isometry2, shape_b: &Shape, xf_b: &Isometry2) -> (Manifold, WorldManifold) {
        let m = collide_shapes(shape_a, xf_a, shape_b, xf_b);
        let wm = WorldManifold::new(&m, xf_a, shape_a.radius(), xf_b, shape_b.radius());
        (m, wm)
    }

    #[test]
    fn test_circles_touching() {
        let a = Shape::circle(1.0);
        let b = Shape::circle(0.5);
        let xf_a = Isometry2::IDENTITY;
        let xf_b = Isometry2::new(Vec2::new(1.4, 0.0), 0.0);
        let (m, wm) = world(&a, &xf_a, &b, &xf_b);
        assert_eq!(m.kind, ManifoldKind::Circles);
        assert_eq!(m.point_count, 1);
        assert!((wm.normal - Vec2::X).length() < 1e-6);
        assert!((wm.separations[0] + 0.1).abs() < 1e-5);
    }

    #[test]
    fn test_circles_apart() {
        let a = Shape::circle(1.0);
        let xf_b = Isometry2::new(Vec2::new(2.5, 0.0), 0.0);
        let m = collide_shapes(&a, &Isometry2::IDENTITY, &a, &xf_b);
        assert!(!m.is_touching());
    }

    #[test]
    fn test_box_stacked_on_box() {
        let a = Shape::rect(1.0, 1.0);
        let b = Shape::rect(1.0, 1.0);
        let xf_a = Isometry2::IDENTITY;
        let xf_b = Isometry2::new(Vec2::new(0.0, 1.9), 0.0);
        let (m, wm) = world(&a, &xf_a, &b, &xf_b);
        assert_eq!(m.point_count, 2);
        assert!((wm.normal - Vec2::Y).length() < 1e-5);
        for i in 0..2 {
            assert!((wm.separations[i] + 0.1 + 2.0 * POLYGON_RADIUS).abs() < 1e-4);
            assert!((wm.points[i].y - 0.95).abs() < 0.02);
        }
        // The two points carry distinct feature ids
        assert_ne!(m.points[0].id, m.points[1].id);
    }

    #[test]
    fn test_small_box_under_wide_box() {
        let a = Shape::rect(0.5, 0.5);
        let b = Shape::rect(3.0, 0.5);
        let xf_b = Isometry2::new(Vec2::new(0.3, 0.95), 0.0);
        let (m, wm) = world(&a, &Isometry2::IDENTITY, &b, &xf_b);
        assert!(m.is_touching());
        // Normal still points from A to B
        assert!(wm.normal.y > 0.99);
    }

    #[test]
    fn test_polygon_circle_face() {
        let poly = Shape::rect(2.0, 0.5);
        let circle = Shape::circle(0.5);
        let xf_b = Isometry2::new(Vec2::new(0.3, 0.9), 0.0);
        let (m, wm) = world(&poly, &Isometry2::IDENTITY, &circle, &xf_b);
        assert_eq!(m.kind, ManifoldKind::FaceA);
        assert!((wm.normal - Vec2::Y).length() < 1e-5);
        assert!(wm.separations[0] < 0.0);
    }

    #[test]
    fn test_polygon_circle_vertex_region() {
        let poly = Shape::rect(1.0, 1.0);
        let circle = Shape::circle(0.5);
        let xf_b = Isometry2::new(Vec2::new(1.3, 1.3), 0.0);
        let (m, wm) = world(&poly, &Isometry2::IDENTITY, &circle, &xf_b);
        assert!(m.is_touching());
        let diag = Vec2::new(1.0, 1.0).normalized();
        assert!((wm.normal - diag).length() < 1e-4);

        let far = Isometry2::new(Vec2::new(1.5, 1.5), 0.0);
        assert!(!collide_shapes(&poly, &Isometry2::IDENTITY, &circle, &far).is_touching());
    }

    #[test]
    fn test_circle_polygon_swapped_order() {
        let poly = Shape::rect(2.0, 0.5);
        let circle = Shape::circle(0.5);
        let xf_circle = Isometry2::new(Vec2::new(0.3, 0.9), 0.0);
        let (m, wm) = world(&circle, &xf_circle, &poly, &Isometry2::IDENTITY);
        assert_eq!(m.kind, ManifoldKind::FaceB);
        // Normal goes from the circle (A) towards the box (B)
        assert!((wm.normal + Vec2::Y).length() < 1e-5);

        let (_, wm_forward) = world(&poly, &Isometry2::IDENTITY, &circle, &xf_circle);
        assert!((wm.separations[0] - wm_forward.separations[0]).abs() < 1e-5);
        assert!((wm.points[0] - wm_forward.points[0]).length() < 1e-5);
    }

    #[test]
    fn test_feature_flip() {
        let id = ContactFeature {
            index_a: 1,
            index_b: 3,
            type_a: FeatureType::Face,
            type_b: FeatureType::Vertex,
        };
        let f = id.flipped();
        assert_eq!(f.index_a, 3);
        assert_eq!(f.type_a, FeatureType::Vertex);
        assert_eq!(f.flipped(), id);
    }
}
