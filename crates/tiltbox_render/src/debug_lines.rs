//! Line-list implementation of [`DebugDraw`]
//!
//! Everything is tessellated into coloured line segments, ready for the
//! line pipeline. Fills are approximated by the outline plus a faint
//! spoke pattern.

use std::f32::consts::TAU;

use tiltbox_math::{Isometry2, Vec2};

use crate::debug_overlay::{Color, DebugDraw};
use crate::pipeline::LineVertex;

/// Segments used for a full circle
const CIRCLE_SEGMENTS: usize = 16;
/// Length of the axes drawn by `draw_transform`
const AXIS_LENGTH: f32 = 0.4;

/// Accumulates debug geometry for one frame
#[derive(Clone, Debug, Default)]
pub struct DebugLines {
    vertices: Vec<LineVertex>,
}

impl DebugLines {
    pub fn new() -> Self {
        Self::default()
    }

    /// Two vertices per segment
    pub fn vertices(&self) -> &[LineVertex] {
        &self.vertices
    }

    pub fn segment_count(&self) -> usize {
        self.vertices.len() / 2
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    pub fn clear(&mut self) {
        self.vertices.clear();
    }

    fn push(&mut self, a: Vec2, b: Vec2, color: Color) {
        let color = color.to_array();
        self.vertices.push(LineVertex { position: a.to_array(), color });
        self.vertices.push(LineVertex { position: b.to_array(), color });
    }

    fn circle_points(center: Vec2, radius: f32) -> impl Iterator<Item = Vec2> {
        (0..CIRCLE_SEGMENTS).map(move |i| {
            let theta = TAU * i as f32 / CIRCLE_SEGMENTS as f32;
            center + Vec2::new(theta.cos(), theta.sin()) * radius
        })
    }
}

fn faded(color: Color) -> Color {
    Color { a: color.a * 0.5, ..color }
}

impl DebugDraw for DebugLines {
    fn draw_polygon(&mut self, vertices: &[Vec2], color: Color) {
        let n = vertices.len();
        for i in 0..n {
            self.push(vertices[i], vertices[(i + 1) % n], color);
        }
    }

    fn draw_solid_polygon(&mut self, vertices: &[Vec2], color: Color) {
        if let Some(&first) = vertices.first() {
            let fill = faded(color);
            for &v in vertices.iter().skip(2).take(vertices.len().saturating_sub(3)) {
                self.push(first, v, fill);
            }
        }
        self.draw_polygon(vertices, color);
    }

    fn draw_circle(&mut self, center: Vec2, radius: f32, color: Color) {
        let points: Vec<Vec2> = Self::circle_points(center, radius).collect();
        self.draw_polygon(&points, color);
    }

    fn draw_solid_circle(&mut self, center: Vec2, radius: f32, axis: Vec2, color: Color) {
        self.draw_circle(center, radius, color);
        self.push(center, center + axis * radius, color);
    }

    fn draw_segment(&mut self, p1: Vec2, p2: Vec2, color: Color) {
        self.push(p1, p2, color);
    }

    fn draw_transform(&mut self, xf: &Isometry2) {
        let p = xf.translation;
        self.push(p, p + xf.rotation.x_axis() * AXIS_LENGTH, Color::RED);
        self.push(p, p + xf.rotation.y_axis() * AXIS_LENGTH, Color::GREEN);
    }

    fn draw_point(&mut self, p: Vec2, size: f32, color: Color) {
        let h = size * 0.5;
        self.push(p - Vec2::new(h, 0.0), p + Vec2::new(h, 0.0), color);
        self.push(p - Vec2::new(0.0, h), p + Vec2::new(0.0, h), color);
    }
}
