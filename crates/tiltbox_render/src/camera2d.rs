//! Orthographic 2D camera
//!
//! World space is metres with y up. Screen space is physical pixels with the
//! origin at the top-left and y down.

use tiltbox_math::{Aabb2, Vec2};

/// Maps world metres to the window
#[derive(Clone, Debug, PartialEq)]
pub struct Camera2D {
    /// World point shown at the centre of the viewport
    pub center: Vec2,
    pub pixels_per_meter: f32,
    /// Viewport size in pixels
    viewport: (u32, u32),
}

impl Camera2D {
    /// Camera whose viewport shows `[0, w/ppm] x [0, h/ppm]`
    pub fn new(viewport_width: u32, viewport_height: u32, pixels_per_meter: f32) -> Self {
        let mut camera = Self {
            center: Vec2::ZERO,
            pixels_per_meter: pixels_per_meter.max(f32::EPSILON),
            viewport: (viewport_width.max(1), viewport_height.max(1)),
        };
        camera.center = camera.visible_size() * 0.5;
        camera
    }

    pub fn viewport(&self) -> (u32, u32) {
        self.viewport
    }

    /// Resize the viewport, keeping the bottom-left corner fixed
    pub fn resize(&mut self, width: u32, height: u32) {
        let bottom_left = self.center - self.visible_size() * 0.5;
        self.viewport = (width.max(1), height.max(1));
        self.center = bottom_left + self.visible_size() * 0.5;
    }

    /// Size of the visible area in metres
    pub fn visible_size(&self) -> Vec2 {
        Vec2::new(self.viewport.0 as f32, self.viewport.1 as f32) * (1.0 / self.pixels_per_meter)
    }

    /// Visible area in world coordinates
    pub fn visible_bounds(&self) -> Aabb2 {
        Aabb2::from_center_half_extents(self.center, self.visible_size() * 0.5)
    }

    /// Convert a window position in pixels to world coordinates
    pub fn screen_to_world(&self, screen: Vec2) -> Vec2 {
        let (w, h) = (self.viewport.0 as f32, self.viewport.1 as f32);
        let dx = (screen.x - 0.5 * w) / self.pixels_per_meter;
        let dy = (0.5 * h - screen.y) / self.pixels_per_meter;
        self.center + Vec2::new(dx, dy)
    }

    /// Convert a world position to window pixels
    pub fn world_to_screen(&self, world: Vec2) -> Vec2 {
        let (w, h) = (self.viewport.0 as f32, self.viewport.1 as f32);
        let d = (world - self.center) * self.pixels_per_meter;
        Vec2::new(0.5 * w + d.x, 0.5 * h - d.y)
    }

    /// Column-major world → clip matrix
    pub fn view_projection(&self) -> [[f32; 4]; 4] {
        let half = self.visible_size() * 0.5;
        let sx = 1.0 / half.x;
        let sy = 1.0 / half.y;
        [
            [sx, 0.0, 0.0, 0.0],
            [0.0, sy, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0],
            [-self.center.x * sx, -self.center.y * sy, 0.0, 1.0],
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: Vec2, b: Vec2) -> bool {
        (a - b).length() < 1e-4
    }

    #[test]
    fn test_new_shows_positive_quadrant() {
        let camera = Camera2D::new(640, 480, 32.0);
        let bounds = camera.visible_bounds();
        assert!(approx(bounds.min, Vec2::ZERO));
        assert!(approx(bounds.max, Vec2::new(20.0, 15.0)));
    }

    #[test]
    fn test_screen_to_world_flips_y() {
        let camera = Camera2D::new(640, 480, 32.0);
        assert!(approx(camera.screen_to_world(Vec2::new(0.0, 480.0)), Vec2::ZERO));
        assert!(approx(camera.screen_to_world(Vec2::new(0.0, 0.0)), Vec2::new(0.0, 15.0)));
        assert!(approx(camera.screen_to_world(Vec2::new(320.0, 240.0)), Vec2::new(10.0, 7.5)));
    }

    #[test]
    fn test_round_trip() {
        let camera = Camera2D::new(800, 600, 40.0);
        let p = Vec2::new(3.3, 7.1);
        assert!(approx(camera.screen_to_world(camera.world_to_screen(p)), p));
    }

    #[test]
    fn test_view_projection_maps_corners_to_ndc() {
        let camera = Camera2D::new(640, 480, 32.0);
        let m = camera.view_projection();
        let apply = |p: Vec2| Vec2::new(m[0][0] * p.x + m[3][0], m[1][1] * p.y + m[3][1]);
        assert!(approx(apply(Vec2::ZERO), Vec2::new(-1.0, -1.0)));
        assert!(approx(apply(Vec2::new(20.0, 15.0)), Vec2::new(1.0, 1.0)));
    }

    #[test]
    fn test_resize_keeps_bottom_left() {
        let mut camera = Camera2D::new(640, 480, 32.0);
        camera.resize(1280, 720);
        assert!(approx(camera.visible_bounds().min, Vec2::ZERO));
        assert!(approx(camera.visible_bounds().max, Vec2::new(40.0, 22.5)));
    }
}
