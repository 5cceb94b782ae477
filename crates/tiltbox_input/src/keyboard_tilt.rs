//! Arrow-key tilt emulation for desktop
//!
//! Controls:
//! - Arrow keys: tilt gravity toward that screen direction
//! - No arrows held: gravity points down

use tiltbox_math::Vec2;
use winit::event::ElementState;
use winit::keyboard::KeyCode;

use crate::TiltMapping;

/// Tracks held arrow keys and produces synthetic tilt samples
#[derive(Clone, Debug, Default)]
pub struct KeyboardTilt {
    left: bool,
    right: bool,
    up: bool,
    down: bool,
    changed: bool,
}

impl KeyboardTilt {
    pub fn new() -> Self {
        Self::default()
    }

    /// Process keyboard input, returns true if the key is an arrow
    pub fn process_keyboard(&mut self, key: KeyCode, state: ElementState) -> bool {
        let pressed = state == ElementState::Pressed;
        let slot = match key {
            KeyCode::ArrowLeft => &mut self.left,
            KeyCode::ArrowRight => &mut self.right,
            KeyCode::ArrowUp => &mut self.up,
            KeyCode::ArrowDown => &mut self.down,
            _ => return false,
        };
        if *slot != pressed {
            *slot = pressed;
            self.changed = true;
        }
        true
    }

    /// Desired gravity direction in screen axes, unit length
    pub fn direction(&self) -> Vec2 {
        let dx = (self.right as i32 - self.left as i32) as f32;
        let dy = (self.up as i32 - self.down as i32) as f32;
        let dir = Vec2::new(dx, dy);
        if dir.length_squared() == 0.0 {
            Vec2::new(0.0, -1.0)
        } else {
            dir.normalized()
        }
    }

    /// Device sample for the current keys under `mapping`
    pub fn sample(&self, mapping: &TiltMapping) -> Vec2 {
        mapping.sample_for(self.direction())
    }

    /// True once after any arrow changed state
    pub fn take_changed(&mut self) -> bool {
        std::mem::take(&mut self.changed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rest_points_down() {
        let keys = KeyboardTilt::new();
        assert_eq!(keys.direction(), Vec2::new(0.0, -1.0));
    }

    #[test]
    fn test_arrow_keys() {
        let mut keys = KeyboardTilt::new();
        assert!(keys.process_keyboard(KeyCode::ArrowLeft, ElementState::Pressed));
        assert_eq!(keys.direction(), Vec2::new(-1.0, 0.0));

        keys.process_keyboard(KeyCode::ArrowUp, ElementState::Pressed);
        let d = keys.direction();
        assert!((d.length() - 1.0).abs() < 1e-6);
        assert!(d.x < 0.0 && d.y > 0.0);

        assert!(!keys.process_keyboard(KeyCode::KeyA, ElementState::Pressed));
    }

    #[test]
    fn test_changed_flag() {
        let mut keys = KeyboardTilt::new();
        assert!(!keys.take_changed());
        keys.process_keyboard(KeyCode::ArrowRight, ElementState::Pressed);
        assert!(keys.take_changed());
        assert!(!keys.take_changed());
        // Key repeat does not count as a change
        keys.process_keyboard(KeyCode::ArrowRight, ElementState::Pressed);
        assert!(!keys.take_changed());
    }

    #[test]
    fn test_sample_maps_back_to_direction() {
        let mapping = TiltMapping::default();
        let mut keys = KeyboardTilt::new();
        keys.process_keyboard(KeyCode::ArrowRight, ElementState::Pressed);
        let g = mapping.to_gravity(keys.sample(&mapping));
        assert!((g - Vec2::new(10.0, 0.0)).length() < 1e-4);
    }
}
