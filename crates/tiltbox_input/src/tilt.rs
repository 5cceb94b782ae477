//! Tilt → gravity mapping
//!
//! Samples arrive in device axes, in units of g. They are low-pass filtered,
//! rotated into screen axes, scaled to m/s² and clamped.

use serde::{Deserialize, Serialize};
use tiltbox_math::Vec2;

/// How device axes map to world gravity
///
/// The default matches a device held in landscape: gravity = (-y, x) * 10.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TiltMapping {
    /// m/s² per g
    pub scale: f32,
    /// Swap device x and y before inversion
    pub swap_axes: bool,
    pub invert_x: bool,
    pub invert_y: bool,
    /// Largest gravity magnitude produced
    pub max_magnitude: f32,
    /// Weight of the newest sample in the low-pass filter, in (0, 1]
    pub filter_factor: f32,
}

impl Default for TiltMapping {
    fn default() -> Self {
        Self {
            scale: 10.0,
            swap_axes: true,
            invert_x: true,
            invert_y: false,
            max_magnitude: 20.0,
            filter_factor: 0.1,
        }
    }
}

impl TiltMapping {
    /// Map a filtered sample to gravity, without filtering
    pub fn to_gravity(&self, sample: Vec2) -> Vec2 {
        (self.orient(sample) * self.scale).clamp_length(self.max_magnitude)
    }

    /// The device sample that would produce gravity along `direction`
    ///
    /// Used to emulate a tilt sensor from other input.
    pub fn sample_for(&self, direction: Vec2) -> Vec2 {
        let mut v = direction;
        if self.invert_x {
            v.x = -v.x;
        }
        if self.invert_y {
            v.y = -v.y;
        }
        if self.swap_axes {
            v = Vec2::new(v.y, v.x);
        }
        v
    }

    fn orient(&self, sample: Vec2) -> Vec2 {
        let mut v = if self.swap_axes {
            Vec2::new(sample.y, sample.x)
        } else {
            sample
        };
        if self.invert_x {
            v.x = -v.x;
        }
        if self.invert_y {
            v.y = -v.y;
        }
        v
    }
}

/// Stateful tilt filter
#[derive(Clone, Debug, Default)]
pub struct TiltMapper {
    mapping: TiltMapping,
    filtered: Option<Vec2>,
}

impl TiltMapper {
    pub fn new(mapping: TiltMapping) -> Self {
        Self {
            mapping,
            filtered: None,
        }
    }

    pub fn mapping(&self) -> &TiltMapping {
        &self.mapping
    }

    /// Feed one sample and get the gravity to apply
    ///
    /// The first sample seeds the filter directly. Non-finite samples are
    /// dropped and the previous result is returned, or `None` before any
    /// valid sample.
    pub fn apply(&mut self, sample: Vec2) -> Option<Vec2> {
        if !sample.is_finite() {
            log::warn!("Ignoring non-finite tilt sample {:?}", sample);
            return self.gravity();
        }

        let k = self.mapping.filter_factor.clamp(f32::EPSILON, 1.0);
        let filtered = match self.filtered {
            Some(prev) => sample * k + prev * (1.0 - k),
            None => sample,
        };
        self.filtered = Some(filtered);
        self.gravity()
    }

    /// Gravity for the current filter state
    pub fn gravity(&self) -> Option<Vec2> {
        self.filtered.map(|f| self.mapping.to_gravity(f))
    }

    /// Forget the filter history
    pub fn reset(&mut self) {
        self.filtered = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: Vec2, b: Vec2) -> bool {
        (a - b).length() < 1e-4
    }

    #[test]
    fn test_landscape_mapping() {
        let mapping = TiltMapping::default();
        // Device x axis pointing down: gravity points down the screen
        assert!(approx(mapping.to_gravity(Vec2::new(-1.0, 0.0)), Vec2::new(0.0, -10.0)));
        assert!(approx(mapping.to_gravity(Vec2::new(0.0, 1.0)), Vec2::new(-10.0, 0.0)));
    }

    #[test]
    fn test_sample_for_inverts_orientation() {
        let mapping = TiltMapping {
            invert_y: true,
            ..Default::default()
        };
        for dir in [Vec2::X, Vec2::Y, Vec2::new(-0.6, 0.8)] {
            let sample = mapping.sample_for(dir);
            assert!(approx(mapping.to_gravity(sample), dir * 10.0));
        }
    }

    #[test]
    fn test_clamped_magnitude() {
        let mapping = TiltMapping::default();
        let g = mapping.to_gravity(Vec2::new(5.0, 5.0));
        assert!((g.length() - 20.0).abs() < 1e-3);
    }

    #[test]
    fn test_low_pass_filter() {
        let mut mapper = TiltMapper::new(TiltMapping::default());
        assert_eq!(mapper.gravity(), None);

        // First sample seeds the filter
        let g = mapper.apply(Vec2::new(-1.0, 0.0)).unwrap();
        assert!(approx(g, Vec2::new(0.0, -10.0)));

        // Then each sample moves it by 10%
        let g = mapper.apply(Vec2::new(0.0, 1.0)).unwrap();
        // filtered = (0, 1) * 0.1 + (-1, 0) * 0.9 = (-0.9, 0.1)
        assert!(approx(g, Vec2::new(-1.0, -9.0)));
    }

    #[test]
    fn test_non_finite_sample_ignored() {
        let mut mapper = TiltMapper::new(TiltMapping::default());
        assert_eq!(mapper.apply(Vec2::new(f32::NAN, 0.0)), None);
        mapper.apply(Vec2::new(-1.0, 0.0));
        let g = mapper.apply(Vec2::new(0.0, f32::INFINITY)).unwrap();
        assert!(approx(g, Vec2::new(0.0, -10.0)));

        mapper.reset();
        assert_eq!(mapper.gravity(), None);
    }
}
