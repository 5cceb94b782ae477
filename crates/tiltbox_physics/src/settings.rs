//! Global tuning constants for the solver
//!
//! Units are metres, kilograms and seconds. The engine is tuned for moving
//! objects between 0.1 and 10 metres in size.

use std::f32::consts::PI;

/// Collision and constraint tolerance
pub const LINEAR_SLOP: f32 = 0.005;

/// Skin radius around polygons, keeps resting contacts stable
pub const POLYGON_RADIUS: f32 = 2.0 * LINEAR_SLOP;

/// Maximum number of vertices on a convex polygon
pub const MAX_POLYGON_VERTICES: usize = 8;

/// Maximum number of contact points between two convex shapes
pub const MAX_MANIFOLD_POINTS: usize = 2;

/// Fraction of overlap resolved per position iteration
pub const BAUMGARTE: f32 = 0.2;

/// Largest position correction applied to a single contact in one iteration
pub const MAX_LINEAR_CORRECTION: f32 = 0.2;

/// Relative normal speed below which collisions are inelastic
pub const VELOCITY_THRESHOLD: f32 = 1.0;

/// Largest distance a body may travel in one step
pub const MAX_TRANSLATION: f32 = 2.0;

/// Largest angle a body may turn in one step
pub const MAX_ROTATION: f32 = 0.5 * PI;
