//! Tilt input for Tiltbox
//!
//! Turns device tilt samples into world gravity, and lets the arrow keys
//! stand in for a tilt sensor on desktop.

mod keyboard_tilt;
mod tilt;

pub use keyboard_tilt::KeyboardTilt;
pub use tilt::{TiltMapper, TiltMapping};
