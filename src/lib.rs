//! Tiltbox - tilt-driven 2D physics sandbox
//!
//! Touches spawn textured boxes, device tilt steers gravity, and every
//! sprite follows its rigid body frame by frame.

pub mod config;
pub mod controller;
pub mod input;
pub mod scene;
pub mod systems;

pub use config::AppConfig;
pub use controller::{ControllerError, ControllerState, FrameReport, InteractionController, SpawnedSprite};
