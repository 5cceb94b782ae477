//! Rendering pipeline components
//!
//! A textured sprite pipeline and a line pipeline for the debug overlay.
//! Both share the same camera uniform layout.

pub mod types;
pub mod sprite_pipeline;
pub mod line_pipeline;

pub use types::{CameraUniforms, LineVertex, SpriteVertex};

pub use sprite_pipeline::SpritePipeline;
pub use line_pipeline::LinePipeline;
