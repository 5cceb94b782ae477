//! 2D Rendering Library
//!
//! This crate provides the wgpu-based rendering for sprites and the physics
//! debug overlay.
//!
//! ## Key Components
//!
//! - [`context::RenderContext`] - WGPU device, queue, and surface management
//! - [`camera2d::Camera2D`] - Orthographic camera in world metres
//! - [`renderable::SpriteBatch`] - Converts a SpriteScene to GPU vertices
//! - [`debug_overlay::DebugOverlay`] - Draws physics geometry through [`DebugDraw`]
//! - [`debug_lines::DebugLines`] - [`DebugDraw`] backend producing line lists
//! - [`pipeline::SpritePipeline`] / [`pipeline::LinePipeline`] - GPU pipelines

pub mod camera2d;
pub mod context;
pub mod debug_lines;
pub mod debug_overlay;
pub mod pipeline;
pub mod renderable;

pub use camera2d::Camera2D;
pub use debug_lines::DebugLines;
pub use debug_overlay::{body_color, Color, DebugDraw, DebugDrawFlags, DebugOverlay};
pub use renderable::{SpriteBatch, SpriteDraw};
