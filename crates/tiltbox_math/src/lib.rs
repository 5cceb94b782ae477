//! 2D Mathematics Library
//!
//! This crate provides the small set of 2D types shared by the physics,
//! sprite and rendering crates.
//!
//! ## Core Types
//!
//! - [`Vec2`] - 2D vector with x, y components
//! - [`Rot2`] - Rotation stored as sine/cosine
//! - [`Isometry2`] - Rigid transform (rotation followed by translation)
//! - [`Aabb2`] - Axis-aligned bounding box

mod vec2;
mod rot2;
mod isometry;
mod aabb;

pub use vec2::Vec2;
pub use rot2::Rot2;
pub use isometry::Isometry2;
pub use aabb::Aabb2;
