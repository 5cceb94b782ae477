//! Core types for Tiltbox
//!
//! This crate connects the physics world to what is drawn on screen:
//!
//! - [`Transform2D`] - Position, rotation, and scale of a sprite
//! - [`Sprite`] / [`SpriteScene`] - Textured quads keyed by [`SpriteKey`]
//! - [`BodySpriteRegistry`] - One-to-one links from bodies to sprites, synced every frame
//! - [`TextureCache`] - Lazily loaded textures with a built-in default
//! - [`AssetError`] / [`LinkError`] - Error types

mod asset_error;
mod error;
mod registry;
mod sprite;
mod texture;
mod texture_cache;
mod transform;

pub use asset_error::AssetError;
pub use error::LinkError;
pub use registry::{BodySpriteRegistry, SyncReport};
pub use sprite::{DirtyFlags, Sprite, SpriteKey, SpriteScene};
pub use texture::{SharedTexture, Texture, TextureHandle, TextureKey, TextureRegion};
pub use texture_cache::{FileTextureLoader, TextureCache, TextureLoader};
pub use transform::Transform2D;

// Re-export commonly used types from tiltbox_math for convenience
pub use tiltbox_math::{Isometry2, Vec2};

// Re-export physics types for convenient access through tiltbox_core
pub use tiltbox_physics::{BodyDef, BodyKey, PhysicsWorld, RigidBody2D, WorldConfig};
