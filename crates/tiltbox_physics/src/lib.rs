//! 2D Physics simulation for Tiltbox
//!
//! This crate provides a small rigid body engine, including:
//! - Collision shapes (circles, convex polygons)
//! - Contact manifolds (circle/circle, polygon/circle, polygon/polygon)
//! - A sequential impulse solver with velocity and position iterations
//! - Read-only geometry snapshots for debug drawing

pub mod body;
pub mod collision;
pub mod error;
pub mod material;
pub mod settings;
pub mod shapes;
pub mod snapshot;
mod solver;
pub mod world;

// Re-export commonly used types
pub use body::{BodyDef, BodyKey, BodyType, RigidBody2D};
pub use collision::{collide_shapes, ContactFeature, Manifold, ManifoldKind, ManifoldPoint, WorldManifold};
pub use error::PhysicsError;
pub use material::{ContactMaterial, MaterialPreset, PhysicsMaterial};
pub use shapes::{Circle, MassData, Polygon, Shape};
pub use snapshot::{BodyGeometry, ContactPoint, ShapeOutline, WorldSnapshot};
pub use world::{PhysicsWorld, WorldConfig};
