//! Physics error types

use crate::body::BodyKey;

/// Errors reported by the physics world
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PhysicsError {
    /// World configuration rejected at construction
    #[error("invalid world configuration: {0}")]
    InvalidConfig(String),
    /// The body key no longer refers to a live body
    #[error("body handle {0:?} is no longer valid")]
    InvalidHandle(BodyKey),
    /// Step size must be finite and positive
    #[error("invalid time step: {0}")]
    InvalidTimeStep(f32),
    /// Shape construction failed (degenerate or non-convex polygon)
    #[error("invalid shape: {0}")]
    InvalidShape(String),
    /// A body ended the step with NaN or infinite state
    #[error("simulation diverged: body {body:?} has a non-finite state")]
    SimulationInstability { body: BodyKey },
}
