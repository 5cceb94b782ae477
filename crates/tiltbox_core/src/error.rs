//! Errors from the body/sprite bridge

use tiltbox_physics::BodyKey;

use crate::SpriteKey;

/// Error returned when linking a body to a sprite
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LinkError {
    /// Either end already takes part in a link
    #[error("body {body:?} or sprite {sprite:?} is already linked")]
    DuplicateLink { body: BodyKey, sprite: SpriteKey },
}
