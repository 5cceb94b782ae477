//! Sprites and the sprite scene graph
//!
//! The scene only stores placement and appearance. It knows nothing about
//! physics; [`BodySpriteRegistry`](crate::BodySpriteRegistry) mirrors body
//! transforms onto it.

use bitflags::bitflags;
use slotmap::{new_key_type, SlotMap};
use tiltbox_math::Vec2;

use crate::texture::{TextureHandle, TextureRegion};
use crate::Transform2D;

new_key_type! {
    /// Key to a sprite in a [`SpriteScene`]
    pub struct SpriteKey;
}

bitflags! {
    /// Flags indicating which parts of a sprite changed since the last draw
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub struct DirtyFlags: u8 {
        /// No changes
        const NONE = 0;
        /// Transform (position, rotation, scale) has changed
        const TRANSFORM = 1 << 0;
        /// Texture or region has changed
        const TEXTURE = 1 << 1;
        /// Tint or size has changed
        const APPEARANCE = 1 << 2;
        /// All flags set
        const ALL = Self::TRANSFORM.bits() | Self::TEXTURE.bits() | Self::APPEARANCE.bits();
    }
}

/// A textured quad in the world
#[derive(Clone, Debug)]
pub struct Sprite {
    transform: Transform2D,
    /// Width and height in world units, before scale
    size: Vec2,
    texture: TextureHandle,
    region: TextureRegion,
    /// RGBA multiplier
    tint: [f32; 4],
    /// Higher values draw on top
    z_order: i32,
    dirty: DirtyFlags,
}

impl Sprite {
    pub fn new(texture: TextureHandle, size: Vec2) -> Self {
        Self {
            transform: Transform2D::identity(),
            size,
            texture,
            region: TextureRegion::FULL,
            tint: [1.0; 4],
            z_order: 0,
            // New sprites are dirty
            dirty: DirtyFlags::ALL,
        }
    }

    pub fn with_transform(mut self, transform: Transform2D) -> Self {
        self.transform = transform;
        self
    }

    pub fn with_region(mut self, region: TextureRegion) -> Self {
        self.region = region;
        self
    }

    pub fn with_tint(mut self, tint: [f32; 4]) -> Self {
        self.tint = tint;
        self
    }

    pub fn with_z_order(mut self, z_order: i32) -> Self {
        self.z_order = z_order;
        self
    }

    pub fn transform(&self) -> &Transform2D {
        &self.transform
    }

    /// Replace the transform
    ///
    /// Returns true if the value changed. An identical transform leaves the
    /// sprite clean.
    pub fn set_transform(&mut self, transform: Transform2D) -> bool {
        if self.transform == transform {
            return false;
        }
        self.transform = transform;
        self.dirty |= DirtyFlags::TRANSFORM;
        true
    }

    pub fn size(&self) -> Vec2 {
        self.size
    }

    pub fn set_size(&mut self, size: Vec2) {
        if self.size != size {
            self.size = size;
            self.dirty |= DirtyFlags::APPEARANCE;
        }
    }

    pub fn texture(&self) -> TextureHandle {
        self.texture
    }

    pub fn region(&self) -> TextureRegion {
        self.region
    }

    pub fn set_texture(&mut self, texture: TextureHandle, region: TextureRegion) {
        if self.texture != texture || self.region != region {
            self.texture = texture;
            self.region = region;
            self.dirty |= DirtyFlags::TEXTURE;
        }
    }

    pub fn z_order(&self) -> i32 {
        self.z_order
    }

    pub fn set_z_order(&mut self, z_order: i32) {
        if self.z_order != z_order {
            self.z_order = z_order;
            self.dirty |= DirtyFlags::APPEARANCE;
        }
    }

    pub fn tint(&self) -> [f32; 4] {
        self.tint
    }

    pub fn set_tint(&mut self, tint: [f32; 4]) {
        if self.tint != tint {
            self.tint = tint;
            self.dirty |= DirtyFlags::APPEARANCE;
        }
    }

    #[inline]
    pub fn dirty_flags(&self) -> DirtyFlags {
        self.dirty
    }

    #[inline]
    pub fn is_dirty(&self) -> bool {
        !self.dirty.is_empty()
    }

    #[inline]
    pub fn clear_dirty(&mut self) {
        self.dirty = DirtyFlags::NONE;
    }

    /// The four corners in world space, counter-clockwise from bottom-left
    pub fn corners(&self) -> [Vec2; 4] {
        let h = self.size * 0.5;
        [
            Vec2::new(-h.x, -h.y),
            Vec2::new(h.x, -h.y),
            Vec2::new(h.x, h.y),
            Vec2::new(-h.x, h.y),
        ]
        .map(|c| self.transform.transform_point(c))
    }
}

/// Flat container of sprites
pub struct SpriteScene {
    sprites: SlotMap<SpriteKey, Sprite>,
    /// A sprite was removed, or the scene is new
    removed: bool,
}

impl Default for SpriteScene {
    fn default() -> Self {
        Self {
            sprites: SlotMap::with_key(),
            // A fresh scene replaces whatever was drawn before
            removed: true,
        }
    }
}

impl SpriteScene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a sprite, returning its key
    pub fn add(&mut self, sprite: Sprite) -> SpriteKey {
        self.sprites.insert(sprite)
    }

    /// Remove a sprite and return it
    pub fn remove(&mut self, key: SpriteKey) -> Option<Sprite> {
        let sprite = self.sprites.remove(key);
        self.removed |= sprite.is_some();
        sprite
    }

    pub fn get(&self, key: SpriteKey) -> Option<&Sprite> {
        self.sprites.get(key)
    }

    pub fn get_mut(&mut self, key: SpriteKey) -> Option<&mut Sprite> {
        self.sprites.get_mut(key)
    }

    pub fn contains(&self, key: SpriteKey) -> bool {
        self.sprites.contains_key(key)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.sprites.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.sprites.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (SpriteKey, &Sprite)> + '_ {
        self.sprites.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = SpriteKey> + '_ {
        self.sprites.keys()
    }

    /// True if any sprite was added, changed or removed since the last
    /// [`clear_all_dirty`](Self::clear_all_dirty)
    pub fn has_dirty(&self) -> bool {
        self.removed || self.sprites.values().any(Sprite::is_dirty)
    }

    pub fn clear_all_dirty(&mut self) {
        self.removed = false;
        for sprite in self.sprites.values_mut() {
            sprite.clear_dirty();
        }
    }

    pub fn clear(&mut self) {
        self.removed |= !self.sprites.is_empty();
        self.sprites.clear();
    }
}
