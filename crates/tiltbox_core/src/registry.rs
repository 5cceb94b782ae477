//! Body ↔ sprite links
//!
//! The registry is the only place that knows which sprite shows which body.
//! Each frame [`BodySpriteRegistry::sync_all`] copies body transforms onto
//! their sprites and drops links whose body or sprite no longer exists.

use slotmap::SecondaryMap;
use tiltbox_physics::{BodyKey, PhysicsWorld};

use crate::error::LinkError;
use crate::sprite::{SpriteKey, SpriteScene};
use crate::Transform2D;

/// Outcome of one [`BodySpriteRegistry::sync_all`] pass
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SyncReport {
    /// Links visited with both ends alive
    pub synced: usize,
    /// Sprites whose transform actually changed
    pub updated: usize,
    /// Links removed because an end had disappeared
    pub pruned: Vec<(BodyKey, SpriteKey)>,
}

/// One-to-one mapping between physics bodies and sprites
#[derive(Default)]
pub struct BodySpriteRegistry {
    sprite_of: SecondaryMap<BodyKey, SpriteKey>,
    body_of: SecondaryMap<SpriteKey, BodyKey>,
}

impl BodySpriteRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Link a body to a sprite
    ///
    /// Fails without changing anything if either end is already linked.
    pub fn link(&mut self, body: BodyKey, sprite: SpriteKey) -> Result<(), LinkError> {
        if self.sprite_of.contains_key(body) || self.body_of.contains_key(sprite) {
            return Err(LinkError::DuplicateLink { body, sprite });
        }
        self.sprite_of.insert(body, sprite);
        self.body_of.insert(sprite, body);
        log::debug!("Linked body {:?} to sprite {:?}", body, sprite);
        Ok(())
    }

    /// Remove the link for a body, returning its sprite
    pub fn unlink(&mut self, body: BodyKey) -> Option<SpriteKey> {
        let sprite = self.sprite_of.remove(body)?;
        self.body_of.remove(sprite);
        Some(sprite)
    }

    /// Remove the link for a sprite, returning its body
    pub fn unlink_sprite(&mut self, sprite: SpriteKey) -> Option<BodyKey> {
        let body = self.body_of.remove(sprite)?;
        self.sprite_of.remove(body);
        Some(body)
    }

    pub fn sprite_for(&self, body: BodyKey) -> Option<SpriteKey> {
        self.sprite_of.get(body).copied()
    }

    pub fn body_for(&self, sprite: SpriteKey) -> Option<BodyKey> {
        self.body_of.get(sprite).copied()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.sprite_of.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.sprite_of.is_empty()
    }

    /// Iterate over all `(body, sprite)` links
    pub fn iter(&self) -> impl Iterator<Item = (BodyKey, SpriteKey)> + '_ {
        self.sprite_of.iter().map(|(body, sprite)| (body, *sprite))
    }

    pub fn clear(&mut self) {
        self.sprite_of.clear();
        self.body_of.clear();
    }

    /// Copy every linked body's position and angle onto its sprite
    ///
    /// Scale is left alone. Links with a missing end are pruned and the
    /// surviving end is not touched.
    pub fn sync_all(&mut self, world: &PhysicsWorld, scene: &mut SpriteScene) -> SyncReport {
        let mut report = SyncReport::default();

        for (body_key, &sprite_key) in self.sprite_of.iter() {
            let Some(body) = world.get_body(body_key) else {
                report.pruned.push((body_key, sprite_key));
                continue;
            };
            let Some(sprite) = scene.get_mut(sprite_key) else {
                report.pruned.push((body_key, sprite_key));
                continue;
            };

            let transform = Transform2D {
                position: body.position,
                rotation: body.angle,
                scale: sprite.transform().scale,
            };
            if sprite.set_transform(transform) {
                report.updated += 1;
            }
            report.synced += 1;
        }

        for &(body, sprite) in &report.pruned {
            self.sprite_of.remove(body);
            self.body_of.remove(sprite);
            log::debug!("Pruned stale link body {:?} / sprite {:?}", body, sprite);
        }

        report
    }
}
