//! Renderable sprites - bridges SpriteScene to GPU buffers
//!
//! Sprites are expanded into two triangles each and grouped into draw
//! calls that share a texture. Draw order follows `z_order`.

use tiltbox_core::{Sprite, SpriteScene, TextureHandle};

use crate::pipeline::SpriteVertex;

/// Vertices emitted per sprite
pub const VERTICES_PER_SPRITE: u32 = 6;

/// A contiguous run of vertices sampled from one texture
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SpriteDraw {
    pub texture: TextureHandle,
    pub first_vertex: u32,
    pub vertex_count: u32,
}

/// GPU-ready sprite geometry for one frame
#[derive(Clone, Debug, Default)]
pub struct SpriteBatch {
    pub vertices: Vec<SpriteVertex>,
    pub draws: Vec<SpriteDraw>,
}

impl SpriteBatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Collect every sprite in the scene
    pub fn build(scene: &SpriteScene) -> Self {
        let mut batch = Self {
            vertices: Vec::with_capacity(scene.len() * VERTICES_PER_SPRITE as usize),
            draws: Vec::new(),
        };
        batch.rebuild(scene);
        batch
    }

    /// Refill from the scene, reusing allocations
    pub fn rebuild(&mut self, scene: &SpriteScene) {
        self.vertices.clear();
        self.draws.clear();

        let mut sprites: Vec<&Sprite> = scene.iter().map(|(_, sprite)| sprite).collect();
        // Stable, so equal keys keep scene order
        sprites.sort_by_key(|sprite| (sprite.z_order(), sprite.texture()));

        for sprite in sprites {
            let first_vertex = self.vertices.len() as u32;
            push_quad(&mut self.vertices, sprite);

            match self.draws.last_mut() {
                Some(last) if last.texture == sprite.texture() => {
                    last.vertex_count += VERTICES_PER_SPRITE;
                }
                _ => self.draws.push(SpriteDraw {
                    texture: sprite.texture(),
                    first_vertex,
                    vertex_count: VERTICES_PER_SPRITE,
                }),
            }
        }
    }

    /// Rebuild only if the scene changed since its dirty flags were cleared
    ///
    /// Returns true when the vertices need uploading again.
    pub fn refresh(&mut self, scene: &SpriteScene) -> bool {
        if !scene.has_dirty() {
            return false;
        }
        self.rebuild(scene);
        true
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn sprite_count(&self) -> usize {
        self.vertices.len() / VERTICES_PER_SPRITE as usize
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }
}

fn push_quad(out: &mut Vec<SpriteVertex>, sprite: &Sprite) {
    let [bl, br, tr, tl] = sprite.corners();
    let r = sprite.region();
    let color = sprite.tint();
    // Image rows run top to bottom, world y runs up
    let vertex = |p: tiltbox_math::Vec2, u: f32, v: f32| SpriteVertex {
        position: p.to_array(),
        uv: [u, v],
        color,
    };
    out.extend_from_slice(&[
        vertex(bl, r.u0, r.v1),
        vertex(br, r.u1, r.v1),
        vertex(tr, r.u1, r.v0),
        vertex(bl, r.u0, r.v1),
        vertex(tr, r.u1, r.v0),
        vertex(tl, r.u0, r.v0),
    ]);
}

#[cfg(test)]
mod tests {
    use super::*;
    use slotmap::SlotMap;
    use tiltbox_core::{TextureRegion, Transform2D};
    use tiltbox_math::Vec2;

    fn handles(n: usize) -> Vec<TextureHandle> {
        let mut map: SlotMap<TextureHandle, ()> = SlotMap::with_key();
        (0..n).map(|_| map.insert(())).collect()
    }

    #[test]
    fn test_empty_scene() {
        let batch = SpriteBatch::build(&SpriteScene::new());
        assert!(batch.is_empty());
        assert!(batch.draws.is_empty());
    }

    #[test]
    fn test_quad_uvs_and_positions() {
        let tex = handles(1)[0];
        let mut scene = SpriteScene::new();
        scene.add(
            Sprite::new(tex, Vec2::new(2.0, 1.0))
                .with_transform(Transform2D::from_position(Vec2::new(5.0, 5.0)))
                .with_region(TextureRegion::grid_cell(2, 2, 1, 0)),
        );

        let batch = SpriteBatch::build(&scene);
        assert_eq!(batch.sprite_count(), 1);
        let bl = batch.vertices[0];
        assert_eq!(bl.position, [4.0, 4.5]);
        assert_eq!(bl.uv, [0.5, 0.5]);
        let tr = batch.vertices[2];
        assert_eq!(tr.position, [6.0, 5.5]);
        assert_eq!(tr.uv, [1.0, 0.0]);
    }

    #[test]
    fn test_draws_merge_by_texture() {
        let tex = handles(2);
        let mut scene = SpriteScene::new();
        scene.add(Sprite::new(tex[0], Vec2::ONE));
        scene.add(Sprite::new(tex[1], Vec2::ONE));
        scene.add(Sprite::new(tex[0], Vec2::ONE));

        let batch = SpriteBatch::build(&scene);
        assert_eq!(batch.draws.len(), 2);
        assert_eq!(batch.draws[0].texture, tex[0]);
        assert_eq!(batch.draws[0].vertex_count, 12);
        assert_eq!(batch.draws[1].first_vertex, 12);
    }

    #[test]
    fn test_z_order_sorts_draws() {
        let tex = handles(2);
        let mut scene = SpriteScene::new();
        scene.add(Sprite::new(tex[0], Vec2::ONE).with_z_order(5));
        scene.add(Sprite::new(tex[1], Vec2::ONE).with_z_order(-1));

        let batch = SpriteBatch::build(&scene);
        assert_eq!(batch.draws[0].texture, tex[1]);
        assert_eq!(batch.draws[1].texture, tex[0]);
    }

    #[test]
    fn test_rebuild_reuses_batch() {
        let tex = handles(1)[0];
        let mut scene = SpriteScene::new();
        let key = scene.add(Sprite::new(tex, Vec2::ONE));
        let mut batch = SpriteBatch::build(&scene);

        scene.remove(key);
        batch.rebuild(&scene);
        assert!(batch.is_empty());
    }

    #[test]
    fn test_refresh_skips_clean_scene() {
        let tex = handles(1)[0];
        let mut scene = SpriteScene::new();
        let key = scene.add(Sprite::new(tex, Vec2::ONE));
        let mut batch = SpriteBatch::new();

        assert!(batch.refresh(&scene));
        assert_eq!(batch.sprite_count(), 1);
        scene.clear_all_dirty();
        assert!(!batch.refresh(&scene));

        // Moving a sprite rebuilds
        scene
            .get_mut(key)
            .unwrap()
            .set_transform(Transform2D::from_position(Vec2::new(3.0, 0.0)));
        assert!(batch.refresh(&scene));
        assert_eq!(batch.vertices[0].position, [2.5, -0.5]);
        scene.clear_all_dirty();

        // So does removing one
        scene.remove(key);
        assert!(batch.refresh(&scene));
        assert!(batch.is_empty());
    }
}
