//! Integration tests for the interaction controller
//!
//! These drive the controller the way the app does and check that:
//! 1. Every spawn creates exactly one link, with the sprite on its body
//! 2. Sprites follow their bodies after each frame
//! 3. Despawned sprites are never touched again
//! 4. Gravity from tilt only affects later steps
//! 5. Identical input gives identical results
//! 6. A wider window widens the arena

use tiltbox::config::AppConfig;
use tiltbox::{ControllerError, InteractionController};
use tiltbox_core::{AssetError, Texture, TextureCache, TextureKey, TextureLoader};
use tiltbox_math::Vec2;

const DT: f32 = 1.0 / 60.0;

/// Serves a 64x64 atlas for every key
struct Atlas;

impl TextureLoader for Atlas {
    fn load(&self, _key: &TextureKey) -> Result<Texture, AssetError> {
        Ok(Texture::solid(64, 64, [200, 120, 80, 255]))
    }
}

fn controller() -> InteractionController {
    let mut config = AppConfig::default();
    config.spawn.seed = Some(42);
    let mut controller = InteractionController::new(&config, TextureCache::new(Atlas));
    controller.initialize(Vec2::new(32.0, 24.0)).unwrap();
    controller
}

fn assert_in_sync(controller: &InteractionController) {
    let world = controller.world().unwrap();
    let scene = controller.sprites().unwrap();
    for (body, sprite) in controller.registry().unwrap().iter() {
        let body = world.get_body(body).unwrap();
        let sprite = scene.get(sprite).unwrap();
        assert_eq!(sprite.transform().position, body.position);
        assert_eq!(sprite.transform().rotation, body.angle);
    }
}

#[test]
fn test_spawn_creates_one_link_in_sync() {
    let mut c = controller();
    let spawned = c.add_new_sprite(Vec2::new(10.0, 10.0)).unwrap();

    assert!(!spawned.used_fallback);
    assert_eq!(c.registry().unwrap().len(), 1);
    assert_eq!(c.registry().unwrap().sprite_for(spawned.body), Some(spawned.sprite));

    let sprite = c.sprites().unwrap().get(spawned.sprite).unwrap();
    assert_eq!(sprite.transform().position, Vec2::new(10.0, 10.0));
    assert_eq!(sprite.size(), Vec2::ONE);
    assert_in_sync(&c);
}

#[test]
fn test_atlas_cell_is_a_quarter() {
    let mut c = controller();
    let spawned = c.add_new_sprite(Vec2::new(10.0, 10.0)).unwrap();
    let region = c.sprites().unwrap().get(spawned.sprite).unwrap().region();
    assert!((region.u1 - region.u0 - 0.5).abs() < 1e-6);
    assert!((region.v1 - region.v0 - 0.5).abs() < 1e-6);
}

#[test]
fn test_sprites_follow_bodies_every_frame() {
    let mut c = controller();
    let spawned = c.add_new_sprite(Vec2::new(10.0, 20.0)).unwrap();

    for _ in 0..30 {
        let report = c.on_frame_tick(DT).unwrap();
        assert_eq!(report.synced, 1);
        assert_in_sync(&c);
    }
    let y = c.world().unwrap().get_body(spawned.body).unwrap().position.y;
    assert!(y < 20.0);
}

#[test]
fn test_tick_without_step_changes_nothing() {
    let mut c = controller();
    c.add_new_sprite(Vec2::new(10.0, 20.0)).unwrap();
    c.on_frame_tick(DT).unwrap();

    // Too short for a step: sync runs but nothing moves
    let report = c.on_frame_tick(DT * 0.25).unwrap();
    assert_eq!(report.steps, 0);
    assert_eq!(report.synced, 1);
    assert_eq!(report.updated, 0);
}

#[test]
fn test_despawn_removes_link_and_sprite() {
    let mut c = controller();
    let a = c.add_new_sprite(Vec2::new(8.0, 10.0)).unwrap();
    let b = c.add_new_sprite(Vec2::new(16.0, 10.0)).unwrap();

    assert_eq!(c.despawn(a.body).unwrap(), Some(a.sprite));
    assert!(!c.sprites().unwrap().contains(a.sprite));
    assert_eq!(c.registry().unwrap().len(), 1);

    // Second despawn of the same body is a handle error
    assert!(matches!(c.despawn(a.body), Err(ControllerError::Physics(_))));

    // The survivor keeps syncing
    for _ in 0..10 {
        let report = c.on_frame_tick(DT).unwrap();
        assert_eq!(report.synced, 1);
        assert_eq!(report.pruned, 0);
    }
    assert_in_sync(&c);
    assert!(c.world().unwrap().contains(b.body));
}

#[test]
fn test_despawn_by_sprite() {
    let mut c = controller();
    let spawned = c.add_new_sprite(Vec2::new(8.0, 10.0)).unwrap();
    assert_eq!(c.despawn_sprite(spawned.sprite).unwrap(), Some(spawned.body));
    assert!(!c.world().unwrap().contains(spawned.body));
    assert!(c.registry().unwrap().is_empty());
}

#[test]
fn test_gravity_change_affects_later_steps() {
    let mut c = controller();
    let spawned = c.add_new_sprite(Vec2::new(16.0, 12.0)).unwrap();

    c.on_frame_tick(DT).unwrap();
    let v0 = c.world().unwrap().get_body(spawned.body).unwrap().linear_velocity;
    assert!(v0.x.abs() < 1e-6);

    // Tilt right: device y = 1 maps to +x gravity
    let g = c.on_tilt(Vec2::new(0.0, -1.0)).unwrap();
    assert!(g.x > 0.0);

    c.on_frame_tick(DT).unwrap();
    let v1 = c.world().unwrap().get_body(spawned.body).unwrap().linear_velocity;
    assert!(v1.x > 0.0);
}

#[test]
fn test_identical_runs_are_bit_identical() {
    let run = || {
        let mut c = controller();
        c.add_new_sprite(Vec2::new(10.0, 10.0)).unwrap();
        c.add_new_sprite(Vec2::new(10.4, 12.0)).unwrap();
        c.on_tilt(Vec2::new(-0.8, 0.3)).unwrap();
        for _ in 0..120 {
            c.on_frame_tick(DT).unwrap();
        }
        c.world()
            .unwrap()
            .iter()
            .map(|(_, b)| (b.position.x.to_bits(), b.position.y.to_bits(), b.angle.to_bits()))
            .collect::<Vec<_>>()
    };
    assert_eq!(run(), run());
}

#[test]
fn test_spawned_box_settles_on_ground() {
    let mut c = controller();
    let spawned = c.add_new_sprite(Vec2::new(16.0, 3.0)).unwrap();
    for _ in 0..180 {
        c.on_frame_tick(DT).unwrap();
    }
    let body = c.world().unwrap().get_body(spawned.body).unwrap();
    assert!((body.position.y - 0.5).abs() < 0.05, "y = {}", body.position.y);
    assert!(body.linear_velocity.length() < 0.1);
}

#[test]
fn test_spawn_in_widened_window_survives() {
    // 1024x768 at 32 px/m, then the window grows to 1920 px wide
    let mut c = controller();
    c.resize_arena(Vec2::new(60.0, 24.0)).unwrap();

    let spawned = c.add_new_sprite(Vec2::new(50.0, 20.0)).unwrap();
    let report = c.on_frame_tick(DT).unwrap();
    assert_eq!(report.despawned, 0);
    assert!(c.world().unwrap().contains(spawned.body));
    assert_in_sync(&c);

    // The new ground catches it
    for _ in 0..300 {
        c.on_frame_tick(DT).unwrap();
    }
    let body = c.world().unwrap().get_body(spawned.body).unwrap();
    assert!((body.position.y - 0.5).abs() < 0.1, "y = {}", body.position.y);
}
