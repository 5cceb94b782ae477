//! Interaction controller
//!
//! Owns the physics world, the sprite scene and the links between them, and
//! turns touches, tilt samples and frame ticks into operations on them.
//!
//! Lifecycle: `Uninitialized` → `Running` (`initialize`) → `TornDown`
//! (`teardown`). Every operation except `initialize` needs `Running`.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use thiserror::Error;

use tiltbox_core::{
    AssetError, BodySpriteRegistry, LinkError, Sprite, SpriteKey, SpriteScene, SyncReport, TextureCache,
    TextureHandle, TextureKey, TextureRegion, Transform2D,
};
use tiltbox_input::TiltMapper;
use tiltbox_math::{Aabb2, Vec2};
use tiltbox_physics::{BodyDef, BodyKey, PhysicsError, PhysicsWorld, WorldConfig};
use tiltbox_render::{DebugLines, DebugOverlay};

use crate::config::{AppConfig, ArenaConfig, FrameConfig, SpawnConfig};
use crate::scene::ArenaBuilder;

/// Controller errors
#[derive(Debug, Error)]
pub enum ControllerError {
    #[error("controller is not running")]
    NotRunning,
    #[error("controller was already initialized")]
    AlreadyInitialized,
    #[error("spawn point {0:?} is not finite")]
    InvalidPoint(Vec2),
    #[error("arena size {0:?} must be finite and positive")]
    InvalidArenaSize(Vec2),
    #[error(transparent)]
    Physics(#[from] PhysicsError),
    #[error(transparent)]
    Link(#[from] LinkError),
    #[error(transparent)]
    Asset(#[from] AssetError),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ControllerState {
    Uninitialized,
    Running,
    TornDown,
}

/// What `add_new_sprite` created
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SpawnedSprite {
    pub body: BodyKey,
    pub sprite: SpriteKey,
    pub texture: TextureHandle,
    /// The spawn texture was missing and the built-in one was used
    pub used_fallback: bool,
}

/// Summary of one `on_frame_tick`
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FrameReport {
    /// Fixed steps taken
    pub steps: u32,
    /// Links synced
    pub synced: usize,
    /// Sprites whose transform changed
    pub updated: usize,
    /// Stale links removed during sync
    pub pruned: usize,
    /// Bodies culled outside the arena
    pub despawned: usize,
    /// The world diverged and was rebuilt
    pub reset: bool,
    /// Simulation time not yet stepped, in seconds
    pub leftover: f32,
}

/// Everything that lives between `initialize` and `teardown`
struct Session {
    world: PhysicsWorld,
    scene: SpriteScene,
    registry: BodySpriteRegistry,
    boundary: Vec<BodyKey>,
    accumulator: f32,
}

/// Top-level orchestration of the sandbox
pub struct InteractionController {
    world_config: WorldConfig,
    frame: FrameConfig,
    arena: ArenaConfig,
    spawn: SpawnConfig,
    spawn_texture: TextureKey,
    textures: TextureCache,
    tilt: TiltMapper,
    overlay: DebugOverlay,
    debug_lines: DebugLines,
    rng: StdRng,
    arena_size: Vec2,
    state: ControllerState,
    session: Option<Session>,
}

impl InteractionController {
    /// Create an uninitialized controller
    pub fn new(config: &AppConfig, textures: TextureCache) -> Self {
        let rng = match config.spawn.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        Self {
            world_config: config.physics.to_world_config(),
            frame: config.frame.clone(),
            arena: config.arena.clone(),
            spawn: config.spawn.clone(),
            spawn_texture: TextureKey::new(config.spawn.texture.clone()),
            textures,
            tilt: TiltMapper::new(config.tilt.clone()),
            overlay: DebugOverlay::new(config.debug.show_overlay, config.debug.to_debug_flags()),
            debug_lines: DebugLines::new(),
            rng,
            arena_size: Vec2::ZERO,
            state: ControllerState::Uninitialized,
            session: None,
        }
    }

    /// Create the world and the arena covering `[0, size.x] x [0, size.y]`
    pub fn initialize(&mut self, arena_size: Vec2) -> Result<(), ControllerError> {
        if self.state != ControllerState::Uninitialized {
            return Err(ControllerError::AlreadyInitialized);
        }
        validate_arena_size(arena_size)?;
        self.arena_size = arena_size;
        self.session = Some(self.new_session()?);
        self.state = ControllerState::Running;
        log::info!(
            "Controller initialized: arena {:.1}x{:.1} m, gravity {:?}",
            arena_size.x,
            arena_size.y,
            self.world_config.gravity
        );
        Ok(())
    }

    fn new_session(&self) -> Result<Session, ControllerError> {
        let mut world = PhysicsWorld::new(self.world_config.clone())?;
        if let Some(gravity) = self.tilt.gravity() {
            world.set_gravity(gravity);
        }

        let boundary = self.build_boundary(&mut world);

        Ok(Session {
            world,
            scene: SpriteScene::new(),
            registry: BodySpriteRegistry::new(),
            boundary,
            accumulator: 0.0,
        })
    }

    fn build_boundary(&self, world: &mut PhysicsWorld) -> Vec<BodyKey> {
        if !self.arena.boundary {
            return Vec::new();
        }
        ArenaBuilder::new(self.arena_size)
            .with_wall_thickness(self.arena.wall_thickness)
            .build(world)
    }

    /// Move the walls and cull bounds to a new visible area
    ///
    /// Spawned bodies are kept. Anything left outside the new bounds is
    /// culled on the next tick.
    pub fn resize_arena(&mut self, arena_size: Vec2) -> Result<(), ControllerError> {
        if self.state != ControllerState::Running {
            return Err(ControllerError::NotRunning);
        }
        validate_arena_size(arena_size)?;
        if arena_size == self.arena_size {
            return Ok(());
        }
        self.arena_size = arena_size;

        let Some(mut session) = self.session.take() else {
            return Err(ControllerError::NotRunning);
        };
        for wall in session.boundary.drain(..) {
            // Walls have no sprite, so there is no link to drop
            if let Err(e) = session.world.remove_body(wall) {
                log::warn!("Arena wall {:?} already gone: {}", wall, e);
            }
        }
        session.boundary = self.build_boundary(&mut session.world);
        self.session = Some(session);

        log::info!("Arena resized to {:.1}x{:.1} m", arena_size.x, arena_size.y);
        Ok(())
    }

    fn session_mut(&mut self) -> Result<&mut Session, ControllerError> {
        match (self.state, self.session.as_mut()) {
            (ControllerState::Running, Some(session)) => Ok(session),
            _ => Err(ControllerError::NotRunning),
        }
    }

    /// Spawn a dynamic body with a linked sprite at a world point
    pub fn add_new_sprite(&mut self, point: Vec2) -> Result<SpawnedSprite, ControllerError> {
        if self.state != ControllerState::Running {
            return Err(ControllerError::NotRunning);
        }
        if !point.is_finite() {
            log::warn!("Rejected spawn at non-finite point {:?}", point);
            return Err(ControllerError::InvalidPoint(point));
        }

        let (texture, used_fallback) = if self.spawn.fallback_to_default_texture {
            self.textures.resolve_or_default(&self.spawn_texture)?
        } else {
            (self.textures.get_or_load(&self.spawn_texture)?, false)
        };

        let region = if used_fallback {
            TextureRegion::FULL
        } else {
            let column = self.rng.gen_range(0..self.spawn.atlas_columns.max(1));
            let row = self.rng.gen_range(0..self.spawn.atlas_rows.max(1));
            TextureRegion::grid_cell(self.spawn.atlas_columns, self.spawn.atlas_rows, column, row)
        };

        let def = BodyDef::dynamic(self.spawn.to_shape(), point).with_material(self.spawn.to_material());
        let size = self.spawn.sprite_size();

        let session = self.session_mut()?;
        let body = session.world.add_body(def);

        // Sprite starts exactly where the body is
        let transform = match session.world.get_body(body) {
            Some(placed) => Transform2D::from_position_rotation(placed.position, placed.angle),
            None => Transform2D::from_position(point),
        };
        let sprite = session.scene.add(
            Sprite::new(texture, size)
                .with_transform(transform)
                .with_region(region),
        );

        if let Err(e) = session.registry.link(body, sprite) {
            session.scene.remove(sprite);
            // Freshly added, cannot be stale
            let _ = session.world.remove_body(body);
            return Err(e.into());
        }

        log::debug!("Spawned body {:?} with sprite {:?} at {:?}", body, sprite, point);
        Ok(SpawnedSprite {
            body,
            sprite,
            texture,
            used_fallback,
        })
    }

    /// Feed a device tilt sample, returning the gravity now in effect
    pub fn on_tilt(&mut self, sample: Vec2) -> Result<Vec2, ControllerError> {
        if self.state != ControllerState::Running {
            return Err(ControllerError::NotRunning);
        }
        let gravity = self.tilt.apply(sample);
        let session = self.session_mut()?;
        if let Some(gravity) = gravity {
            session.world.set_gravity(gravity);
        }
        Ok(session.world.gravity())
    }

    /// Advance the simulation by a wall-clock delta
    ///
    /// Steps run first, then culling, then one sync, then the overlay.
    pub fn on_frame_tick(&mut self, wall_dt: f32) -> Result<FrameReport, ControllerError> {
        let time_step = self.world_config.time_step;
        let max_steps = self.frame.max_steps_per_frame.max(1);
        let max_frame_time = self.frame.max_frame_time;
        let cull_bounds = self.cull_bounds();

        let session = self.session_mut()?;
        let mut report = FrameReport::default();

        let dt = if wall_dt.is_finite() && wall_dt > 0.0 {
            wall_dt.min(max_frame_time)
        } else {
            if wall_dt != 0.0 {
                log::warn!("Ignoring invalid frame delta {}", wall_dt);
            }
            0.0
        };
        session.accumulator += dt;

        while session.accumulator >= time_step && report.steps < max_steps {
            match session.world.step(time_step) {
                Ok(()) => {
                    session.accumulator -= time_step;
                    report.steps += 1;
                }
                Err(PhysicsError::SimulationInstability { body }) => {
                    log::error!("Simulation diverged at body {:?}, resetting world", body);
                    self.rebuild_session()?;
                    report.reset = true;
                    return Ok(report);
                }
                Err(e) => return Err(e.into()),
            }
        }
        if session.accumulator >= time_step {
            log::debug!("Dropping {:.3}s of simulation backlog", session.accumulator);
            session.accumulator %= time_step;
        }
        report.leftover = session.accumulator;

        let outside: Vec<BodyKey> = session
            .world
            .iter()
            .filter(|(_, body)| body.is_dynamic() && !cull_bounds.contains(body.position))
            .map(|(key, _)| key)
            .collect();
        for key in outside {
            if Self::remove_linked(session, key).is_ok() {
                report.despawned += 1;
            }
        }

        let SyncReport { synced, updated, pruned } = session.registry.sync_all(&session.world, &mut session.scene);
        report.synced = synced;
        report.updated = updated;
        report.pruned = pruned.len();

        self.debug_lines.clear();
        if self.overlay.enabled {
            if let Some(session) = self.session.as_ref() {
                self.overlay.render(&session.world.snapshot(), &mut self.debug_lines);
            }
        }

        Ok(report)
    }

    fn cull_bounds(&self) -> Aabb2 {
        Aabb2::new(Vec2::ZERO, self.arena_size).expanded(self.arena.cull_margin.max(0.0))
    }

    /// Remove a body together with its link and sprite
    fn remove_linked(session: &mut Session, body: BodyKey) -> Result<Option<SpriteKey>, ControllerError> {
        session.world.remove_body(body)?;
        let sprite = session.registry.unlink(body);
        if let Some(sprite) = sprite {
            session.scene.remove(sprite);
        }
        log::debug!("Despawned body {:?} (sprite {:?})", body, sprite);
        Ok(sprite)
    }

    /// Remove a body, its link and its sprite in one step
    pub fn despawn(&mut self, body: BodyKey) -> Result<Option<SpriteKey>, ControllerError> {
        let session = self.session_mut()?;
        Self::remove_linked(session, body)
    }

    /// Despawn by sprite; unlinked sprites are just removed
    pub fn despawn_sprite(&mut self, sprite: SpriteKey) -> Result<Option<BodyKey>, ControllerError> {
        let session = self.session_mut()?;
        match session.registry.body_for(sprite) {
            Some(body) => {
                Self::remove_linked(session, body)?;
                Ok(Some(body))
            }
            None => {
                session.scene.remove(sprite);
                Ok(None)
            }
        }
    }

    fn rebuild_session(&mut self) -> Result<(), ControllerError> {
        self.session = Some(self.new_session()?);
        self.debug_lines.clear();
        Ok(())
    }

    /// Drop every spawned body and start a fresh world
    pub fn reset(&mut self) -> Result<(), ControllerError> {
        self.session_mut()?;
        self.rebuild_session()?;
        log::info!("World reset");
        Ok(())
    }

    /// Release the world, scene and links
    pub fn teardown(&mut self) {
        if self.state == ControllerState::TornDown {
            return;
        }
        self.session = None;
        self.debug_lines.clear();
        self.state = ControllerState::TornDown;
        log::info!("Controller torn down");
    }

    /// Mark the sprite scene as drawn
    ///
    /// Called by the renderer once it has picked up the current sprites.
    pub fn clear_sprite_dirty(&mut self) {
        if let Some(session) = self.session.as_mut() {
            session.scene.clear_all_dirty();
        }
    }

    pub fn set_debug_enabled(&mut self, enabled: bool) {
        self.overlay.enabled = enabled;
        if !enabled {
            self.debug_lines.clear();
        }
    }

    /// Flip the overlay, returning the new state
    pub fn toggle_debug(&mut self) -> bool {
        let enabled = self.overlay.toggle();
        if !enabled {
            self.debug_lines.clear();
        }
        log::info!("Debug overlay {}", if enabled { "on" } else { "off" });
        enabled
    }

    pub fn state(&self) -> ControllerState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == ControllerState::Running
    }

    pub fn arena_size(&self) -> Vec2 {
        self.arena_size
    }

    pub fn world(&self) -> Option<&PhysicsWorld> {
        self.session.as_ref().map(|s| &s.world)
    }

    pub fn registry(&self) -> Option<&BodySpriteRegistry> {
        self.session.as_ref().map(|s| &s.registry)
    }

    pub fn sprites(&self) -> Option<&SpriteScene> {
        self.session.as_ref().map(|s| &s.scene)
    }

    /// Static walls around the arena
    pub fn boundary(&self) -> &[BodyKey] {
        self.session.as_ref().map(|s| s.boundary.as_slice()).unwrap_or(&[])
    }

    pub fn textures(&self) -> &TextureCache {
        &self.textures
    }

    pub fn overlay(&self) -> &DebugOverlay {
        &self.overlay
    }

    /// Overlay geometry from the last tick; empty while disabled
    pub fn debug_lines(&self) -> &DebugLines {
        &self.debug_lines
    }
}

fn validate_arena_size(size: Vec2) -> Result<(), ControllerError> {
    if size.is_finite() && size.x > 0.0 && size.y > 0.0 {
        Ok(())
    } else {
        Err(ControllerError::InvalidArenaSize(size))
    }
}
