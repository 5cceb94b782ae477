//! Application configuration
//!
//! Configuration is loaded from multiple sources with the following priority (lowest to highest):
//! 1. `config/default.toml` (version controlled)
//! 2. `config/user.toml` (gitignored, user overrides)
//! 3. Environment variables (`TILTBOX_SECTION__KEY`)

use figment::{Figment, providers::{Format, Toml, Env}};
use serde::{Serialize, Deserialize};
use std::path::Path;
use thiserror::Error;

use tiltbox_input::TiltMapping;
use tiltbox_math::Vec2;
use tiltbox_physics::{MaterialPreset, PhysicsMaterial, Shape, WorldConfig};
use tiltbox_render::DebugDrawFlags;

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub window: WindowConfig,
    #[serde(default)]
    pub physics: PhysicsConfig,
    /// Fixed-step clock
    #[serde(default)]
    pub frame: FrameConfig,
    /// Play area around the visible screen
    #[serde(default)]
    pub arena: ArenaConfig,
    /// What a touch spawns
    #[serde(default)]
    pub spawn: SpawnConfig,
    #[serde(default)]
    pub tilt: TiltMapping,
    #[serde(default)]
    pub assets: AssetsConfig,
    #[serde(default)]
    pub rendering: RenderingConfig,
    #[serde(default)]
    pub debug: DebugConfig,
}

impl AppConfig {
    /// Load configuration from default locations
    ///
    /// Priority (lowest to highest):
    /// 1. `config/default.toml`
    /// 2. `config/user.toml`
    /// 3. Environment variables (`TILTBOX_*`)
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from("config")
    }

    /// Load configuration from a specific config directory
    pub fn load_from<P: AsRef<Path>>(config_dir: P) -> Result<Self, ConfigError> {
        let config_dir = config_dir.as_ref();
        let default_path = config_dir.join("default.toml");
        let user_path = config_dir.join("user.toml");

        let mut figment = Figment::new();

        if default_path.exists() {
            figment = figment.merge(Toml::file(&default_path));
        }

        if user_path.exists() {
            figment = figment.merge(Toml::file(&user_path));
        }

        // TILTBOX_WINDOW__TITLE=Test -> window.title = "Test"
        figment = figment.merge(Env::prefixed("TILTBOX_").split("__"));

        let config: Self = figment.extract()?;
        log::info!("Loaded configuration from {}", config_dir.display());
        Ok(config)
    }
}

/// Window configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub title: String,
    /// Width in logical pixels
    pub width: u32,
    /// Height in logical pixels
    pub height: u32,
    pub fullscreen: bool,
    pub vsync: bool,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "Tiltbox".to_string(),
            width: 1024,
            height: 768,
            fullscreen: false,
            vsync: true,
        }
    }
}

/// Physics world parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    /// Initial gravity in m/s²
    pub gravity: [f32; 2],
    /// Fixed step in seconds
    pub time_step: f32,
    pub velocity_iterations: u32,
    pub position_iterations: u32,
    pub warm_starting: bool,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        let world = WorldConfig::default();
        Self {
            gravity: world.gravity.to_array(),
            time_step: world.time_step,
            velocity_iterations: world.velocity_iterations,
            position_iterations: world.position_iterations,
            warm_starting: world.warm_starting,
        }
    }
}

impl PhysicsConfig {
    pub fn to_world_config(&self) -> WorldConfig {
        WorldConfig::new(Vec2::from(self.gravity))
            .with_time_step(self.time_step)
            .with_iterations(self.velocity_iterations, self.position_iterations)
            .with_warm_starting(self.warm_starting)
    }
}

/// Accumulate-and-step clock limits
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FrameConfig {
    /// Longest wall-clock delta accepted per frame, in seconds
    pub max_frame_time: f32,
    /// Steps per frame before the backlog is dropped
    pub max_steps_per_frame: u32,
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            max_frame_time: 0.25,
            max_steps_per_frame: 8,
        }
    }
}

/// Arena around the visible area
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ArenaConfig {
    pub pixels_per_meter: f32,
    /// Build static walls around the screen
    pub boundary: bool,
    /// Wall thickness in metres
    pub wall_thickness: f32,
    /// Dynamic bodies this far outside the arena are despawned
    pub cull_margin: f32,
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self {
            pixels_per_meter: 32.0,
            boundary: true,
            wall_thickness: 1.0,
            cull_margin: 10.0,
        }
    }
}

/// Shape of spawned bodies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpawnShape {
    Box,
    Circle,
}

/// What `add_new_sprite` creates
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SpawnConfig {
    /// Texture key, resolved against `assets.root`
    pub texture: String,
    pub atlas_columns: u32,
    pub atlas_rows: u32,
    pub shape: SpawnShape,
    /// Box half extents in metres
    pub half_extents: [f32; 2],
    /// Circle radius in metres
    pub radius: f32,
    pub density: f32,
    pub friction: f32,
    pub restitution: f32,
    /// Named material; replaces density, friction and restitution when set
    #[serde(skip_serializing_if = "Option::is_none")]
    pub material: Option<MaterialPreset>,
    /// Use the built-in texture when the spawn texture is missing
    pub fallback_to_default_texture: bool,
    /// Atlas cell RNG seed; random when absent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

impl Default for SpawnConfig {
    fn default() -> Self {
        Self {
            texture: "blocks.png".to_string(),
            atlas_columns: 2,
            atlas_rows: 2,
            shape: SpawnShape::Box,
            half_extents: [0.5, 0.5],
            radius: 0.5,
            density: 1.0,
            friction: 0.3,
            restitution: 0.0,
            material: None,
            fallback_to_default_texture: true,
            seed: None,
        }
    }
}

impl SpawnConfig {
    pub fn to_shape(&self) -> Shape {
        match self.shape {
            SpawnShape::Box => Shape::rect(self.half_extents[0], self.half_extents[1]),
            SpawnShape::Circle => Shape::circle(self.radius),
        }
    }

    /// Sprite width and height matching the body shape
    pub fn sprite_size(&self) -> Vec2 {
        match self.shape {
            SpawnShape::Box => Vec2::from(self.half_extents) * 2.0,
            SpawnShape::Circle => Vec2::splat(self.radius * 2.0),
        }
    }

    pub fn to_material(&self) -> PhysicsMaterial {
        match self.material {
            Some(preset) => preset.material(),
            None => PhysicsMaterial::new(self.friction, self.restitution, self.density),
        }
    }
}

/// Asset locations
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetsConfig {
    /// Directory texture keys are resolved against
    pub root: String,
}

impl Default for AssetsConfig {
    fn default() -> Self {
        Self {
            root: "assets".to_string(),
        }
    }
}

/// Rendering configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderingConfig {
    /// Background color [r, g, b, a]
    pub background_color: [f32; 4],
}

impl Default for RenderingConfig {
    fn default() -> Self {
        Self {
            background_color: [0.08, 0.08, 0.12, 1.0],
        }
    }
}

/// Debug configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DebugConfig {
    /// Start with the physics overlay visible
    pub show_overlay: bool,
    /// Log level (error, warn, info, debug, trace)
    pub log_level: String,
    pub draw_shapes: bool,
    pub draw_aabbs: bool,
    pub draw_center_of_mass: bool,
    pub draw_contacts: bool,
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            show_overlay: false,
            log_level: "info".to_string(),
            draw_shapes: true,
            draw_aabbs: false,
            draw_center_of_mass: false,
            draw_contacts: false,
        }
    }
}

impl DebugConfig {
    pub fn to_debug_flags(&self) -> DebugDrawFlags {
        let mut flags = DebugDrawFlags::empty();
        flags.set(DebugDrawFlags::SHAPES, self.draw_shapes);
        flags.set(DebugDrawFlags::AABBS, self.draw_aabbs);
        flags.set(DebugDrawFlags::CENTER_OF_MASS, self.draw_center_of_mass);
        flags.set(DebugDrawFlags::CONTACTS, self.draw_contacts);
        flags
    }
}

/// Configuration error
#[derive(Debug, Error)]
#[error("Configuration error: {0}")]
pub struct ConfigError(#[from] figment::Error);
