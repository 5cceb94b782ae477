//! Tiltbox - tilt-driven 2D physics sandbox
//!
//! Click or touch to drop a box. Arrow keys tilt gravity, `D` toggles the
//! physics overlay, `R` clears the arena, `Esc` quits.

use winit::{
    application::ApplicationHandler,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::PhysicalKey,
    window::WindowId,
};

use tiltbox::config::AppConfig;
use tiltbox::input::{InputAction, InputMapper};
use tiltbox::systems::{RenderError, RenderSystem, SimulationSystem, WindowSystem};
use tiltbox::InteractionController;
use tiltbox_core::{FileTextureLoader, TextureCache};
use tiltbox_input::KeyboardTilt;
use tiltbox_math::Vec2;
use tiltbox_render::Camera2D;

/// Main application state
struct App {
    config: AppConfig,
    window: Option<WindowSystem>,
    render: Option<RenderSystem>,
    camera: Option<Camera2D>,
    controller: InteractionController,
    simulation: SimulationSystem,
    keyboard_tilt: KeyboardTilt,
    /// Last cursor position in physical pixels
    cursor: Vec2,
}

impl App {
    fn new(config: AppConfig) -> Self {
        let textures = TextureCache::new(FileTextureLoader::new(&config.assets.root));
        let controller = InteractionController::new(&config, textures);

        Self {
            config,
            window: None,
            render: None,
            camera: None,
            controller,
            simulation: SimulationSystem::new(),
            keyboard_tilt: KeyboardTilt::new(),
            cursor: Vec2::ZERO,
        }
    }

    fn spawn_at_screen(&mut self, screen: Vec2) {
        let Some(camera) = &self.camera else {
            return;
        };
        let point = camera.screen_to_world(screen);
        if let Err(e) = self.controller.add_new_sprite(point) {
            log::warn!("Spawn at {:?} failed: {}", point, e);
        }
    }

    fn handle_action(&mut self, action: InputAction, event_loop: &ActiveEventLoop) {
        match action {
            InputAction::Spawn => self.spawn_at_screen(self.cursor),
            InputAction::ToggleDebug => {
                self.controller.toggle_debug();
            }
            InputAction::Reset => {
                if let Err(e) = self.controller.reset() {
                    log::warn!("Reset failed: {}", e);
                }
            }
            InputAction::ToggleFullscreen => {
                if let Some(window) = &self.window {
                    window.toggle_fullscreen();
                }
            }
            InputAction::Exit => {
                self.controller.teardown();
                event_loop.exit();
            }
        }
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        if self.keyboard_tilt.take_changed() {
            log::debug!("Keyboard tilt direction {:?}", self.keyboard_tilt.direction());
        }
        // The emulated sensor reports every frame, like a real one
        let sample = self.keyboard_tilt.sample(&self.config.tilt);
        if let Err(e) = self.controller.on_tilt(sample) {
            log::warn!("Tilt ignored: {}", e);
        }

        if let Err(e) = self.simulation.update(&mut self.controller) {
            log::error!("Frame update failed: {}", e);
            event_loop.exit();
            return;
        }

        let (Some(render), Some(camera)) = (&mut self.render, &self.camera) else {
            return;
        };
        let Some(scene) = self.controller.sprites() else {
            return;
        };
        let lines = self.controller.overlay().enabled.then(|| self.controller.debug_lines());

        let result = render.render_frame(camera, scene, self.controller.textures(), lines);
        // The batch was rebuilt before the surface was acquired
        self.controller.clear_sprite_dirty();

        match result {
            Ok(()) => {}
            Err(RenderError::SurfaceLost) => log::debug!("Surface lost, reconfigured"),
            Err(RenderError::OutOfMemory) => {
                log::error!("GPU out of memory");
                event_loop.exit();
            }
            Err(e) => log::warn!("{}", e),
        }

        if let (Some(window), Some(world)) = (&self.window, self.controller.world()) {
            window.update_title(
                world.body_count().saturating_sub(self.controller.boundary().len()),
                world.gravity().to_array(),
                self.controller.overlay().enabled,
            );
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let window = match WindowSystem::create(event_loop, &self.config.window) {
            Ok(window) => window,
            Err(e) => {
                log::error!("{}", e);
                event_loop.exit();
                return;
            }
        };

        let render = match RenderSystem::new(
            window.window().clone(),
            self.config.rendering.clone(),
            self.config.window.vsync,
        ) {
            Ok(render) => render,
            Err(e) => {
                log::error!("{}", e);
                event_loop.exit();
                return;
            }
        };

        let (width, height) = render.size();
        let camera = Camera2D::new(width, height, self.config.arena.pixels_per_meter);

        if !self.controller.is_running() {
            if let Err(e) = self.controller.initialize(camera.visible_size()) {
                log::error!("Failed to start simulation: {}", e);
                event_loop.exit();
                return;
            }
        }

        self.simulation.restart();
        self.window = Some(window);
        self.render = Some(render);
        self.camera = Some(camera);
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => {
                self.controller.teardown();
                event_loop.exit();
            }

            WindowEvent::Resized(size) => {
                if let Some(render) = &mut self.render {
                    render.resize(size.width, size.height);
                }
                if let Some(camera) = &mut self.camera {
                    camera.resize(size.width, size.height);
                    // Minimised windows report zero size; keep the old arena
                    if size.width > 0 && size.height > 0 && self.controller.is_running() {
                        if let Err(e) = self.controller.resize_arena(camera.visible_size()) {
                            log::warn!("Arena not resized: {}", e);
                        }
                    }
                }
            }

            WindowEvent::CursorMoved { position, .. } => {
                self.cursor = Vec2::new(position.x as f32, position.y as f32);
            }

            WindowEvent::MouseInput { state, button, .. } => {
                if let Some(action) = InputMapper::map_mouse_button(button, state) {
                    self.handle_action(action, event_loop);
                }
            }

            WindowEvent::Touch(touch) => {
                if InputMapper::map_touch(touch.phase).is_some() {
                    let at = Vec2::new(touch.location.x as f32, touch.location.y as f32);
                    self.spawn_at_screen(at);
                }
            }

            WindowEvent::KeyboardInput { event, .. } => {
                if let PhysicalKey::Code(key) = event.physical_key {
                    if !self.keyboard_tilt.process_keyboard(key, event.state) {
                        if let Some(action) = InputMapper::map_keyboard(key, event.state) {
                            self.handle_action(action, event_loop);
                        }
                    }
                }
            }

            WindowEvent::RedrawRequested => self.redraw(event_loop),

            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let loaded = AppConfig::load();
    let log_level = loaded
        .as_ref()
        .map(|c| c.debug.log_level.clone())
        .unwrap_or_else(|_| "info".to_string());
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    let config = loaded.unwrap_or_else(|e| {
        log::warn!("{}. Using defaults.", e);
        AppConfig::default()
    });
    log::info!("Starting Tiltbox");

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App::new(config);
    event_loop.run_app(&mut app)?;
    Ok(())
}
