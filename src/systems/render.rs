//! GPU rendering system
//!
//! Manages GPU rendering including:
//! - Render context and surface
//! - Sprite and debug line pipelines
//! - Texture uploads from the cache
//! - Frame rendering

use std::sync::Arc;
use thiserror::Error;
use winit::window::Window;

use tiltbox_core::{SpriteScene, TextureCache};
use tiltbox_render::{
    context::{ContextError, RenderContext},
    pipeline::{CameraUniforms, LinePipeline, SpritePipeline},
    Camera2D, DebugLines, SpriteBatch,
};

use crate::config::RenderingConfig;

/// Render error types
#[derive(Debug, Error)]
pub enum RenderError {
    /// GPU setup failed
    #[error("GPU initialization failed: {0}")]
    Context(#[from] ContextError),
    /// Surface was lost (window resized, minimized, etc.)
    #[error("Surface lost")]
    SurfaceLost,
    /// GPU out of memory
    #[error("Out of memory")]
    OutOfMemory,
    /// Other surface error
    #[error("Render error: {0}")]
    Other(String),
}

/// Manages GPU rendering
pub struct RenderSystem {
    context: RenderContext,
    sprite_pipeline: SpritePipeline,
    line_pipeline: LinePipeline,
    batch: SpriteBatch,
    render_config: RenderingConfig,
}

impl RenderSystem {
    /// Create render system from window and config
    pub fn new(window: Arc<Window>, render_config: RenderingConfig, vsync: bool) -> Result<Self, RenderError> {
        let context = pollster::block_on(RenderContext::with_vsync(window, vsync))?;

        let sprite_pipeline = SpritePipeline::new(&context.device, context.config.format);
        let line_pipeline = LinePipeline::new(&context.device, context.config.format);

        Ok(Self {
            context,
            sprite_pipeline,
            line_pipeline,
            batch: SpriteBatch::new(),
            render_config,
        })
    }

    /// Handle window resize
    pub fn resize(&mut self, width: u32, height: u32) {
        self.context.resize(winit::dpi::PhysicalSize::new(width, height));
    }

    /// Upload any texture referenced by the batch that the GPU has not seen
    fn upload_missing_textures(&mut self, textures: &TextureCache) {
        for draw in &self.batch.draws {
            if self.sprite_pipeline.has_texture(draw.texture) {
                continue;
            }
            match textures.get(draw.texture) {
                Some(texture) => self.sprite_pipeline.upload_texture(
                    &self.context.device,
                    &self.context.queue,
                    draw.texture,
                    &texture,
                ),
                None => log::warn!("Sprite references unknown texture {:?}", draw.texture),
            }
        }
    }

    /// Render a single frame
    ///
    /// Sprites first, then the debug lines on top when given. The sprite
    /// batch is only rebuilt when `scene` has dirty sprites, so the caller
    /// clears the flags after each frame.
    pub fn render_frame(
        &mut self,
        camera: &Camera2D,
        scene: &SpriteScene,
        textures: &TextureCache,
        debug_lines: Option<&DebugLines>,
    ) -> Result<(), RenderError> {
        // Sprite vertices stay on the GPU until the scene changes
        if self.batch.refresh(scene) {
            self.upload_missing_textures(textures);
            self.sprite_pipeline
                .upload_vertices(&self.context.device, &self.context.queue, &self.batch.vertices);
        }

        let uniforms = CameraUniforms {
            view_proj: camera.view_projection(),
        };
        self.sprite_pipeline.update_camera(&self.context.queue, &uniforms);

        let lines = debug_lines.map(|l| l.vertices()).unwrap_or(&[]);
        self.line_pipeline.update_camera(&self.context.queue, &uniforms);
        self.line_pipeline
            .upload_vertices(&self.context.device, &self.context.queue, lines);

        // Get surface texture
        let output = match self.context.surface.get_current_texture() {
            Ok(output) => output,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                self.context.reconfigure();
                return Err(RenderError::SurfaceLost);
            }
            Err(wgpu::SurfaceError::OutOfMemory) => return Err(RenderError::OutOfMemory),
            Err(e) => return Err(RenderError::Other(format!("{:?}", e))),
        };

        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .context
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        let bg = &self.render_config.background_color;
        self.sprite_pipeline.render(
            &mut encoder,
            &view,
            &self.batch.draws,
            wgpu::Color {
                r: bg[0] as f64,
                g: bg[1] as f64,
                b: bg[2] as f64,
                a: bg[3] as f64,
            },
        );
        self.line_pipeline.render(&mut encoder, &view);

        self.context.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        Ok(())
    }

    /// Get current surface size
    pub fn size(&self) -> (u32, u32) {
        (self.context.size.width, self.context.size.height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_error_display() {
        assert_eq!(format!("{}", RenderError::SurfaceLost), "Surface lost");
        assert_eq!(format!("{}", RenderError::OutOfMemory), "Out of memory");
        assert_eq!(
            format!("{}", RenderError::Other("test".to_string())),
            "Render error: test"
        );
        let err = RenderError::from(ContextError::NoAdapter);
        assert!(err.to_string().contains("no compatible GPU adapter"));
    }
}
