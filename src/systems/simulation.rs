//! Simulation system
//!
//! Measures wall-clock time between frames and hands it to the controller,
//! which turns it into fixed physics steps.

use std::time::Instant;

use crate::controller::{ControllerError, FrameReport, InteractionController};

/// Drives the controller from the wall clock
pub struct SimulationSystem {
    last_frame: Instant,
}

impl SimulationSystem {
    pub fn new() -> Self {
        Self {
            last_frame: Instant::now(),
        }
    }

    /// Seconds since the previous call
    pub fn tick(&mut self) -> f32 {
        let now = Instant::now();
        let dt = (now - self.last_frame).as_secs_f32();
        self.last_frame = now;
        dt
    }

    /// Restart timing, e.g. after the window was hidden
    pub fn restart(&mut self) {
        self.last_frame = Instant::now();
    }

    /// Run one frame: measure time, step, sync, overlay
    pub fn update(&mut self, controller: &mut InteractionController) -> Result<FrameReport, ControllerError> {
        let dt = self.tick();
        let report = controller.on_frame_tick(dt)?;
        if report.reset {
            log::warn!("World was reset after a simulation failure");
        }
        if report.despawned > 0 {
            log::debug!("Culled {} bodies outside the arena", report.despawned);
        }
        Ok(report)
    }
}

impl Default for SimulationSystem {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tick_measures_elapsed() {
        let mut sim = SimulationSystem::new();
        std::thread::sleep(std::time::Duration::from_millis(20));
        let dt = sim.tick();
        assert!(dt >= 0.02);
        // Second tick starts from the first
        assert!(sim.tick() < dt);
    }

    #[test]
    fn test_update_requires_running_controller() {
        use tiltbox_core::{AssetError, Texture, TextureCache, TextureKey, TextureLoader};

        struct NoFiles;
        impl TextureLoader for NoFiles {
            fn load(&self, key: &TextureKey) -> Result<Texture, AssetError> {
                Err(AssetError::MissingResource(key.to_string()))
            }
        }

        let mut controller = InteractionController::new(&crate::AppConfig::default(), TextureCache::new(NoFiles));
        let mut sim = SimulationSystem::default();
        assert!(matches!(sim.update(&mut controller), Err(ControllerError::NotRunning)));
    }
}
