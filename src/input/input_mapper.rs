//! Input mapping from raw events to semantic actions
//!
//! A left click or a touch spawns a sprite. Arrow keys are NOT mapped here -
//! they go to `KeyboardTilt`, which emulates the tilt sensor.

use winit::event::{ElementState, MouseButton, TouchPhase};
use winit::keyboard::KeyCode;

/// Actions triggered by discrete input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputAction {
    /// Spawn a sprite under the pointer (click or touch)
    Spawn,
    /// Toggle the physics debug overlay (D key)
    ToggleDebug,
    /// Remove every spawned body (R key)
    Reset,
    /// Toggle fullscreen mode (F key)
    ToggleFullscreen,
    /// Exit application (Escape)
    Exit,
}

/// Maps raw input events to semantic actions
pub struct InputMapper;

impl InputMapper {
    /// Map keyboard input to an action
    ///
    /// Returns `None` for releases and for unmapped keys
    pub fn map_keyboard(key: KeyCode, state: ElementState) -> Option<InputAction> {
        if state != ElementState::Pressed {
            return None;
        }

        match key {
            KeyCode::KeyD => Some(InputAction::ToggleDebug),
            KeyCode::KeyR => Some(InputAction::Reset),
            KeyCode::KeyF => Some(InputAction::ToggleFullscreen),
            KeyCode::Escape => Some(InputAction::Exit),
            _ => None,
        }
    }

    /// Left click acts as a touch
    pub fn map_mouse_button(button: MouseButton, state: ElementState) -> Option<InputAction> {
        (button == MouseButton::Left && state == ElementState::Pressed).then_some(InputAction::Spawn)
    }

    /// Only the start of a touch spawns
    pub fn map_touch(phase: TouchPhase) -> Option<InputAction> {
        (phase == TouchPhase::Started).then_some(InputAction::Spawn)
    }
}
