use glam::Vec2;
use winit::event::{ElementState, MouseButton, MouseScrollDelta, WindowEvent};

use super::controller::OrbitController;

/// Translates window mouse events into orbit camera moves.
#[derive(Debug, Default)]
pub struct InputHandler {
    last_mouse_pos: Vec2,
    mouse_pressed: bool,
    shift_pressed: bool,
}

impl InputHandler {
    /// Handler with no buttons held.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if the event was consumed by the camera.
    pub fn handle_event(
        &mut self,
        controller: &mut OrbitController,
        event: &WindowEvent,
    ) -> bool {
        match event {
            WindowEvent::MouseInput {
                button: MouseButton::Left,
                state,
                ..
            } => {
                self.mouse_pressed = *state == ElementState::Pressed;
                true
            }
            WindowEvent::ModifiersChanged(modifiers) => {
                self.shift_pressed = modifiers.state().shift_key();
                true
            }
            WindowEvent::CursorMoved { position, .. } => {
                let current_pos =
                    Vec2::new(position.x as f32, position.y as f32);
                let delta = current_pos - self.last_mouse_pos;
                self.last_mouse_pos = current_pos;

                if self.mouse_pressed {
                    if self.shift_pressed {
                        controller.pan(delta);
                    } else {
                        controller.rotate(delta);
                    }
                }
                true
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let scroll = match delta {
                    MouseScrollDelta::LineDelta(_, y) => *y,
                    MouseScrollDelta::PixelDelta(pos) => pos.y as f32 * 0.01,
                };
                controller.zoom(scroll);
                true
            }
            _ => false,
        }
    }
}
