use pasture_kernel::{Camera, Controls};

use crate::action::Action;

/// Latched input between frames.
///
/// Handlers call [`InputState::handle`] and [`InputState::look`] as often as
/// events arrive; the frame driver calls [`InputState::controls`] once per
/// frame.
#[derive(Debug, Default)]
pub struct InputState {
    held: Controls,
    place_pending: bool,
    remove_pending: bool,
    mouse_captured: bool,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn handle(&mut self, action: Action, pressed: bool) {
        match action {
            Action::MoveForward => self.held.forward = pressed,
            Action::MoveBackward => self.held.backward = pressed,
            Action::StrafeLeft => self.held.left = pressed,
            Action::StrafeRight => self.held.right = pressed,
            Action::PanLeft => self.held.pan_left = pressed,
            Action::PanRight => self.held.pan_right = pressed,
            Action::Jump => self.held.jump = pressed,
            Action::Fire => self.held.fire = pressed,
            Action::PlaceBlock => self.place_pending |= pressed,
            Action::RemoveBlock => self.remove_pending |= pressed,
        }
    }

    /// Mouse motion in pixels. Only accumulates camera angles, and only
    /// while the pointer is captured.
    pub fn look(&self, camera: &mut Camera, dx: f32, dy: f32) {
        if self.mouse_captured {
            camera.mouse_rotate(dx, dy);
        }
    }

    pub fn set_mouse_captured(&mut self, captured: bool) {
        if self.mouse_captured != captured {
            tracing::debug!(captured, "mouse capture changed");
        }
        self.mouse_captured = captured;
        if !captured {
            self.held.fire = false;
        }
    }

    pub fn mouse_captured(&self) -> bool {
        self.mouse_captured
    }

    /// Drop every held key, e.g. when the window loses focus.
    pub fn release_all(&mut self) {
        self.held = Controls::default();
        self.place_pending = false;
        self.remove_pending = false;
    }

    /// Sample this frame's controls, consuming one-shot requests.
    pub fn controls(&mut self) -> Controls {
        let controls = Controls {
            place_block: self.place_pending,
            remove_block: self.remove_pending,
            ..self.held
        };
        self.place_pending = false;
        self.remove_pending = false;
        controls
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn held_actions_persist_across_frames() {
        let mut input = InputState::new();
        input.handle(Action::MoveForward, true);
        assert!(input.controls().forward);
        assert!(input.controls().forward);
        input.handle(Action::MoveForward, false);
        assert!(!input.controls().forward);
    }

    #[test]
    fn one_shot_actions_are_consumed() {
        let mut input = InputState::new();
        input.handle(Action::PlaceBlock, true);
        input.handle(Action::PlaceBlock, false);
        assert!(input.controls().place_block);
        assert!(!input.controls().place_block);
    }

    #[test]
    fn look_requires_capture() {
        let mut input = InputState::new();
        let mut camera = Camera::default();
        input.look(&mut camera, 100.0, 0.0);
        assert_eq!(camera.yaw(), 0.0);

        input.set_mouse_captured(true);
        input.look(&mut camera, 100.0, 0.0);
        assert!(camera.yaw() != 0.0);
        assert_eq!(camera.view_updates(), 0);
    }

    #[test]
    fn many_mouse_events_only_move_angles() {
        let mut input = InputState::new();
        input.set_mouse_captured(true);
        let mut camera = Camera::default();
        for _ in 0..500 {
            input.look(&mut camera, 1.0, -3.0);
        }
        assert_eq!(camera.pitch(), 89.0);
        assert_eq!(camera.view_updates(), 0);
    }

    #[test]
    fn release_all_clears_everything() {
        let mut input = InputState::new();
        input.handle(Action::StrafeLeft, true);
        input.handle(Action::RemoveBlock, true);
        input.release_all();
        assert_eq!(input.controls(), Controls::default());
    }
}
