use pasture_input::Action;
use winit::keyboard::KeyCode;

/// Keyboard binding. Mouse buttons are handled by the event loop.
pub fn action_for(key: KeyCode) -> Option<Action> {
    Some(match key {
        KeyCode::KeyW | KeyCode::ArrowUp => Action::MoveForward,
        KeyCode::KeyS | KeyCode::ArrowDown => Action::MoveBackward,
        KeyCode::KeyA => Action::StrafeLeft,
        KeyCode::KeyD => Action::StrafeRight,
        KeyCode::KeyQ | KeyCode::ArrowLeft => Action::PanLeft,
        KeyCode::KeyE | KeyCode::ArrowRight => Action::PanRight,
        KeyCode::Space => Action::Jump,
        KeyCode::KeyF => Action::Fire,
        KeyCode::KeyB => Action::PlaceBlock,
        KeyCode::KeyV => Action::RemoveBlock,
        _ => return None,
    })
}
