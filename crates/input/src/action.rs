use serde::{Deserialize, Serialize};

/// A high-level player intent, independent of the device that produced it.
///
/// The desktop app maps keys and buttons to actions; the simulation never
/// sees raw input events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    MoveForward,
    MoveBackward,
    StrafeLeft,
    StrafeRight,
    /// Turn left by a fixed keyboard step.
    PanLeft,
    /// Turn right by a fixed keyboard step.
    PanRight,
    Jump,
    Fire,
    PlaceBlock,
    RemoveBlock,
}

impl Action {
    /// Held actions apply every frame while down; the rest trigger once per press.
    pub fn is_held(self) -> bool {
        !matches!(self, Action::PlaceBlock | Action::RemoveBlock)
    }
}
