//! Rendering adapter: turns simulation state into a bounded list of draw
//! calls against any [`DrawBackend`].
//!
//! # Invariants
//! - The renderer never mutates simulation state.
//! - One view upload per frame, one draw call per static batch, one draw
//!   call per posed part or bullet.
//! - Static geometry is rebaked wholesale only when the block field changes.

mod backend;
mod batch;
mod driver;
mod pose;
mod scene;
mod stats;

pub use backend::{DrawBackend, DrawCall, RecordingBackend};
pub use batch::{BatchVertex, CUBE_VERTICES, CubeBatch};
pub use driver::{FrameDriver, FrameRenderer};
pub use pose::{EnemyPoser, Gait, JointAngles, PoseArena, SheepPoser, gait};
pub use scene::StaticScene;
pub use stats::{FrameStats, FrameTimer};
