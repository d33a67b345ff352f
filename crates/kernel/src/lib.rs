//! Simulation kernel: the single writer of all gameplay state.
//!
//! # Invariants
//! - Input handlers only mutate plain numeric state (camera angles, control flags).
//! - One [`Simulation::step`] per host frame: movement, gravity, projectiles,
//!   enemy AI, then hit resolution, in that order.
//! - The view matrix is produced only by [`Camera::update_view`], never by a step
//!   or an input handler.
//! - Given the same seed, config and controls, steps are bit-reproducible.

pub mod audio;
pub mod camera;
pub mod enemy;
pub mod field;
pub mod flock;
pub mod gun;
pub mod rng;
pub mod sim;

pub use audio::{AudioSink, NullAudio, SoundCue, WalkEdge, WalkLoop};
pub use camera::{Camera, look_direction};
pub use enemy::{Enemy, EnemySwarm};
pub use field::BlockField;
pub use flock::{Flock, Sheep};
pub use gun::{Bullet, Gun, HitReport, Score};
pub use rng::SplitMix64;
pub use sim::{Controls, Simulation};
