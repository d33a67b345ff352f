//! Input layer: device events become [`Action`]s, and actions only ever
//! touch plain numbers.
//!
//! # Invariants
//! - This crate depends on the kernel's numeric types and nothing that
//!   renders, so an event handler cannot trigger matrix synthesis or GPU work.
//! - Mouse motion goes straight into camera angles; everything else is
//!   latched into [`InputState`] and read once per frame.

pub mod action;
pub mod state;

pub use action::Action;
pub use state::InputState;
