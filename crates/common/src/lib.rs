//! Shared value types and configuration for the pasture shooter.
//!
//! Every type here is a closed, plain-data shape: no behaviour beyond
//! construction and validation lives in this crate.

pub mod config;
pub mod types;

pub use config::{
    CameraConfig, ConfigError, EnemyConfig, FieldConfig, FlockConfig, GunConfig, PlayerConfig,
    SimConfig,
};
pub use types::{Material, Placement, TextureId};
