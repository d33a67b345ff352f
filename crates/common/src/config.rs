use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Errors from loading or validating a [`SimConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Complete tuning for one simulation session.
///
/// All rates are per simulation frame; the host drives one frame per
/// display refresh (roughly 60 Hz).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    pub camera: CameraConfig,
    pub gun: GunConfig,
    pub enemies: EnemyConfig,
    pub flock: FlockConfig,
    pub field: FieldConfig,
    pub player: PlayerConfig,
}

/// First-person camera and player-body physics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Eye position at session start.
    pub start: Vec3,
    /// Initial yaw in degrees.
    pub yaw: f32,
    /// Initial pitch in degrees.
    pub pitch: f32,
    /// Distance covered by one movement step.
    pub move_speed: f32,
    /// Yaw change of one keyboard pan step, in degrees.
    pub pan_step: f32,
    /// Degrees of rotation per pixel of mouse motion.
    pub mouse_sensitivity: f32,
    /// Eye height when standing on bare ground.
    pub ground_y: f32,
    /// Upward velocity given by a jump.
    pub jump_force: f32,
    /// Velocity lost per frame while airborne.
    pub gravity: f32,
    /// Vertical field of view in degrees.
    pub fov: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            start: Vec3::new(16.0, 1.5, 16.0),
            yaw: 0.0,
            pitch: 0.0,
            move_speed: 0.15,
            pan_step: 2.0,
            mouse_sensitivity: 0.15,
            ground_y: 1.5,
            jump_force: 0.22,
            gravity: 0.012,
            fov: 70.0,
            near: 0.05,
            far: 200.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GunConfig {
    /// Frames that must pass after a shot before the next one.
    pub cooldown: u32,
    pub bullet_speed: f32,
    /// Frames a bullet stays alive absent a hit.
    pub lifetime: u32,
    /// Distance in front of the eye where bullets appear.
    pub muzzle_offset: f32,
}

impl Default for GunConfig {
    fn default() -> Self {
        Self {
            cooldown: 12,
            bullet_speed: 0.6,
            lifetime: 90,
            muzzle_offset: 0.4,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnemyConfig {
    /// Population cap; spawning pauses while this many are alive.
    pub max_alive: usize,
    /// Frames between spawn attempts.
    pub spawn_interval: u32,
    pub speed: f32,
    pub health: u32,
    /// Bullet hit radius at scale 1.0.
    pub hit_radius: f32,
    /// Horizontal distance under which the player takes damage.
    pub contact_radius: f32,
    /// Player health lost per frame per enemy in contact.
    pub contact_damage: f32,
    pub score_per_kill: u32,
    pub min_scale: f32,
    pub max_scale: f32,
    pub base_y: f32,
    pub bob_amplitude: f32,
    /// Bob phase advance per frame, in radians.
    pub bob_rate: f32,
}

impl Default for EnemyConfig {
    fn default() -> Self {
        Self {
            max_alive: 6,
            spawn_interval: 150,
            speed: 0.035,
            health: 2,
            hit_radius: 0.7,
            contact_radius: 1.2,
            contact_damage: 0.25,
            score_per_kill: 10,
            min_scale: 0.8,
            max_scale: 1.2,
            base_y: 1.0,
            bob_amplitude: 0.15,
            bob_rate: 0.08,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlockConfig {
    pub count: usize,
    pub walk_speed: f32,
    /// Gait phase advance per frame, in radians.
    pub gait_rate: f32,
}

impl Default for FlockConfig {
    fn default() -> Self {
        Self {
            count: 6,
            walk_speed: 0.02,
            gait_rate: 0.12,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldConfig {
    /// Cells along X.
    pub width: i32,
    /// Cells along Z.
    pub depth: i32,
    /// Tallest block stack allowed in one cell.
    pub max_stack: i32,
    /// Distance ahead of the eye targeted by block edits.
    pub reach: f32,
}

impl Default for FieldConfig {
    fn default() -> Self {
        Self {
            width: 32,
            depth: 32,
            max_stack: 4,
            reach: 2.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    pub health: f32,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self { health: 100.0 }
    }
}

impl SimConfig {
    /// Load a YAML config file. Missing sections and fields take defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path.as_ref())?;
        let config = Self::from_yaml(&text)?;
        tracing::debug!(path = %path.as_ref().display(), "loaded sim config");
        Ok(config)
    }

    pub fn from_yaml(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values that would break simulation invariants.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |msg: &str| Err(ConfigError::Invalid(msg.to_string()));

        if self.gun.lifetime == 0 {
            return invalid("gun.lifetime must be at least 1 frame");
        }
        if self.enemies.health == 0 {
            return invalid("enemies.health must be at least 1");
        }
        if self.enemies.spawn_interval == 0 {
            return invalid("enemies.spawn_interval must be at least 1 frame");
        }
        if self.enemies.min_scale <= 0.0 || self.enemies.min_scale > self.enemies.max_scale {
            return invalid("enemies scale range must be positive and ordered");
        }
        if self.field.width <= 0 || self.field.depth <= 0 {
            return invalid("field dimensions must be positive");
        }
        if self.field.max_stack < 0 {
            return invalid("field.max_stack must not be negative");
        }
        if self.camera.gravity <= 0.0 {
            return invalid("camera.gravity must be positive");
        }
        if !(self.camera.near > 0.0 && self.camera.near < self.camera.far) {
            return invalid("camera clip planes must satisfy 0 < near < far");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_are_valid() {
        let config = SimConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.camera.start, Vec3::new(16.0, 1.5, 16.0));
        assert_eq!(config.camera.move_speed, 0.15);
        assert_eq!(config.enemies.health, 2);
        assert_eq!(config.enemies.score_per_kill, 10);
    }

    #[test]
    fn partial_yaml_keeps_defaults() {
        let config = SimConfig::from_yaml("gun:\n  cooldown: 3\n").unwrap();
        assert_eq!(config.gun.cooldown, 3);
        assert_eq!(config.gun.lifetime, GunConfig::default().lifetime);
        assert_eq!(config.enemies, EnemyConfig::default());
    }

    #[test]
    fn zero_lifetime_is_rejected() {
        let err = SimConfig::from_yaml("gun:\n  lifetime: 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn inverted_scale_range_is_rejected() {
        let err =
            SimConfig::from_yaml("enemies:\n  min_scale: 2.0\n  max_scale: 1.0\n").unwrap_err();
        assert!(err.to_string().contains("scale"));
    }

    #[test]
    fn load_from_file() {
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        writeln!(tmp, "field:\n  width: 8\n  depth: 12").unwrap();
        let config = SimConfig::load(tmp.path()).unwrap();
        assert_eq!(config.field.width, 8);
        assert_eq!(config.field.depth, 12);
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = SimConfig::load("/definitely/not/here.yaml").unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
