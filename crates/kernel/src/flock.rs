use glam::Vec3;
use pasture_common::FlockConfig;

use crate::rng::SplitMix64;

/// Keeps sheep this far inside the fence.
const MARGIN: f32 = 1.0;

#[derive(Debug, Clone, PartialEq)]
pub struct Sheep {
    /// Ground contact point (y = 0).
    pub position: Vec3,
    /// Walking direction in degrees, same convention as camera yaw.
    pub heading: f32,
    /// Gait phase in radians; drives every joint angle.
    pub gait_phase: f32,
}

impl Sheep {
    pub fn direction(&self) -> Vec3 {
        let (s, c) = self.heading.to_radians().sin_cos();
        Vec3::new(c, 0.0, s)
    }
}

/// Decorative sheep wandering inside the field.
#[derive(Debug, Clone)]
pub struct Flock {
    sheep: Vec<Sheep>,
    walk_speed: f32,
    gait_rate: f32,
    width: f32,
    depth: f32,
}

impl Flock {
    pub fn new(config: &FlockConfig, width: f32, depth: f32, rng: &mut SplitMix64) -> Self {
        let sheep = (0..config.count)
            .map(|_| Sheep {
                position: Vec3::new(
                    rng.range(MARGIN, (width - MARGIN).max(MARGIN)),
                    0.0,
                    rng.range(MARGIN, (depth - MARGIN).max(MARGIN)),
                ),
                heading: rng.range(0.0, 360.0),
                gait_phase: rng.range(0.0, std::f32::consts::TAU),
            })
            .collect();
        Self {
            sheep,
            walk_speed: config.walk_speed,
            gait_rate: config.gait_rate,
            width,
            depth,
        }
    }

    pub fn sheep(&self) -> &[Sheep] {
        &self.sheep
    }

    fn inside(&self, p: Vec3) -> bool {
        p.x >= MARGIN && p.z >= MARGIN && p.x <= self.width - MARGIN && p.z <= self.depth - MARGIN
    }

    /// Walk every sheep one frame, turning around at the fence.
    pub fn advance(&mut self, rng: &mut SplitMix64) {
        for i in 0..self.sheep.len() {
            let next = self.sheep[i].position + self.sheep[i].direction() * self.walk_speed;
            if self.inside(next) {
                self.sheep[i].position = next;
            } else {
                let jitter = rng.range(-30.0, 30.0);
                let sheep = &mut self.sheep[i];
                sheep.heading = (sheep.heading + 180.0 + jitter).rem_euclid(360.0);
            }
            self.sheep[i].gait_phase += self.gait_rate;
        }
    }
}
