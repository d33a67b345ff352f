use glam::Vec3;
use pasture_common::EnemyConfig;

use crate::rng::SplitMix64;

/// A hostile creature closing in on the player.
#[derive(Debug, Clone, PartialEq)]
pub struct Enemy {
    /// `y` is derived each frame from the bob phase.
    pub position: Vec3,
    pub health: u32,
    pub scale: f32,
    pub dead: bool,
    /// Idle bob and limb animation phase, radians.
    pub phase: f32,
    /// Bullet hit radius, already multiplied by `scale`.
    pub radius: f32,
    in_contact: bool,
}

impl Enemy {
    /// Whether a point lies inside the hit sphere.
    pub fn contains(&self, point: Vec3) -> bool {
        self.position.distance_squared(point) <= self.radius * self.radius
    }

    /// Apply one point of damage. Returns true on the hit that kills.
    pub fn take_hit(&mut self) -> bool {
        if self.dead {
            return false;
        }
        self.health = self.health.saturating_sub(1);
        if self.health == 0 {
            self.dead = true;
            return true;
        }
        false
    }

    /// Discrete health tier for material selection.
    pub fn wounded(&self, full_health: u32) -> bool {
        self.health < full_health
    }
}

/// Result of one [`EnemySwarm::advance`].
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Contact {
    /// Total player damage this frame.
    pub damage: f32,
    /// Enemies that entered contact range this frame.
    pub entered: usize,
}

/// Live enemies plus the timed spawner that feeds them.
#[derive(Debug, Clone)]
pub struct EnemySwarm {
    enemies: Vec<Enemy>,
    config: EnemyConfig,
    spawn_timer: u32,
    width: f32,
    depth: f32,
}

impl EnemySwarm {
    pub fn new(config: EnemyConfig, width: f32, depth: f32) -> Self {
        Self {
            enemies: Vec::new(),
            config,
            spawn_timer: 0,
            width,
            depth,
        }
    }

    /// Live enemies in spawn order.
    pub fn enemies(&self) -> &[Enemy] {
        &self.enemies
    }

    /// Mutable view for hit resolution.
    pub fn enemies_mut(&mut self) -> &mut [Enemy] {
        &mut self.enemies
    }

    /// Number of enemies in the active set.
    pub fn len(&self) -> usize {
        self.enemies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.enemies.is_empty()
    }

    /// Tuning the swarm was built with.
    pub fn config(&self) -> &EnemyConfig {
        &self.config
    }

    /// Place a new enemy on a uniformly chosen field edge. Fails at the cap.
    pub fn spawn(&mut self, rng: &mut SplitMix64) -> bool {
        if self.enemies.len() >= self.config.max_alive {
            return false;
        }
        let edge = rng.below(4);
        let along_x = rng.next_f32() * self.width;
        let along_z = rng.next_f32() * self.depth;
        let (x, z) = match edge {
            0 => (along_x, 0.0),
            1 => (along_x, self.depth),
            2 => (0.0, along_z),
            _ => (self.width, along_z),
        };
        let scale = rng.range(self.config.min_scale, self.config.max_scale);
        let phase = rng.range(0.0, std::f32::consts::TAU);

        self.enemies.push(Enemy {
            position: Vec3::new(x, self.bob_height(phase), z),
            health: self.config.health,
            scale,
            dead: false,
            phase,
            radius: self.config.hit_radius * scale,
            in_contact: false,
        });
        tracing::debug!(edge, x, z, alive = self.enemies.len(), "enemy spawned");
        true
    }

    /// Advance the spawn timer; spawns when it elapses.
    pub fn tick_spawner(&mut self, rng: &mut SplitMix64) -> bool {
        self.spawn_timer += 1;
        if self.spawn_timer < self.config.spawn_interval {
            return false;
        }
        self.spawn_timer = 0;
        self.spawn(rng)
    }

    fn bob_height(&self, phase: f32) -> f32 {
        self.config.base_y + phase.sin() * self.config.bob_amplitude
    }

    /// Steer every live enemy straight at the target's horizontal position,
    /// bob it, and total up contact damage against the player.
    pub fn advance(&mut self, target: Vec3) -> Contact {
        let mut contact = Contact::default();
        let speed = self.config.speed;
        let contact_sq = self.config.contact_radius * self.config.contact_radius;

        for i in 0..self.enemies.len() {
            if self.enemies[i].dead {
                continue;
            }
            let phase = self.enemies[i].phase + self.config.bob_rate;
            let bob = self.bob_height(phase);
            let enemy = &mut self.enemies[i];

            let to_target = Vec3::new(target.x - enemy.position.x, 0.0, target.z - enemy.position.z);
            let distance = to_target.length();
            if distance > f32::EPSILON {
                let step = speed.min(distance);
                enemy.position += to_target / distance * step;
            }
            enemy.phase = phase;
            enemy.position.y = bob;

            let dx = target.x - enemy.position.x;
            let dz = target.z - enemy.position.z;
            let in_range = dx * dx + dz * dz <= contact_sq;
            if in_range {
                contact.damage += self.config.contact_damage;
                if !enemy.in_contact {
                    contact.entered += 1;
                }
            }
            enemy.in_contact = in_range;
        }
        contact
    }

    /// Drop enemies killed this step. Returns how many were removed.
    pub fn remove_dead(&mut self) -> usize {
        let before = self.enemies.len();
        self.enemies.retain(|e| !e.dead);
        before - self.enemies.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn swarm() -> EnemySwarm {
        EnemySwarm::new(EnemyConfig::default(), 32.0, 32.0)
    }

    #[test]
    fn spawns_on_an_edge_with_full_health() {
        let mut s = swarm();
        let mut rng = SplitMix64::new(3);
        for _ in 0..6 {
            assert!(s.spawn(&mut rng));
        }
        for e in s.enemies() {
            let on_edge = e.position.x == 0.0
                || e.position.x == 32.0
                || e.position.z == 0.0
                || e.position.z == 32.0;
            assert!(on_edge, "{:?}", e.position);
            assert_eq!(e.health, 2);
            assert!(!e.dead);
        }
    }

    #[test]
    fn population_is_capped() {
        let mut s = swarm();
        let mut rng = SplitMix64::new(0);
        for _ in 0..20 {
            s.spawn(&mut rng);
        }
        assert_eq!(s.len(), s.config().max_alive);
    }

    #[test]
    fn spawner_is_timer_gated() {
        let mut s = swarm();
        let mut rng = SplitMix64::new(0);
        let interval = s.config().spawn_interval;
        for _ in 0..interval - 1 {
            assert!(!s.tick_spawner(&mut rng));
        }
        assert!(s.tick_spawner(&mut rng));
        assert_eq!(s.len(), 1);
    }

    #[test]
    fn steers_toward_target_at_fixed_speed() {
        let mut s = swarm();
        let mut rng = SplitMix64::new(11);
        s.spawn(&mut rng);
        let target = Vec3::new(16.0, 1.5, 16.0);
        let before = s.enemies()[0].position;
        s.advance(target);
        let after = s.enemies()[0].position;

        let moved = Vec3::new(after.x - before.x, 0.0, after.z - before.z);
        assert!((moved.length() - s.config().speed).abs() < 1e-5);
        let d0 = Vec3::new(target.x - before.x, 0.0, target.z - before.z).length();
        let d1 = Vec3::new(target.x - after.x, 0.0, target.z - after.z).length();
        assert!(d1 < d0);
    }

    #[test]
    fn contact_damage_accrues_every_frame() {
        let mut s = swarm();
        let mut rng = SplitMix64::new(5);
        s.spawn(&mut rng);
        let target = s.enemies()[0].position;

        let first = s.advance(target);
        assert_eq!(first.entered, 1);
        assert!((first.damage - 0.25).abs() < 1e-6);

        let second = s.advance(target);
        assert_eq!(second.entered, 0);
        assert!((second.damage - 0.25).abs() < 1e-6);
    }

    #[test]
    fn two_hits_kill_a_fresh_enemy() {
        let mut s = swarm();
        let mut rng = SplitMix64::new(1);
        s.spawn(&mut rng);
        let e = &mut s.enemies_mut()[0];
        assert!(!e.take_hit());
        assert!(e.wounded(2));
        assert!(e.take_hit());
        assert!(e.dead);
        assert!(!e.take_hit());
        assert_eq!(s.remove_dead(), 1);
        assert!(s.is_empty());
    }
}
