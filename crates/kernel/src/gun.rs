use glam::Vec3;
use pasture_common::GunConfig;

use crate::enemy::Enemy;

/// A live projectile.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bullet {
    pub position: Vec3,
    pub velocity: Vec3,
    /// Frames left; always > 0 while the bullet is in the live set.
    pub lifetime: u32,
}

/// Running score.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Score {
    pub points: u32,
    pub kills: u32,
    pub per_kill: u32,
}

impl Score {
    pub fn new(per_kill: u32) -> Self {
        Self {
            points: 0,
            kills: 0,
            per_kill,
        }
    }

    pub fn award_kill(&mut self) {
        self.kills += 1;
        self.points += self.per_kill;
    }
}

/// Outcome of one [`Gun::resolve_hits`] pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HitReport {
    pub hits: u32,
    pub kills: u32,
}

/// Projectile weapon: cooldown gate plus the list of live bullets.
#[derive(Debug, Clone)]
pub struct Gun {
    bullets: Vec<Bullet>,
    cooldown: u32,
    config: GunConfig,
}

impl Gun {
    pub fn new(config: GunConfig) -> Self {
        Self {
            bullets: Vec::new(),
            cooldown: 0,
            config,
        }
    }

    /// Live bullets in fire order.
    pub fn bullets(&self) -> &[Bullet] {
        &self.bullets
    }

    /// Frames until the gun can fire again.
    pub fn cooldown(&self) -> u32 {
        self.cooldown
    }

    /// Tuning this gun was built with.
    pub fn config(&self) -> &GunConfig {
        &self.config
    }

    /// Launch a bullet along `direction` (unit length). A no-op while the
    /// cooldown is running.
    pub fn fire(&mut self, origin: Vec3, direction: Vec3) -> bool {
        if self.cooldown > 0 {
            return false;
        }
        self.bullets.push(Bullet {
            position: origin,
            velocity: direction * self.config.bullet_speed,
            lifetime: self.config.lifetime,
        });
        self.cooldown = self.config.cooldown;
        true
    }

    /// One frame: tick the cooldown, move bullets, expire the ones whose
    /// lifetime ran out.
    pub fn advance(&mut self) {
        self.cooldown = self.cooldown.saturating_sub(1);
        for bullet in &mut self.bullets {
            bullet.position += bullet.velocity;
            bullet.lifetime -= 1;
        }
        self.bullets.retain(|b| b.lifetime > 0);
    }

    /// Brute-force bullet vs enemy test at post-move positions.
    ///
    /// Bullets are checked in fire order against enemies in spawn order; a
    /// bullet is consumed by the first live enemy it intersects, with no
    /// nearest-first tie-break. Kills are marked on the enemy and scored here;
    /// removal from the swarm is left to the caller.
    pub fn resolve_hits(&mut self, enemies: &mut [Enemy], score: &mut Score) -> HitReport {
        let mut report = HitReport::default();
        self.bullets.retain(|bullet| {
            let Some(enemy) = enemies
                .iter_mut()
                .find(|e| !e.dead && e.contains(bullet.position))
            else {
                return true;
            };
            report.hits += 1;
            if enemy.take_hit() {
                report.kills += 1;
                score.award_kill();
            }
            false
        });
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enemy::EnemySwarm;
    use crate::rng::SplitMix64;
    use pasture_common::EnemyConfig;

    fn gun() -> Gun {
        Gun::new(GunConfig {
            cooldown: 5,
            bullet_speed: 0.5,
            lifetime: 8,
            muzzle_offset: 0.0,
        })
    }

    #[test]
    fn lifetime_decreases_by_one_per_frame() {
        let mut g = gun();
        assert!(g.fire(Vec3::ZERO, Vec3::X));
        let mut last = g.bullets()[0].lifetime;
        while let Some(b) = g.bullets().first().copied() {
            assert!(b.lifetime > 0);
            g.advance();
            if let Some(next) = g.bullets().first() {
                assert_eq!(next.lifetime, last - 1);
                last = next.lifetime;
            }
        }
    }

    #[test]
    fn bullet_lives_exactly_its_lifetime() {
        let mut g = gun();
        g.fire(Vec3::ZERO, Vec3::X);
        let mut frames_present = 0;
        while !g.bullets().is_empty() {
            frames_present += 1;
            g.advance();
        }
        assert_eq!(frames_present, 8);
    }

    #[test]
    fn bullets_move_by_velocity() {
        let mut g = gun();
        g.fire(Vec3::new(1.0, 2.0, 3.0), Vec3::Z);
        g.advance();
        g.advance();
        assert_eq!(g.bullets()[0].position, Vec3::new(1.0, 2.0, 4.0));
    }

    #[test]
    fn cooldown_blocks_rapid_fire() {
        let mut g = gun();
        assert!(g.fire(Vec3::ZERO, Vec3::X));
        for _ in 0..5 {
            assert!(!g.fire(Vec3::ZERO, Vec3::X));
            g.advance();
        }
        assert!(g.fire(Vec3::ZERO, Vec3::X));
        assert_eq!(g.bullets().len(), 2);
    }

    fn swarm_with_one(rng: &mut SplitMix64) -> EnemySwarm {
        let mut swarm = EnemySwarm::new(EnemyConfig::default(), 32.0, 32.0);
        assert!(swarm.spawn(rng));
        swarm
    }

    #[test]
    fn enemy_dies_after_two_hits_and_scores_once() {
        let mut rng = SplitMix64::new(4);
        let mut swarm = swarm_with_one(&mut rng);
        let mut score = Score::new(10);
        let mut g = gun();
        let target = swarm.enemies()[0].position;

        g.fire(target, Vec3::X);
        let first = g.resolve_hits(swarm.enemies_mut(), &mut score);
        assert_eq!(first, HitReport { hits: 1, kills: 0 });
        assert!(!swarm.enemies()[0].dead);
        assert_eq!(score.points, 0);
        assert!(g.bullets().is_empty());

        for _ in 0..5 {
            g.advance();
        }
        g.fire(target, Vec3::X);
        let second = g.resolve_hits(swarm.enemies_mut(), &mut score);
        assert_eq!(second, HitReport { hits: 1, kills: 1 });
        assert!(swarm.enemies()[0].dead);
        assert_eq!(score.points, 10);
        assert_eq!(score.kills, 1);
    }

    #[test]
    fn bullet_hits_only_first_enemy_in_order() {
        let mut rng = SplitMix64::new(9);
        let mut swarm = swarm_with_one(&mut rng);
        swarm.spawn(&mut rng);
        let shared = Vec3::new(10.0, 1.0, 10.0);
        for e in swarm.enemies_mut() {
            e.position = shared;
        }
        let mut score = Score::new(10);
        let mut g = gun();
        g.fire(shared, Vec3::X);
        g.resolve_hits(swarm.enemies_mut(), &mut score);
        assert_eq!(swarm.enemies()[0].health, 1);
        assert_eq!(swarm.enemies()[1].health, 2);
    }

    #[test]
    fn misses_keep_bullets_alive() {
        let mut rng = SplitMix64::new(9);
        let mut swarm = swarm_with_one(&mut rng);
        let mut score = Score::new(10);
        let mut g = gun();
        g.fire(swarm.enemies()[0].position + Vec3::new(50.0, 0.0, 0.0), Vec3::X);
        let report = g.resolve_hits(swarm.enemies_mut(), &mut score);
        assert_eq!(report, HitReport::default());
        assert_eq!(g.bullets().len(), 1);
    }

    #[test]
    fn dead_enemies_do_not_absorb_bullets() {
        let mut rng = SplitMix64::new(6);
        let mut swarm = swarm_with_one(&mut rng);
        swarm.enemies_mut()[0].dead = true;
        let mut score = Score::new(10);
        let mut g = gun();
        g.fire(swarm.enemies()[0].position, Vec3::X);
        assert_eq!(g.resolve_hits(swarm.enemies_mut(), &mut score).hits, 0);
        assert_eq!(g.bullets().len(), 1);
    }
}
