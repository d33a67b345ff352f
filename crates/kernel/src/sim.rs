use glam::Vec3;
use pasture_common::SimConfig;

use crate::audio::SoundCue;
use crate::camera::{Camera, look_direction};
use crate::enemy::EnemySwarm;
use crate::field::BlockField;
use crate::flock::Flock;
use crate::gun::{Gun, Score};
use crate::rng::SplitMix64;

/// Control levels sampled once per frame.
///
/// Movement and pan flags are held-key levels; the remaining flags are
/// one-shot requests consumed by the step that reads them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Controls {
    pub forward: bool,
    pub backward: bool,
    pub left: bool,
    pub right: bool,
    pub pan_left: bool,
    pub pan_right: bool,
    pub jump: bool,
    pub fire: bool,
    pub place_block: bool,
    pub remove_block: bool,
}

/// All gameplay state for one session, owned by the frame driver.
///
/// [`Simulation::step`] is the only writer besides the camera's numeric
/// mutators, which input handlers may call between frames.
#[derive(Debug, Clone)]
pub struct Simulation {
    config: SimConfig,
    camera: Camera,
    gun: Gun,
    swarm: EnemySwarm,
    flock: Flock,
    field: BlockField,
    score: Score,
    health: f32,
    frame: u64,
    rng: SplitMix64,
    moving: bool,
    cues: Vec<SoundCue>,
}

impl Simulation {
    pub fn new(config: SimConfig, seed: u64) -> Self {
        let mut rng = SplitMix64::new(seed);
        let width = config.field.width as f32;
        let depth = config.field.depth as f32;
        let flock = Flock::new(&config.flock, width, depth, &mut rng);
        Self {
            camera: Camera::new(&config.camera),
            gun: Gun::new(config.gun.clone()),
            swarm: EnemySwarm::new(config.enemies.clone(), width, depth),
            flock,
            field: BlockField::new(&config.field),
            score: Score::new(config.enemies.score_per_kill),
            health: config.player.health,
            frame: 0,
            rng,
            moving: false,
            cues: Vec::new(),
            config,
        }
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    /// Numeric camera access for input handlers and the frame driver.
    pub fn camera_mut(&mut self) -> &mut Camera {
        &mut self.camera
    }

    pub fn gun(&self) -> &Gun {
        &self.gun
    }

    pub fn swarm(&self) -> &EnemySwarm {
        &self.swarm
    }

    pub fn swarm_mut(&mut self) -> &mut EnemySwarm {
        &mut self.swarm
    }

    pub fn flock(&self) -> &Flock {
        &self.flock
    }

    pub fn field(&self) -> &BlockField {
        &self.field
    }

    pub fn field_mut(&mut self) -> &mut BlockField {
        &mut self.field
    }

    pub fn score(&self) -> Score {
        self.score
    }

    pub fn health(&self) -> f32 {
        self.health
    }

    /// Health has run out. Play continues; this only feeds the HUD.
    pub fn downed(&self) -> bool {
        self.health <= 0.0
    }

    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Whether the player walked on the ground during the last step.
    pub fn is_moving(&self) -> bool {
        self.moving
    }

    /// Take the sound cues raised since the last drain.
    pub fn drain_cues(&mut self) -> Vec<SoundCue> {
        std::mem::take(&mut self.cues)
    }

    pub fn cues(&self) -> &[SoundCue] {
        &self.cues
    }

    /// Advance one frame. Order: controls, gravity, projectiles, enemy AI,
    /// hit resolution, dead-enemy removal. Does not touch the view matrix.
    pub fn step(&mut self, controls: &Controls) {
        let _span = tracing::info_span!("sim_step", frame = self.frame).entered();
        self.frame += 1;

        self.apply_movement(controls);
        self.apply_actions(controls);

        let floor = self.camera.ground_y() + self.field.height_under(self.camera.position) as f32;
        self.camera.apply_gravity(floor);

        self.gun.advance();

        self.swarm.tick_spawner(&mut self.rng);
        let contact = self.swarm.advance(self.camera.position);
        if contact.damage > 0.0 {
            self.health = (self.health - contact.damage).max(0.0);
        }
        if contact.entered > 0 {
            self.cues.push(SoundCue::Hurt);
        }
        self.flock.advance(&mut self.rng);

        let report = self
            .gun
            .resolve_hits(self.swarm.enemies_mut(), &mut self.score);
        for _ in 0..report.hits - report.kills {
            self.cues.push(SoundCue::Hit);
        }
        for _ in 0..report.kills {
            self.cues.push(SoundCue::Kill);
        }
        let removed = self.swarm.remove_dead();
        if removed > 0 {
            tracing::info!(
                removed,
                score = self.score.points,
                alive = self.swarm.len(),
                "enemies killed"
            );
        }
    }

    fn apply_movement(&mut self, c: &Controls) {
        let before = self.camera.position;
        if c.forward {
            self.camera.move_forward();
        }
        if c.backward {
            self.camera.move_backward();
        }
        if c.left {
            self.camera.move_left();
        }
        if c.right {
            self.camera.move_right();
        }
        if c.pan_left {
            self.camera.pan_left();
        }
        if c.pan_right {
            self.camera.pan_right();
        }
        self.moving = self.camera.grounded() && self.camera.position != before;
    }

    fn apply_actions(&mut self, c: &Controls) {
        if c.jump && self.camera.jump() {
            self.cues.push(SoundCue::Jump);
        }

        if c.fire {
            let direction = look_direction(self.camera.yaw(), self.camera.pitch());
            let origin = self.camera.position + direction * self.gun.config().muzzle_offset;
            if self.gun.fire(origin, direction) {
                self.cues.push(SoundCue::Shoot);
            }
        }

        if c.place_block || c.remove_block {
            let target = self.edit_target();
            let Some((col, row)) = self.field.cell_at(target) else {
                return;
            };
            if c.place_block && self.field.add_block(col, row) {
                self.cues.push(SoundCue::BlockPlace);
            }
            if c.remove_block && self.field.remove_block(col, row) {
                self.cues.push(SoundCue::BlockBreak);
            }
        }
    }

    /// Point `reach` units ahead of the eye along horizontal forward.
    fn edit_target(&self) -> Vec3 {
        self.camera.position + self.camera.flat_forward() * self.config.field.reach
    }

    /// FNV-1a over everything a step can change, for replay comparison.
    pub fn state_hash(&self) -> u64 {
        let mut h = Fnv::default();
        h.write(&self.frame.to_le_bytes());
        h.write(&self.rng.state().to_le_bytes());
        h.vec3(self.camera.position);
        h.f32(self.camera.yaw());
        h.f32(self.camera.pitch());
        h.f32(self.camera.velocity_y());
        h.write(&self.gun.cooldown().to_le_bytes());
        for b in self.gun.bullets() {
            h.vec3(b.position);
            h.write(&b.lifetime.to_le_bytes());
        }
        for e in self.swarm.enemies() {
            h.vec3(e.position);
            h.write(&e.health.to_le_bytes());
            h.f32(e.phase);
        }
        for s in self.flock.sheep() {
            h.vec3(s.position);
            h.f32(s.heading);
            h.f32(s.gait_phase);
        }
        h.write(&self.score.points.to_le_bytes());
        h.f32(self.health);
        for &height in self.field.heights() {
            h.write(&height.to_le_bytes());
        }
        h.0
    }
}

struct Fnv(u64);

impl Default for Fnv {
    fn default() -> Self {
        Self(0xcbf2_9ce4_8422_2325)
    }
}

impl Fnv {
    fn write(&mut self, bytes: &[u8]) {
        for &b in bytes {
            self.0 ^= b as u64;
            self.0 = self.0.wrapping_mul(0x0100_0000_01b3);
        }
    }

    fn f32(&mut self, v: f32) {
        self.write(&v.to_le_bytes());
    }

    fn vec3(&mut self, v: Vec3) {
        for c in v.to_array() {
            self.f32(c);
        }
    }
}
