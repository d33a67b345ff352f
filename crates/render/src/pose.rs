//! Hierarchical part transforms for the animated actors.
//!
//! Every actor owns a fixed [`PoseArena`] whose slots are overwritten each
//! frame. Limbs are built by extending one running transform from the joint
//! outwards, so a child segment always inherits its parent's rotation.

use glam::{Mat4, Quat, Vec3};
use pasture_common::Material;
use pasture_kernel::{Enemy, Sheep};

use crate::backend::DrawBackend;

/// Fixed pool of part transforms, indexed by part slot.
#[derive(Debug, Clone)]
pub struct PoseArena<const N: usize> {
    models: [Mat4; N],
    materials: [Material; N],
}

impl<const N: usize> PoseArena<N> {
    pub fn new() -> Self {
        Self {
            models: [Mat4::IDENTITY; N],
            materials: [Material::Wool; N],
        }
    }

    /// Return every slot to identity without touching the allocation.
    pub fn reset(&mut self) {
        self.models.fill(Mat4::IDENTITY);
    }

    pub fn set(&mut self, slot: usize, model: Mat4, material: Material) {
        self.models[slot] = model;
        self.materials[slot] = material;
    }

    pub fn get(&self, slot: usize) -> (Mat4, Material) {
        (self.models[slot], self.materials[slot])
    }

    pub fn len(&self) -> usize {
        N
    }

    pub fn is_empty(&self) -> bool {
        N == 0
    }

    /// One draw call per part.
    pub fn draw(&self, backend: &mut impl DrawBackend) {
        for (model, material) in self.models.iter().zip(&self.materials) {
            backend.draw_part(*model, *material);
        }
    }
}

impl<const N: usize> Default for PoseArena<N> {
    fn default() -> Self {
        Self::new()
    }
}

/// Joint angles for one side of a body, radians.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct JointAngles {
    pub shoulder: f32,
    pub elbow: f32,
    pub hip: f32,
    pub knee: f32,
    pub tail: f32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Gait {
    pub right: JointAngles,
    pub left: JointAngles,
}

const SWING: f32 = 0.5;
const BEND: f32 = 0.4;
const WAG: f32 = 0.35;

/// Walk cycle as a pure function of phase. The left side swings exactly
/// opposite the right.
pub fn gait(phase: f32) -> Gait {
    let (s, c) = phase.sin_cos();
    let tail = WAG * (2.0 * phase).sin();
    let right = JointAngles {
        shoulder: SWING * s,
        elbow: BEND * c.max(0.0),
        hip: -SWING * s,
        knee: BEND * (-c).max(0.0),
        tail,
    };
    let left = JointAngles {
        shoulder: -right.shoulder,
        elbow: right.knee,
        hip: -right.hip,
        knee: right.elbow,
        tail,
    };
    Gait { right, left }
}

/// Box segment hanging down from the running transform's origin.
fn hanging(running: Mat4, length: f32, thickness: f32) -> Mat4 {
    running
        * Mat4::from_translation(Vec3::new(0.0, -length * 0.5, 0.0))
        * Mat4::from_scale(Vec3::new(thickness, length, thickness))
}

/// Two-segment limb from a pivot. Returns `(upper, lower, end)` where `end`
/// is the running transform at the tip of the lower segment.
fn limb(
    parent: Mat4,
    pivot: Vec3,
    swing: f32,
    bend: f32,
    upper_len: f32,
    lower_len: f32,
    thickness: f32,
) -> (Mat4, Mat4, Mat4) {
    let mut running = parent * Mat4::from_translation(pivot) * Mat4::from_rotation_z(swing);
    let upper = hanging(running, upper_len, thickness);

    running = running
        * Mat4::from_translation(Vec3::new(0.0, -upper_len, 0.0))
        * Mat4::from_rotation_z(bend);
    let lower = hanging(running, lower_len, thickness * 0.9);

    running *= Mat4::from_translation(Vec3::new(0.0, -lower_len, 0.0));
    (upper, lower, running)
}

pub mod sheep_part {
    pub const BODY: usize = 0;
    pub const HEAD: usize = 1;
    pub const TAIL: usize = 2;
    /// Upper then lower segment per leg: front right, front left, hind right,
    /// hind left.
    pub const LEGS: usize = 3;
    pub const COUNT: usize = 11;
}

const SHEEP_LEG_X: f32 = 0.35;
const SHEEP_LEG_Z: f32 = 0.2;
const SHEEP_HIP_Y: f32 = 0.5;
const SHEEP_SEGMENT: f32 = 0.25;

#[derive(Debug, Clone, Default)]
pub struct SheepPoser {
    arena: PoseArena<{ sheep_part::COUNT }>,
}

impl SheepPoser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fill the arena for one sheep. Local +X is the walking direction.
    pub fn pose(&mut self, sheep: &Sheep) -> &PoseArena<{ sheep_part::COUNT }> {
        use sheep_part::*;

        let g = gait(sheep.gait_phase);
        let root = Mat4::from_translation(sheep.position)
            * Mat4::from_rotation_y(-sheep.heading.to_radians());
        let arena = &mut self.arena;
        arena.reset();

        arena.set(
            BODY,
            root * Mat4::from_translation(Vec3::new(0.0, 0.75, 0.0))
                * Mat4::from_scale(Vec3::new(1.0, 0.6, 0.6)),
            Material::Wool,
        );
        arena.set(
            HEAD,
            root * Mat4::from_translation(Vec3::new(0.6, 0.95, 0.0))
                * Mat4::from_scale(Vec3::new(0.35, 0.35, 0.35)),
            Material::SheepSkin,
        );
        arena.set(
            TAIL,
            root * Mat4::from_translation(Vec3::new(-0.5, 0.85, 0.0))
                * Mat4::from_rotation_z(g.right.tail)
                * Mat4::from_translation(Vec3::new(-0.1, 0.0, 0.0))
                * Mat4::from_scale(Vec3::new(0.2, 0.12, 0.12)),
            Material::Wool,
        );

        let legs = [
            (SHEEP_LEG_X, -SHEEP_LEG_Z, g.right.shoulder, g.right.elbow),
            (SHEEP_LEG_X, SHEEP_LEG_Z, g.left.shoulder, g.left.elbow),
            (-SHEEP_LEG_X, -SHEEP_LEG_Z, g.right.hip, g.right.knee),
            (-SHEEP_LEG_X, SHEEP_LEG_Z, g.left.hip, g.left.knee),
        ];
        for (i, (x, z, swing, bend)) in legs.into_iter().enumerate() {
            let (upper, lower, _) = limb(
                root,
                Vec3::new(x, SHEEP_HIP_Y, z),
                swing,
                bend,
                SHEEP_SEGMENT,
                SHEEP_SEGMENT,
                0.15,
            );
            arena.set(LEGS + 2 * i, upper, Material::SheepSkin);
            arena.set(LEGS + 2 * i + 1, lower, Material::SheepSkin);
        }
        &self.arena
    }

    pub fn draw(&mut self, sheep: &Sheep, backend: &mut impl DrawBackend) {
        self.pose(sheep).draw(backend);
    }
}

pub mod enemy_part {
    pub const BODY: usize = 0;
    pub const FACE: usize = 1;
    /// Upper arm, forearm, hand per side: right then left.
    pub const ARMS: usize = 2;
    /// Upper then lower segment per side: right then left.
    pub const LEGS: usize = 8;
    pub const COUNT: usize = 12;
}

#[derive(Debug, Clone, Default)]
pub struct EnemyPoser {
    arena: PoseArena<{ enemy_part::COUNT }>,
}

impl EnemyPoser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fill the arena for one enemy turned to face `target`. Body material
    /// follows the health tier only.
    pub fn pose(
        &mut self,
        enemy: &Enemy,
        target: Vec3,
        full_health: u32,
    ) -> &PoseArena<{ enemy_part::COUNT }> {
        use enemy_part::*;

        let facing = (target.z - enemy.position.z).atan2(target.x - enemy.position.x);
        let root = Mat4::from_scale_rotation_translation(
            Vec3::splat(enemy.scale),
            Quat::from_rotation_y(-facing),
            enemy.position,
        );
        let skin = if enemy.wounded(full_health) {
            Material::EnemyWounded
        } else {
            Material::EnemyHealthy
        };
        let g = gait(enemy.phase);
        let arena = &mut self.arena;
        arena.reset();

        arena.set(
            BODY,
            root * Mat4::from_scale(Vec3::new(0.8, 0.9, 0.6)),
            skin,
        );
        arena.set(
            FACE,
            root * Mat4::from_translation(Vec3::new(0.42, 0.15, 0.0))
                * Mat4::from_scale(Vec3::new(0.04, 0.35, 0.45)),
            Material::EnemyFace,
        );

        let arms = [(-0.4, g.right), (0.4, g.left)];
        for (i, (z, joints)) in arms.into_iter().enumerate() {
            let (upper, forearm, wrist) = limb(
                root,
                Vec3::new(0.0, 0.35, z),
                joints.shoulder,
                joints.elbow,
                0.35,
                0.3,
                0.14,
            );
            let hand = wrist * Mat4::from_scale(Vec3::splat(0.12));
            let base = ARMS + 3 * i;
            arena.set(base, upper, skin);
            arena.set(base + 1, forearm, skin);
            arena.set(base + 2, hand, Material::EnemyFace);
        }

        let legs = [(-0.18, g.right), (0.18, g.left)];
        for (i, (z, joints)) in legs.into_iter().enumerate() {
            let (upper, lower, _) = limb(
                root,
                Vec3::new(0.0, -0.45, z),
                joints.hip,
                joints.knee,
                0.3,
                0.25,
                0.18,
            );
            arena.set(LEGS + 2 * i, upper, skin);
            arena.set(LEGS + 2 * i + 1, lower, skin);
        }
        &self.arena
    }

    pub fn draw(
        &mut self,
        enemy: &Enemy,
        target: Vec3,
        full_health: u32,
        backend: &mut impl DrawBackend,
    ) {
        self.pose(enemy, target, full_health).draw(backend);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{DrawCall, RecordingBackend};
    use pasture_common::EnemyConfig;
    use pasture_kernel::{EnemySwarm, SplitMix64};

    fn sheep(phase: f32) -> Sheep {
        Sheep {
            position: Vec3::new(4.0, 0.0, 7.0),
            heading: 35.0,
            gait_phase: phase,
        }
    }

    fn enemy() -> Enemy {
        let mut swarm = EnemySwarm::new(EnemyConfig::default(), 32.0, 32.0);
        let mut rng = SplitMix64::new(12);
        swarm.spawn(&mut rng);
        swarm.enemies()[0].clone()
    }

    fn models<const N: usize>(arena: &PoseArena<N>) -> Vec<[f32; 16]> {
        (0..N).map(|i| arena.get(i).0.to_cols_array()).collect()
    }

    #[test]
    fn gait_left_mirrors_right() {
        for k in 0..64 {
            let g = gait(k as f32 * 0.37);
            assert_eq!(g.left.shoulder, -g.right.shoulder);
            assert_eq!(g.left.hip, -g.right.hip);
            assert_eq!(g.left.tail, g.right.tail);
            assert!(g.right.elbow >= 0.0 && g.left.elbow >= 0.0);
        }
    }

    #[test]
    fn identical_phase_gives_identical_pose() {
        let mut a = SheepPoser::new();
        let mut b = SheepPoser::new();
        let first = models(a.pose(&sheep(1.234)));
        // Disturb `a` with another phase before posing again.
        a.pose(&sheep(4.0));
        let again = models(a.pose(&sheep(1.234)));
        let other = models(b.pose(&sheep(1.234)));
        assert_eq!(first, again);
        assert_eq!(first, other);
    }

    #[test]
    fn forearm_starts_where_upper_arm_ends() {
        let mut poser = EnemyPoser::new();
        let e = enemy();
        let arena = poser.pose(&e, Vec3::new(16.0, 1.5, 16.0), 2);
        for side in 0..2 {
            let base = enemy_part::ARMS + 3 * side;
            let (upper, _) = arena.get(base);
            let (forearm, _) = arena.get(base + 1);
            let elbow = upper.transform_point3(Vec3::new(0.0, -0.5, 0.0));
            let top = forearm.transform_point3(Vec3::new(0.0, 0.5, 0.0));
            assert!(elbow.distance(top) < 1e-4, "{elbow} vs {top}");
        }
    }

    #[test]
    fn sheep_lower_leg_follows_upper_leg() {
        let mut poser = SheepPoser::new();
        let arena = poser.pose(&sheep(0.8));
        for leg in 0..4 {
            let (upper, _) = arena.get(sheep_part::LEGS + 2 * leg);
            let (lower, _) = arena.get(sheep_part::LEGS + 2 * leg + 1);
            let knee = upper.transform_point3(Vec3::new(0.0, -0.5, 0.0));
            let top = lower.transform_point3(Vec3::new(0.0, 0.5, 0.0));
            assert!(knee.distance(top) < 1e-4);
        }
    }

    #[test]
    fn standing_sheep_feet_touch_ground() {
        // Phase 0 with the hind knee straight and the front legs vertical.
        let mut poser = SheepPoser::new();
        let arena = poser.pose(&sheep(0.0));
        let (front_right_lower, _) = arena.get(sheep_part::LEGS + 1);
        let (hind_right_lower, _) = arena.get(sheep_part::LEGS + 5);
        let foot = hind_right_lower.transform_point3(Vec3::new(0.0, -0.5, 0.0));
        assert!(foot.y.abs() < 1e-5);
        let bent = front_right_lower.transform_point3(Vec3::new(0.0, -0.5, 0.0));
        assert!(bent.y > 0.0);
    }

    #[test]
    fn head_points_along_heading() {
        let mut poser = SheepPoser::new();
        let s = sheep(0.0);
        let arena = poser.pose(&s);
        let head = arena.get(sheep_part::HEAD).0.transform_point3(Vec3::ZERO);
        let offset = Vec3::new(head.x - s.position.x, 0.0, head.z - s.position.z);
        assert!(offset.normalize().dot(s.direction()) > 0.999);
    }

    #[test]
    fn enemy_material_follows_health_tier() {
        let mut poser = EnemyPoser::new();
        let mut e = enemy();
        let target = Vec3::new(16.0, 1.5, 16.0);
        assert_eq!(poser.pose(&e, target, 2).get(enemy_part::BODY).1, Material::EnemyHealthy);
        e.phase += 1.0;
        assert_eq!(poser.pose(&e, target, 2).get(enemy_part::BODY).1, Material::EnemyHealthy);
        e.take_hit();
        let arena = poser.pose(&e, target, 2);
        assert_eq!(arena.get(enemy_part::BODY).1, Material::EnemyWounded);
        assert_eq!(arena.get(enemy_part::FACE).1, Material::EnemyFace);
    }

    #[test]
    fn one_draw_per_part() {
        let mut backend = RecordingBackend::new();
        SheepPoser::new().draw(&sheep(0.3), &mut backend);
        assert_eq!(backend.draw_calls(), sheep_part::COUNT);
        EnemyPoser::new().draw(&enemy(), Vec3::ZERO, 2, &mut backend);
        assert_eq!(backend.draw_calls(), sheep_part::COUNT + enemy_part::COUNT);
        assert!(backend
            .calls()
            .iter()
            .all(|c| matches!(c, DrawCall::Part { .. })));
    }
}
