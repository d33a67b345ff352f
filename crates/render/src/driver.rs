use std::time::Instant;

use glam::{Mat4, Vec3};
use pasture_common::{Material, SimConfig};
use pasture_kernel::{AudioSink, Controls, Simulation};

use crate::backend::DrawBackend;
use crate::batch::CubeBatch;
use crate::pose::{EnemyPoser, SheepPoser};
use crate::scene::StaticScene;
use crate::stats::{FrameStats, FrameTimer};

const BULLET_SIZE: f32 = 0.12;

/// Wraps a backend and tallies what passes through it.
struct Counting<'a, B: DrawBackend + ?Sized> {
    inner: &'a mut B,
    stats: FrameStats,
}

impl<B: DrawBackend + ?Sized> DrawBackend for Counting<'_, B> {
    fn upload_view(&mut self, view_proj: Mat4) {
        self.stats.view_uploads += 1;
        self.inner.upload_view(view_proj);
    }

    fn draw_batch(&mut self, batch: &CubeBatch) {
        self.stats.draw_calls += 1;
        self.stats.batch_vertices += batch.vertex_count();
        self.inner.draw_batch(batch);
    }

    fn draw_part(&mut self, model: Mat4, material: Material) {
        self.stats.draw_calls += 1;
        self.stats.part_draws += 1;
        self.inner.draw_part(model, material);
    }
}

/// Issues one frame's draw calls from simulation state. Never mutates it.
#[derive(Debug, Default)]
pub struct FrameRenderer {
    sheep: SheepPoser,
    enemies: EnemyPoser,
}

impl FrameRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Upload the view once, then draw static batches, sheep, enemies and
    /// bullets. Uses the view cached by the last `Camera::update_view`.
    pub fn render<B: DrawBackend + ?Sized>(
        &mut self,
        sim: &Simulation,
        scene: &StaticScene,
        backend: &mut B,
    ) -> FrameStats {
        let _span = tracing::info_span!("render_frame", frame = sim.frame()).entered();
        let mut out = Counting {
            inner: backend,
            stats: FrameStats::default(),
        };

        out.upload_view(sim.camera().view_projection());
        scene.draw(&mut out);

        for sheep in sim.flock().sheep() {
            self.sheep.draw(sheep, &mut out);
        }

        let target = sim.camera().position;
        let full_health = sim.swarm().config().health;
        for enemy in sim.swarm().enemies() {
            self.enemies.draw(enemy, target, full_health, &mut out);
        }

        for bullet in sim.gun().bullets() {
            let model = Mat4::from_translation(bullet.position)
                * Mat4::from_scale(Vec3::splat(BULLET_SIZE));
            out.draw_part(model, Material::Bullet);
        }

        out.stats
    }
}

/// Owns the simulation and the static scene, and runs the fixed
/// update-then-render order once per host frame.
#[derive(Debug)]
pub struct FrameDriver {
    sim: Simulation,
    scene: StaticScene,
    renderer: FrameRenderer,
    timer: FrameTimer,
    last_tick: Option<Instant>,
}

impl FrameDriver {
    pub fn new(config: SimConfig, seed: u64) -> Self {
        Self::with_simulation(Simulation::new(config, seed))
    }

    pub fn with_simulation(sim: Simulation) -> Self {
        Self {
            sim,
            scene: StaticScene::new(),
            renderer: FrameRenderer::new(),
            timer: FrameTimer::default(),
            last_tick: None,
        }
    }

    pub fn sim(&self) -> &Simulation {
        &self.sim
    }

    /// Input handlers reach the camera through here; they may only change
    /// its numeric state.
    pub fn sim_mut(&mut self) -> &mut Simulation {
        &mut self.sim
    }

    pub fn scene(&self) -> &StaticScene {
        &self.scene
    }

    pub fn timer(&self) -> &FrameTimer {
        &self.timer
    }

    pub fn set_aspect(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.sim.camera_mut().aspect = width as f32 / height as f32;
        }
    }

    /// One host frame: step, flush audio, rebake batches if the field
    /// changed, synthesize the view, render.
    pub fn tick<B: DrawBackend + ?Sized>(
        &mut self,
        controls: &Controls,
        backend: &mut B,
        audio: &mut impl AudioSink,
    ) -> FrameStats {
        let now = Instant::now();
        if let Some(last) = self.last_tick.replace(now) {
            self.timer.record(now - last);
        }

        self.sim.step(controls);

        for cue in self.sim.drain_cues() {
            audio.play_sound(cue);
        }
        audio.tick_walk_sound(self.sim.is_moving());

        let rebuilt = self.sim.field().needs_rebuild();
        if rebuilt {
            self.scene.rebuild_batches(self.sim.field());
            self.sim.field_mut().mark_rebuilt();
        }

        self.sim.camera_mut().update_view();

        let mut stats = self.renderer.render(&self.sim, &self.scene, backend);
        stats.rebuilt = rebuilt;
        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{DrawCall, RecordingBackend};
    use crate::pose::{enemy_part, sheep_part};
    use pasture_kernel::{NullAudio, SoundCue};

    #[derive(Default)]
    struct CaptureAudio {
        cues: Vec<SoundCue>,
        walking: Vec<bool>,
    }

    impl AudioSink for CaptureAudio {
        fn play_sound(&mut self, cue: SoundCue) {
            self.cues.push(cue);
        }

        fn tick_walk_sound(&mut self, is_moving: bool) {
            self.walking.push(is_moving);
        }
    }

    fn driver() -> FrameDriver {
        FrameDriver::new(SimConfig::default(), 21)
    }

    #[test]
    fn view_is_synthesized_once_per_tick() {
        let mut d = driver();
        let mut backend = RecordingBackend::new();
        let controls = Controls {
            forward: true,
            pan_left: true,
            ..Controls::default()
        };
        for frame in 1..=30u64 {
            backend.clear();
            let stats = d.tick(&controls, &mut backend, &mut NullAudio);
            assert_eq!(d.sim().camera().view_updates(), frame);
            assert_eq!(stats.view_uploads, 1);
            assert_eq!(backend.view_uploads(), 1);
            assert!(matches!(backend.calls()[0], DrawCall::View(_)));
        }
    }

    #[test]
    fn mouse_look_between_frames_does_not_touch_view() {
        let mut d = driver();
        let mut backend = RecordingBackend::new();
        d.tick(&Controls::default(), &mut backend, &mut NullAudio);
        let view = d.sim().camera().view();
        for _ in 0..500 {
            d.sim_mut().camera_mut().mouse_rotate(1.0, 0.5);
        }
        assert_eq!(d.sim().camera().view(), view);
        assert_eq!(d.sim().camera().view_updates(), 1);
    }

    #[test]
    fn draw_calls_are_bounded_by_scene_content() {
        let mut d = driver();
        let mut backend = RecordingBackend::new();
        let controls = Controls {
            fire: true,
            ..Controls::default()
        };
        for _ in 0..400 {
            backend.clear();
            let stats = d.tick(&controls, &mut backend, &mut NullAudio);
            let sim = d.sim();
            let bound = 3
                + sheep_part::COUNT * sim.flock().sheep().len()
                + enemy_part::COUNT * sim.swarm().len()
                + sim.gun().bullets().len();
            assert_eq!(stats.draw_calls as usize, bound);
            assert_eq!(backend.draw_calls(), bound);
        }
    }

    #[test]
    fn batches_rebuild_only_after_edits() {
        let mut d = driver();
        let mut backend = RecordingBackend::new();
        let idle = Controls::default();
        assert!(d.tick(&idle, &mut backend, &mut NullAudio).rebuilt);
        for _ in 0..10 {
            assert!(!d.tick(&idle, &mut backend, &mut NullAudio).rebuilt);
        }

        let before = d.scene().vertex_count();
        let place = Controls {
            place_block: true,
            ..Controls::default()
        };
        let stats = d.tick(&place, &mut backend, &mut NullAudio);
        assert!(stats.rebuilt);
        assert!(d.scene().vertex_count() > before);
        assert!(!d.tick(&idle, &mut backend, &mut NullAudio).rebuilt);
    }

    #[test]
    fn cues_and_walk_level_reach_audio() {
        let mut d = driver();
        let mut backend = RecordingBackend::new();
        let mut audio = CaptureAudio::default();
        let controls = Controls {
            forward: true,
            fire: true,
            ..Controls::default()
        };
        d.tick(&controls, &mut backend, &mut audio);
        d.tick(&Controls::default(), &mut backend, &mut audio);
        assert!(audio.cues.contains(&SoundCue::Shoot));
        assert_eq!(audio.walking, vec![true, false]);
        assert!(d.sim().cues().is_empty());
    }

    #[test]
    fn aspect_ignores_zero_sized_windows() {
        let mut d = driver();
        d.set_aspect(1600, 800);
        assert_eq!(d.sim().camera().aspect, 2.0);
        d.set_aspect(0, 800);
        assert_eq!(d.sim().camera().aspect, 2.0);
    }
}
