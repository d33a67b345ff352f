use glam::Mat4;
use pasture_common::{Material, TextureId};

use crate::batch::CubeBatch;

/// Sink for one frame's draw calls.
///
/// Implementations receive the view exactly once per frame, before any draw.
pub trait DrawBackend {
    /// Upload the combined view-projection transform for this frame.
    fn upload_view(&mut self, view_proj: Mat4);

    /// Draw a whole static batch in one call, with an identity model transform.
    fn draw_batch(&mut self, batch: &CubeBatch);

    /// Draw one unit cube transformed by `model`.
    fn draw_part(&mut self, model: Mat4, material: Material);
}

impl<B: DrawBackend + ?Sized> DrawBackend for &mut B {
    fn upload_view(&mut self, view_proj: Mat4) {
        (**self).upload_view(view_proj);
    }

    fn draw_batch(&mut self, batch: &CubeBatch) {
        (**self).draw_batch(batch);
    }

    fn draw_part(&mut self, model: Mat4, material: Material) {
        (**self).draw_part(model, material);
    }
}

/// A draw call as seen by [`RecordingBackend`].
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCall {
    View(Mat4),
    Batch {
        texture: TextureId,
        vertices: usize,
        generation: u64,
    },
    Part {
        model: Mat4,
        material: Material,
    },
}

/// Backend that records calls instead of drawing. Used headless and in tests.
#[derive(Debug, Default)]
pub struct RecordingBackend {
    calls: Vec<DrawCall>,
}

impl RecordingBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> &[DrawCall] {
        &self.calls
    }

    /// Forget recorded calls, keeping the allocation for the next frame.
    pub fn clear(&mut self) {
        self.calls.clear();
    }

    pub fn batch_vertices(&self) -> usize {
        self.calls
            .iter()
            .map(|c| match c {
                DrawCall::Batch { vertices, .. } => *vertices,
                _ => 0,
            })
            .sum()
    }

    pub fn view_uploads(&self) -> usize {
        self.calls
            .iter()
            .filter(|c| matches!(c, DrawCall::View(_)))
            .count()
    }

    /// Calls that would reach the GPU as draws.
    pub fn draw_calls(&self) -> usize {
        self.calls.len() - self.view_uploads()
    }
}

impl DrawBackend for RecordingBackend {
    fn upload_view(&mut self, view_proj: Mat4) {
        self.calls.push(DrawCall::View(view_proj));
    }

    fn draw_batch(&mut self, batch: &CubeBatch) {
        self.calls.push(DrawCall::Batch {
            texture: batch.texture(),
            vertices: batch.vertex_count(),
            generation: batch.generation(),
        });
    }

    fn draw_part(&mut self, model: Mat4, material: Material) {
        self.calls.push(DrawCall::Part { model, material });
    }
}
