use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3};
use pasture_common::{Placement, TextureId};

use crate::backend::DrawBackend;

/// Vertices in the unit cube template: 6 faces, 2 triangles each.
pub const CUBE_VERTICES: usize = 36;

/// Interleaved position + UV, world space once baked.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct BatchVertex {
    pub position: [f32; 3],
    pub uv: [f32; 2],
}

/// Corners of each face of a unit cube centered on the origin, wound
/// counter-clockwise seen from outside.
#[rustfmt::skip]
const FACES: [[[f32; 3]; 4]; 6] = [
    [[-0.5, -0.5,  0.5], [ 0.5, -0.5,  0.5], [ 0.5,  0.5,  0.5], [-0.5,  0.5,  0.5]], // +Z
    [[ 0.5, -0.5, -0.5], [-0.5, -0.5, -0.5], [-0.5,  0.5, -0.5], [ 0.5,  0.5, -0.5]], // -Z
    [[ 0.5, -0.5,  0.5], [ 0.5, -0.5, -0.5], [ 0.5,  0.5, -0.5], [ 0.5,  0.5,  0.5]], // +X
    [[-0.5, -0.5, -0.5], [-0.5, -0.5,  0.5], [-0.5,  0.5,  0.5], [-0.5,  0.5, -0.5]], // -X
    [[-0.5,  0.5,  0.5], [ 0.5,  0.5,  0.5], [ 0.5,  0.5, -0.5], [-0.5,  0.5, -0.5]], // +Y
    [[-0.5, -0.5, -0.5], [ 0.5, -0.5, -0.5], [ 0.5, -0.5,  0.5], [-0.5, -0.5,  0.5]], // -Y
];

const FACE_UVS: [[f32; 2]; 4] = [[0.0, 1.0], [1.0, 1.0], [1.0, 0.0], [0.0, 0.0]];
const FACE_TRIANGLES: [usize; 6] = [0, 1, 2, 2, 3, 0];

/// Many static cuboids sharing one texture, baked into a single vertex list.
///
/// Rebuilt wholesale whenever its placements change; there is no
/// incremental update. `generation` bumps on every build so a GPU backend can
/// tell its uploaded buffer is stale and release it.
#[derive(Debug, Clone)]
pub struct CubeBatch {
    texture: TextureId,
    vertices: Vec<BatchVertex>,
    generation: u64,
}

impl CubeBatch {
    pub fn new(texture: TextureId) -> Self {
        Self {
            texture,
            vertices: Vec::new(),
            generation: 0,
        }
    }

    /// Bake `placements` into a fresh vertex list, discarding the previous one.
    pub fn build(&mut self, placements: &[Placement], texture: TextureId) {
        self.vertices.clear();
        self.vertices.reserve(placements.len() * CUBE_VERTICES);
        self.texture = texture;

        for p in placements {
            for face in &FACES {
                for &corner in &FACE_TRIANGLES {
                    let local = Vec3::from_array(face[corner]);
                    let world = local * p.scale + p.translation;
                    self.vertices.push(BatchVertex {
                        position: world.to_array(),
                        uv: FACE_UVS[corner],
                    });
                }
            }
        }
        self.generation += 1;
    }

    /// One draw call for the whole batch; nothing at all when empty.
    pub fn draw(&self, backend: &mut impl DrawBackend) {
        if self.vertices.is_empty() {
            return;
        }
        backend.draw_batch(self);
    }

    pub fn texture(&self) -> TextureId {
        self.texture
    }

    pub fn vertices(&self) -> &[BatchVertex] {
        &self.vertices
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Positions are pre-baked in world space.
    pub fn model(&self) -> Mat4 {
        Mat4::IDENTITY
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{DrawCall, RecordingBackend};

    fn placements(n: usize) -> Vec<Placement> {
        (0..n)
            .map(|i| Placement::block(i as i32, 0, 0))
            .collect()
    }

    #[test]
    fn vertex_count_is_36_per_placement() {
        let mut batch = CubeBatch::new(TextureId::Crate);
        batch.build(&placements(7), TextureId::Crate);
        assert_eq!(batch.vertex_count(), 36 * 7);

        let mut backend = RecordingBackend::new();
        batch.draw(&mut backend);
        assert_eq!(backend.draw_calls(), 1);
        assert_eq!(backend.batch_vertices(), 252);
    }

    #[test]
    fn empty_rebuild_draws_nothing() {
        let mut batch = CubeBatch::new(TextureId::Crate);
        batch.build(&placements(3), TextureId::Crate);
        batch.build(&[], TextureId::Crate);
        assert_eq!(batch.vertex_count(), 0);

        let mut backend = RecordingBackend::new();
        batch.draw(&mut backend);
        assert!(backend.calls().is_empty());
    }

    #[test]
    fn rebuild_replaces_previous_geometry() {
        let mut batch = CubeBatch::new(TextureId::Grass);
        batch.build(&placements(5), TextureId::Grass);
        let first = batch.generation();
        batch.build(&placements(2), TextureId::Fence);
        assert_eq!(batch.vertex_count(), 72);
        assert_eq!(batch.texture(), TextureId::Fence);
        assert!(batch.generation() > first);
    }

    #[test]
    fn placement_transform_is_applied() {
        let mut batch = CubeBatch::new(TextureId::Fence);
        let p = Placement::new(Vec3::new(10.0, 2.0, -4.0), Vec3::new(2.0, 4.0, 0.5));
        batch.build(&[p], TextureId::Fence);
        for v in batch.vertices() {
            let [x, y, z] = v.position;
            assert!((x - 10.0).abs() <= 1.0 + 1e-6);
            assert!((y - 2.0).abs() <= 2.0 + 1e-6);
            assert!((z + 4.0).abs() <= 0.25 + 1e-6);
        }
        let max_x = batch
            .vertices()
            .iter()
            .map(|v| v.position[0])
            .fold(f32::MIN, f32::max);
        assert_eq!(max_x, 11.0);
    }

    #[test]
    fn batch_draw_carries_texture_and_generation() {
        let mut batch = CubeBatch::new(TextureId::Grass);
        batch.build(&placements(1), TextureId::Grass);
        let mut backend = RecordingBackend::new();
        batch.draw(&mut backend);
        assert_eq!(
            backend.calls()[0],
            DrawCall::Batch {
                texture: TextureId::Grass,
                vertices: 36,
                generation: 1,
            }
        );
        assert_eq!(batch.model(), Mat4::IDENTITY);
    }
}
