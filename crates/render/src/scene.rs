use pasture_common::TextureId;
use pasture_kernel::BlockField;

use crate::backend::DrawBackend;
use crate::batch::CubeBatch;

/// The static world: one [`CubeBatch`] per texture.
#[derive(Debug, Clone)]
pub struct StaticScene {
    batches: Vec<CubeBatch>,
}

impl StaticScene {
    pub fn new() -> Self {
        Self {
            batches: TextureId::ALL.iter().map(|&t| CubeBatch::new(t)).collect(),
        }
    }

    /// Rebake every batch from the field's current layout.
    pub fn rebuild_batches(&mut self, field: &BlockField) {
        let _span = tracing::info_span!("rebuild_batches").entered();
        for batch in &mut self.batches {
            let texture = batch.texture();
            batch.build(&field.placements(texture), texture);
        }
        tracing::info!(
            blocks = field.block_count(),
            vertices = self.vertex_count(),
            "static batches rebuilt"
        );
    }

    pub fn batch(&self, texture: TextureId) -> &CubeBatch {
        &self.batches[texture.index()]
    }

    pub fn batches(&self) -> &[CubeBatch] {
        &self.batches
    }

    pub fn vertex_count(&self) -> usize {
        self.batches.iter().map(CubeBatch::vertex_count).sum()
    }

    /// At most one draw per texture.
    pub fn draw(&self, backend: &mut impl DrawBackend) {
        for batch in &self.batches {
            batch.draw(backend);
        }
    }
}

impl Default for StaticScene {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::RecordingBackend;
    use crate::batch::CUBE_VERTICES;
    use pasture_common::FieldConfig;

    #[test]
    fn batches_are_indexed_by_texture() {
        let scene = StaticScene::new();
        for t in TextureId::ALL {
            assert_eq!(scene.batch(t).texture(), t);
        }
    }

    #[test]
    fn rebuild_matches_field_layout() {
        let config = FieldConfig::default();
        let mut field = BlockField::empty(&config);
        let mut scene = StaticScene::new();
        scene.rebuild_batches(&field);
        assert_eq!(scene.batch(TextureId::Crate).vertex_count(), 0);

        field.add_block(2, 2);
        field.add_block(2, 2);
        scene.rebuild_batches(&field);
        assert_eq!(scene.batch(TextureId::Crate).vertex_count(), 2 * CUBE_VERTICES);
        assert_eq!(
            scene.batch(TextureId::Grass).vertex_count(),
            (config.width * config.depth) as usize * CUBE_VERTICES
        );
    }

    #[test]
    fn empty_crate_batch_is_skipped() {
        let field = BlockField::empty(&FieldConfig::default());
        let mut scene = StaticScene::new();
        scene.rebuild_batches(&field);
        let mut backend = RecordingBackend::new();
        scene.draw(&mut backend);
        // Grass and fence only.
        assert_eq!(backend.draw_calls(), 2);
    }
}
