use glam::Vec3;
use pasture_common::{FieldConfig, Placement, TextureId};

/// Block stacks seeded into a fresh field as `(col, row, height)`.
const SEED_STACKS: &[(i32, i32, i32)] = &[
    (5, 5, 1),
    (6, 5, 2),
    (6, 6, 1),
    (25, 7, 3),
    (9, 24, 1),
    (10, 24, 1),
    (24, 25, 2),
];

/// Grid of block stack heights over the play field.
///
/// Edits only flip a dirty flag; the renderer rebakes its static batches
/// wholesale when it sees the flag.
#[derive(Debug, Clone)]
pub struct BlockField {
    width: i32,
    depth: i32,
    max_stack: i32,
    heights: Vec<i32>,
    dirty: bool,
}

impl BlockField {
    /// Empty field of the configured size.
    pub fn empty(config: &FieldConfig) -> Self {
        let cells = (config.width.max(0) * config.depth.max(0)) as usize;
        Self {
            width: config.width,
            depth: config.depth,
            max_stack: config.max_stack,
            heights: vec![0; cells],
            dirty: true,
        }
    }

    /// Field with the default scattered crate stacks.
    pub fn new(config: &FieldConfig) -> Self {
        let mut field = Self::empty(config);
        for &(col, row, height) in SEED_STACKS {
            if let Some(i) = field.index(col, row) {
                field.heights[i] = height.min(field.max_stack);
            }
        }
        field
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn depth(&self) -> i32 {
        self.depth
    }

    fn index(&self, col: i32, row: i32) -> Option<usize> {
        if col < 0 || row < 0 || col >= self.width || row >= self.depth {
            return None;
        }
        Some((row * self.width + col) as usize)
    }

    /// Cell containing a world position, if it lies on the field.
    pub fn cell_at(&self, pos: Vec3) -> Option<(i32, i32)> {
        let col = pos.x.floor() as i32;
        let row = pos.z.floor() as i32;
        self.index(col, row).map(|_| (col, row))
    }

    /// Stack height of a cell; 0 off the field.
    pub fn block_height(&self, col: i32, row: i32) -> i32 {
        self.index(col, row).map_or(0, |i| self.heights[i])
    }

    /// Height of the block stack under a world position.
    pub fn height_under(&self, pos: Vec3) -> i32 {
        self.cell_at(pos)
            .map_or(0, |(col, row)| self.block_height(col, row))
    }

    pub fn add_block(&mut self, col: i32, row: i32) -> bool {
        let Some(i) = self.index(col, row) else {
            return false;
        };
        if self.heights[i] >= self.max_stack {
            return false;
        }
        self.heights[i] += 1;
        self.dirty = true;
        tracing::debug!(col, row, height = self.heights[i], "block added");
        true
    }

    pub fn remove_block(&mut self, col: i32, row: i32) -> bool {
        let Some(i) = self.index(col, row) else {
            return false;
        };
        if self.heights[i] == 0 {
            return false;
        }
        self.heights[i] -= 1;
        self.dirty = true;
        tracing::debug!(col, row, height = self.heights[i], "block removed");
        true
    }

    /// Row-major stack heights, `width * depth` cells.
    pub fn heights(&self) -> &[i32] {
        &self.heights
    }

    pub fn block_count(&self) -> usize {
        self.heights.iter().map(|&h| h as usize).sum()
    }

    /// Whether the static batches are stale.
    pub fn needs_rebuild(&self) -> bool {
        self.dirty
    }

    pub fn mark_rebuilt(&mut self) {
        self.dirty = false;
    }

    /// Every static cuboid drawn with the given texture.
    pub fn placements(&self, texture: TextureId) -> Vec<Placement> {
        match texture {
            TextureId::Grass => self.floor_tiles(),
            TextureId::Fence => self.fence_posts(),
            TextureId::Crate => self.crate_blocks(),
        }
    }

    fn floor_tiles(&self) -> Vec<Placement> {
        let mut out = Vec::with_capacity(self.heights.len());
        for row in 0..self.depth {
            for col in 0..self.width {
                out.push(Placement::new(
                    Vec3::new(col as f32 + 0.5, -0.05, row as f32 + 0.5),
                    Vec3::new(1.0, 0.1, 1.0),
                ));
            }
        }
        out
    }

    fn fence_posts(&self) -> Vec<Placement> {
        let post = Vec3::new(0.15, 1.0, 0.15);
        let (w, d) = (self.width as f32, self.depth as f32);
        let mut out = Vec::new();
        for col in 0..=self.width {
            let x = col as f32;
            out.push(Placement::new(Vec3::new(x, 0.5, 0.0), post));
            out.push(Placement::new(Vec3::new(x, 0.5, d), post));
        }
        for row in 1..self.depth {
            let z = row as f32;
            out.push(Placement::new(Vec3::new(0.0, 0.5, z), post));
            out.push(Placement::new(Vec3::new(w, 0.5, z), post));
        }
        out
    }

    fn crate_blocks(&self) -> Vec<Placement> {
        let mut out = Vec::with_capacity(self.block_count());
        for row in 0..self.depth {
            for col in 0..self.width {
                for level in 0..self.block_height(col, row) {
                    out.push(Placement::block(col, level, row));
                }
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small() -> BlockField {
        BlockField::empty(&FieldConfig {
            width: 4,
            depth: 3,
            max_stack: 2,
            reach: 2.0,
        })
    }

    #[test]
    fn heights_default_to_zero_and_off_field() {
        let field = small();
        assert_eq!(field.block_height(1, 1), 0);
        assert_eq!(field.block_height(-1, 0), 0);
        assert_eq!(field.block_height(4, 0), 0);
    }

    #[test]
    fn add_respects_max_stack() {
        let mut field = small();
        assert!(field.add_block(1, 1));
        assert!(field.add_block(1, 1));
        assert!(!field.add_block(1, 1));
        assert_eq!(field.block_height(1, 1), 2);
    }

    #[test]
    fn edits_off_field_fail() {
        let mut field = small();
        assert!(!field.add_block(10, 0));
        assert!(!field.remove_block(0, -3));
    }

    #[test]
    fn remove_from_empty_fails() {
        let mut field = small();
        assert!(!field.remove_block(2, 2));
        field.add_block(2, 2);
        assert!(field.remove_block(2, 2));
        assert_eq!(field.block_height(2, 2), 0);
    }

    #[test]
    fn edits_mark_dirty() {
        let mut field = small();
        assert!(field.needs_rebuild());
        field.mark_rebuilt();
        assert!(!field.needs_rebuild());
        assert!(!field.remove_block(0, 0));
        assert!(!field.needs_rebuild());
        field.add_block(0, 0);
        assert!(field.needs_rebuild());
    }

    #[test]
    fn placements_track_layout() {
        let mut field = small();
        assert_eq!(field.placements(TextureId::Grass).len(), 12);
        assert!(field.placements(TextureId::Crate).is_empty());
        field.add_block(3, 2);
        field.add_block(3, 2);
        let crates = field.placements(TextureId::Crate);
        assert_eq!(crates.len(), 2);
        assert_eq!(crates[1].translation, Vec3::new(3.5, 1.5, 2.5));
        // 5 posts along each X edge, 2 along each inner Z edge.
        assert_eq!(field.placements(TextureId::Fence).len(), 14);
    }

    #[test]
    fn height_under_position() {
        let mut field = small();
        field.add_block(1, 2);
        assert_eq!(field.height_under(Vec3::new(1.7, 5.0, 2.1)), 1);
        assert_eq!(field.height_under(Vec3::new(-0.2, 0.0, 0.0)), 0);
    }

    #[test]
    fn seeded_field_has_blocks() {
        let field = BlockField::new(&FieldConfig::default());
        assert_eq!(field.block_height(6, 5), 2);
        assert!(field.block_count() > 0);
    }
}
