use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Texture shared by every cuboid of one static batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TextureId {
    Grass,
    Fence,
    Crate,
}

impl TextureId {
    pub const ALL: [TextureId; 3] = [TextureId::Grass, TextureId::Fence, TextureId::Crate];

    /// Dense index, usable as a slot into per-texture tables.
    pub fn index(self) -> usize {
        match self {
            TextureId::Grass => 0,
            TextureId::Fence => 1,
            TextureId::Crate => 2,
        }
    }
}

/// One static cuboid in world space: a unit cube scaled then translated.
///
/// `translation` is the cuboid's center.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Placement {
    pub translation: Vec3,
    pub scale: Vec3,
}

impl Placement {
    pub fn new(translation: Vec3, scale: Vec3) -> Self {
        Self { translation, scale }
    }

    /// A unit block whose minimum corner sits on integer cell coordinates.
    pub fn block(col: i32, level: i32, row: i32) -> Self {
        Self {
            translation: Vec3::new(col as f32 + 0.5, level as f32 + 0.5, row as f32 + 0.5),
            scale: Vec3::ONE,
        }
    }
}

/// Flat color material for animated parts and projectiles.
///
/// Selection may depend on discrete state (enemy health tier) but never on
/// continuous animation parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Material {
    Wool,
    SheepSkin,
    EnemyHealthy,
    EnemyWounded,
    EnemyFace,
    Bullet,
}

impl Material {
    pub fn color(self) -> [f32; 4] {
        match self {
            Material::Wool => [0.94, 0.93, 0.88, 1.0],
            Material::SheepSkin => [0.22, 0.18, 0.16, 1.0],
            Material::EnemyHealthy => [0.35, 0.75, 0.25, 1.0],
            Material::EnemyWounded => [0.85, 0.25, 0.2, 1.0],
            Material::EnemyFace => [0.08, 0.08, 0.08, 1.0],
            Material::Bullet => [1.0, 0.85, 0.2, 1.0],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn texture_indices_are_dense() {
        let indices: Vec<usize> = TextureId::ALL.iter().map(|t| t.index()).collect();
        assert_eq!(indices, vec![0, 1, 2]);
    }

    #[test]
    fn block_placement_is_cell_centered() {
        let p = Placement::block(3, 0, 5);
        assert_eq!(p.translation, Vec3::new(3.5, 0.5, 5.5));
        assert_eq!(p.scale, Vec3::ONE);
    }

    #[test]
    fn enemy_tiers_have_distinct_colors() {
        assert_ne!(
            Material::EnemyHealthy.color(),
            Material::EnemyWounded.color()
        );
    }
}
