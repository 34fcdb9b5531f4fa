//! # Block Type Module
//!
//! This module defines the different types of blocks in the voxel world.

use serde::{Deserialize, Serialize};

/// Enumerates all possible block types in the voxel world.
///
/// Each variant represents a distinct type of block with its own texture
/// layout. The discriminant indexes `BLOCK_TYPE_TO_ATLAS_TILES`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum BlockType {
    /// An empty cell. Carries no geometry.
    EMPTY,

    /// A basic dirt block, used for every solid layer below the surface.
    DIRT,

    /// A grass block with different textures on top and sides.
    /// The top is green, sides have grass on dirt, and bottom is plain dirt.
    GRASS,
}

impl BlockType {
    /// Every block type that produces geometry, in table order.
    pub const SOLID: [BlockType; 2] = [BlockType::DIRT, BlockType::GRASS];

    /// Returns `true` for every type except `EMPTY`.
    #[inline]
    pub fn is_solid(self) -> bool {
        self != BlockType::EMPTY
    }
}

impl Default for BlockType {
    fn default() -> Self {
        BlockType::EMPTY
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_empty_is_not_solid() {
        assert!(!BlockType::EMPTY.is_solid());
        assert!(BlockType::SOLID.iter().all(|block_type| block_type.is_solid()));
    }
}
