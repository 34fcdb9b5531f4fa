//! # Block Module
//!
//! This module provides the core block-related functionality for the voxel engine.
//! It includes block type definitions, block face handling, and the static
//! texture atlas layout for every block face.

use block_side::BlockSide;
use block_type::BlockType;

pub mod block_side;
pub mod block_type;

/// A tile position `(column, row)` inside the texture atlas.
pub type AtlasTile = (u32, u32);

/// Maps each block type to its atlas tile for each face.
///
/// The outer array is indexed by `BlockType` as a `usize`.
/// The inner array contains 6 tiles, one for each face in the order:
/// [Front, Back, Bottom, Top, Left, Right]
pub static BLOCK_TYPE_TO_ATLAS_TILES: [[AtlasTile; 6]; 3] = [
    [(0, 0); 6],  // EMPTY (never meshed)
    [(2, 15); 6], // DIRT
    [(3, 15), (3, 15), (2, 15), (8, 13), (3, 15), (3, 15)], // GRASS (top: grass, bottom: dirt)
];

/// Gets the atlas tile of one face of a block type.
///
/// # Arguments
/// * `block_type` - The type of the block
/// * `side` - Which face of the block
///
/// # Returns
/// The `(column, row)` atlas tile, or `None` for `BlockType::EMPTY`.
pub fn atlas_tile(block_type: BlockType, side: BlockSide) -> Option<AtlasTile> {
    if !block_type.is_solid() {
        return None;
    }
    Some(BLOCK_TYPE_TO_ATLAS_TILES[block_type as usize][side as usize])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grass_has_distinct_top_and_bottom() {
        assert_eq!(atlas_tile(BlockType::GRASS, BlockSide::TOP), Some((8, 13)));
        assert_eq!(atlas_tile(BlockType::GRASS, BlockSide::BOTTOM), Some((2, 15)));
        assert_eq!(atlas_tile(BlockType::GRASS, BlockSide::LEFT), Some((3, 15)));
    }

    #[test]
    fn empty_has_no_tile() {
        for side in BlockSide::all() {
            assert_eq!(atlas_tile(BlockType::EMPTY, side), None);
        }
    }
}
