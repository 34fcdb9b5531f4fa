//! # Chunk Iteration Module
//!
//! This module provides an iterator over the solid blocks of a `VoxelGrid`.
//! It walks the solidity bit vector and skips straight over runs of empty
//! cells, so meshing a mostly-empty chunk does not pay for the empty volume.

use bitvec::slice::IterOnes;
use bitvec::{order::Lsb0, prelude::BitVec};
use cgmath::Point3;

use crate::engine_state::voxels::block::block_type::BlockType;

use super::VoxelGrid;

/// An iterator over all non-empty blocks in a grid.
///
/// Yields the block position (in grid coordinates) and the block type, in flat
/// index order.
pub struct ChunkBlockIterator<'a> {
    /// Reference to the grid being iterated over
    grid: &'a VoxelGrid,
    /// Positions of the set bits in the solid array
    solid_offsets: IterOnes<'a, usize, Lsb0>,
}

impl<'a> ChunkBlockIterator<'a> {
    /// Creates a new `ChunkBlockIterator` for the given grid.
    pub fn new(grid: &'a VoxelGrid) -> Self {
        let solid_array: &'a BitVec = grid.solid_array();
        ChunkBlockIterator {
            grid,
            solid_offsets: solid_array.iter_ones(),
        }
    }
}

impl<'a> Iterator for ChunkBlockIterator<'a> {
    type Item = (Point3<usize>, BlockType);

    fn next(&mut self) -> Option<Self::Item> {
        let index = self.solid_offsets.next()?;
        let position = self.grid.dimensions().position_of(index);
        Some((position, self.grid.blocks()[index]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine_state::voxels::chunk::ChunkDimensions;

    #[test]
    fn yields_only_solid_blocks_with_positions() {
        let mut grid = VoxelGrid::empty(ChunkDimensions::new(4, 4, 4));
        grid.set(0, 0, 0, BlockType::DIRT);
        grid.set(3, 2, 1, BlockType::GRASS);

        let blocks: Vec<_> = ChunkBlockIterator::new(&grid).collect();
        assert_eq!(
            blocks,
            vec![
                (Point3::new(0, 0, 0), BlockType::DIRT),
                (Point3::new(3, 2, 1), BlockType::GRASS),
            ]
        );
    }

    #[test]
    fn empty_grid_yields_nothing() {
        let grid = VoxelGrid::empty(ChunkDimensions::new(2, 2, 2));
        assert_eq!(ChunkBlockIterator::new(&grid).count(), 0);
    }
}
