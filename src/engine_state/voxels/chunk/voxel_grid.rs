//! Dense block storage for a single chunk.

use bitvec::prelude::BitVec;

use super::ChunkDimensions;
use crate::engine_state::voxels::block::block_type::BlockType;

/// A dense 3D array of block types for one chunk.
///
/// Blocks are stored flat in `x, z, y` order (see [`ChunkDimensions::index`]).
/// A parallel bit vector records which cells are solid so that the face
/// culling pass can test neighbours without touching the block array.
///
/// A grid is built by the worker that generates a chunk and dropped as soon as
/// the chunk's mesh has been produced.
#[derive(Clone, Debug)]
pub struct VoxelGrid {
    /// The fixed extent of the grid
    dimensions: ChunkDimensions,
    /// One entry per cell, in flat index order
    blocks: Vec<BlockType>,
    /// One bit per cell: `1` if the cell is not `EMPTY`
    solid_array: BitVec,
}

impl VoxelGrid {
    /// Creates a grid where every cell is `EMPTY`.
    pub fn empty(dimensions: ChunkDimensions) -> Self {
        let volume = dimensions.volume();
        VoxelGrid {
            dimensions,
            blocks: vec![BlockType::EMPTY; volume],
            solid_array: BitVec::repeat(false, volume),
        }
    }

    /// Assembles a grid from blocks already laid out in flat index order.
    ///
    /// Used by [`super::VoxelGridBuilder`]; the lengths are checked there.
    pub(super) fn from_parts(
        dimensions: ChunkDimensions,
        blocks: Vec<BlockType>,
        solid_array: BitVec,
    ) -> Self {
        debug_assert_eq!(blocks.len(), dimensions.volume());
        debug_assert_eq!(solid_array.len(), dimensions.volume());
        VoxelGrid {
            dimensions,
            blocks,
            solid_array,
        }
    }

    /// The extent of the grid.
    pub fn dimensions(&self) -> &ChunkDimensions {
        &self.dimensions
    }

    /// Gets the block at `(x, y, z)`, or `None` if the position is out of bounds.
    pub fn get(&self, x: usize, y: usize, z: usize) -> Option<BlockType> {
        if x >= self.dimensions.width || y >= self.dimensions.height || z >= self.dimensions.depth
        {
            return None;
        }
        Some(self.blocks[self.dimensions.index(x, y, z)])
    }

    /// Sets the block at `(x, y, z)`.
    ///
    /// # Returns
    /// `false` if the position is out of bounds and nothing was written.
    pub fn set(&mut self, x: usize, y: usize, z: usize, block_type: BlockType) -> bool {
        if x >= self.dimensions.width || y >= self.dimensions.height || z >= self.dimensions.depth
        {
            return false;
        }
        let index = self.dimensions.index(x, y, z);
        self.blocks[index] = block_type;
        self.solid_array.set(index, block_type.is_solid());
        true
    }

    /// Returns `true` if the cell at the signed position is empty.
    ///
    /// Positions outside the grid count as empty, so faces on the chunk border
    /// are always emitted.
    #[inline]
    pub fn is_empty_at(&self, x: i32, y: i32, z: i32) -> bool {
        if !self.dimensions.contains(x, y, z) {
            return true;
        }
        !self.solid_array[self.dimensions.index(x as usize, y as usize, z as usize)]
    }

    /// The number of non-empty cells.
    pub fn solid_count(&self) -> usize {
        self.solid_array.count_ones()
    }

    /// The raw block array in flat index order.
    pub fn blocks(&self) -> &[BlockType] {
        &self.blocks
    }

    pub(super) fn solid_array(&self) -> &BitVec {
        &self.solid_array
    }
}
