//! # Chunk Creation Module
//!
//! This module provides a builder that fills a `VoxelGrid` sequentially, one
//! block at a time, in flat index order. It keeps the block array and the
//! solidity bit vector in step so that neither has to be recomputed afterwards.
//!
//! Because the flat index is `x * depth * height + z * height + y`, pushing
//! blocks column by column (`x` outermost, then `z`, then `y` from the bottom)
//! writes them exactly where they belong.

use bitvec::vec::BitVec;

use crate::{
    engine_state::voxels::block::block_type::BlockType, error::GenerationError,
};

use super::{ChunkDimensions, VoxelGrid};

/// A builder for creating and populating a `VoxelGrid` in flat index order.
pub struct VoxelGridBuilder {
    /// The extent of the grid being built
    dimensions: ChunkDimensions,
    /// Blocks pushed so far
    blocks: Vec<BlockType>,
    /// Bit vector where each bit represents whether a block is solid (1) or empty (0)
    solid_array: BitVec,
}

impl VoxelGridBuilder {
    /// Creates a new builder for a grid of the given dimensions.
    ///
    /// # Arguments
    /// * `dimensions` - The extent of the grid to create
    pub fn new(dimensions: ChunkDimensions) -> Self {
        let volume = dimensions.volume();
        VoxelGridBuilder {
            dimensions,
            blocks: Vec::with_capacity(volume),
            solid_array: BitVec::with_capacity(volume),
        }
    }

    /// Adds a block at the next flat index.
    ///
    /// # Arguments
    /// * `block_type` - The type of block to add
    pub fn push_block_type(&mut self, block_type: BlockType) {
        self.solid_array.push(block_type.is_solid());
        self.blocks.push(block_type);
    }

    /// Adds a full vertical column, bottom to top.
    ///
    /// # Arguments
    /// * `column` - Produces the block type for each `y` in `0..height`
    pub fn push_column(&mut self, mut column: impl FnMut(usize) -> BlockType) {
        for y in 0..self.dimensions.height {
            self.push_block_type(column(y));
        }
    }

    /// The number of blocks pushed so far.
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// Returns `true` if no blocks have been pushed yet.
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Finalizes the grid.
    ///
    /// # Returns
    /// The constructed `VoxelGrid`, or `GenerationError::IncompleteGrid` if
    /// the number of pushed blocks does not match the grid volume.
    pub fn build(self) -> Result<VoxelGrid, GenerationError> {
        let expected = self.dimensions.volume();
        if self.blocks.len() != expected {
            return Err(GenerationError::IncompleteGrid {
                expected,
                actual: self.blocks.len(),
            });
        }
        Ok(VoxelGrid::from_parts(
            self.dimensions,
            self.blocks,
            self.solid_array,
        ))
    }
}
