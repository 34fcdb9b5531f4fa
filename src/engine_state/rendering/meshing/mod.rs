//! Mesh generation for voxel chunks.
//!
//! This module converts a chunk's `VoxelGrid` into per-block-type mesh batches
//! using face-visibility culling: a face of a solid voxel is emitted only when
//! the neighbouring cell on that side is empty or outside the chunk. Faces
//! shared between two solid voxels are never emitted.
//!
//! # Architecture
//! - `ChunkMesher`: the culling pass, configured with the atlas layout and the
//!   bottom-face toggle
//! - `mesh/`: the face, batch and artifact types it produces
//!
//! # Performance Considerations
//! - One full scan of the chunk's solid voxels per mesh; there is no partial
//!   remeshing, a changed chunk is meshed again from scratch
//! - Neighbour tests read the grid's solidity bit vector only

use std::collections::HashMap;

mod mesh;

pub use mesh::*;

use crate::engine_state::{
    rendering::material::AtlasLayout,
    voxels::{
        block::{block_side::BlockSide, block_type::BlockType},
        chunk::{chunk_iteration::ChunkBlockIterator, VoxelGrid},
    },
};

/// Converts voxel grids into mesh batches.
///
/// Holds only configuration, so one mesher is shared by every worker.
#[derive(Copy, Clone, Debug)]
pub struct ChunkMesher {
    /// Whether faces pointing down (-Y) are emitted at all
    emit_bottom_faces: bool,
    /// Atlas used to compute texture coordinates
    atlas: AtlasLayout,
}

impl ChunkMesher {
    /// Creates a new mesher.
    ///
    /// # Arguments
    /// * `emit_bottom_faces` - Emit bottom faces. They are normally skipped
    ///   because terrain is never seen from below.
    /// * `atlas` - The atlas layout used for texture coordinates
    pub fn new(emit_bottom_faces: bool, atlas: AtlasLayout) -> Self {
        ChunkMesher {
            emit_bottom_faces,
            atlas,
        }
    }

    /// Whether bottom faces are emitted.
    pub fn emits_bottom_faces(&self) -> bool {
        self.emit_bottom_faces
    }

    /// Meshes a grid.
    ///
    /// # Arguments
    /// * `grid` - The fully populated grid of one chunk
    ///
    /// # Returns
    /// One batch per block type that has at least one visible face.
    pub fn mesh(&self, grid: &VoxelGrid) -> HashMap<BlockType, MeshBatch> {
        let mut batches: HashMap<BlockType, MeshBatch> = HashMap::new();

        for (position, block_type) in ChunkBlockIterator::new(grid) {
            let (x, y, z) = (position.x as i32, position.y as i32, position.z as i32);

            for side in BlockSide::all() {
                if side == BlockSide::BOTTOM && !self.emit_bottom_faces {
                    continue;
                }
                let (dx, dy, dz) = side.neighbour_offset();
                if !grid.is_empty_at(x + dx, y + dy, z + dz) {
                    continue;
                }
                let face = Face::new(position.x, position.y, position.z, block_type, side);
                batches
                    .entry(block_type)
                    .or_default()
                    .push_face(&face, &self.atlas);
            }
        }

        batches
    }
}

impl Default for ChunkMesher {
    fn default() -> Self {
        ChunkMesher::new(false, AtlasLayout::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine_state::voxels::chunk::ChunkDimensions;

    fn faces(batches: &HashMap<BlockType, MeshBatch>) -> usize {
        batches.values().map(MeshBatch::face_count).sum()
    }

    #[test]
    fn isolated_voxel_emits_six_faces() {
        let mut grid = VoxelGrid::empty(ChunkDimensions::new(5, 5, 5));
        grid.set(2, 2, 2, BlockType::DIRT);

        let batches = ChunkMesher::new(true, AtlasLayout::default()).mesh(&grid);
        let batch = &batches[&BlockType::DIRT];
        assert_eq!(batch.face_count(), 6);
        assert_eq!(batch.vertices.len(), 24);
        assert_eq!(batch.indices.len(), 36);
    }

    #[test]
    fn isolated_voxel_without_bottom_faces_emits_five() {
        let mut grid = VoxelGrid::empty(ChunkDimensions::new(5, 5, 5));
        grid.set(2, 2, 2, BlockType::GRASS);

        let batches = ChunkMesher::new(false, AtlasLayout::default()).mesh(&grid);
        let batch = &batches[&BlockType::GRASS];
        assert_eq!(batch.face_count(), 5);
        assert_eq!(batch.vertices.len(), 20);
        assert_eq!(batch.indices.len(), 30);
        assert!(batch.vertices.iter().all(|v| v.normal != [0.0, -1.0, 0.0]));
    }

    #[test]
    fn enclosed_voxel_emits_no_faces() {
        let mut grid = VoxelGrid::empty(ChunkDimensions::new(5, 5, 5));
        for x in 1..4 {
            for y in 1..4 {
                for z in 1..4 {
                    let block_type = if (x, y, z) == (2, 2, 2) {
                        BlockType::GRASS
                    } else {
                        BlockType::DIRT
                    };
                    grid.set(x, y, z, block_type);
                }
            }
        }

        let batches = ChunkMesher::new(true, AtlasLayout::default()).mesh(&grid);
        assert!(!batches.contains_key(&BlockType::GRASS));
        // 3x3x3 cube: 9 faces per side.
        assert_eq!(faces(&batches), 54);
    }

    #[test]
    fn grid_edges_always_emit_boundary_faces() {
        // Fill the whole grid: only the outer shell is visible.
        let dimensions = ChunkDimensions::new(2, 3, 4);
        let mut grid = VoxelGrid::empty(dimensions);
        for x in 0..2 {
            for y in 0..4 {
                for z in 0..3 {
                    grid.set(x, y, z, BlockType::DIRT);
                }
            }
        }

        let batches = ChunkMesher::new(true, AtlasLayout::default()).mesh(&grid);
        let expected = 2 * (2 * 3 + 2 * 4 + 3 * 4);
        assert_eq!(faces(&batches), expected);

        let without_bottom = ChunkMesher::new(false, AtlasLayout::default()).mesh(&grid);
        assert_eq!(faces(&without_bottom), expected - 2 * 3);
    }

    #[test]
    fn voxel_in_a_corner_emits_its_boundary_faces() {
        let mut grid = VoxelGrid::empty(ChunkDimensions::new(3, 3, 3));
        grid.set(0, 0, 0, BlockType::DIRT);
        grid.set(1, 0, 0, BlockType::DIRT);

        let batches = ChunkMesher::new(true, AtlasLayout::default()).mesh(&grid);
        // Two voxels side by side share one hidden pair of faces.
        assert_eq!(faces(&batches), 10);
    }

    #[test]
    fn batches_are_grouped_by_block_type() {
        let mut grid = VoxelGrid::empty(ChunkDimensions::new(4, 4, 4));
        grid.set(0, 0, 0, BlockType::DIRT);
        grid.set(0, 1, 0, BlockType::GRASS);
        grid.set(3, 3, 3, BlockType::GRASS);

        let batches = ChunkMesher::default().mesh(&grid);
        assert_eq!(batches.len(), 2);
        // Dirt: 4 sides (top is covered by grass, bottom skipped).
        assert_eq!(batches[&BlockType::DIRT].face_count(), 4);
        // Grass: 5 + 5 (bottom of the upper one skipped, the lower one sits on dirt).
        assert_eq!(batches[&BlockType::GRASS].face_count(), 10);
        let grass = &batches[&BlockType::GRASS];
        assert_eq!(grass.indices.iter().copied().max(), Some(grass.vertices.len() as u32 - 1));
    }

    #[test]
    fn empty_grid_has_no_batches() {
        let grid = VoxelGrid::empty(ChunkDimensions::new(4, 4, 4));
        assert!(ChunkMesher::default().mesh(&grid).is_empty());
    }
}
