//! Mesh data structures for voxel rendering.
//!
//! This module provides the CPU-side vertex and index buffers produced for a
//! chunk, grouped by block type so that each type can be drawn with its own
//! material without switching materials between faces.

use std::collections::{BTreeSet, HashMap};

use crate::engine_state::{
    rendering::{material::AtlasLayout, Vertex},
    voxels::{
        block::{atlas_tile, block_type::BlockType},
        chunk::ChunkCoordinate,
    },
};

use super::face::Face;

/// Number of vertices emitted per face.
pub const VERTICES_PER_FACE: usize = 4;
/// Number of indices emitted per face (two triangles).
pub const INDICES_PER_FACE: usize = 6;

/// Vertex and index data for every visible face of one block type in a chunk.
///
/// Faces are appended one at a time; each new face's indices are offset by the
/// number of vertices already in the batch, so the whole batch shares a single
/// contiguous vertex buffer.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshBatch {
    /// The vertex data for this batch
    pub vertices: Vec<Vertex>,
    /// The index data for this batch
    pub indices: Vec<u32>,
}

impl MeshBatch {
    /// Creates a new, empty batch.
    pub fn new() -> Self {
        MeshBatch::default()
    }

    /// Appends one face.
    ///
    /// # Arguments
    /// * `face` - The face to emit
    /// * `atlas` - The atlas layout used to turn the face's tile into texture coordinates
    pub fn push_face(&mut self, face: &Face, atlas: &AtlasLayout) {
        let tile = atlas_tile(face.block_type, face.block_side).unwrap_or((0, 0));
        let ([u0, v0], [u1, v1]) = atlas.tile_bounds(tile);
        let tex_coords = [[u0, v0], [u1, v0], [u1, v1], [u0, v1]];
        let normal = face.block_side.normal();

        let offset = self.vertices.len() as u32;
        for (corner, uv) in face.corners().into_iter().zip(tex_coords) {
            self.vertices.push(Vertex::new(corner, uv, normal));
        }
        self.indices.extend(Self::generate_face_indices(offset));
    }

    /// Generates index data for a face whose first vertex is at `offset`.
    ///
    /// # Returns
    /// Six indices forming the two triangles `(0, 1, 2)` and `(2, 3, 0)`.
    pub fn generate_face_indices(offset: u32) -> [u32; INDICES_PER_FACE] {
        [offset, offset + 1, offset + 2, offset + 2, offset + 3, offset]
    }

    /// The number of faces in this batch.
    pub fn face_count(&self) -> usize {
        self.vertices.len() / VERTICES_PER_FACE
    }

    /// The number of indices to draw.
    pub fn index_count(&self) -> usize {
        self.indices.len()
    }

    /// Returns `true` if the batch has no geometry.
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// The vertex buffer as raw bytes.
    pub fn vertex_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }

    /// The index buffer as raw bytes.
    pub fn index_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.indices)
    }

    /// Total upload size in bytes.
    pub fn byte_len(&self) -> usize {
        self.vertex_bytes().len() + self.index_bytes().len()
    }
}

/// The finished, immutable product of background work for one chunk.
///
/// Built on a worker, moved through the completion channel, and consumed on
/// the main thread when the chunk is uploaded.
#[derive(Debug, Clone)]
pub struct ChunkArtifact {
    coordinate: ChunkCoordinate,
    batches: HashMap<BlockType, MeshBatch>,
    textures: BTreeSet<String>,
}

impl ChunkArtifact {
    /// Creates a new artifact.
    ///
    /// # Arguments
    /// * `coordinate` - The chunk this artifact belongs to
    /// * `batches` - One non-empty batch per block type present in the chunk
    /// * `textures` - Names of the textures the batches reference
    pub fn new(
        coordinate: ChunkCoordinate,
        batches: HashMap<BlockType, MeshBatch>,
        textures: BTreeSet<String>,
    ) -> Self {
        ChunkArtifact {
            coordinate,
            batches,
            textures,
        }
    }

    /// The chunk this artifact belongs to.
    pub fn coordinate(&self) -> ChunkCoordinate {
        self.coordinate
    }

    /// The mesh batches, keyed by block type.
    pub fn batches(&self) -> &HashMap<BlockType, MeshBatch> {
        &self.batches
    }

    /// Names of the textures referenced by the batches.
    pub fn textures(&self) -> &BTreeSet<String> {
        &self.textures
    }

    /// Total number of faces across all batches.
    pub fn face_count(&self) -> usize {
        self.batches.values().map(MeshBatch::face_count).sum()
    }

    /// Consumes the artifact, yielding its batches in block type order.
    pub fn into_batches(self) -> Vec<(BlockType, MeshBatch)> {
        let mut batches: Vec<_> = self.batches.into_iter().collect();
        batches.sort_by_key(|(block_type, _)| *block_type);
        batches
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine_state::voxels::block::block_side::BlockSide;

    #[test]
    fn indices_are_offset_per_face() {
        let atlas = AtlasLayout::new(16);
        let mut batch = MeshBatch::new();
        batch.push_face(&Face::new(0, 0, 0, BlockType::DIRT, BlockSide::TOP), &atlas);
        batch.push_face(&Face::new(1, 0, 0, BlockType::DIRT, BlockSide::TOP), &atlas);

        assert_eq!(batch.face_count(), 2);
        assert_eq!(batch.vertices.len(), 8);
        assert_eq!(batch.indices, vec![0, 1, 2, 2, 3, 0, 4, 5, 6, 6, 7, 4]);
    }

    #[test]
    fn texture_coordinates_cover_one_atlas_tile() {
        let atlas = AtlasLayout::new(16);
        let mut batch = MeshBatch::new();
        batch.push_face(&Face::new(0, 0, 0, BlockType::GRASS, BlockSide::TOP), &atlas);

        let (u0, v0) = (8.0 / 16.0, 13.0 / 16.0);
        let (u1, v1) = (9.0 / 16.0, 14.0 / 16.0);
        let uvs: Vec<[f32; 2]> = batch.vertices.iter().map(|v| v.tex_coords).collect();
        assert_eq!(uvs, vec![[u0, v0], [u1, v0], [u1, v1], [u0, v1]]);
        assert!(batch.vertices.iter().all(|v| v.normal == [0.0, 1.0, 0.0]));
    }

    #[test]
    fn byte_views_match_lengths() {
        let atlas = AtlasLayout::new(16);
        let mut batch = MeshBatch::new();
        batch.push_face(&Face::new(0, 0, 0, BlockType::DIRT, BlockSide::LEFT), &atlas);
        assert_eq!(batch.vertex_bytes().len(), 4 * Vertex::STRIDE);
        assert_eq!(batch.index_bytes().len(), 6 * 4);
        assert_eq!(batch.byte_len(), 4 * Vertex::STRIDE + 24);
    }
}
