//! Rendering side of the voxel engine.
//!
//! This module contains everything between a chunk's voxel data and a draw
//! call: the mesher that turns voxels into vertex/index batches, the material
//! registry, and the narrow [`gpu::GpuBackend`] boundary through which batches
//! become GPU resources.
//!
//! Actual graphics API objects (buffers, shaders, textures) live behind that
//! boundary and are not created here.

use cgmath::Point3;

use super::voxels::{block::block_type::BlockType, chunk::ChunkCoordinate};

pub mod gpu;
pub mod material;
pub mod meshing;
mod vertex;

// Re-export commonly used types
pub use vertex::Vertex;

use material::Material;

/// One drawable batch handed to the render callback.
///
/// Carries everything a draw call needs: which GPU buffers to bind, which
/// material to bind before drawing, how many indices to draw, and where the
/// chunk sits in the world.
#[derive(Debug)]
pub struct DrawBatch<'a, H> {
    /// The chunk this batch belongs to
    pub coordinate: ChunkCoordinate,
    /// The block type of every face in the batch
    pub block_type: BlockType,
    /// The backend handle returned when the batch was uploaded
    pub handle: &'a H,
    /// The material to bind, if one is registered for the block type
    pub material: Option<&'a Material>,
    /// Number of indices to draw
    pub index_count: usize,
    /// Model translation of the chunk
    pub translation: Point3<f32>,
}
