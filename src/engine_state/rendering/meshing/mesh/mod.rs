//! Mesh generation data structures for voxel rendering.
//!
//! # Architecture
//! - [`Face`]: a single quad of a voxel with its corners and side
//! - [`MeshBatch`]: vertices and indices for all faces of one block type
//! - [`ChunkArtifact`]: every batch of one chunk, ready for upload

mod face;
mod mesh;

pub use face::Face;
pub use mesh::*;
