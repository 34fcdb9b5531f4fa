//! # Chunk Module
//!
//! This module provides the chunk addressing types (`ChunkCoordinate`,
//! `ChunkDimensions`) and the dense per-chunk block storage (`VoxelGrid`),
//! together with the terrain generator that fills it.
//!
//! ## Layout
//!
//! Chunks tile the world on a 2D grid (no vertical chunking). Every chunk spans
//! the full vertical extent `height`, and blocks inside it are addressed by
//! `(x, y, z)` with `x < width`, `y < height`, `z < depth`.
//!
//! The flat storage index is `x * depth * height + z * height + y`, so a
//! vertical column is contiguous in memory. Terrain generation writes one
//! column at a time, which makes this the natural fill order.

use cgmath::Point3;
use serde::{Deserialize, Serialize};

mod chunk_creation;
pub mod chunk_iteration;
pub mod terrain;
pub mod voxel_grid;

pub use chunk_creation::VoxelGridBuilder;
pub use voxel_grid::VoxelGrid;

/// The horizontal size of a chunk in blocks, unless configured otherwise.
pub const CHUNK_DIMENSION: usize = 16;
/// The vertical size of a chunk in blocks, unless configured otherwise.
pub const CHUNK_HEIGHT: usize = 64;

/// Identifies a chunk's position on the 2D chunk grid.
///
/// Equality and hashing are by value, so this is used as the key of every
/// chunk table in the streaming pipeline.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ChunkCoordinate {
    /// Chunk index along the world X axis
    pub x: i32,
    /// Chunk index along the world Z axis
    pub z: i32,
}

impl ChunkCoordinate {
    /// Creates a new chunk coordinate.
    pub const fn new(x: i32, z: i32) -> Self {
        ChunkCoordinate { x, z }
    }

    /// Finds the chunk containing a world-space position.
    ///
    /// Uses floor division so that positions just below zero belong to chunk `-1`
    /// rather than chunk `0`. The vertical component is ignored.
    ///
    /// # Arguments
    /// * `position` - The world-space position (usually the viewpoint)
    /// * `dimensions` - The chunk dimensions in blocks
    pub fn from_world_position(position: Point3<f32>, dimensions: &ChunkDimensions) -> Self {
        ChunkCoordinate {
            x: (position.x / dimensions.width as f32).floor() as i32,
            z: (position.z / dimensions.depth as f32).floor() as i32,
        }
    }

    /// Euclidean distance to another coordinate, in chunk units.
    pub fn distance(&self, other: &ChunkCoordinate) -> f32 {
        let dx = (self.x - other.x) as f32;
        let dz = (self.z - other.z) as f32;
        (dx * dx + dz * dz).sqrt()
    }

    /// The world-space position of this chunk's `(0, 0, 0)` block.
    ///
    /// This is the model translation applied when the chunk is drawn.
    pub fn world_origin(&self, dimensions: &ChunkDimensions) -> Point3<f32> {
        Point3::new(
            (self.x * dimensions.width as i32) as f32,
            0.0,
            (self.z * dimensions.depth as i32) as f32,
        )
    }
}

impl std::fmt::Display for ChunkCoordinate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.z)
    }
}

/// The fixed size of every chunk, in blocks.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkDimensions {
    /// Extent along X
    pub width: usize,
    /// Extent along Z
    pub depth: usize,
    /// Extent along Y
    pub height: usize,
}

impl ChunkDimensions {
    /// Creates a new set of chunk dimensions.
    pub const fn new(width: usize, depth: usize, height: usize) -> Self {
        ChunkDimensions {
            width,
            depth,
            height,
        }
    }

    /// The number of blocks in one chunk.
    pub fn volume(&self) -> usize {
        self.width * self.depth * self.height
    }

    /// The number of vertical columns in one chunk.
    pub fn columns(&self) -> usize {
        self.width * self.depth
    }

    /// Flat storage index of `(x, y, z)`. The caller guarantees it is in bounds.
    #[inline]
    pub fn index(&self, x: usize, y: usize, z: usize) -> usize {
        x * self.depth * self.height + z * self.height + y
    }

    /// Returns `true` if `(x, y, z)` lies inside the chunk.
    #[inline]
    pub fn contains(&self, x: i32, y: i32, z: i32) -> bool {
        x >= 0
            && y >= 0
            && z >= 0
            && (x as usize) < self.width
            && (y as usize) < self.height
            && (z as usize) < self.depth
    }

    /// Inverse of [`ChunkDimensions::index`].
    #[inline]
    pub fn position_of(&self, index: usize) -> Point3<usize> {
        let column_stride = self.height;
        let row_stride = self.depth * self.height;
        Point3::new(
            index / row_stride,
            index % column_stride,
            (index % row_stride) / column_stride,
        )
    }
}

impl Default for ChunkDimensions {
    fn default() -> Self {
        ChunkDimensions::new(CHUNK_DIMENSION, CHUNK_DIMENSION, CHUNK_HEIGHT)
    }
}
