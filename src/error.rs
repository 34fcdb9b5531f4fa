//! # Errors
//!
//! Error types for every failure the streaming pipeline can observe. None of
//! them is fatal: a failed chunk is simply missing until a later load pass
//! requests it again.

use std::path::PathBuf;

use thiserror::Error;

use crate::engine_state::voxels::{
    block::block_type::BlockType,
    chunk::{ChunkCoordinate, ChunkDimensions},
};

/// A chunk could not be generated or meshed on a worker.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum GenerationError {
    /// One of the chunk extents is zero.
    #[error("cannot generate a chunk with dimensions {0:?}")]
    InvalidDimensions(ChunkDimensions),

    /// The noise function produced NaN or infinity for a column.
    #[error("noise sample for column ({x}, {z}) of chunk {coordinate} is not finite")]
    NonFiniteNoise {
        /// The chunk being generated
        coordinate: ChunkCoordinate,
        /// Column X inside the chunk
        x: usize,
        /// Column Z inside the chunk
        z: usize,
    },

    /// A grid was finalised with the wrong number of blocks.
    #[error("voxel grid holds {actual} blocks, expected {expected}")]
    IncompleteGrid {
        /// The grid volume
        expected: usize,
        /// The number of blocks pushed
        actual: usize,
    },

    /// The producer failed for a reason of its own.
    #[error("chunk {coordinate} could not be produced: {reason}")]
    Other {
        /// The chunk being generated
        coordinate: ChunkCoordinate,
        /// Human-readable description
        reason: String,
    },
}

/// A mesh batch could not be turned into GPU resources.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum UploadError {
    /// The backend refused the allocation.
    #[error("out of GPU memory uploading {block_type:?} batch of chunk {coordinate} ({bytes} bytes)")]
    OutOfMemory {
        /// The chunk being uploaded
        coordinate: ChunkCoordinate,
        /// The batch being uploaded
        block_type: BlockType,
        /// Size of the rejected upload
        bytes: usize,
    },

    /// The backend could not bind the batch for another reason.
    #[error("could not bind {block_type:?} batch of chunk {coordinate}: {reason}")]
    Binding {
        /// The chunk being uploaded
        coordinate: ChunkCoordinate,
        /// The batch being uploaded
        block_type: BlockType,
        /// Human-readable description
        reason: String,
    },
}

/// The streaming configuration is unusable.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A chunk extent is zero.
    #[error("chunk dimensions must be non-zero, got {0:?}")]
    ZeroDimension(ChunkDimensions),

    /// The load radius is negative.
    #[error("load radius must not be negative, got {0}")]
    NegativeLoadRadius(i32),

    /// The load window would hold more chunks than the core can track.
    #[error("load radius {load_radius} exceeds the maximum of {max}")]
    LoadRadiusTooLarge {
        /// The configured load radius
        load_radius: i32,
        /// The largest accepted radius
        max: i32,
    },

    /// The unload radius would evict chunks the load window keeps requesting.
    #[error("unload radius {unload_radius} is smaller than the load window reach {required}")]
    UnloadRadiusTooSmall {
        /// The configured unload radius
        unload_radius: f32,
        /// The farthest distance inside the load window
        required: f32,
    },

    /// A limit that must allow at least one unit of work is zero.
    #[error("{0} must be at least 1")]
    ZeroLimit(&'static str),

    /// The configuration file could not be read.
    #[error("could not read config file {path:?}")]
    Io {
        /// Path of the file
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// The configuration file is not valid JSON for `StreamingConfig`.
    #[error("invalid streaming config")]
    Json(#[from] serde_json::Error),
}
