//! # Voxel Engine Core
//!
//! This module contains the voxel side of the streaming core: what a block is,
//! how a chunk stores its blocks, how terrain fills them, and the `World` that
//! keeps the chunks around a moving viewpoint loaded.
//!
//! ## Architecture
//!
//! * **Block**: Block types, face directions and their atlas tiles
//! * **Chunk**: Fixed-size voxel grids, their coordinates and the terrain generator
//! * **Tasks**: The background chunk production run by scheduler workers
//! * **World**: Decides which chunks should exist and owns the resident ones
//!
//! ## Data Flow
//!
//! 1. The world observes the viewpoint once per tick
//! 2. Missing chunks of the load window are queued, closest first
//! 3. Workers generate and mesh them off the main thread
//! 4. A bounded number of finished chunks is uploaded per tick
//! 5. Chunks that fall behind the unload radius are released
//!
//! ## Thread Safety
//!
//! * Workers own the grid they build and share the generator read-only
//! * Only the main thread touches the world and the GPU backend

pub mod block;
pub mod chunk;
pub mod tasks;
pub mod world;
