//! # Chunk Task Core Types
//!
//! This module defines the building blocks of the chunk streaming pipeline.
//!
//! ## Core Components
//! - `ChunkProducer`: The background work that turns a coordinate into a `ChunkArtifact`
//! - `ChunkTask`: A queued request for one coordinate, ordered by priority
//! - `ChunkState`: Where a coordinate currently is in the pipeline
//!
//! ## Task Lifecycle
//! 1. A `ChunkTask` is queued via `StreamingScheduler::enqueue()` (`Queued`)
//! 2. `dispatch()` hands it to a worker thread (`Generating`)
//! 3. The worker runs the `ChunkProducer` and sends the artifact back (`ReadyForUpload`)
//! 4. The main thread uploads it and marks it `Resident`
//! 5. Eviction forgets the coordinate entirely
//!
//! ## Thread Safety
//! - `ChunkProducer` must be `Send + Sync`: one instance is shared by every worker
//! - Artifacts are moved, never shared, from worker to main thread

use std::{cmp::Ordering, time::Duration};

use crate::{
    engine_state::{rendering::meshing::ChunkArtifact, voxels::chunk::ChunkCoordinate},
    error::GenerationError,
};

/// The background work performed for one chunk.
///
/// # Implementation Guidelines
/// - Runs on a worker thread; must not touch GPU state
/// - Must be a pure producer: everything it needs is owned or shared read-only
/// - Should return an error rather than panic; a panic still releases the worker slot
pub trait ChunkProducer: Send + Sync {
    /// Produces the render-ready artifact of a chunk.
    ///
    /// # Arguments
    /// * `coordinate` - The chunk to produce
    fn produce(&self, coordinate: ChunkCoordinate) -> Result<ChunkArtifact, GenerationError>;
}

/// Position of a coordinate in the streaming pipeline.
///
/// A coordinate with no state is unrequested.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ChunkState {
    /// Waiting in the priority queue
    Queued,
    /// Being produced on a worker
    Generating,
    /// Produced and waiting in the completion channel
    ReadyForUpload,
    /// Uploaded and drawable
    Resident,
}

/// A queued request for one chunk.
///
/// Ordered so that a `BinaryHeap<ChunkTask>` pops the *lowest* priority value
/// (the closest chunk) first.
#[derive(Copy, Clone, Debug)]
pub struct ChunkTask {
    /// The chunk to produce
    pub coordinate: ChunkCoordinate,
    /// Distance from the viewpoint at enqueue time
    pub priority: f32,
}

impl PartialEq for ChunkTask {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for ChunkTask {}

impl PartialOrd for ChunkTask {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ChunkTask {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .priority
            .total_cmp(&self.priority)
            .then_with(|| other.coordinate.cmp(&self.coordinate))
    }
}

/// What a worker sends back through the completion channel.
#[derive(Debug)]
pub(crate) struct Completion {
    pub coordinate: ChunkCoordinate,
    pub result: Result<ChunkArtifact, GenerationError>,
    pub elapsed: Duration,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BinaryHeap;

    #[test]
    fn heap_pops_closest_first() {
        let mut heap = BinaryHeap::new();
        for (x, priority) in [(0, 3.0), (1, 0.5), (2, 7.25), (3, 1.0)] {
            heap.push(ChunkTask {
                coordinate: ChunkCoordinate::new(x, 0),
                priority,
            });
        }
        let order: Vec<i32> = std::iter::from_fn(|| heap.pop())
            .map(|task| task.coordinate.x)
            .collect();
        assert_eq!(order, vec![1, 3, 0, 2]);
    }
}
