//! The GPU collaborator boundary.
//!
//! The streaming core never creates graphics resources itself. It hands each
//! finished mesh batch to a [`GpuBackend`] on the main thread and keeps the
//! opaque handle it gets back until the chunk is evicted.
//!
//! [`HeadlessGpu`] is an in-memory backend used by the demo binary and tests:
//! it copies the batch bytes into owned buffers and tracks what is alive.

use std::collections::HashMap;

use crate::{
    engine_state::voxels::{block::block_type::BlockType, chunk::ChunkCoordinate},
    error::UploadError,
};

use super::meshing::MeshBatch;

/// Turns CPU-side mesh batches into GPU resources and releases them again.
///
/// Every method is called on the main thread only.
pub trait GpuBackend {
    /// Opaque handle to the uploaded vertex and index buffers of one batch.
    type Handle;

    /// Uploads one batch.
    ///
    /// # Arguments
    /// * `coordinate` - The chunk the batch belongs to
    /// * `block_type` - The block type of the batch
    /// * `batch` - The vertex and index data
    fn upload(
        &mut self,
        coordinate: ChunkCoordinate,
        block_type: BlockType,
        batch: &MeshBatch,
    ) -> Result<Self::Handle, UploadError>;

    /// Releases the resources behind a handle.
    fn release(&mut self, handle: Self::Handle);
}

/// Handle issued by [`HeadlessGpu`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct BufferId(pub u64);

/// Buffers held by [`HeadlessGpu`] for one handle.
#[derive(Debug)]
struct HeadlessBuffers {
    vertex_buffer: Vec<u8>,
    index_buffer: Vec<u8>,
}

/// An in-memory GPU backend.
///
/// Uploads copy the batch into owned byte buffers. An optional memory budget
/// makes uploads fail with `UploadError::OutOfMemory` once exceeded, and a
/// one-shot failure switch lets tests inject a binding failure.
#[derive(Debug, Default)]
pub struct HeadlessGpu {
    buffers: HashMap<BufferId, HeadlessBuffers>,
    next_id: u64,
    live_bytes: usize,
    memory_budget: Option<usize>,
    fail_next_uploads: usize,
    uploads: usize,
    releases: usize,
}

impl HeadlessGpu {
    /// Creates a backend without a memory budget.
    pub fn new() -> Self {
        HeadlessGpu::default()
    }

    /// Creates a backend that refuses uploads beyond `bytes` of live memory.
    pub fn with_memory_budget(bytes: usize) -> Self {
        HeadlessGpu {
            memory_budget: Some(bytes),
            ..HeadlessGpu::default()
        }
    }

    /// Makes the next `count` uploads fail with a binding error.
    pub fn fail_next_uploads(&mut self, count: usize) {
        self.fail_next_uploads = count;
    }

    /// Number of handles currently alive.
    pub fn live_buffers(&self) -> usize {
        self.buffers.len()
    }

    /// Bytes held by live handles.
    pub fn live_bytes(&self) -> usize {
        self.live_bytes
    }

    /// Total successful uploads since creation.
    pub fn upload_count(&self) -> usize {
        self.uploads
    }

    /// Total releases since creation.
    pub fn release_count(&self) -> usize {
        self.releases
    }

    /// Size of the index buffer behind a handle, in indices.
    pub fn index_count(&self, id: BufferId) -> Option<usize> {
        self.buffers
            .get(&id)
            .map(|buffers| buffers.index_buffer.len() / std::mem::size_of::<u32>())
    }
}

impl GpuBackend for HeadlessGpu {
    type Handle = BufferId;

    fn upload(
        &mut self,
        coordinate: ChunkCoordinate,
        block_type: BlockType,
        batch: &MeshBatch,
    ) -> Result<BufferId, UploadError> {
        if self.fail_next_uploads > 0 {
            self.fail_next_uploads -= 1;
            return Err(UploadError::Binding {
                coordinate,
                block_type,
                reason: "injected failure".to_owned(),
            });
        }

        let bytes = batch.byte_len();
        if let Some(budget) = self.memory_budget {
            if self.live_bytes + bytes > budget {
                return Err(UploadError::OutOfMemory {
                    coordinate,
                    block_type,
                    bytes,
                });
            }
        }

        let id = BufferId(self.next_id);
        self.next_id += 1;
        self.buffers.insert(
            id,
            HeadlessBuffers {
                vertex_buffer: batch.vertex_bytes().to_vec(),
                index_buffer: batch.index_bytes().to_vec(),
            },
        );
        self.live_bytes += bytes;
        self.uploads += 1;
        Ok(id)
    }

    fn release(&mut self, handle: BufferId) {
        if let Some(buffers) = self.buffers.remove(&handle) {
            self.live_bytes -= buffers.vertex_buffer.len() + buffers.index_buffer.len();
            self.releases += 1;
        } else {
            log::warn!("Release of unknown buffer {:?}", handle);
        }
    }
}
