//! # World Module
//!
//! This module provides the `World` struct which keeps the chunks around a
//! moving viewpoint loaded. It is the central coordinator of the streaming
//! pipeline and the sole owner of every resident chunk's GPU resources.
//!
//! ## Architecture
//!
//! The world stores resident chunks in a registry keyed by `ChunkCoordinate`.
//! Each entry exclusively owns the backend handles of its batches; evicting a
//! chunk is one `remove` from the registry followed by releasing those handles.
//! Chunks that are queued or being generated live only in the scheduler.
//!
//! ## Tick
//!
//! `tick()` is called once per frame on the main thread:
//! 1. Upload a bounded number of finished chunks
//! 2. Find the viewpoint's chunk; stop here unless it changed
//! 3. Evict resident chunks beyond the unload radius
//! 4. Request every missing chunk of the load window, closest first
//! 5. Top up the scheduler's workers
//!
//! ## Performance Considerations
//!
//! - Upload cost is spread over frames by the per-tick drain budget
//! - The load and unload passes only run when the viewpoint changes chunk
//! - Chunk lookup is O(1) using a hash map

use std::{
    collections::{BTreeSet, HashMap},
    sync::Arc,
};

use cgmath::Point3;
use log::{debug, info, warn};

use crate::{
    config::StreamingConfig,
    engine_state::{
        rendering::{
            gpu::GpuBackend,
            material::{AtlasLayout, MaterialRegistry},
            meshing::{ChunkArtifact, ChunkMesher},
            DrawBatch,
        },
        task_management::{
            task::{ChunkProducer, ChunkState},
            StreamingScheduler,
        },
        voxels::{
            block::block_type::BlockType,
            chunk::{terrain::TerrainGenerator, ChunkCoordinate},
            tasks::chunk_generation_task::ChunkGenerationTask,
        },
    },
    error::{ConfigError, UploadError},
};

/// One uploaded batch of a resident chunk.
#[derive(Debug)]
pub struct ResidentBatch<H> {
    /// Block type of every face in the batch
    pub block_type: BlockType,
    /// Backend handle of the uploaded buffers
    pub handle: H,
    /// Number of indices to draw
    pub index_count: usize,
}

/// A chunk whose batches are on the GPU.
#[derive(Debug)]
pub struct ResidentChunk<H> {
    coordinate: ChunkCoordinate,
    batches: Vec<ResidentBatch<H>>,
    textures: BTreeSet<String>,
}

impl<H> ResidentChunk<H> {
    /// The chunk's coordinate.
    pub fn coordinate(&self) -> ChunkCoordinate {
        self.coordinate
    }

    /// The uploaded batches, in block type order.
    pub fn batches(&self) -> &[ResidentBatch<H>] {
        &self.batches
    }

    /// Textures the batches are drawn with.
    pub fn textures(&self) -> &BTreeSet<String> {
        &self.textures
    }
}

/// What one call to `World::tick` did.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct TickReport {
    /// Chunks uploaded and made resident
    pub uploaded: usize,
    /// Finished chunks thrown away because they were no longer wanted
    pub stale_discarded: usize,
    /// Resident chunks released
    pub evicted: usize,
    /// Queued requests dropped because the viewpoint moved away
    pub pruned: usize,
    /// New chunk requests
    pub enqueued: usize,
    /// Workers started
    pub dispatched: usize,
    /// Uploads the GPU backend refused; those chunks stay absent
    pub failed_uploads: Vec<UploadError>,
}

/// Streams terrain chunks around a viewpoint.
///
/// # Type Parameters
/// - `G`: The GPU backend that receives uploads and releases
///
/// # Examples
///
/// ```
/// use cgmath::Point3;
/// use voxel_streaming::{HeadlessGpu, MaterialRegistry, StreamingConfig, World};
///
/// let mut world = World::new(
///     StreamingConfig::default(),
///     MaterialRegistry::default(),
///     HeadlessGpu::new(),
/// )
/// .expect("default config is valid");
///
/// // Once per frame:
/// let report = world.tick(Point3::new(8.0, 40.0, 8.0));
/// assert!(report.enqueued > 0);
///
/// world.render_all(|batch| {
///     let _ = (batch.handle, batch.material, batch.translation);
/// });
/// world.shutdown();
/// ```
pub struct World<G: GpuBackend> {
    config: StreamingConfig,
    scheduler: StreamingScheduler,
    resident: HashMap<ChunkCoordinate, ResidentChunk<G::Handle>>,
    materials: MaterialRegistry,
    gpu: G,
    /// `None` until the first tick, or after `request_refresh()`
    viewpoint_chunk: Option<ChunkCoordinate>,
}

impl<G: GpuBackend> World<G> {
    /// Creates a world that generates terrain with the configured settings.
    ///
    /// # Arguments
    /// * `config` - Streaming configuration, validated here
    /// * `materials` - Material lookup used while drawing
    /// * `gpu` - Backend receiving uploads and releases
    pub fn new(
        config: StreamingConfig,
        materials: MaterialRegistry,
        gpu: G,
    ) -> Result<Self, ConfigError> {
        let producer = ChunkGenerationTask::new(
            TerrainGenerator::new(config.terrain, config.dimensions),
            ChunkMesher::new(config.emit_bottom_faces, AtlasLayout::new(config.atlas_tiles)),
            materials.clone(),
        );
        World::with_producer(config, Arc::new(producer), materials, gpu)
    }

    /// Creates a world whose chunks come from a custom producer.
    pub fn with_producer(
        config: StreamingConfig,
        producer: Arc<dyn ChunkProducer>,
        materials: MaterialRegistry,
        gpu: G,
    ) -> Result<Self, ConfigError> {
        config.validate()?;

        info!(
            "Creating world: load radius {} ({:?}), unload radius {}, {} workers, {} uploads per tick",
            config.load_radius,
            config.load_window,
            config.unload_radius,
            config.max_in_flight,
            config.max_uploads_per_tick
        );

        Ok(World {
            scheduler: StreamingScheduler::new(producer, config.max_in_flight),
            config,
            resident: HashMap::new(),
            materials,
            gpu,
            viewpoint_chunk: None,
        })
    }

    /// Advances the streaming pipeline by one frame.
    ///
    /// # Arguments
    /// * `viewpoint` - World-space position of the camera
    ///
    /// # Returns
    /// A summary of the work done, including any upload failures.
    pub fn tick(&mut self, viewpoint: Point3<f32>) -> TickReport {
        let mut report = TickReport::default();
        if self.scheduler.is_shut_down() {
            return report;
        }

        let center = ChunkCoordinate::from_world_position(viewpoint, &self.config.dimensions);

        for artifact in self.scheduler.drain_ready(self.config.max_uploads_per_tick) {
            self.promote(artifact, center, &mut report);
        }

        if self.viewpoint_chunk != Some(center) {
            if let Some(previous) = self.viewpoint_chunk {
                debug!("Viewpoint moved from chunk {} to {}", previous, center);
            }
            report.evicted = self.unload_distant(center);
            let unload_radius = self.config.unload_radius;
            report.pruned = self
                .scheduler
                .prune_queued(|coordinate| center.distance(&coordinate) <= unload_radius);
            report.enqueued = self.load_nearby(center);
            self.viewpoint_chunk = Some(center);
        }

        report.dispatched = self.scheduler.dispatch();
        report
    }

    /// Requests every missing chunk of the load window around `center`.
    ///
    /// # Returns
    /// The number of new requests.
    pub fn load_nearby(&mut self, center: ChunkCoordinate) -> usize {
        self.config
            .load_window
            .coordinates(center, self.config.load_radius)
            .into_iter()
            .filter(|coordinate| self.scheduler.enqueue(*coordinate, center.distance(coordinate)))
            .count()
    }

    /// Releases every resident chunk farther than the unload radius from `center`.
    ///
    /// # Returns
    /// The number of chunks released.
    pub fn unload_distant(&mut self, center: ChunkCoordinate) -> usize {
        let unload_radius = self.config.unload_radius;
        let distant: Vec<ChunkCoordinate> = self
            .resident
            .keys()
            .filter(|coordinate| center.distance(coordinate) > unload_radius)
            .copied()
            .collect();

        for coordinate in &distant {
            if let Some(chunk) = self.resident.remove(coordinate) {
                self.release(chunk);
            }
            self.scheduler.forget(*coordinate);
        }

        if !distant.is_empty() {
            debug!("Evicted {} chunks around {}", distant.len(), center);
        }
        distant.len()
    }

    /// Calls `draw` once per batch of every resident chunk.
    ///
    /// # Arguments
    /// * `draw` - Receives the handle, material, index count and translation of each batch
    pub fn render_all(&self, mut draw: impl FnMut(DrawBatch<'_, G::Handle>)) {
        for chunk in self.resident.values() {
            let translation = chunk.coordinate.world_origin(&self.config.dimensions);
            for batch in &chunk.batches {
                draw(DrawBatch {
                    coordinate: chunk.coordinate,
                    block_type: batch.block_type,
                    handle: &batch.handle,
                    material: self.materials.get(batch.block_type),
                    index_count: batch.index_count,
                    translation,
                });
            }
        }
    }

    /// Forces the next tick to run the load and unload passes even if the
    /// viewpoint stays in the same chunk.
    ///
    /// Chunks whose generation or upload failed are only requested again by a
    /// load pass.
    pub fn request_refresh(&mut self) {
        self.viewpoint_chunk = None;
    }

    /// Releases every resident chunk and stops the scheduler.
    ///
    /// Workers still running are abandoned; their results are discarded.
    /// Calling this more than once has no further effect.
    pub fn shutdown(&mut self) {
        if self.scheduler.is_shut_down() && self.resident.is_empty() {
            return;
        }

        self.scheduler.shutdown();
        let released = self.resident.len();
        for (_, chunk) in self.resident.drain() {
            for batch in chunk.batches {
                self.gpu.release(batch.handle);
            }
        }
        self.viewpoint_chunk = None;
        info!("World shut down, released {} chunks", released);
    }

    /// Number of resident chunks.
    pub fn resident_count(&self) -> usize {
        self.resident.len()
    }

    /// Returns `true` if the chunk is uploaded and drawable.
    pub fn is_resident(&self, coordinate: ChunkCoordinate) -> bool {
        self.resident.contains_key(&coordinate)
    }

    /// Looks up a resident chunk.
    pub fn resident_chunk(&self, coordinate: ChunkCoordinate) -> Option<&ResidentChunk<G::Handle>> {
        self.resident.get(&coordinate)
    }

    /// Coordinates of every resident chunk, in no particular order.
    pub fn resident_coordinates(&self) -> impl Iterator<Item = ChunkCoordinate> + '_ {
        self.resident.keys().copied()
    }

    /// The chunk the viewpoint was in at the last load pass.
    pub fn viewpoint_chunk(&self) -> Option<ChunkCoordinate> {
        self.viewpoint_chunk
    }

    /// The scheduler, for inspecting the pipeline.
    pub fn scheduler(&self) -> &StreamingScheduler {
        &self.scheduler
    }

    /// The active configuration.
    pub fn config(&self) -> &StreamingConfig {
        &self.config
    }

    /// The GPU backend.
    pub fn gpu(&self) -> &G {
        &self.gpu
    }

    /// The GPU backend, mutably.
    pub fn gpu_mut(&mut self) -> &mut G {
        &mut self.gpu
    }

    /// Uploads a finished chunk, or discards it if it is no longer wanted.
    fn promote(&mut self, artifact: ChunkArtifact, center: ChunkCoordinate, report: &mut TickReport) {
        let coordinate = artifact.coordinate();
        let tracked = self.scheduler.state(coordinate) == Some(ChunkState::ReadyForUpload);

        if !tracked || center.distance(&coordinate) > self.config.unload_radius {
            if tracked {
                self.scheduler.forget(coordinate);
            }
            debug!("Discarding stale chunk {}", coordinate);
            report.stale_discarded += 1;
            return;
        }

        match self.upload(artifact) {
            Ok(chunk) => {
                self.resident.insert(coordinate, chunk);
                self.scheduler.mark_resident(coordinate);
                report.uploaded += 1;
            }
            Err(upload_error) => {
                warn!("Upload of chunk {} failed: {}", coordinate, upload_error);
                self.scheduler.forget(coordinate);
                report.failed_uploads.push(upload_error);
            }
        }
    }

    /// Uploads every batch of an artifact.
    ///
    /// On failure the batches already uploaded are released again, so a chunk
    /// is either fully resident or holds nothing on the GPU.
    fn upload(&mut self, artifact: ChunkArtifact) -> Result<ResidentChunk<G::Handle>, UploadError> {
        let coordinate = artifact.coordinate();
        let textures = artifact.textures().clone();
        let mut chunk = ResidentChunk {
            coordinate,
            batches: Vec::new(),
            textures,
        };

        for (block_type, batch) in artifact.into_batches() {
            if batch.is_empty() {
                continue;
            }
            match self.gpu.upload(coordinate, block_type, &batch) {
                Ok(handle) => chunk.batches.push(ResidentBatch {
                    block_type,
                    handle,
                    index_count: batch.index_count(),
                }),
                Err(upload_error) => {
                    self.release(chunk);
                    return Err(upload_error);
                }
            }
        }

        Ok(chunk)
    }

    fn release(&mut self, chunk: ResidentChunk<G::Handle>) {
        for batch in chunk.batches {
            self.gpu.release(batch.handle);
        }
    }
}

impl<G: GpuBackend> Drop for World<G> {
    fn drop(&mut self) {
        self.shutdown();
    }
}
