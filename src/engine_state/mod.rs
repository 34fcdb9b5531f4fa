//! # Engine State Module
//!
//! The core engine module: everything between a viewpoint moving through the
//! world and the draw calls of the chunks around it.
//!
//! ## Key Components
//!
//! * `EngineState` - Drives one frame: moves the viewpoint, ticks the world, draws
//! * `rendering` - Meshing, materials and the GPU backend boundary
//! * `task_management` - The streaming scheduler and its worker threads
//! * `viewpoint` - A scripted observer used to drive the world
//! * `voxels` - Blocks, chunks, terrain and the streaming `World`
//!
//! ## Architecture
//!
//! Each subsystem owns one concern. `EngineState` only sequences them once per
//! frame and keeps running statistics; it holds no chunk state of its own.

use log::trace;
use web_time::Duration;

use rendering::gpu::GpuBackend;
use viewpoint::Viewpoint;
use voxels::world::{TickReport, World};

pub mod rendering;
pub mod task_management;
pub mod viewpoint;
pub mod voxels;

/// Running totals over every frame of an `EngineState`.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct FrameStats {
    /// Frames run
    pub frames: u64,
    /// Chunks uploaded
    pub uploaded: usize,
    /// Chunks evicted
    pub evicted: usize,
    /// Finished chunks discarded as stale
    pub stale_discarded: usize,
    /// Uploads refused by the backend
    pub failed_uploads: usize,
    /// Draw calls issued by the last frame
    pub draw_calls: usize,
    /// Indices drawn by the last frame
    pub indices_drawn: usize,
    /// Highest number of workers seen running at the end of a frame
    pub peak_in_flight: usize,
}

/// The per-frame driver of the streaming world.
///
/// # Examples
///
/// ```
/// use cgmath::{Deg, Point3};
/// use voxel_streaming::{
///     EngineState, HeadlessGpu, MaterialRegistry, StreamingConfig, Viewpoint, World,
/// };
/// use web_time::Duration;
///
/// let world = World::new(StreamingConfig::default(), MaterialRegistry::default(), HeadlessGpu::new())
///     .expect("default config is valid");
/// let mut engine = EngineState::new(world, Viewpoint::new(Point3::new(0.0, 48.0, 0.0), Deg(0.0), 16.0));
///
/// for _ in 0..3 {
///     engine.frame(Duration::from_millis(16));
/// }
/// assert_eq!(engine.stats().frames, 3);
/// ```
pub struct EngineState<G: GpuBackend> {
    /// The streaming world
    pub world: World<G>,
    /// The observer the world streams around
    pub viewpoint: Viewpoint,
    stats: FrameStats,
}

impl<G: GpuBackend> EngineState<G> {
    /// Creates a new engine state.
    pub fn new(world: World<G>, viewpoint: Viewpoint) -> Self {
        EngineState {
            world,
            viewpoint,
            stats: FrameStats::default(),
        }
    }

    /// Moves the viewpoint and ticks the world.
    ///
    /// # Arguments
    /// * `dt` - Time elapsed since the previous update
    pub fn update(&mut self, dt: Duration) -> TickReport {
        self.viewpoint.advance(dt);
        let report = self.world.tick(self.viewpoint.position);

        self.stats.frames += 1;
        self.stats.uploaded += report.uploaded;
        self.stats.evicted += report.evicted;
        self.stats.stale_discarded += report.stale_discarded;
        self.stats.failed_uploads += report.failed_uploads.len();
        self.stats.peak_in_flight = self
            .stats
            .peak_in_flight
            .max(self.world.scheduler().in_flight());

        report
    }

    /// Draws every resident chunk.
    ///
    /// There is no real device behind the backend boundary here, so drawing
    /// means counting what a renderer would submit.
    pub fn render(&mut self) {
        let mut draw_calls = 0;
        let mut indices_drawn = 0;
        self.world.render_all(|batch| {
            trace!(
                "Draw {:?} of chunk {} ({} indices)",
                batch.block_type,
                batch.coordinate,
                batch.index_count
            );
            draw_calls += 1;
            indices_drawn += batch.index_count;
        });
        self.stats.draw_calls = draw_calls;
        self.stats.indices_drawn = indices_drawn;
    }

    /// Runs one full frame: update followed by render.
    pub fn frame(&mut self, dt: Duration) -> TickReport {
        let report = self.update(dt);
        self.render();
        report
    }

    /// Statistics accumulated so far.
    pub fn stats(&self) -> FrameStats {
        self.stats
    }

    /// Shuts the world down.
    pub fn shutdown(&mut self) {
        self.world.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::StreamingConfig,
        engine_state::{
            rendering::{gpu::HeadlessGpu, material::MaterialRegistry},
            voxels::chunk::ChunkDimensions,
        },
    };
    use cgmath::{Deg, Point3};

    fn engine(viewpoint: Viewpoint) -> EngineState<HeadlessGpu> {
        let config = StreamingConfig {
            dimensions: ChunkDimensions::new(4, 4, 8),
            load_radius: 1,
            unload_radius: 2.0,
            ..StreamingConfig::default()
        };
        let world = World::new(config, MaterialRegistry::default(), HeadlessGpu::new()).unwrap();
        EngineState::new(world, viewpoint)
    }

    #[test]
    fn frames_accumulate_statistics() {
        let mut engine = engine(Viewpoint::stationary(Point3::new(1.0, 4.0, 1.0)));
        let deadline = std::time::Instant::now() + std::time::Duration::from_secs(20);
        while engine.world.resident_count() < 9 {
            assert!(std::time::Instant::now() < deadline);
            engine.frame(Duration::from_millis(1));
            std::thread::sleep(std::time::Duration::from_millis(1));
        }

        let stats = engine.stats();
        assert_eq!(stats.uploaded, 9);
        assert_eq!(stats.evicted, 0);
        assert!(stats.peak_in_flight <= engine.world.config().max_in_flight);
        assert!(stats.draw_calls >= 9);
        assert!(stats.indices_drawn > 0);
    }

    #[test]
    fn moving_viewpoint_is_followed() {
        let mut engine = engine(Viewpoint::new(Point3::new(1.0, 4.0, 1.0), Deg(0.0), 4.0));
        engine.update(Duration::from_secs(0));
        engine.update(Duration::from_secs(3));
        // 12 blocks along +X is three chunks of width 4.
        assert_eq!(
            engine.world.viewpoint_chunk(),
            Some(voxels::chunk::ChunkCoordinate::new(3, 0))
        );
        assert_eq!(engine.stats().frames, 2);
        engine.shutdown();
        assert_eq!(engine.world.gpu().live_buffers(), 0);
    }
}
