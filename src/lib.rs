#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![warn(rustdoc::invalid_rust_codeblocks)]

//! # Voxel Streaming
//!
//! The chunk streaming core of a voxel terrain engine: it keeps the terrain
//! around a moving viewpoint generated, meshed and uploaded, and releases it
//! again once the viewpoint has moved on.
//!
//! ## Key Modules
//!
//! * `config` - Tunables of the streaming core, loadable from JSON
//! * `core` - Concurrency primitives used throughout the engine
//! * `engine_state` - Terrain, meshing, scheduling and the streaming world
//! * `error` - Error types of every fallible operation
//!
//! ## Architecture
//!
//! ```text
//! World::tick ──► StreamingScheduler ──► worker threads
//!    ▲                                     │ TerrainGenerator → ChunkMesher
//!    │                                     ▼
//!    └──── drain_ready (bounded) ◄──── completion channel
//!            │
//!            ▼
//!        GpuBackend::upload ──► resident registry ──► render_all
//! ```
//!
//! * Workers are pure CPU producers and never touch GPU state
//! * Only the main thread uploads, evicts and draws
//! * A bounded number of chunks is uploaded per frame
//!
//! ## Usage
//!
//! ```rust
//! use cgmath::Point3;
//! use voxel_streaming::{HeadlessGpu, MaterialRegistry, StreamingConfig, World};
//!
//! let mut world = World::new(StreamingConfig::default(), MaterialRegistry::default(), HeadlessGpu::new())?;
//! for _ in 0..10 {
//!     world.tick(Point3::new(0.0, 48.0, 0.0));
//! }
//! world.render_all(|batch| println!("{} {:?}: {} indices", batch.coordinate, batch.block_type, batch.index_count));
//! # Ok::<(), voxel_streaming::ConfigError>(())
//! ```
//!
//! The binary runs the same loop over a scripted flight:
//!
//! ```bash
//! RUST_LOG=info cargo run --release -- streaming.json
//! ```

use std::{env, thread};

use anyhow::Context;
use cgmath::{Deg, Point3};
use log::info;
use web_time::{Duration, Instant};

pub mod config;
pub mod core;
pub mod engine_state;
pub mod error;

pub use config::{LoadWindow, StreamingConfig};
pub use engine_state::{
    rendering::{
        gpu::{BufferId, GpuBackend, HeadlessGpu},
        material::{AtlasLayout, Material, MaterialRegistry},
        meshing::{ChunkArtifact, ChunkMesher, MeshBatch},
        DrawBatch, Vertex,
    },
    task_management::{
        task::{ChunkProducer, ChunkState},
        StreamingScheduler,
    },
    viewpoint::Viewpoint,
    voxels::{
        block::{block_side::BlockSide, block_type::BlockType},
        chunk::{terrain::TerrainGenerator, ChunkCoordinate, ChunkDimensions, VoxelGrid},
        tasks::chunk_generation_task::ChunkGenerationTask,
        world::{TickReport, World},
    },
    EngineState, FrameStats,
};
pub use error::{ConfigError, GenerationError, UploadError};

/// Frames simulated by `run()`.
pub const DEMO_FRAMES: u64 = 600;

/// Simulated time per frame.
pub const FRAME_TIME: Duration = Duration::from_millis(16);

/// Runs the headless streaming demo.
///
/// Reads an optional JSON configuration path from the first command line
/// argument, then flies a viewpoint across the terrain for `DEMO_FRAMES`
/// frames, logging what the streaming core does.
pub fn run() -> anyhow::Result<()> {
    let mut log_builder = env_logger::Builder::new();
    log_builder
        .target(env_logger::Target::Stdout)
        .parse_env("RUST_LOG")
        .init();
    info!("Logger initialized");

    let config = match env::args().nth(1) {
        Some(path) => StreamingConfig::from_path(&path)
            .with_context(|| format!("loading streaming config from {path}"))?,
        None => StreamingConfig::default(),
    };

    let materials = MaterialRegistry::with_block_atlas(AtlasLayout::new(config.atlas_tiles));
    let start = Point3::new(0.5, config.dimensions.height as f32, 0.5);
    let chunk_width = config.dimensions.width as f32;
    let world = World::new(config, materials, HeadlessGpu::new())?;

    // One chunk every half second.
    let viewpoint = Viewpoint::new(start, Deg(30.0), chunk_width * 2.0).with_turn_rate(Deg(3.0));
    let mut engine = EngineState::new(world, viewpoint);

    let started = Instant::now();
    for frame in 0..DEMO_FRAMES {
        let frame_start = Instant::now();
        let report = engine.frame(FRAME_TIME);

        if frame % 60 == 0 || !report.failed_uploads.is_empty() {
            let stats = engine.stats();
            info!(
                "Frame {}: viewpoint chunk {:?}, {} resident, {} in flight, {} queued, {} draw calls, {} uploads failed",
                frame,
                engine.world.viewpoint_chunk(),
                engine.world.resident_count(),
                engine.world.scheduler().in_flight(),
                engine.world.scheduler().queued_len(),
                stats.draw_calls,
                stats.failed_uploads
            );
        }

        if let Some(rest) = FRAME_TIME.checked_sub(frame_start.elapsed()) {
            thread::sleep(rest);
        }
    }

    let stats = engine.stats();
    engine.shutdown();
    info!(
        "Streamed {} chunks in {:.1} s: {} evicted, {} stale, peak {} workers, {} GPU bytes left",
        stats.uploaded,
        started.elapsed().as_secs_f32(),
        stats.evicted,
        stats.stale_discarded,
        stats.peak_in_flight,
        engine.world.gpu().live_bytes()
    );

    Ok(())
}
