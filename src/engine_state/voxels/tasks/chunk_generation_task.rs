//! # Chunk Generation Task
//!
//! This module defines the `ChunkGenerationTask`, the background work run for
//! every chunk the world requests. It fills the chunk's voxels from terrain
//! noise and meshes them, producing a `ChunkArtifact` that the main thread can
//! upload without any further computation.

use std::collections::BTreeSet;

use log::debug;
use web_time::Instant;

use crate::{
    config::StreamingConfig,
    engine_state::{
        rendering::{
            material::{AtlasLayout, MaterialRegistry},
            meshing::{ChunkArtifact, ChunkMesher},
        },
        task_management::task::ChunkProducer,
        voxels::chunk::{terrain::TerrainGenerator, ChunkCoordinate},
    },
    error::GenerationError,
};

/// Generates and meshes one chunk per call.
///
/// This task is responsible for:
/// 1. Filling the chunk's voxel grid from the terrain height map
/// 2. Meshing the grid with face culling
/// 3. Collecting the names of the textures the batches reference
///
/// Shared read-only by every worker.
pub struct ChunkGenerationTask {
    generator: TerrainGenerator,
    mesher: ChunkMesher,
    materials: MaterialRegistry,
}

impl ChunkGenerationTask {
    /// Creates a new chunk generation task.
    ///
    /// # Arguments
    /// * `generator` - Terrain source
    /// * `mesher` - Mesher applied to every generated grid
    /// * `materials` - Used to name the textures each artifact needs
    pub fn new(generator: TerrainGenerator, mesher: ChunkMesher, materials: MaterialRegistry) -> Self {
        ChunkGenerationTask {
            generator,
            mesher,
            materials,
        }
    }

    /// Builds the task from a streaming configuration with the default block materials.
    pub fn from_config(config: &StreamingConfig) -> Self {
        let atlas = AtlasLayout::new(config.atlas_tiles);
        ChunkGenerationTask::new(
            TerrainGenerator::new(config.terrain, config.dimensions),
            ChunkMesher::new(config.emit_bottom_faces, atlas),
            MaterialRegistry::with_block_atlas(atlas),
        )
    }
}

impl ChunkProducer for ChunkGenerationTask {
    fn produce(&self, coordinate: ChunkCoordinate) -> Result<ChunkArtifact, GenerationError> {
        let started = Instant::now();

        let grid = self.generator.generate(coordinate)?;
        let generated = started.elapsed();

        let batches = self.mesher.mesh(&grid);
        let textures: BTreeSet<String> = batches
            .keys()
            .filter_map(|block_type| self.materials.texture_name(*block_type))
            .map(str::to_owned)
            .collect();

        let artifact = ChunkArtifact::new(coordinate, batches, textures);
        debug!(
            "Chunk {}: {} solid blocks, {} faces (generate {:.2} ms, total {:.2} ms)",
            coordinate,
            grid.solid_count(),
            artifact.face_count(),
            generated.as_secs_f64() * 1000.0,
            started.elapsed().as_secs_f64() * 1000.0
        );

        Ok(artifact)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine_state::voxels::{
        block::block_type::BlockType,
        chunk::ChunkDimensions,
    };

    fn small_config() -> StreamingConfig {
        StreamingConfig {
            dimensions: ChunkDimensions::new(8, 8, 16),
            ..StreamingConfig::default()
        }
    }

    #[test]
    fn produces_a_meshed_artifact() {
        let task = ChunkGenerationTask::from_config(&small_config());
        let artifact = task.produce(ChunkCoordinate::new(1, -1)).unwrap();

        assert_eq!(artifact.coordinate(), ChunkCoordinate::new(1, -1));
        assert!(artifact.face_count() > 0);
        // Every column is topped with grass.
        assert!(artifact.batches().contains_key(&BlockType::GRASS));
        assert!(!artifact.batches().contains_key(&BlockType::EMPTY));
        assert!(artifact.textures().contains("blocks_atlas"));
    }

    #[test]
    fn production_is_deterministic() {
        let task = ChunkGenerationTask::from_config(&small_config());
        let first = task.produce(ChunkCoordinate::new(4, 9)).unwrap();
        let second = task.produce(ChunkCoordinate::new(4, 9)).unwrap();
        assert_eq!(first.into_batches(), second.into_batches());
    }

    #[test]
    fn invalid_dimensions_fail_without_panicking() {
        let config = StreamingConfig {
            dimensions: ChunkDimensions::new(0, 8, 16),
            ..StreamingConfig::default()
        };
        let task = ChunkGenerationTask::from_config(&config);
        assert!(matches!(
            task.produce(ChunkCoordinate::new(0, 0)),
            Err(GenerationError::InvalidDimensions(_))
        ));
    }
}
