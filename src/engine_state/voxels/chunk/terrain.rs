//! # Terrain Generation
//!
//! Deterministic height-field terrain. Each chunk column samples multi-octave
//! Perlin noise at its world-space position, the sample is scaled into the
//! chunk's vertical extent, and the column is filled in layers:
//!
//! - `y == h - 1`: `GRASS`
//! - `y <  h - 1`: `DIRT`
//! - `y >= h`: `EMPTY`
//!
//! The output depends only on the chunk coordinate, the noise settings and the
//! chunk dimensions, so a chunk that is unloaded and later regenerated looks
//! exactly the same.

use noise::{Fbm, MultiFractal, NoiseFn, Perlin};
use serde::{Deserialize, Serialize};

use crate::{
    engine_state::voxels::block::block_type::BlockType, error::GenerationError,
};

use super::{ChunkCoordinate, ChunkDimensions, VoxelGrid, VoxelGridBuilder};

/// Noise seed used unless configured otherwise.
pub const DEFAULT_SEED: u32 = 1_234_567_890;
/// World-space scale applied to block coordinates before sampling noise.
pub const DEFAULT_NOISE_SCALE: f64 = 0.05;
/// Number of noise octaves summed per sample.
pub const DEFAULT_OCTAVES: usize = 3;

/// Parameters of the terrain noise.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TerrainSettings {
    /// Seed of the Perlin permutation table
    pub seed: u32,
    /// Scale applied to world block coordinates
    pub scale: f64,
    /// Number of fractal octaves
    pub octaves: usize,
}

impl Default for TerrainSettings {
    fn default() -> Self {
        TerrainSettings {
            seed: DEFAULT_SEED,
            scale: DEFAULT_NOISE_SCALE,
            octaves: DEFAULT_OCTAVES,
        }
    }
}

/// Column heights of one chunk, indexed `x * depth + z`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HeightMap {
    depth: usize,
    heights: Vec<usize>,
}

impl HeightMap {
    /// Height of the column at `(x, z)`: the number of solid blocks in it.
    pub fn get(&self, x: usize, z: usize) -> usize {
        self.heights[x * self.depth + z]
    }

    /// All column heights in `x * depth + z` order.
    pub fn heights(&self) -> &[usize] {
        &self.heights
    }
}

/// Produces the block data for a chunk from coherent noise.
///
/// Holds no mutable state, so a single generator is shared by every worker.
pub struct TerrainGenerator {
    /// Fractal Perlin noise, seeded once
    noise: Fbm<Perlin>,
    /// The settings the noise was built from
    settings: TerrainSettings,
    /// The extent of every generated chunk
    dimensions: ChunkDimensions,
}

impl TerrainGenerator {
    /// Creates a new generator.
    ///
    /// # Arguments
    /// * `settings` - Seed, scale and octave count of the noise
    /// * `dimensions` - The extent of every generated chunk
    pub fn new(settings: TerrainSettings, dimensions: ChunkDimensions) -> Self {
        let noise = Fbm::<Perlin>::new(settings.seed)
            .set_octaves(settings.octaves.max(1))
            .set_frequency(1.0);
        TerrainGenerator {
            noise,
            settings,
            dimensions,
        }
    }

    /// The extent of every generated chunk.
    pub fn dimensions(&self) -> &ChunkDimensions {
        &self.dimensions
    }

    /// The noise settings.
    pub fn settings(&self) -> &TerrainSettings {
        &self.settings
    }

    /// Computes the column heights of a chunk.
    ///
    /// # Arguments
    /// * `coordinate` - The chunk to sample
    ///
    /// # Returns
    /// One height per column in `0..=height`, or a `GenerationError` if the
    /// dimensions are degenerate or the noise misbehaves.
    pub fn height_map(&self, coordinate: ChunkCoordinate) -> Result<HeightMap, GenerationError> {
        let ChunkDimensions {
            width,
            depth,
            height,
        } = self.dimensions;
        if width == 0 || depth == 0 || height == 0 {
            return Err(GenerationError::InvalidDimensions(self.dimensions));
        }

        let origin_x = coordinate.x as f64 * width as f64;
        let origin_z = coordinate.z as f64 * depth as f64;
        let mut heights = Vec::with_capacity(self.dimensions.columns());

        for x in 0..width {
            for z in 0..depth {
                let sample = self.noise.get([
                    (origin_x + x as f64) * self.settings.scale,
                    (origin_z + z as f64) * self.settings.scale,
                ]);
                if !sample.is_finite() {
                    return Err(GenerationError::NonFiniteNoise { coordinate, x, z });
                }
                let normalized = (sample * 0.5 + 0.5).clamp(0.0, 1.0);
                heights.push(((normalized * height as f64) as usize).min(height));
            }
        }

        Ok(HeightMap { depth, heights })
    }

    /// Generates the full block grid of a chunk.
    ///
    /// # Arguments
    /// * `coordinate` - The chunk to generate
    pub fn generate(&self, coordinate: ChunkCoordinate) -> Result<VoxelGrid, GenerationError> {
        let height_map = self.height_map(coordinate)?;
        let mut builder = VoxelGridBuilder::new(self.dimensions);

        for &column_height in height_map.heights() {
            builder.push_column(|y| classify(y, column_height));
        }

        builder.build()
    }
}

/// Block type at height `y` of a column whose surface height is `column_height`.
#[inline]
pub fn classify(y: usize, column_height: usize) -> BlockType {
    if y >= column_height {
        BlockType::EMPTY
    } else if y + 1 == column_height {
        BlockType::GRASS
    } else {
        BlockType::DIRT
    }
}
