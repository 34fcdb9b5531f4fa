//! # Streaming Configuration
//!
//! All tunables of the streaming core in one serde-friendly struct. Every
//! field has a default, so a JSON file only needs to name what it changes:
//!
//! ```rust
//! use voxel_streaming::{LoadWindow, StreamingConfig};
//!
//! let config = StreamingConfig::from_json_str(r#"{ "load_radius": 3, "unload_radius": 6.0 }"#)
//!     .expect("valid config");
//! assert_eq!(config.load_radius, 3);
//! assert_eq!(config.load_window, LoadWindow::Square);
//! assert_eq!(config.max_in_flight, 16);
//! ```

use std::{fs, path::Path};

use serde::{Deserialize, Serialize};

use crate::{
    engine_state::{
        rendering::material::DEFAULT_ATLAS_TILES,
        task_management::MAX_TASKS_IN_FLIGHT,
        voxels::chunk::{terrain::TerrainSettings, ChunkCoordinate, ChunkDimensions},
    },
    error::ConfigError,
};

/// Chunks loaded around the viewpoint chunk in each direction.
pub const DEFAULT_LOAD_RADIUS: i32 = 5;

/// Resident chunks farther than this from the viewpoint chunk are evicted.
pub const DEFAULT_UNLOAD_RADIUS: f32 = (DEFAULT_LOAD_RADIUS * 2) as f32;

/// Largest accepted load radius. A square window of this radius already holds
/// about four million chunks.
pub const MAX_LOAD_RADIUS: i32 = 1024;

/// Artifacts uploaded per tick.
pub const DEFAULT_UPLOADS_PER_TICK: usize = 2;

/// Shape of the set of chunks kept loaded around the viewpoint.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoadWindow {
    /// Every chunk with `|dx| <= r` and `|dz| <= r`
    #[default]
    Square,
    /// Every chunk with `dx² + dz² <= r²`
    Circle,
}

impl LoadWindow {
    /// The farthest planar distance from the centre to a chunk in the window.
    pub fn reach(&self, radius: i32) -> f32 {
        match self {
            LoadWindow::Square => radius as f32 * std::f32::consts::SQRT_2,
            LoadWindow::Circle => radius as f32,
        }
    }

    /// Lists the chunks of the window around `center`, closest first.
    ///
    /// # Arguments
    /// * `center` - The viewpoint chunk
    /// * `radius` - The load radius in chunks
    ///
    /// The radius is clamped to `0..=MAX_LOAD_RADIUS`.
    pub fn coordinates(&self, center: ChunkCoordinate, radius: i32) -> Vec<ChunkCoordinate> {
        let radius = radius.clamp(0, MAX_LOAD_RADIUS);
        let side = 2 * radius as usize + 1;
        let mut coordinates = Vec::with_capacity(side * side);

        let radius_squared = i64::from(radius) * i64::from(radius);
        for dx in -radius..=radius {
            for dz in -radius..=radius {
                let (dx64, dz64) = (i64::from(dx), i64::from(dz));
                if *self == LoadWindow::Circle && dx64 * dx64 + dz64 * dz64 > radius_squared {
                    continue;
                }
                coordinates.push(ChunkCoordinate::new(
                    center.x.wrapping_add(dx),
                    center.z.wrapping_add(dz),
                ));
            }
        }

        coordinates.sort_by(|a, b| {
            center
                .distance(a)
                .total_cmp(&center.distance(b))
                .then_with(|| a.cmp(b))
        });
        coordinates
    }
}

/// Tunables of the streaming core.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamingConfig {
    /// Size of every chunk in voxels
    pub dimensions: ChunkDimensions,
    /// Noise parameters of the terrain
    pub terrain: TerrainSettings,
    /// Load window radius in chunks
    pub load_radius: i32,
    /// Eviction distance in chunks
    pub unload_radius: f32,
    /// Shape of the load window
    pub load_window: LoadWindow,
    /// Maximum concurrent generation workers
    pub max_in_flight: usize,
    /// Maximum completions drained per tick
    pub max_uploads_per_tick: usize,
    /// Emit faces pointing down
    pub emit_bottom_faces: bool,
    /// Tiles per side of the block texture atlas
    pub atlas_tiles: u32,
}

impl Default for StreamingConfig {
    fn default() -> Self {
        StreamingConfig {
            dimensions: ChunkDimensions::default(),
            terrain: TerrainSettings::default(),
            load_radius: DEFAULT_LOAD_RADIUS,
            unload_radius: DEFAULT_UNLOAD_RADIUS,
            load_window: LoadWindow::default(),
            max_in_flight: MAX_TASKS_IN_FLIGHT,
            max_uploads_per_tick: DEFAULT_UPLOADS_PER_TICK,
            emit_bottom_faces: false,
            atlas_tiles: DEFAULT_ATLAS_TILES,
        }
    }
}

impl StreamingConfig {
    /// Parses and validates a JSON configuration.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: StreamingConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a JSON configuration file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    /// Checks the configuration for values the streaming core cannot run with.
    ///
    /// The unload radius must cover every chunk the load window can request,
    /// otherwise a chunk at the window's edge would be evicted right after it
    /// was loaded and requested again on the next move.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let ChunkDimensions {
            width,
            depth,
            height,
        } = self.dimensions;
        if width == 0 || depth == 0 || height == 0 {
            return Err(ConfigError::ZeroDimension(self.dimensions));
        }
        if self.load_radius < 0 {
            return Err(ConfigError::NegativeLoadRadius(self.load_radius));
        }
        if self.load_radius > MAX_LOAD_RADIUS {
            return Err(ConfigError::LoadRadiusTooLarge {
                load_radius: self.load_radius,
                max: MAX_LOAD_RADIUS,
            });
        }
        if self.max_in_flight == 0 {
            return Err(ConfigError::ZeroLimit("max_in_flight"));
        }
        if self.max_uploads_per_tick == 0 {
            return Err(ConfigError::ZeroLimit("max_uploads_per_tick"));
        }
        if self.atlas_tiles == 0 {
            return Err(ConfigError::ZeroLimit("atlas_tiles"));
        }

        let required = self.load_window.reach(self.load_radius);
        if self.unload_radius.is_nan() || self.unload_radius < required {
            return Err(ConfigError::UnloadRadiusTooSmall {
                unload_radius: self.unload_radius,
                required,
            });
        }
        Ok(())
    }
}
