//! Materials and the texture atlas layout.
//!
//! The renderer binds one material per mesh batch. Materials are looked up by
//! block type in a [`MaterialRegistry`] that is built once at startup and
//! handed to the world, rather than living in global state.

use std::collections::HashMap;

use crate::engine_state::voxels::block::{block_type::BlockType, AtlasTile};

/// Texture name of the block atlas, unless configured otherwise.
pub const DEFAULT_ATLAS_TEXTURE: &str = "blocks_atlas";
/// Number of tiles along each side of the atlas, unless configured otherwise.
pub const DEFAULT_ATLAS_TILES: u32 = 16;

/// A square texture atlas split into `tiles x tiles` equally sized tiles.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct AtlasLayout {
    tiles: u32,
}

impl AtlasLayout {
    /// Creates a layout with `tiles` tiles per row and per column.
    ///
    /// A value of zero is treated as one.
    pub fn new(tiles: u32) -> Self {
        AtlasLayout {
            tiles: tiles.max(1),
        }
    }

    /// Tiles per row and per column.
    pub fn tiles(&self) -> u32 {
        self.tiles
    }

    /// Normalized texture coordinates of a tile.
    ///
    /// # Returns
    /// `(min, max)` corners of the tile, both in `0.0..=1.0`.
    pub fn tile_bounds(&self, (column, row): AtlasTile) -> ([f32; 2], [f32; 2]) {
        let tiles = self.tiles as f32;
        (
            [column as f32 / tiles, row as f32 / tiles],
            [(column + 1) as f32 / tiles, (row + 1) as f32 / tiles],
        )
    }
}

impl Default for AtlasLayout {
    fn default() -> Self {
        AtlasLayout::new(DEFAULT_ATLAS_TILES)
    }
}

/// Everything the renderer binds before drawing one batch.
#[derive(Clone, Debug, PartialEq)]
pub struct Material {
    /// Name of the texture to bind
    pub texture: String,
    /// Atlas layout of that texture
    pub atlas: AtlasLayout,
}

/// Lookup table from block type to material.
#[derive(Clone, Debug)]
pub struct MaterialRegistry {
    materials: HashMap<BlockType, Material>,
}

impl MaterialRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        MaterialRegistry {
            materials: HashMap::new(),
        }
    }

    /// A registry where every solid block type uses the shared block atlas.
    pub fn with_block_atlas(atlas: AtlasLayout) -> Self {
        let mut registry = MaterialRegistry::new();
        for block_type in BlockType::SOLID {
            registry.insert(
                block_type,
                Material {
                    texture: DEFAULT_ATLAS_TEXTURE.to_owned(),
                    atlas,
                },
            );
        }
        registry
    }

    /// Registers or replaces the material of a block type.
    pub fn insert(&mut self, block_type: BlockType, material: Material) -> Option<Material> {
        self.materials.insert(block_type, material)
    }

    /// Looks up the material of a block type.
    pub fn get(&self, block_type: BlockType) -> Option<&Material> {
        self.materials.get(&block_type)
    }

    /// Name of the texture used by a block type, if it has a material.
    pub fn texture_name(&self, block_type: BlockType) -> Option<&str> {
        self.get(block_type).map(|material| material.texture.as_str())
    }
}

impl Default for MaterialRegistry {
    fn default() -> Self {
        MaterialRegistry::with_block_atlas(AtlasLayout::default())
    }
}
