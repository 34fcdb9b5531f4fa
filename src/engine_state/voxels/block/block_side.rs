//! # Block Side Module
//!
//! This module defines the different faces/sides of a voxel block.
//! It provides the neighbour offsets and normals used for face culling.

use cgmath::Vector3;

/// Represents the six possible faces of a voxel block.
///
/// Each variant is assigned a unique integer value which is used to index
/// the per-side texture tables.
///
/// The order is: [FRONT, BACK, BOTTOM, TOP, LEFT, RIGHT]
#[derive(PartialEq, Eq, Hash, Copy, Clone, Debug)]
pub enum BlockSide {
    /// The front face (facing positive Z)
    FRONT = 0,

    /// The back face (facing negative Z)
    BACK = 1,

    /// The bottom face (facing negative Y)
    BOTTOM = 2,

    /// The top face (facing positive Y)
    TOP = 3,

    /// The left face (facing negative X)
    LEFT = 4,

    /// The right face (facing positive X)
    RIGHT = 5,
}

impl BlockSide {
    /// Returns an array containing all six block faces in a consistent order.
    ///
    /// This is useful for iterating over all possible faces of a block.
    /// The order is: [FRONT, BACK, BOTTOM, TOP, LEFT, RIGHT]
    pub fn all() -> [BlockSide; 6] {
        [
            BlockSide::FRONT,
            BlockSide::BACK,
            BlockSide::BOTTOM,
            BlockSide::TOP,
            BlockSide::LEFT,
            BlockSide::RIGHT,
        ]
    }

    /// The offset `(dx, dy, dz)` from a voxel to its neighbour on this side.
    pub fn neighbour_offset(self) -> (i32, i32, i32) {
        match self {
            BlockSide::FRONT => (0, 0, 1),
            BlockSide::BACK => (0, 0, -1),
            BlockSide::BOTTOM => (0, -1, 0),
            BlockSide::TOP => (0, 1, 0),
            BlockSide::LEFT => (-1, 0, 0),
            BlockSide::RIGHT => (1, 0, 0),
        }
    }

    /// The outward unit normal of this side.
    pub fn normal(self) -> Vector3<f32> {
        let (x, y, z) = self.neighbour_offset();
        Vector3::new(x as f32, y as f32, z as f32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::InnerSpace;

    #[test]
    fn normals_are_unit_and_opposite_in_pairs() {
        for side in BlockSide::all() {
            assert!((side.normal().magnitude() - 1.0).abs() < f32::EPSILON);
        }
        assert_eq!(BlockSide::FRONT.normal(), -BlockSide::BACK.normal());
        assert_eq!(BlockSide::TOP.normal(), -BlockSide::BOTTOM.normal());
        assert_eq!(BlockSide::RIGHT.normal(), -BlockSide::LEFT.normal());
    }

    #[test]
    fn discriminants_follow_table_order() {
        for (index, side) in BlockSide::all().into_iter().enumerate() {
            assert_eq!(side as usize, index);
        }
    }
}
