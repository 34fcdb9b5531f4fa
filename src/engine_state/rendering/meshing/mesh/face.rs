use cgmath::{Point3, Vector3};

use crate::engine_state::voxels::block::{block_side::BlockSide, block_type::BlockType};

/// Represents a single quad face of a voxel in the mesh.
///
/// A face is defined by four corner points (lower-left, lower-right,
/// upper-right, upper-left) as seen from outside the voxel, looking against the
/// face normal. In that order the corners wind counter-clockwise.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Face {
    /// Lower-left corner of the face in chunk coordinates
    pub ll: Point3<f32>,
    /// Lower-right corner of the face in chunk coordinates
    pub lr: Point3<f32>,
    /// Upper-right corner of the face in chunk coordinates
    pub ur: Point3<f32>,
    /// Upper-left corner of the face in chunk coordinates
    pub ul: Point3<f32>,
    /// The block type this face belongs to
    pub block_type: BlockType,
    /// Which side of the block this face represents
    pub block_side: BlockSide,
}

impl Face {
    /// Creates a new face for a voxel at the given coordinates.
    ///
    /// The voxel at `(i, j, k)` occupies the unit cube from `(i, j, k)` to
    /// `(i + 1, j + 1, k + 1)`.
    ///
    /// # Arguments
    /// * `i`, `j`, `k` - The coordinates of the voxel in chunk space
    /// * `block_type` - The type of the block
    /// * `block_side` - Which side of the block this face represents
    pub fn new(i: usize, j: usize, k: usize, block_type: BlockType, block_side: BlockSide) -> Self {
        let (x, y, z) = (i as f32, j as f32, k as f32);

        // Origin of the lower-left corner, then the in-plane "right" and "up"
        // axes. right x up is the outward normal.
        let (base, right, up) = match block_side {
            BlockSide::FRONT => (
                Point3::new(x, y, z + 1.0),
                Vector3::unit_x(),
                Vector3::unit_y(),
            ),
            BlockSide::BACK => (
                Point3::new(x + 1.0, y, z),
                -Vector3::unit_x(),
                Vector3::unit_y(),
            ),
            BlockSide::BOTTOM => (Point3::new(x, y, z), Vector3::unit_x(), Vector3::unit_z()),
            BlockSide::TOP => (
                Point3::new(x, y + 1.0, z + 1.0),
                Vector3::unit_x(),
                -Vector3::unit_z(),
            ),
            BlockSide::LEFT => (Point3::new(x, y, z), Vector3::unit_z(), Vector3::unit_y()),
            BlockSide::RIGHT => (
                Point3::new(x + 1.0, y, z + 1.0),
                -Vector3::unit_z(),
                Vector3::unit_y(),
            ),
        };

        Face {
            ll: base,
            lr: base + right,
            ur: base + right + up,
            ul: base + up,
            block_type,
            block_side,
        }
    }

    /// The corners in emission order: lower-left, lower-right, upper-right, upper-left.
    pub fn corners(&self) -> [Point3<f32>; 4] {
        [self.ll, self.lr, self.ur, self.ul]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::InnerSpace;

    #[test]
    fn corners_wind_counter_clockwise_around_the_normal() {
        for side in BlockSide::all() {
            let face = Face::new(2, 3, 4, BlockType::DIRT, side);
            let winding = (face.lr - face.ll).cross(face.ur - face.ll);
            assert!(
                (winding.normalize() - side.normal()).magnitude() < 1e-6,
                "{side:?} winds the wrong way"
            );
        }
    }

    #[test]
    fn faces_lie_on_the_voxel_boundary() {
        for side in BlockSide::all() {
            let face = Face::new(2, 3, 4, BlockType::DIRT, side);
            let centre = Point3::new(2.5, 3.5, 4.5);
            for corner in face.corners() {
                let offset = corner - centre;
                assert!((offset.dot(side.normal()) - 0.5).abs() < 1e-6);
                assert!(offset.x.abs() <= 0.5 && offset.y.abs() <= 0.5 && offset.z.abs() <= 0.5);
            }
        }
    }
}
