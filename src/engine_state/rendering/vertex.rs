//! Vertex data structures for voxel rendering.
//!
//! This module defines the CPU-side vertex format produced by the mesher and
//! handed to the GPU collaborator as raw bytes.

use cgmath::{Point3, Vector3};

/// A vertex in the voxel rendering pipeline.
///
/// # Memory Layout
/// - Position: 3x f32 (12 bytes)
/// - Texture Coordinates: 2x f32 (8 bytes)
/// - Normal: 3x f32 (12 bytes)
///
/// Total size: 32 bytes, interleaved in that order
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex {
    /// Position relative to the chunk origin
    pub position: [f32; 3],
    /// Normalized atlas texture coordinates
    pub tex_coords: [f32; 2],
    /// Outward face normal
    pub normal: [f32; 3],
}

impl Vertex {
    /// Creates a new vertex.
    ///
    /// # Arguments
    /// * `pos` - The position relative to the chunk origin
    /// * `tex_coords` - Normalized texture coordinates inside the atlas
    /// * `normal` - The outward normal of the face this vertex belongs to
    pub fn new(pos: Point3<f32>, tex_coords: [f32; 2], normal: Vector3<f32>) -> Self {
        Vertex {
            position: pos.into(),
            tex_coords,
            normal: normal.into(),
        }
    }

    /// Size in bytes of one vertex as uploaded.
    pub const STRIDE: usize = std::mem::size_of::<Vertex>();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_is_tightly_packed() {
        assert_eq!(Vertex::STRIDE, 32);
        let vertex = Vertex::new(
            Point3::new(1.0, 2.0, 3.0),
            [0.25, 0.5],
            Vector3::new(0.0, 1.0, 0.0),
        );
        let raw: &[f32] = bytemuck::cast_slice(std::slice::from_ref(&vertex));
        assert_eq!(raw, &[1.0, 2.0, 3.0, 0.25, 0.5, 0.0, 1.0, 0.0]);
    }
}
