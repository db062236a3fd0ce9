//! Vertex layout of chunk meshes.
//!
//! The layout is plain `#[repr(C)]` data so hosts can upload a mesh with a
//! single byte copy.

use cgmath::{Point3, Vector3};

/// A single mesh vertex.
///
/// # Memory Layout
/// - Position: [f32; 3] (12 bytes), chunk-local, scaled by block size
/// - Normal: [f32; 3] (12 bytes)
/// - Color: [f32; 4] (16 bytes), smooth light brightness in RGB, alpha 1
/// - UV: [f32; 2] (8 bytes)
/// - UV2: [f32; 2] (8 bytes), x holds the texture array layer
///
/// Total size: 56 bytes
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub color: [f32; 4],
    pub uv: [f32; 2],
    pub uv2: [f32; 2],
}

/// Describes one attribute of [`Vertex`] for a host's pipeline setup.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct VertexAttribute {
    pub name: &'static str,
    /// Shader location.
    pub location: u32,
    /// Byte offset from the start of the vertex.
    pub offset: usize,
    /// Number of `f32` components.
    pub components: usize,
}

impl Vertex {
    pub fn new(
        position: Point3<f32>,
        normal: Vector3<f32>,
        brightness: f32,
        uv: [f32; 2],
        layer: u32,
    ) -> Self {
        Vertex {
            position: position.into(),
            normal: normal.into(),
            color: [brightness, brightness, brightness, 1.0],
            uv,
            uv2: [layer as f32, 0.0],
        }
    }

    /// Attribute table matching the field order.
    ///
    /// # Shader Attributes
    /// - `location = 0`: position (vec3<f32>)
    /// - `location = 1`: normal (vec3<f32>)
    /// - `location = 2`: color (vec4<f32>)
    /// - `location = 3`: uv (vec2<f32>)
    /// - `location = 4`: uv2 (vec2<f32>)
    pub fn layout() -> [VertexAttribute; 5] {
        const F32: usize = std::mem::size_of::<f32>();
        [
            VertexAttribute { name: "position", location: 0, offset: 0, components: 3 },
            VertexAttribute { name: "normal", location: 1, offset: 3 * F32, components: 3 },
            VertexAttribute { name: "color", location: 2, offset: 6 * F32, components: 4 },
            VertexAttribute { name: "uv", location: 3, offset: 10 * F32, components: 2 },
            VertexAttribute { name: "uv2", location: 4, offset: 12 * F32, components: 2 },
        ]
    }

    /// Bytes between consecutive vertices.
    pub const fn stride() -> usize {
        std::mem::size_of::<Vertex>()
    }
}
