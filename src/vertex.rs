//! # Vertex Module
//!
//! This module provides the `Vertex` struct used by every mesh in the crate. A vertex carries a
//! position, a surface normal and a texture coordinate, interleaved in a single buffer so that one
//! vertex occupies exactly eight `f32` values (32 bytes).
//!
//! # Overview
//!
//! ## Structs
//!
//! - [`Vertex`]: A single vertex with position, normal and texture-coordinate attributes.
//!
//! ## Methods
//!
//! - [`Vertex::vertex_attributes`]: Returns the vertex attributes layout supported by the `Vertex` struct.
//! - [`Vertex::description`]: Returns the high-level memory layout for vertex data to be provided to the GPU.
//!
//! ## Layout
//!
//! | Location | Attribute    | Format      | Byte offset |
//! |----------|--------------|-------------|-------------|
//! | 0        | `position`   | `Float32x3` | 0           |
//! | 1        | `normal`     | `Float32x3` | 12          |
//! | 2        | `tex_coords` | `Float32x2` | 24          |
//!
//! The stride is `size_of::<Vertex>()`, i.e. 32 bytes. Shaders consuming these buffers must declare
//! their inputs at the same locations (see `shaders/lighting.wgsl`).
//!
//! ```rust,ignore
//! use wgpu::util::DeviceExt;
//!
//! let mesh = torus_core::TorusGeometry::default().build();
//! let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
//!     label: Some("Torus Vertex Buffer"),
//!     contents: bytemuck::cast_slice(&mesh.vertices),
//!     usage: wgpu::BufferUsages::VERTEX,
//! });
//! ```
//!
//! # Crate Dependencies
//!
//! This module depends on the following crates:
//! - `wgpu` for the GPU attributes and layouts.
//! - `bytemuck` for safe and efficient conversion of structs for GPU usage.

/// A single interleaved vertex: position, normal and texture coordinate.
///
/// The struct is `#[repr(C)]` and `Pod`, so a `&[Vertex]` can be handed to the GPU with
/// `bytemuck::cast_slice` without any copying or repacking.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex {
    /// Object-space position `[x, y, z]`.
    pub position: [f32; 3],

    /// Unit-length surface normal `[x, y, z]`.
    pub normal: [f32; 3],

    /// Texture coordinate `[u, v]`, both in `[0.0, 1.0]` for generated meshes.
    pub tex_coords: [f32; 2],
}

impl Vertex {
    /// Number of `f32` values one vertex occupies in the vertex buffer.
    pub const FLOATS: usize = 8;

    /// Generates the vertex attributes layout for the `Vertex` struct.
    ///
    /// # Returns
    ///
    /// Three attributes, indexed from 0 in the vertex shader:
    ///
    /// - `position` as `Float32x3`
    /// - `normal` as `Float32x3`
    /// - `tex_coords` as `Float32x2`
    ///
    /// The offsets are accumulated by `wgpu::vertex_attr_array!`, which yields 0, 12 and 24 bytes.
    pub fn vertex_attributes() -> Vec<wgpu::VertexAttribute> {
        wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3, 2 => Float32x2].to_vec()
    }

    /// Returns the vertex buffer layout for the `Vertex` struct.
    ///
    /// # Parameters
    ///
    /// - `attributes`: The attributes produced by [`Vertex::vertex_attributes`].
    ///
    /// # Returns
    ///
    /// A `wgpu::VertexBufferLayout` whose stride is the size of one `Vertex` and whose step mode
    /// advances once per vertex.
    ///
    /// ```rust,ignore
    /// let attributes = Vertex::vertex_attributes();
    /// let layout = Vertex::description(&attributes);
    /// ```
    pub fn description(attributes: &[wgpu::VertexAttribute]) -> wgpu::VertexBufferLayout {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vertex_is_eight_floats() {
        assert_eq!(
            std::mem::size_of::<Vertex>(),
            Vertex::FLOATS * std::mem::size_of::<f32>()
        );
    }

    #[test]
    fn attributes_follow_interleaved_layout() {
        let attributes = Vertex::vertex_attributes();
        let offsets: Vec<_> = attributes
            .iter()
            .map(|a| (a.shader_location, a.offset, a.format))
            .collect();
        assert_eq!(
            offsets,
            vec![
                (0, 0, wgpu::VertexFormat::Float32x3),
                (1, 12, wgpu::VertexFormat::Float32x3),
                (2, 24, wgpu::VertexFormat::Float32x2),
            ]
        );

        let layout = Vertex::description(&attributes);
        assert_eq!(layout.array_stride, 32);
        assert_eq!(layout.step_mode, wgpu::VertexStepMode::Vertex);
    }
}
