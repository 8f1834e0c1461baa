//! # Graphics Context
//!
//! The two seams between a drawable and the graphics API:
//!
//! - [`GraphicsDevice`] turns [`MeshData`] into a GPU-resident mesh once, at construction time.
//! - [`RenderContext`] binds textures and meshes and issues indexed draws, once per frame.
//!
//! `wgpu::Device` implements [`GraphicsDevice`] by uploading into a [`GpuMesh`], and
//! [`FrameContext`] implements [`RenderContext`] by recording into a `wgpu::RenderPass`.

use wgpu::util::DeviceExt;

use crate::geometry::MeshData;
use crate::shader::{LightingShader, Shader, TEXTURE_UNITS};
use crate::texture::{TextureHandle, TextureRegistry};

/// Creates GPU-resident meshes.
pub trait GraphicsDevice {
    /// Owns the uploaded buffers; dropping it releases them.
    type Mesh;

    fn upload_mesh(&self, label: &str, data: &MeshData) -> Self::Mesh;
}

/// Records binds and draws for one frame.
pub trait RenderContext {
    type Mesh;
    type Shader: Shader;

    /// Binds `texture` to texture unit `unit` for the draws that follow.
    fn bind_texture(&mut self, unit: u32, texture: TextureHandle);

    /// Makes `mesh` the vertex and index source for the draws that follow.
    fn bind_vertex_array(&mut self, mesh: &Self::Mesh);

    /// Draws `index_count` indices of the bound mesh as a triangle list using `shader`.
    fn draw_elements(&mut self, shader: &mut Self::Shader, index_count: u32);
}

/// One immutable vertex buffer and one immutable `u32` index buffer.
pub struct GpuMesh {
    pub vertex_buffer: wgpu::Buffer,

    pub index_buffer: wgpu::Buffer,

    vertex_count: u32,

    index_count: u32,
}

impl GpuMesh {
    pub fn vertex_count(&self) -> u32 {
        self.vertex_count
    }

    pub fn index_count(&self) -> u32 {
        self.index_count
    }
}

impl Drop for GpuMesh {
    fn drop(&mut self) {
        log::trace!(
            "Releasing mesh buffers ({} vertices, {} indices)",
            self.vertex_count,
            self.index_count
        );
        self.vertex_buffer.destroy();
        self.index_buffer.destroy();
    }
}

impl GraphicsDevice for wgpu::Device {
    type Mesh = GpuMesh;

    fn upload_mesh(&self, label: &str, data: &MeshData) -> GpuMesh {
        let vertex_buffer = self.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{label} Vertex Buffer")),
            contents: bytemuck::cast_slice(&data.vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });

        let index_buffer = self.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{label} Index Buffer")),
            contents: bytemuck::cast_slice(&data.indices),
            usage: wgpu::BufferUsages::INDEX,
        });

        log::debug!(
            "Uploaded '{label}': {} bytes of vertices, {} bytes of indices",
            vertex_buffer.size(),
            index_buffer.size()
        );

        GpuMesh {
            vertex_buffer,
            index_buffer,
            vertex_count: data.vertex_count(),
            index_count: data.index_count(),
        }
    }
}

/// A [`RenderContext`] that records into an open render pass.
pub struct FrameContext<'a, 'pass> {
    pass: &'a mut wgpu::RenderPass<'pass>,

    device: &'a wgpu::Device,

    queue: &'a wgpu::Queue,

    textures: &'a TextureRegistry,

    units: [TextureHandle; TEXTURE_UNITS],
}

impl<'a, 'pass> FrameContext<'a, 'pass> {
    pub fn new(
        pass: &'a mut wgpu::RenderPass<'pass>,
        device: &'a wgpu::Device,
        queue: &'a wgpu::Queue,
        textures: &'a TextureRegistry,
    ) -> Self {
        Self {
            pass,
            device,
            queue,
            textures,
            units: [TextureHandle::NONE; TEXTURE_UNITS],
        }
    }
}

impl RenderContext for FrameContext<'_, '_> {
    type Mesh = GpuMesh;
    type Shader = LightingShader;

    fn bind_texture(&mut self, unit: u32, texture: TextureHandle) {
        match self.units.get_mut(unit as usize) {
            Some(slot) => *slot = texture,
            None => log::warn!("Texture unit {unit} is out of range, ignoring {texture:?}"),
        }
    }

    fn bind_vertex_array(&mut self, mesh: &GpuMesh) {
        self.pass.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
        self.pass
            .set_index_buffer(mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
    }

    fn draw_elements(&mut self, shader: &mut LightingShader, index_count: u32) {
        shader.bind(self.pass, self.device, self.queue, self.textures, &self.units);
        self.pass.draw_indexed(0..index_count, 0, 0..1);
    }
}
