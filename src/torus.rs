//! # Torus
//!
//! A renderable torus: procedural geometry uploaded once, plus the material and texture settings
//! used when it is drawn.
//!
//! ## Construction
//!
//! Every constructor generates and uploads the same mesh for a given [`TorusGeometry`]; they differ
//! only in which surface settings they fill in.
//!
//! | Constructor                  | Intended draw call            |
//! |------------------------------|-------------------------------|
//! | [`Torus::new`]               | either, after calling a setter |
//! | [`Torus::with_material`]     | [`Torus::draw_with_material`] |
//! | [`Torus::with_texture`]      | [`Torus::draw_with_texture`]  |
//! | [`Torus::from_geometry`]     | either, custom shape          |
//!
//! ## Drawing
//!
//! Both draw calls make the shader current, push the surface uniforms, set the model matrix (the
//! identity unless a `*_at` variant is used), bind the mesh and issue one indexed triangle-list
//! draw. Nothing is validated: unknown texture handles and uniform names are left to the context
//! and the shader.
//!
//! ## Ownership
//!
//! The torus owns its mesh handle. Dropping the torus drops the mesh, which releases the GPU
//! buffers. The setters only touch per-draw uniform values, so geometry is never re-uploaded.

use nalgebra_glm::{Mat4, Vec3};

use crate::context::{GpuMesh, GraphicsDevice, RenderContext};
use crate::geometry::TorusGeometry;
use crate::shader::Shader;
use crate::texture::TextureHandle;

/// Texture-coordinate window handed to [`Torus::with_texture`].
///
/// Stored on the torus but not applied to the generated coordinates, which always span
/// `[0, 1] × [0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TexCoordWindow {
    pub min_u: f32,
    pub max_u: f32,
    pub min_v: f32,
    pub max_v: f32,
}

impl Default for TexCoordWindow {
    fn default() -> Self {
        Self {
            min_u: 0.0,
            max_u: 1.0,
            min_v: 0.0,
            max_v: 1.0,
        }
    }
}

/// A torus mesh plus the surface settings its draw calls push to the shader.
///
/// `M` is whatever the [`GraphicsDevice`] that built it produces; [`GpuMesh`] for wgpu.
///
/// ```
/// use torus_core::{GraphicsDevice, MeshData, TextureHandle, Torus};
///
/// struct CpuDevice;
///
/// impl GraphicsDevice for CpuDevice {
///     type Mesh = MeshData;
///
///     fn upload_mesh(&self, _label: &str, data: &MeshData) -> MeshData {
///         data.clone()
///     }
/// }
///
/// let mut torus = Torus::new(&CpuDevice);
/// torus.set_texture(TextureHandle(1), TextureHandle(2), 32.0);
///
/// assert_eq!(torus.diffuse_map(), TextureHandle(1));
/// assert_eq!(torus.shininess(), 32.0);
/// assert_eq!(torus.mesh().index_count(), torus.index_count());
/// ```
pub struct Torus<M = GpuMesh> {
    ambient: Vec3,
    diffuse: Vec3,
    specular: Vec3,

    diffuse_map: TextureHandle,
    specular_map: TextureHandle,
    tex_coord_window: TexCoordWindow,

    shininess: f32,

    mesh: M,
    vertex_count: u32,
    index_count: u32,
}

impl<M> Torus<M> {
    /// Default-shaped torus with zeroed material and no textures.
    pub fn new<D>(device: &D) -> Self
    where
        D: GraphicsDevice<Mesh = M>,
    {
        Self::from_geometry(device, &TorusGeometry::default())
    }

    /// Default-shaped torus for [`Torus::draw_with_material`].
    pub fn with_material<D>(
        device: &D,
        ambient: Vec3,
        diffuse: Vec3,
        specular: Vec3,
        shininess: f32,
    ) -> Self
    where
        D: GraphicsDevice<Mesh = M>,
    {
        let mut torus = Self::new(device);
        torus.set_material(ambient, diffuse, specular, shininess);
        torus
    }

    /// Default-shaped torus for [`Torus::draw_with_texture`].
    pub fn with_texture<D>(
        device: &D,
        diffuse_map: TextureHandle,
        specular_map: TextureHandle,
        shininess: f32,
        tex_coord_window: TexCoordWindow,
    ) -> Self
    where
        D: GraphicsDevice<Mesh = M>,
    {
        let mut torus = Self::new(device);
        torus.set_texture(diffuse_map, specular_map, shininess);
        torus.tex_coord_window = tex_coord_window;
        torus
    }

    /// Generates `geometry` and uploads it through `device`.
    pub fn from_geometry<D>(device: &D, geometry: &TorusGeometry) -> Self
    where
        D: GraphicsDevice<Mesh = M>,
    {
        let data = geometry.build();
        let mesh = device.upload_mesh("Torus", &data);

        Self {
            ambient: Vec3::zeros(),
            diffuse: Vec3::zeros(),
            specular: Vec3::zeros(),
            diffuse_map: TextureHandle::NONE,
            specular_map: TextureHandle::NONE,
            tex_coord_window: TexCoordWindow::default(),
            shininess: 0.0,
            mesh,
            vertex_count: data.vertex_count(),
            index_count: data.index_count(),
        }
    }

    /// Draws with the diffuse and specular maps and an identity model matrix.
    pub fn draw_with_texture<C>(&self, ctx: &mut C, shader: &mut C::Shader)
    where
        C: RenderContext<Mesh = M>,
    {
        self.draw_with_texture_at(ctx, shader, &Mat4::identity());
    }

    /// Draws with the diffuse map on texture unit 0 and the specular map on unit 1.
    pub fn draw_with_texture_at<C>(&self, ctx: &mut C, shader: &mut C::Shader, model: &Mat4)
    where
        C: RenderContext<Mesh = M>,
    {
        shader.use_program();

        shader.set_int("material.diffuse", 0);
        shader.set_int("material.specular", 1);
        shader.set_float("material.shininess", self.shininess);

        ctx.bind_texture(0, self.diffuse_map);
        ctx.bind_texture(1, self.specular_map);

        shader.set_mat4("model", model);

        ctx.bind_vertex_array(&self.mesh);
        ctx.draw_elements(shader, self.index_count);
    }

    /// Draws with the material colours and an identity model matrix.
    pub fn draw_with_material<C>(&self, ctx: &mut C, shader: &mut C::Shader)
    where
        C: RenderContext<Mesh = M>,
    {
        self.draw_with_material_at(ctx, shader, &Mat4::identity());
    }

    /// Draws with the flat ambient, diffuse and specular colours.
    pub fn draw_with_material_at<C>(&self, ctx: &mut C, shader: &mut C::Shader, model: &Mat4)
    where
        C: RenderContext<Mesh = M>,
    {
        shader.use_program();

        shader.set_vec3("material.ambient", &self.ambient);
        shader.set_vec3("material.diffuse", &self.diffuse);
        shader.set_vec3("material.specular", &self.specular);
        shader.set_float("material.shininess", self.shininess);

        shader.set_mat4("model", model);

        ctx.bind_vertex_array(&self.mesh);
        ctx.draw_elements(shader, self.index_count);
    }

    /// Replaces the material colours and the shininess used by [`Torus::draw_with_material`].
    pub fn set_material(&mut self, ambient: Vec3, diffuse: Vec3, specular: Vec3, shininess: f32) {
        self.ambient = ambient;
        self.diffuse = diffuse;
        self.specular = specular;
        self.shininess = shininess;
    }

    /// Replaces both maps and the shininess. The texture-coordinate window is kept.
    pub fn set_texture(&mut self, diffuse_map: TextureHandle, specular_map: TextureHandle, shininess: f32) {
        self.diffuse_map = diffuse_map;
        self.specular_map = specular_map;
        self.shininess = shininess;
    }

    /// Ambient material colour.
    pub fn ambient(&self) -> Vec3 {
        self.ambient
    }

    /// Diffuse material colour.
    pub fn diffuse(&self) -> Vec3 {
        self.diffuse
    }

    /// Specular material colour.
    pub fn specular(&self) -> Vec3 {
        self.specular
    }

    /// Specular exponent, shared by both draw paths.
    pub fn shininess(&self) -> f32 {
        self.shininess
    }

    /// Texture bound to unit 0 by [`Torus::draw_with_texture`].
    pub fn diffuse_map(&self) -> TextureHandle {
        self.diffuse_map
    }

    /// Texture bound to unit 1 by [`Torus::draw_with_texture`].
    pub fn specular_map(&self) -> TextureHandle {
        self.specular_map
    }

    /// Window handed to [`Torus::with_texture`]; stored, never applied to the mesh.
    pub fn tex_coord_window(&self) -> TexCoordWindow {
        self.tex_coord_window
    }

    /// Vertices in the uploaded vertex buffer.
    pub fn vertex_count(&self) -> u32 {
        self.vertex_count
    }

    /// Indices in the uploaded index buffer; every draw issues exactly this many.
    pub fn index_count(&self) -> u32 {
        self.index_count
    }

    /// The GPU-resident mesh owned by this torus.
    pub fn mesh(&self) -> &M {
        &self.mesh
    }
}
