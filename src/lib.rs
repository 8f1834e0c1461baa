//! # Torus Renderer Library
//!
//! This library renders a procedurally generated torus with wgpu, either with flat material colours
//! or with diffuse and specular texture maps, lit by a single point light. It is the mesh primitive
//! of a small fruit-slicing game demo, packaged with a window, an egui control panel and a scene
//! that shows both shading styles side by side.
//!
//! ## Modules
//!
//! - [`geometry`]: Generates torus vertices and indices ([`TorusGeometry`], [`MeshData`]).
//! - [`torus`]: The renderable [`Torus`]: owns the uploaded mesh and the surface settings.
//! - [`shader`]: The [`Shader`] contract and the wgpu [`LightingShader`].
//! - [`context`]: The [`GraphicsDevice`] and [`RenderContext`] seams and their wgpu implementations.
//! - [`texture`]: [`Texture`], [`TextureHandle`] and [`TextureRegistry`].
//! - `vertex`: The interleaved [`Vertex`] layout.
//! - `uniform_buffer` / `uniform_binding`: The per-draw lighting uniform block and its
//!   dynamic-offset storage.
//! - `app`, `renderer`, `gpu`, `scene`: The demo application.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use torus_core::{FrameContext, LightingShader, ShadingModel, Torus};
//! use nalgebra_glm::Vec3;
//!
//! let torus = Torus::with_material(
//!     &device,
//!     Vec3::new(0.2, 0.1, 0.06),
//!     Vec3::new(1.0, 0.5, 0.31),
//!     Vec3::new(0.5, 0.5, 0.5),
//!     32.0,
//! );
//! let mut shader = LightingShader::new(&device, surface_format, ShadingModel::Material);
//!
//! // Inside a render pass:
//! shader.begin_frame();
//! let mut ctx = FrameContext::new(&mut render_pass, &device, &queue, &textures);
//! torus.draw_with_material(&mut ctx, &mut shader);
//! ```
//!
//! ## Dependencies
//!
//! - `wgpu`: GPU buffers, pipelines and render passes.
//! - `winit`, `egui`: Window, events and the control panel.
//! - `nalgebra-glm`: Vectors and matrices.
//! - `bytemuck`: Casting vertex and uniform structs to bytes.
//! - `log`, `env_logger` / `console_log`: Logging.
//! - `thiserror`: Error types.

mod app;
mod gpu;
mod renderer;
mod scene;
mod uniform_binding;
mod uniform_buffer;
mod vertex;

pub mod context;
pub mod error;
pub mod geometry;
pub mod shader;
pub mod texture;
pub mod torus;

use web_time::Duration;

pub use crate::app::App;
pub use crate::context::{FrameContext, GpuMesh, GraphicsDevice, RenderContext};
pub use crate::error::{GeometryError, RenderError, Result};
pub use crate::geometry::{MeshData, TorusGeometry};
pub use crate::gpu::Gpu;
pub use crate::renderer::Renderer;
pub use crate::scene::{Scene, SceneControls};
pub use crate::shader::{LightingShader, Shader, ShadingModel, TEXTURE_UNITS};
pub use crate::texture::{Texture, TextureHandle, TextureRegistry};
pub use crate::torus::{TexCoordWindow, Torus};
pub use crate::uniform_binding::UniformBinding;
pub use crate::uniform_buffer::LightingUniform;
pub use crate::vertex::Vertex;

/// WGSL source of the lighting program.
///
/// One vertex stage (`vertex_main`) and two fragment stages sharing the `Uniforms` block at group 0:
///
/// - `fragment_material`: Phong shading with the material colours from the uniform block.
/// - `fragment_textured`: Phong shading with colours sampled from the textures at group 1
///   (unit 0 at bindings 0/1, unit 1 at bindings 2/3).
///
/// Vertex inputs are `@location(0) position`, `@location(1) normal` and `@location(2) tex_coords`,
/// matching [`Vertex::vertex_attributes`].
pub const SHADER_SOURCE: &str = include_str!("shaders/lighting.wgsl");

/// Initializes logging, opens the window and runs the event loop until it exits.
pub fn run() -> Result<()> {
    #[cfg(not(target_arch = "wasm32"))]
    env_logger::init();

    #[cfg(target_arch = "wasm32")]
    {
        std::panic::set_hook(Box::new(console_error_panic_hook::hook));
        if console_log::init().is_err() {
            log::warn!("Logger was already initialized");
        }
    }

    let event_loop = winit::event_loop::EventLoop::new()?;
    event_loop.set_control_flow(winit::event_loop::ControlFlow::Poll);

    #[cfg(not(target_arch = "wasm32"))]
    {
        let mut app = App::default();
        event_loop.run_app(&mut app)?;
    }

    #[cfg(target_arch = "wasm32")]
    {
        use winit::platform::web::EventLoopExtWebSys;
        event_loop.spawn_app(App::default());
    }

    Ok(())
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen::prelude::wasm_bindgen(start)]
pub fn start() {
    if let Err(error) = run() {
        log::error!("{error}");
    }
}
