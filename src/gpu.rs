//! # GPU Management Module
//!
//! The `gpu` module brings up wgpu for a window: it creates the surface, picks an adapter, opens a
//! device and queue, and configures the surface for presentation.
//!
//! ## Features
//!
//! - **Fallible initialization**: every step that can fail reports a [`RenderError`] instead of
//!   panicking, so the application can log the reason and shut down cleanly.
//! - **Surface maintenance**: resizing and reconfiguring after the surface is lost or outdated.
//! - **Depth texture creation**: one `Depth32Float` view per surface size.
//!
//! ## Example Usage
//!
//! ```rust,ignore
//! async fn create_gpu(window: std::sync::Arc<winit::window::Window>, width: u32, height: u32) {
//!     match Gpu::new_async(window, width, height).await {
//!         Ok(gpu) => log::info!("Surface format: {:?}", gpu.surface_format),
//!         Err(error) => log::error!("{error}"),
//!     }
//! }
//! ```

use crate::error::{RenderError, Result};
use crate::renderer::Renderer;

/// Surface, device and queue for one window.
pub struct Gpu {
    /// The window's presentation surface.
    pub surface: wgpu::Surface<'static>,

    /// Creates every buffer, texture and pipeline in the crate.
    pub device: wgpu::Device,

    /// Receives buffer writes, texture uploads and command buffers.
    pub queue: wgpu::Queue,

    /// Current surface size, format and present mode.
    pub surface_config: wgpu::SurfaceConfiguration,

    /// Colour format of the surface; pipelines target it.
    pub surface_format: wgpu::TextureFormat,
}

impl Gpu {
    /// Width over height of the surface; the height is clamped to 1 while minimised.
    pub fn aspect_ratio(&self) -> f32 {
        self.surface_config.width as f32 / self.surface_config.height.max(1) as f32
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.surface_config.width = width.max(1);
        self.surface_config.height = height.max(1);
        self.surface.configure(&self.device, &self.surface_config);
    }

    /// Reapplies the current configuration after the surface was lost or became outdated.
    pub fn reconfigure(&self) {
        self.surface.configure(&self.device, &self.surface_config);
    }

    pub fn create_depth_texture(&self, width: u32, height: u32) -> wgpu::TextureView {
        self.device
            .create_texture(&wgpu::TextureDescriptor {
                label: Some("Depth Texture"),
                size: wgpu::Extent3d {
                    width: width.max(1),
                    height: height.max(1),
                    depth_or_array_layers: 1,
                },
                mip_level_count: 1,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format: Renderer::DEPTH_FORMAT,
                usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
                view_formats: &[],
            })
            .create_view(&wgpu::TextureViewDescriptor::default())
    }

    /// Creates the surface for `window` and opens a device that can present to it.
    ///
    /// # Errors
    ///
    /// - [`RenderError::SurfaceCreateFailed`] if the window cannot back a surface.
    /// - [`RenderError::AdapterRequestFailed`] if no adapter can present to the surface.
    /// - [`RenderError::DeviceCreateFailed`] if the adapter rejects the requested limits.
    /// - [`RenderError::SurfaceUnsupported`] if the surface offers no format for the adapter.
    pub async fn new_async(
        window: impl Into<wgpu::SurfaceTarget<'static>>,
        width: u32,
        height: u32,
    ) -> Result<Self> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor::default());
        let surface = instance.create_surface(window)?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                compatible_surface: Some(&surface),
                ..Default::default()
            })
            .await
            .ok_or(RenderError::AdapterRequestFailed)?;
        log::info!("WGPU Adapter: {:?}", adapter.get_info());

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("Torus Device"),
                    required_features: wgpu::Features::empty(),
                    required_limits: required_limits(&adapter),
                    memory_hints: wgpu::MemoryHints::default(),
                },
                None,
            )
            .await?;

        let surface_config = surface_configuration(&surface.get_capabilities(&adapter), width, height)
            .ok_or(RenderError::SurfaceUnsupported)?;
        surface.configure(&device, &surface_config);

        Ok(Self {
            surface_format: surface_config.format,
            surface,
            device,
            queue,
            surface_config,
        })
    }
}

fn required_limits(adapter: &wgpu::Adapter) -> wgpu::Limits {
    let limits = if cfg!(all(target_arch = "wasm32", feature = "webgl")) {
        wgpu::Limits::downlevel_webgl2_defaults()
    } else {
        wgpu::Limits::default()
    };
    limits.using_resolution(adapter.limits())
}

/// Picks a non-sRGB format when one exists (egui blends in gamma space) and the first present and
/// alpha modes. `None` if the surface reports no formats at all.
fn surface_configuration(
    capabilities: &wgpu::SurfaceCapabilities,
    width: u32,
    height: u32,
) -> Option<wgpu::SurfaceConfiguration> {
    let format = capabilities
        .formats
        .iter()
        .copied()
        .find(|format| !format.is_srgb())
        .or_else(|| capabilities.formats.first().copied())?;

    Some(wgpu::SurfaceConfiguration {
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        format,
        width: width.max(1),
        height: height.max(1),
        present_mode: capabilities.present_modes.first().copied()?,
        alpha_mode: capabilities.alpha_modes.first().copied()?,
        view_formats: vec![],
        desired_maximum_frame_latency: 2,
    })
}
