//! # Renderer Module
//!
//! The `Renderer` owns the GPU, the depth buffer, the egui renderer and the demo [`Scene`], and
//! turns one call to [`Renderer::render_frame`] into one presented frame.
//!
//! ## Frame Structure
//!
//! 1. Update the scene (camera, rotation, user controls).
//! 2. Upload egui texture and buffer changes.
//! 3. Acquire the surface texture. A lost or outdated surface is reconfigured and the frame is
//!    skipped; any other surface error is logged and the frame is skipped.
//! 4. Record one render pass: clear, draw the tori, draw egui on top.
//! 5. Submit and present.

use crate::error::Result;
use crate::gpu::Gpu;
use crate::scene::{Scene, SceneControls};

const CLEAR_COLOUR: wgpu::Color = wgpu::Color {
    r: 0.19,
    g: 0.24,
    b: 0.42,
    a: 1.0,
};

pub struct Renderer {
    gpu: Gpu,

    depth_view: wgpu::TextureView,

    gui: egui_wgpu::Renderer,

    scene: Scene,
}

impl Renderer {
    /// Depth buffer format shared by the render pass and every pipeline that writes depth.
    pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

    pub async fn new(
        window: impl Into<wgpu::SurfaceTarget<'static>>,
        width: u32,
        height: u32,
    ) -> Result<Self> {
        let gpu = Gpu::new_async(window, width, height).await?;
        let depth_view = gpu.create_depth_texture(width, height);
        let gui = egui_wgpu::Renderer::new(
            &gpu.device,
            gpu.surface_format,
            Some(Self::DEPTH_FORMAT),
            1,
            false,
        );
        let scene = Scene::new(&gpu.device, &gpu.queue, gpu.surface_format)?;

        Ok(Self {
            gpu,
            depth_view,
            gui,
            scene,
        })
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.gpu.resize(width, height);
        self.depth_view = self.gpu.create_depth_texture(width, height);
    }

    pub fn render_frame(
        &mut self,
        screen_descriptor: egui_wgpu::ScreenDescriptor,
        paint_jobs: Vec<egui::epaint::ClippedPrimitive>,
        textures_delta: egui::TexturesDelta,
        delta_time: crate::Duration,
        controls: &SceneControls,
    ) {
        self.scene
            .update(self.gpu.aspect_ratio(), delta_time.as_secs_f32(), controls);

        self.upload_gui_textures(&textures_delta);

        let Some(frame) = self.acquire_frame() else {
            return;
        };
        let frame_view = frame.texture.create_view(&wgpu::TextureViewDescriptor {
            format: Some(self.gpu.surface_format),
            ..Default::default()
        });

        let mut encoder = self
            .gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Frame Encoder"),
            });

        self.gui.update_buffers(
            &self.gpu.device,
            &self.gpu.queue,
            &mut encoder,
            &paint_jobs,
            &screen_descriptor,
        );

        {
            let mut pass = begin_scene_pass(&mut encoder, &frame_view, &self.depth_view);

            self.scene
                .render(&mut pass, &self.gpu.device, &self.gpu.queue, controls);
            self.gui.render(&mut pass, &paint_jobs, &screen_descriptor);
        }

        self.gpu.queue.submit(std::iter::once(encoder.finish()));
        frame.present();

        for id in &textures_delta.free {
            self.gui.free_texture(id);
        }
    }

    fn upload_gui_textures(&mut self, textures_delta: &egui::TexturesDelta) {
        for (id, image_delta) in &textures_delta.set {
            self.gui
                .update_texture(&self.gpu.device, &self.gpu.queue, *id, image_delta);
        }
    }

    fn acquire_frame(&self) -> Option<wgpu::SurfaceTexture> {
        match self.gpu.surface.get_current_texture() {
            Ok(frame) => Some(frame),
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                log::warn!("Surface lost or outdated, reconfiguring");
                self.gpu.reconfigure();
                None
            }
            Err(error) => {
                log::error!("Skipping frame: {error}");
                None
            }
        }
    }
}

/// Clears the frame and depth buffer and opens the pass the scene and egui record into.
fn begin_scene_pass(
    encoder: &mut wgpu::CommandEncoder,
    frame_view: &wgpu::TextureView,
    depth_view: &wgpu::TextureView,
) -> wgpu::RenderPass<'static> {
    encoder
        .begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Scene Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: frame_view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(CLEAR_COLOUR),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: depth_view,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            timestamp_writes: None,
            occlusion_query_set: None,
        })
        .forget_lifetime()
}
