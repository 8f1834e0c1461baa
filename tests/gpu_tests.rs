//! GPU Tests
//!
//! Tests for:
//! - Mesh upload buffer sizes
//! - Texture upload validation and the registry fallback
//! - Uniform slot allocation and growth
//! - Pipeline creation and per-frame program state
//! - Offscreen frames read back to check per-draw uniforms, slot growth, late texture
//!   registration and texture colour handling
//!
//! Each test opens a headless device and returns early when the machine has no usable adapter.

#![cfg(not(target_arch = "wasm32"))]

use std::ops::Range;

use nalgebra_glm::{Mat4, Vec3};

use torus_core::{
    FrameContext, LightingShader, LightingUniform, RenderError, Renderer, Shader, ShadingModel,
    TexCoordWindow, Texture, TextureHandle, TextureRegistry, Torus, UniformBinding, Vertex,
};

fn headless_device() -> Option<(wgpu::Device, wgpu::Queue)> {
    pollster::block_on(async {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor::default());
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: None,
                force_fallback_adapter: false,
            })
            .await?;
        adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("Test Device"),
                    required_features: wgpu::Features::empty(),
                    required_limits: adapter.limits(),
                    memory_hints: wgpu::MemoryHints::default(),
                },
                None,
            )
            .await
            .ok()
    })
}

macro_rules! device_or_skip {
    () => {
        match headless_device() {
            Some(device) => device,
            None => {
                eprintln!("No GPU adapter available, skipping");
                return;
            }
        }
    };
}

#[test]
fn upload_sizes_buffers_from_counts() {
    let (device, _queue) = device_or_skip!();

    let torus = Torus::new(&device);

    assert_eq!(
        torus.mesh().vertex_buffer.size(),
        325 * std::mem::size_of::<Vertex>() as u64
    );
    assert_eq!(torus.mesh().index_buffer.size(), 1728 * 4);
    assert_eq!(torus.mesh().vertex_count(), torus.vertex_count());
    assert_eq!(torus.mesh().index_count(), torus.index_count());
}

#[test]
fn texture_rejects_wrong_byte_count() {
    let (device, queue) = device_or_skip!();

    let result = Texture::from_rgba8(&device, &queue, "Short", 2, 2, &[0; 8]);

    match result {
        Err(RenderError::TextureSizeMismatch {
            expected, actual, ..
        }) => {
            assert_eq!(expected, 16);
            assert_eq!(actual, 8);
        }
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("texture with 8 bytes for 2x2 pixels was accepted"),
    }
}

#[test]
fn registry_issues_handles_from_one_and_falls_back() {
    let (device, queue) = device_or_skip!();

    let mut registry = TextureRegistry::new(&device, &queue).unwrap();
    assert!(registry.is_empty());

    let red = registry.insert(Texture::solid(&device, &queue, "Red", [255, 0, 0, 255]).unwrap());
    let blue = registry.insert(Texture::solid(&device, &queue, "Blue", [0, 0, 255, 255]).unwrap());

    assert_eq!(red, TextureHandle(1));
    assert_eq!(blue, TextureHandle(2));
    assert_eq!(registry.len(), 2);
    assert!(registry.get(TextureHandle::NONE).is_none());
    assert!(registry.get(TextureHandle(3)).is_none());

    let fallback = registry.resolve(TextureHandle::NONE);
    assert!(std::ptr::eq(fallback, registry.resolve(TextureHandle(99))));
    assert!(!std::ptr::eq(fallback, registry.resolve(red)));
}

#[test]
fn uniform_slots_advance_and_grow() {
    let (device, queue) = device_or_skip!();

    let mut binding = UniformBinding::new(&device);
    let stride = binding.slot_stride();
    let alignment = device.limits().min_uniform_buffer_offset_alignment as u64;

    assert_eq!(stride % alignment, 0);
    assert!(stride >= std::mem::size_of::<LightingUniform>() as u64);
    assert_eq!(binding.capacity(), UniformBinding::INITIAL_CAPACITY);

    for slot in 0..UniformBinding::INITIAL_CAPACITY {
        let offset = binding.push(&device, &queue, LightingUniform::default());
        assert_eq!(offset as u64, slot as u64 * stride);
    }

    let offset = binding.push(&device, &queue, LightingUniform::default());
    assert_eq!(offset, 0);
    assert_eq!(binding.capacity(), UniformBinding::INITIAL_CAPACITY * 2);

    binding.reset();
    assert_eq!(binding.push(&device, &queue, LightingUniform::default()), 0);
}

#[test]
fn shaders_report_their_model_and_stage_uniforms() {
    let (device, _queue) = device_or_skip!();
    let format = wgpu::TextureFormat::Rgba8Unorm;

    let mut material = LightingShader::new(&device, format, ShadingModel::Material);
    let textured = LightingShader::new(&device, format, ShadingModel::Textured);

    assert_eq!(material.shading_model(), ShadingModel::Material);
    assert_eq!(textured.shading_model(), ShadingModel::Textured);

    material.set_float("material.shininess", 12.0);
    material.set_float("no.such.uniform", 1.0);
    assert_eq!(material.uniforms().material_shininess, 12.0);
}

#[test]
fn begin_frame_clears_the_current_program() {
    let (device, _queue) = device_or_skip!();

    let mut shader = LightingShader::new(&device, TARGET_FORMAT, ShadingModel::Material);
    assert!(!shader.is_in_use());

    shader.use_program();
    assert!(shader.is_in_use());

    shader.begin_frame();
    assert!(!shader.is_in_use());
}

// ============================================================================
// Offscreen frames
// ============================================================================

const SIZE: u32 = 64;
const TARGET_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;
const LEFT: Range<u32> = 0..SIZE / 2;
const RIGHT: Range<u32> = SIZE / 2..SIZE;

/// A colour target, a depth target and a buffer the colour target is copied into after each frame.
struct Offscreen {
    colour: wgpu::Texture,
    colour_view: wgpu::TextureView,
    depth_view: wgpu::TextureView,
    readback: wgpu::Buffer,
}

impl Offscreen {
    fn extent() -> wgpu::Extent3d {
        wgpu::Extent3d {
            width: SIZE,
            height: SIZE,
            depth_or_array_layers: 1,
        }
    }

    fn new(device: &wgpu::Device) -> Self {
        let target = |label, format, usage| {
            device.create_texture(&wgpu::TextureDescriptor {
                label: Some(label),
                size: Self::extent(),
                mip_level_count: 1,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format,
                usage,
                view_formats: &[],
            })
        };

        let colour = target(
            "Offscreen Colour",
            TARGET_FORMAT,
            wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_SRC,
        );
        let depth = target(
            "Offscreen Depth",
            Renderer::DEPTH_FORMAT,
            wgpu::TextureUsages::RENDER_ATTACHMENT,
        );

        Self {
            colour_view: colour.create_view(&wgpu::TextureViewDescriptor::default()),
            depth_view: depth.create_view(&wgpu::TextureViewDescriptor::default()),
            colour,
            readback: device.create_buffer(&wgpu::BufferDescriptor {
                label: Some("Offscreen Readback"),
                size: (SIZE * SIZE * 4) as wgpu::BufferAddress,
                usage: wgpu::BufferUsages::MAP_READ | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            }),
        }
    }

    /// Clears to black, records `draw`, and returns the frame's pixels row by row.
    fn render(
        &self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        draw: impl FnOnce(&mut wgpu::RenderPass<'_>),
    ) -> Vec<[u8; 4]> {
        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Offscreen Encoder"),
        });

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Offscreen Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &self.colour_view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            draw(&mut pass);
        }

        encoder.copy_texture_to_buffer(
            wgpu::TexelCopyTextureInfo {
                texture: &self.colour,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            wgpu::TexelCopyBufferInfo {
                buffer: &self.readback,
                layout: wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(SIZE * 4),
                    rows_per_image: Some(SIZE),
                },
            },
            Self::extent(),
        );
        queue.submit(std::iter::once(encoder.finish()));

        let slice = self.readback.slice(..);
        slice.map_async(wgpu::MapMode::Read, |result| {
            result.expect("readback buffer should map")
        });
        let _ = device.poll(wgpu::Maintain::Wait);

        let pixels = slice
            .get_mapped_range()
            .chunks_exact(4)
            .map(|pixel| [pixel[0], pixel[1], pixel[2], pixel[3]])
            .collect();
        self.readback.unmap();
        pixels
    }
}

/// Number of pixels within `columns` that satisfy `matches`.
fn count(pixels: &[[u8; 4]], columns: Range<u32>, matches: impl Fn(&[u8; 4]) -> bool) -> usize {
    pixels
        .iter()
        .enumerate()
        .filter(|(index, pixel)| columns.contains(&(*index as u32 % SIZE)) && matches(*pixel))
        .count()
}

fn is_red(pixel: &[u8; 4]) -> bool {
    pixel[0] > 200 && pixel[1] < 50 && pixel[2] < 50
}

fn is_green(pixel: &[u8; 4]) -> bool {
    pixel[0] < 50 && pixel[1] > 200 && pixel[2] < 50
}

fn is_white(pixel: &[u8; 4]) -> bool {
    pixel[..3].iter().all(|&channel| channel > 200)
}

fn is_background(pixel: &[u8; 4]) -> bool {
    pixel[..3].iter().all(|&channel| channel < 10)
}

/// Starts a frame on `shader` with a camera looking down +z and an ambient-only white light, so
/// every lit pixel shows the surface colour unchanged.
fn begin_flat_frame(shader: &mut LightingShader) {
    shader.begin_frame();
    shader.set_mat4(
        "projection",
        &nalgebra_glm::perspective_lh_zo(1.0, 60_f32.to_radians(), 0.1, 100.0),
    );
    shader.set_mat4(
        "view",
        &nalgebra_glm::look_at_lh(&Vec3::new(0.0, 0.0, -3.0), &Vec3::zeros(), &Vec3::y()),
    );
    shader.set_vec3("viewPos", &Vec3::new(0.0, 0.0, -3.0));
    shader.set_vec3("light.position", &Vec3::new(0.0, 0.0, -3.0));
    shader.set_vec3("light.ambient", &Vec3::new(1.0, 1.0, 1.0));
    shader.set_vec3("light.diffuse", &Vec3::zeros());
    shader.set_vec3("light.specular", &Vec3::zeros());
}

/// Model matrix that stands the ring up to face the camera, centred at `x`.
fn facing_camera(x: f32) -> Mat4 {
    nalgebra_glm::translation(&Vec3::new(x, 0.0, 0.0))
        * nalgebra_glm::rotation(90_f32.to_radians(), &Vec3::x())
}

fn flat_torus(device: &wgpu::Device, colour: Vec3) -> Torus {
    Torus::with_material(device, colour, colour, Vec3::zeros(), 1.0)
}

#[test]
fn one_shader_keeps_each_draws_uniforms() {
    let (device, queue) = device_or_skip!();
    let offscreen = Offscreen::new(&device);
    let textures = TextureRegistry::new(&device, &queue).unwrap();
    let mut shader = LightingShader::new(&device, TARGET_FORMAT, ShadingModel::Material);

    let red = flat_torus(&device, Vec3::new(1.0, 0.0, 0.0));
    let green = flat_torus(&device, Vec3::new(0.0, 1.0, 0.0));

    begin_flat_frame(&mut shader);
    let pixels = offscreen.render(&device, &queue, |pass| {
        let mut ctx = FrameContext::new(pass, &device, &queue, &textures);
        red.draw_with_material_at(&mut ctx, &mut shader, &facing_camera(-0.9));
        green.draw_with_material_at(&mut ctx, &mut shader, &facing_camera(0.9));
    });

    assert!(count(&pixels, LEFT, is_red) > 0);
    assert!(count(&pixels, RIGHT, is_green) > 0);
    assert_eq!(count(&pixels, LEFT, is_green), 0);
    assert_eq!(count(&pixels, RIGHT, is_red), 0);
}

#[test]
fn draws_past_slot_capacity_keep_their_uniforms() {
    let (device, queue) = device_or_skip!();
    let offscreen = Offscreen::new(&device);
    let textures = TextureRegistry::new(&device, &queue).unwrap();
    let mut shader = LightingShader::new(&device, TARGET_FORMAT, ShadingModel::Material);

    let red = flat_torus(&device, Vec3::new(1.0, 0.0, 0.0));
    let green = flat_torus(&device, Vec3::new(0.0, 1.0, 0.0));

    begin_flat_frame(&mut shader);
    let pixels = offscreen.render(&device, &queue, |pass| {
        let mut ctx = FrameContext::new(pass, &device, &queue, &textures);
        for _ in 0..UniformBinding::INITIAL_CAPACITY {
            red.draw_with_material_at(&mut ctx, &mut shader, &facing_camera(-0.9));
        }
        green.draw_with_material_at(&mut ctx, &mut shader, &facing_camera(0.9));
    });

    assert!(count(&pixels, LEFT, is_red) > 0);
    assert!(count(&pixels, RIGHT, is_green) > 0);
    assert_eq!(count(&pixels, LEFT, is_green), 0);
    assert_eq!(count(&pixels, RIGHT, is_red), 0);
}

#[test]
fn texture_registered_after_a_draw_replaces_the_fallback() {
    let (device, queue) = device_or_skip!();
    let offscreen = Offscreen::new(&device);
    let mut textures = TextureRegistry::new(&device, &queue).unwrap();
    let mut shader = LightingShader::new(&device, TARGET_FORMAT, ShadingModel::Textured);

    let torus = Torus::with_texture(
        &device,
        TextureHandle(1),
        TextureHandle::NONE,
        1.0,
        TexCoordWindow::default(),
    );

    begin_flat_frame(&mut shader);
    let before = offscreen.render(&device, &queue, |pass| {
        let mut ctx = FrameContext::new(pass, &device, &queue, &textures);
        torus.draw_with_texture_at(&mut ctx, &mut shader, &facing_camera(0.0));
    });

    assert!(count(&before, 0..SIZE, is_white) > 0);
    assert_eq!(count(&before, 0..SIZE, is_red), 0);
    assert_eq!(shader.cached_texture_bindings(), 0);

    let red = Texture::solid(&device, &queue, "Red", [255, 0, 0, 255]).unwrap();
    assert_eq!(textures.insert(red), TextureHandle(1));

    begin_flat_frame(&mut shader);
    let after = offscreen.render(&device, &queue, |pass| {
        let mut ctx = FrameContext::new(pass, &device, &queue, &textures);
        torus.draw_with_texture_at(&mut ctx, &mut shader, &facing_camera(0.0));
    });

    assert!(count(&after, 0..SIZE, is_red) > 0);
    assert_eq!(count(&after, 0..SIZE, is_white), 0);
    assert_eq!(shader.cached_texture_bindings(), 1);
}

#[test]
fn textured_draw_keeps_authored_colour() {
    let (device, queue) = device_or_skip!();
    let offscreen = Offscreen::new(&device);
    let mut textures = TextureRegistry::new(&device, &queue).unwrap();
    let mut shader = LightingShader::new(&device, TARGET_FORMAT, ShadingModel::Textured);

    let grey = textures.insert(Texture::solid(&device, &queue, "Grey", [128, 128, 128, 255]).unwrap());
    let torus = Torus::with_texture(&device, grey, grey, 1.0, TexCoordWindow::default());

    begin_flat_frame(&mut shader);
    let pixels = offscreen.render(&device, &queue, |pass| {
        let mut ctx = FrameContext::new(pass, &device, &queue, &textures);
        torus.draw_with_texture_at(&mut ctx, &mut shader, &facing_camera(0.0));
    });

    let lit: Vec<_> = pixels.iter().filter(|pixel| !is_background(pixel)).collect();
    assert!(!lit.is_empty());
    for pixel in lit {
        for &channel in &pixel[..3] {
            assert!(channel.abs_diff(128) <= 2, "{pixel:?}");
        }
    }
}
