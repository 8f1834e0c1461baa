//! # Shader Module
//!
//! The [`Shader`] trait is the contract a drawable uses to talk to a lighting program: make it the
//! active program, then set uniforms by name. [`LightingShader`] implements it on top of wgpu.
//!
//! ## How named uniforms reach the GPU
//!
//! wgpu has no per-name uniform state, so [`LightingShader`] keeps a CPU-side
//! [`LightingUniform`] block. Every setter writes into that block; when a draw is recorded the block
//! is copied into the next slot of a dynamic-offset [`UniformBinding`] and group 0 is bound at that
//! slot. Later setter calls therefore never affect draws that were already recorded.
//!
//! ## Shading models
//!
//! - [`ShadingModel::Material`]: colours come from `material.ambient`, `material.diffuse` and
//!   `material.specular`.
//! - [`ShadingModel::Textured`]: colours come from the textures bound to units 0 and 1, selected by
//!   the `material.diffuse` / `material.specular` sampler-unit integers. Bind group 1 holds the two
//!   units and is cached per pair of texture handles.

use std::collections::HashMap;

use nalgebra_glm::{Mat4, Vec3};

use crate::renderer::Renderer;
use crate::texture::{TextureHandle, TextureRegistry};
use crate::uniform_binding::UniformBinding;
use crate::uniform_buffer::LightingUniform;
use crate::vertex::Vertex;
use crate::SHADER_SOURCE;

/// Number of texture units a lighting program samples from.
pub const TEXTURE_UNITS: usize = 2;

/// A shading program whose uniforms are addressed by name.
pub trait Shader {
    /// Makes this program the one subsequent draws use.
    fn use_program(&mut self);

    fn set_int(&mut self, name: &str, value: i32);

    fn set_float(&mut self, name: &str, value: f32);

    fn set_vec3(&mut self, name: &str, value: &Vec3);

    fn set_mat4(&mut self, name: &str, value: &Mat4);
}

/// Which fragment stage a [`LightingShader`] runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShadingModel {
    Material,
    Textured,
}

impl ShadingModel {
    fn fragment_entry(self) -> &'static str {
        match self {
            Self::Material => "fragment_material",
            Self::Textured => "fragment_textured",
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::Material => "Material Lighting Pipeline",
            Self::Textured => "Textured Lighting Pipeline",
        }
    }
}

/// Phong lighting program backed by a wgpu render pipeline.
pub struct LightingShader {
    shading_model: ShadingModel,

    pipeline: wgpu::RenderPipeline,

    uniform: UniformBinding,

    texture_bind_group_layout: Option<wgpu::BindGroupLayout>,

    texture_bind_groups: HashMap<[TextureHandle; TEXTURE_UNITS], wgpu::BindGroup>,

    staging: LightingUniform,

    in_use: bool,
}

impl LightingShader {
    pub fn new(
        device: &wgpu::Device,
        surface_format: wgpu::TextureFormat,
        shading_model: ShadingModel,
    ) -> Self {
        let uniform = UniformBinding::new(device);

        let texture_bind_group_layout = match shading_model {
            ShadingModel::Material => None,
            ShadingModel::Textured => Some(Self::create_texture_bind_group_layout(device)),
        };

        let pipeline = Self::create_pipeline(
            device,
            surface_format,
            shading_model,
            &uniform,
            texture_bind_group_layout.as_ref(),
        );

        log::info!("Created {shading_model:?} lighting shader");

        Self {
            shading_model,
            pipeline,
            uniform,
            texture_bind_group_layout,
            texture_bind_groups: HashMap::new(),
            staging: LightingUniform::default(),
            in_use: false,
        }
    }

    pub fn shading_model(&self) -> ShadingModel {
        self.shading_model
    }

    /// The uniform values the next draw will see.
    pub fn uniforms(&self) -> &LightingUniform {
        &self.staging
    }

    /// Rewinds the per-draw uniform slots. Call once per frame before recording draws.
    ///
    /// The program stops being current, so each frame has to call [`Shader::use_program`] again.
    pub fn begin_frame(&mut self) {
        self.uniform.reset();
        self.in_use = false;
    }

    /// Whether [`Shader::use_program`] was called since the last [`LightingShader::begin_frame`].
    pub fn is_in_use(&self) -> bool {
        self.in_use
    }

    /// Number of texture-unit pairs with a cached bind group.
    pub fn cached_texture_bindings(&self) -> usize {
        self.texture_bind_groups.len()
    }

    /// Snapshots the current uniforms and binds pipeline, uniform slot and textures on `pass`.
    pub(crate) fn bind(
        &mut self,
        pass: &mut wgpu::RenderPass<'_>,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        textures: &TextureRegistry,
        units: &[TextureHandle; TEXTURE_UNITS],
    ) {
        if !self.in_use {
            log::warn!(
                "{:?} lighting shader drawn before use_program was called",
                self.shading_model
            );
        }

        let offset = self.uniform.push(device, queue, self.staging);

        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, &self.uniform.bind_group, &[offset]);

        if let Some(layout) = &self.texture_bind_group_layout {
            // A handle the registry has not issued yet may be issued later, so a pair that fell
            // back is rebuilt on every draw instead of being cached.
            let settled = units
                .iter()
                .all(|&handle| handle.is_none() || textures.contains(handle));

            if settled {
                let bind_group = self
                    .texture_bind_groups
                    .entry(*units)
                    .or_insert_with(|| Self::create_texture_bind_group(device, layout, textures, units));
                pass.set_bind_group(1, &*bind_group, &[]);
            } else {
                let bind_group = Self::create_texture_bind_group(device, layout, textures, units);
                pass.set_bind_group(1, &bind_group, &[]);
            }
        }
    }

    fn create_texture_bind_group_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
        let texture_entry = |binding| wgpu::BindGroupLayoutEntry {
            binding,
            visibility: wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Texture {
                sample_type: wgpu::TextureSampleType::Float { filterable: true },
                view_dimension: wgpu::TextureViewDimension::D2,
                multisampled: false,
            },
            count: None,
        };
        let sampler_entry = |binding| wgpu::BindGroupLayoutEntry {
            binding,
            visibility: wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
            count: None,
        };

        device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            entries: &[
                texture_entry(0),
                sampler_entry(1),
                texture_entry(2),
                sampler_entry(3),
            ],
            label: Some("texture_units_bind_group_layout"),
        })
    }

    fn create_texture_bind_group(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        textures: &TextureRegistry,
        units: &[TextureHandle; TEXTURE_UNITS],
    ) -> wgpu::BindGroup {
        log::debug!("Creating texture bind group for units {units:?}");

        let [unit0, unit1] = units.map(|handle| textures.resolve(handle));

        device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&unit0.view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&unit0.sampler),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::TextureView(&unit1.view),
                },
                wgpu::BindGroupEntry {
                    binding: 3,
                    resource: wgpu::BindingResource::Sampler(&unit1.sampler),
                },
            ],
            label: Some("texture_units_bind_group"),
        })
    }

    fn create_pipeline(
        device: &wgpu::Device,
        surface_format: wgpu::TextureFormat,
        shading_model: ShadingModel,
        uniform: &UniformBinding,
        texture_bind_group_layout: Option<&wgpu::BindGroupLayout>,
    ) -> wgpu::RenderPipeline {
        let shader_module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Lighting Shader"),
            source: wgpu::ShaderSource::Wgsl(std::borrow::Cow::Borrowed(SHADER_SOURCE)),
        });

        let mut bind_group_layouts = vec![&uniform.bind_group_layout];
        bind_group_layouts.extend(texture_bind_group_layout);

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some(shading_model.label()),
            bind_group_layouts: &bind_group_layouts,
            push_constant_ranges: &[],
        });

        device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some(shading_model.label()),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader_module,
                entry_point: Some("vertex_main"),
                buffers: &[Vertex::description(&Vertex::vertex_attributes())],
                compilation_options: Default::default(),
            },
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                // Double-sided: the tube is visible from inside when the camera clips it.
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                conservative: false,
                unclipped_depth: false,
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: Renderer::DEPTH_FORMAT,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState {
                count: 1,
                mask: !0,
                alpha_to_coverage_enabled: false,
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader_module,
                entry_point: Some(shading_model.fragment_entry()),
                targets: &[Some(wgpu::ColorTargetState {
                    format: surface_format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            multiview: None,
            cache: None,
        })
    }
}

impl Shader for LightingShader {
    fn use_program(&mut self) {
        self.in_use = true;
    }

    fn set_int(&mut self, name: &str, value: i32) {
        if !self.staging.set_int(name, value) {
            log::trace!("Ignoring unknown int uniform '{name}'");
        }
    }

    fn set_float(&mut self, name: &str, value: f32) {
        if !self.staging.set_float(name, value) {
            log::trace!("Ignoring unknown float uniform '{name}'");
        }
    }

    fn set_vec3(&mut self, name: &str, value: &Vec3) {
        if !self.staging.set_vec3(name, value) {
            log::trace!("Ignoring unknown vec3 uniform '{name}'");
        }
    }

    fn set_mat4(&mut self, name: &str, value: &Mat4) {
        if !self.staging.set_mat4(name, value) {
            log::trace!("Ignoring unknown mat4 uniform '{name}'");
        }
    }
}
