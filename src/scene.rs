//! # Scene Module
//!
//! The demo scene: a flat-material torus and a texture-mapped torus spinning side by side under one
//! point light.
//!
//! The scene owns everything the two draws need: the two lighting programs, the texture registry
//! holding the procedurally generated maps, both tori, and the camera and light. [`Scene::update`]
//! advances the rotation and copies the user's [`SceneControls`] onto the tori through their
//! setters. [`Scene::render`] records both draws into the renderer's pass.

use nalgebra_glm::{Mat4, Vec3};

use crate::context::FrameContext;
use crate::error::Result;
use crate::shader::{LightingShader, Shader, ShadingModel};
use crate::texture::{Texture, TextureRegistry};
use crate::torus::{TexCoordWindow, Torus};

/// User-adjustable settings, edited from the egui panel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SceneControls {
    pub show_material: bool,

    pub show_textured: bool,

    /// Degrees per second around the vertical axis.
    pub rotation_speed: f32,

    pub shininess: f32,

    /// Diffuse colour of the material torus. Ambient is a dimmed copy.
    pub diffuse_colour: [f32; 3],
}

impl Default for SceneControls {
    fn default() -> Self {
        Self {
            show_material: true,
            show_textured: true,
            rotation_speed: 30.0,
            shininess: 32.0,
            diffuse_colour: [1.0, 0.5, 0.31],
        }
    }
}

const CAMERA_POSITION: [f32; 3] = [0.0, 1.2, 3.0];
const LIGHT_POSITION: [f32; 3] = [1.5, 2.0, 2.0];
const TORUS_OFFSET: f32 = 0.9;

/// Tightly packed RGBA8 checkerboard of `size × size` pixels with `cells` squares per side.
pub fn checkerboard(size: u32, cells: u32, even: [u8; 4], odd: [u8; 4]) -> Vec<u8> {
    let cell_size = (size / cells.max(1)).max(1);
    let mut pixels = Vec::with_capacity((size * size * 4) as usize);
    for y in 0..size {
        for x in 0..size {
            let colour = if (x / cell_size + y / cell_size) % 2 == 0 {
                even
            } else {
                odd
            };
            pixels.extend_from_slice(&colour);
        }
    }
    pixels
}

pub struct Scene {
    pub model: Mat4,

    projection: Mat4,

    view: Mat4,

    material_shader: LightingShader,

    texture_shader: LightingShader,

    textures: TextureRegistry,

    material_torus: Torus,

    textured_torus: Torus,
}

impl Scene {
    pub fn new(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        surface_format: wgpu::TextureFormat,
    ) -> Result<Self> {
        let mut textures = TextureRegistry::new(device, queue)?;

        let diffuse_map = textures.insert(Texture::from_rgba8(
            device,
            queue,
            "Checkerboard Diffuse Map",
            64,
            64,
            &checkerboard(64, 8, [235, 200, 60, 255], [60, 140, 70, 255]),
        )?);

        let specular_map = textures.insert(Texture::from_rgba8(
            device,
            queue,
            "Checkerboard Specular Map",
            64,
            64,
            &checkerboard(64, 8, [255, 255, 255, 255], [40, 40, 40, 255]),
        )?);

        let controls = SceneControls::default();
        let diffuse = Vec3::from(controls.diffuse_colour);

        let material_torus = Torus::with_material(
            device,
            diffuse * 0.2,
            diffuse,
            Vec3::new(0.5, 0.5, 0.5),
            controls.shininess,
        );

        let textured_torus = Torus::with_texture(
            device,
            diffuse_map,
            specular_map,
            controls.shininess,
            TexCoordWindow::default(),
        );

        Ok(Self {
            model: Mat4::identity(),
            projection: Mat4::identity(),
            view: Mat4::identity(),
            material_shader: LightingShader::new(device, surface_format, ShadingModel::Material),
            texture_shader: LightingShader::new(device, surface_format, ShadingModel::Textured),
            textures,
            material_torus,
            textured_torus,
        })
    }

    pub fn update(&mut self, aspect_ratio: f32, delta_time: f32, controls: &SceneControls) {
        self.projection =
            nalgebra_glm::perspective_lh_zo(aspect_ratio, 60_f32.to_radians(), 0.1, 1000.0);

        self.view = nalgebra_glm::look_at_lh(
            &Vec3::from(CAMERA_POSITION),
            &nalgebra_glm::vec3(0.0, 0.0, 0.0),
            &Vec3::y(),
        );

        self.model = nalgebra_glm::rotate(
            &self.model,
            controls.rotation_speed.to_radians() * delta_time,
            &Vec3::y(),
        );

        let diffuse = Vec3::from(controls.diffuse_colour);
        self.material_torus.set_material(
            diffuse * 0.2,
            diffuse,
            self.material_torus.specular(),
            controls.shininess,
        );

        self.textured_torus.set_texture(
            self.textured_torus.diffuse_map(),
            self.textured_torus.specular_map(),
            controls.shininess,
        );
    }

    pub fn render(
        &mut self,
        renderpass: &mut wgpu::RenderPass<'_>,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        controls: &SceneControls,
    ) {
        let camera_position = Vec3::from(CAMERA_POSITION);
        let light_position = Vec3::from(LIGHT_POSITION);

        for shader in [&mut self.material_shader, &mut self.texture_shader] {
            shader.begin_frame();
            shader.use_program();
            shader.set_mat4("projection", &self.projection);
            shader.set_mat4("view", &self.view);
            shader.set_vec3("viewPos", &camera_position);
            shader.set_vec3("light.position", &light_position);
            shader.set_vec3("light.ambient", &Vec3::new(0.3, 0.3, 0.3));
            shader.set_vec3("light.diffuse", &Vec3::new(0.8, 0.8, 0.8));
            shader.set_vec3("light.specular", &Vec3::new(1.0, 1.0, 1.0));
        }

        let tilt = nalgebra_glm::rotation(35_f32.to_radians(), &Vec3::x());
        let mut ctx = FrameContext::new(renderpass, device, queue, &self.textures);

        if controls.show_material {
            let model = nalgebra_glm::translation(&Vec3::new(-TORUS_OFFSET, 0.0, 0.0)) * self.model * tilt;
            self.material_torus
                .draw_with_material_at(&mut ctx, &mut self.material_shader, &model);
        }

        if controls.show_textured {
            let model = nalgebra_glm::translation(&Vec3::new(TORUS_OFFSET, 0.0, 0.0)) * self.model * tilt;
            self.textured_torus
                .draw_with_texture_at(&mut ctx, &mut self.texture_shader, &model);
        }
    }
}
