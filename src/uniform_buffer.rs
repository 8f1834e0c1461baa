//! # Uniform Buffer
//!
//! This module defines `LightingUniform`, the CPU-side mirror of the `Uniforms` block declared in
//! `shaders/lighting.wgsl`. The lighting programs address their uniforms by name (`"model"`,
//! `"material.shininess"`, `"light.position"`, ...); the setters on this struct translate those
//! names into field writes so a whole block can be uploaded with one `queue.write_buffer` call.
//!
//! ## Memory Layout
//!
//! WGSL aligns `mat4x4<f32>` and `vec4<f32>` to 16 bytes, so every colour and position is stored as
//! a `[f32; 4]` with an unused `w`. The trailing scalars are packed into one final 16-byte row:
//!
//! | Field                                   | Bytes |
//! |-----------------------------------------|-------|
//! | `projection`, `view`, `model`           | 3×64  |
//! | `view_position`, light (4 × vec4)       | 5×16  |
//! | material colours (3 × vec4)             | 3×16  |
//! | `shininess`, two sampler units, padding | 16    |
//!
//! for a total of 336 bytes.
//!
//! ## Uniform names
//!
//! | Name                                       | Setter      |
//! |--------------------------------------------|-------------|
//! | `projection`, `view`, `model`              | `set_mat4`  |
//! | `viewPos`                                  | `set_vec3`  |
//! | `light.position` / `.ambient` / `.diffuse` / `.specular` | `set_vec3` |
//! | `material.ambient` / `.diffuse` / `.specular` | `set_vec3` |
//! | `material.shininess`                       | `set_float` |
//! | `material.diffuse` / `.specular` (texture unit) | `set_int` |
//!
//! Names that do not appear in the table are ignored, the same way a GL program ignores a uniform
//! whose location is `-1`.

use nalgebra_glm::{Mat4, Vec3};

/// The per-draw uniform block shared by the material and textured lighting programs.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct LightingUniform {
    pub projection: Mat4,
    pub view: Mat4,
    pub model: Mat4,

    pub view_position: [f32; 4],

    pub light_position: [f32; 4],
    pub light_ambient: [f32; 4],
    pub light_diffuse: [f32; 4],
    pub light_specular: [f32; 4],

    pub material_ambient: [f32; 4],
    pub material_diffuse: [f32; 4],
    pub material_specular: [f32; 4],

    pub material_shininess: f32,

    /// Texture unit sampled for the diffuse colour.
    pub diffuse_unit: i32,

    /// Texture unit sampled for the specular intensity.
    pub specular_unit: i32,

    _padding: f32,
}

impl Default for LightingUniform {
    fn default() -> Self {
        Self {
            projection: Mat4::identity(),
            view: Mat4::identity(),
            model: Mat4::identity(),
            view_position: [0.0; 4],
            light_position: [0.0; 4],
            light_ambient: [0.0; 4],
            light_diffuse: [0.0; 4],
            light_specular: [0.0; 4],
            material_ambient: [0.0; 4],
            material_diffuse: [0.0; 4],
            material_specular: [0.0; 4],
            material_shininess: 32.0,
            diffuse_unit: 0,
            specular_unit: 1,
            _padding: 0.0,
        }
    }
}

fn extend(value: &Vec3) -> [f32; 4] {
    [value.x, value.y, value.z, 1.0]
}

impl LightingUniform {
    /// Writes an integer uniform. Returns `false` when the name is unknown.
    pub fn set_int(&mut self, name: &str, value: i32) -> bool {
        match name {
            "material.diffuse" => self.diffuse_unit = value,
            "material.specular" => self.specular_unit = value,
            _ => return false,
        }
        true
    }

    /// Writes a float uniform. Returns `false` when the name is unknown.
    pub fn set_float(&mut self, name: &str, value: f32) -> bool {
        match name {
            "material.shininess" => self.material_shininess = value,
            _ => return false,
        }
        true
    }

    /// Writes a vec3 uniform. Returns `false` when the name is unknown.
    pub fn set_vec3(&mut self, name: &str, value: &Vec3) -> bool {
        let slot = match name {
            "viewPos" => &mut self.view_position,
            "light.position" => &mut self.light_position,
            "light.ambient" => &mut self.light_ambient,
            "light.diffuse" => &mut self.light_diffuse,
            "light.specular" => &mut self.light_specular,
            "material.ambient" => &mut self.material_ambient,
            "material.diffuse" => &mut self.material_diffuse,
            "material.specular" => &mut self.material_specular,
            _ => return false,
        };
        *slot = extend(value);
        true
    }

    /// Writes a mat4 uniform. Returns `false` when the name is unknown.
    pub fn set_mat4(&mut self, name: &str, value: &Mat4) -> bool {
        let slot = match name {
            "projection" => &mut self.projection,
            "view" => &mut self.view,
            "model" => &mut self.model,
            _ => return false,
        };
        *slot = *value;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_matches_wgsl_block() {
        assert_eq!(std::mem::size_of::<LightingUniform>(), 336);
        assert_eq!(std::mem::size_of::<LightingUniform>() % 16, 0);
    }

    #[test]
    fn material_names_map_to_fields() {
        let mut uniform = LightingUniform::default();
        assert!(uniform.set_vec3("material.ambient", &Vec3::new(0.1, 0.2, 0.3)));
        assert!(uniform.set_vec3("material.diffuse", &Vec3::new(0.4, 0.5, 0.6)));
        assert!(uniform.set_vec3("material.specular", &Vec3::new(0.7, 0.8, 0.9)));
        assert!(uniform.set_float("material.shininess", 64.0));

        assert_eq!(uniform.material_ambient, [0.1, 0.2, 0.3, 1.0]);
        assert_eq!(uniform.material_diffuse, [0.4, 0.5, 0.6, 1.0]);
        assert_eq!(uniform.material_specular, [0.7, 0.8, 0.9, 1.0]);
        assert_eq!(uniform.material_shininess, 64.0);
    }

    #[test]
    fn sampler_units_share_names_with_material_colours() {
        let mut uniform = LightingUniform::default();
        assert!(uniform.set_int("material.diffuse", 1));
        assert!(uniform.set_int("material.specular", 0));
        assert_eq!((uniform.diffuse_unit, uniform.specular_unit), (1, 0));
        assert_eq!(uniform.material_diffuse, [0.0; 4]);
    }

    #[test]
    fn matrices_map_to_fields() {
        let mut uniform = LightingUniform::default();
        let model = nalgebra_glm::translation(&Vec3::new(1.0, 2.0, 3.0));
        assert!(uniform.set_mat4("model", &model));
        assert_eq!(uniform.model, model);
        assert_eq!(uniform.view, Mat4::identity());
    }

    #[test]
    fn unknown_names_are_ignored() {
        let mut uniform = LightingUniform::default();
        let before = uniform;
        assert!(!uniform.set_int("material.emission", 3));
        assert!(!uniform.set_float("material.ambient", 1.0));
        assert!(!uniform.set_vec3("model", &Vec3::new(1.0, 1.0, 1.0)));
        assert!(!uniform.set_mat4("normalMatrix", &Mat4::identity()));
        assert_eq!(uniform, before);
    }
}
