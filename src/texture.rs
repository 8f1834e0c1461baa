//! # Textures
//!
//! GPU textures and the small integer handles draw calls refer to them by.
//!
//! Meshes never own textures. A [`TextureRegistry`] owns every texture, hands out
//! [`TextureHandle`]s starting at 1, and resolves handles back to textures when a draw binds them.
//! Handle 0 ([`TextureHandle::NONE`]) and handles the registry never issued resolve to a 1×1 white
//! texture, so a forgotten or stale handle renders flat white instead of failing.

use crate::error::{RenderError, Result};

/// Identifies a texture inside a [`TextureRegistry`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TextureHandle(pub u32);

impl TextureHandle {
    /// Never issued by a registry; always resolves to the fallback texture.
    pub const NONE: Self = Self(0);

    pub fn is_none(self) -> bool {
        self == Self::NONE
    }
}

/// A sampled 2D RGBA8 texture together with its default view and sampler.
pub struct Texture {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    pub sampler: wgpu::Sampler,
}

/// Number of bytes `width × height` RGBA8 pixels occupy.
pub fn rgba8_len(width: u32, height: u32) -> usize {
    width as usize * height as usize * 4
}

impl Texture {
    /// Maps are sampled as stored: the lighting output goes to a non-sRGB surface unconverted.
    pub const FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;

    /// Creates a texture from tightly packed RGBA8 rows and uploads it through `queue`.
    pub fn from_rgba8(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        label: &str,
        width: u32,
        height: u32,
        data: &[u8],
    ) -> Result<Self> {
        let expected = rgba8_len(width, height);
        if data.len() != expected || expected == 0 {
            return Err(RenderError::TextureSizeMismatch {
                label: label.to_owned(),
                expected,
                actual: data.len(),
            });
        }

        let size = wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        };

        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: Self::FORMAT,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            data,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(width * 4),
                rows_per_image: Some(height),
            },
            size,
        );

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some(label),
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::Repeat,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        log::debug!("Uploaded texture '{label}' ({width}x{height})");

        Ok(Self {
            texture,
            view,
            sampler,
        })
    }

    /// A 1×1 texture filled with `rgba`.
    pub fn solid(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        label: &str,
        rgba: [u8; 4],
    ) -> Result<Self> {
        Self::from_rgba8(device, queue, label, 1, 1, &rgba)
    }
}

/// Owns textures and maps handles to them.
pub struct TextureRegistry {
    textures: Vec<Texture>,
    fallback: Texture,
}

impl TextureRegistry {
    pub fn new(device: &wgpu::Device, queue: &wgpu::Queue) -> Result<Self> {
        Ok(Self {
            textures: Vec::new(),
            fallback: Texture::solid(device, queue, "Fallback White Texture", [255; 4])?,
        })
    }

    /// Takes ownership of `texture` and returns its handle.
    pub fn insert(&mut self, texture: Texture) -> TextureHandle {
        self.textures.push(texture);
        TextureHandle(self.textures.len() as u32)
    }

    /// Looks up a handle; `None` for [`TextureHandle::NONE`] and unknown handles.
    pub fn get(&self, handle: TextureHandle) -> Option<&Texture> {
        let index = handle.0.checked_sub(1)?;
        self.textures.get(index as usize)
    }

    /// Whether `handle` was issued by this registry.
    pub fn contains(&self, handle: TextureHandle) -> bool {
        self.get(handle).is_some()
    }

    /// Looks up a handle, falling back to the white texture.
    pub fn resolve(&self, handle: TextureHandle) -> &Texture {
        self.get(handle).unwrap_or_else(|| {
            if !handle.is_none() {
                log::debug!("Unknown texture handle {handle:?}, binding fallback");
            }
            &self.fallback
        })
    }

    pub fn len(&self) -> usize {
        self.textures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.textures.is_empty()
    }
}
