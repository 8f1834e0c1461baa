//! # Uniform Binding Module
//!
//! This module defines the `UniformBinding` struct, which owns a uniform buffer split into equally
//! sized slots and the bind group that exposes one slot at a time through a dynamic offset.
//!
//! ## Overview
//!
//! A frame may draw the same program many times with different uniforms (one torus per draw, each
//! with its own model matrix and material). Writing every draw's block into the same bytes would
//! leave only the last write visible once the command buffer executes, so each draw
//! [`push`](UniformBinding::push)es its block into the next free slot and binds group 0 with that
//! slot's offset.
//!
//! - **Slot stride**: `size_of::<LightingUniform>()` rounded up to the device's
//!   `min_uniform_buffer_offset_alignment`.
//! - **Growth**: when a frame needs more slots than the buffer holds, the buffer is reallocated at
//!   twice the size. The bind group layout never changes, so pipelines built against it stay valid.
//! - **Frame reset**: [`reset`](UniformBinding::reset) rewinds the slot cursor at the start of a frame.

use crate::uniform_buffer::LightingUniform;

/// Dynamic-offset uniform storage for one lighting program.
pub struct UniformBinding {
    pub buffer: wgpu::Buffer,

    pub bind_group: wgpu::BindGroup,

    pub bind_group_layout: wgpu::BindGroupLayout,

    slot_stride: wgpu::BufferAddress,

    capacity: u32,

    cursor: u32,
}

/// Rounds `size` up to the next multiple of `alignment`.
pub(crate) fn aligned_stride(size: wgpu::BufferAddress, alignment: wgpu::BufferAddress) -> wgpu::BufferAddress {
    let alignment = alignment.max(1);
    size.div_ceil(alignment) * alignment
}

impl UniformBinding {
    pub const INITIAL_CAPACITY: u32 = 16;

    fn block_size() -> wgpu::BufferAddress {
        std::mem::size_of::<LightingUniform>() as wgpu::BufferAddress
    }

    pub fn new(device: &wgpu::Device) -> Self {
        let slot_stride = aligned_stride(
            Self::block_size(),
            device.limits().min_uniform_buffer_offset_alignment as wgpu::BufferAddress,
        );

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: true,
                    min_binding_size: wgpu::BufferSize::new(Self::block_size()),
                },
                count: None,
            }],
            label: Some("lighting_uniform_bind_group_layout"),
        });

        let (buffer, bind_group) =
            Self::allocate(device, &bind_group_layout, slot_stride, Self::INITIAL_CAPACITY);

        Self {
            buffer,
            bind_group,
            bind_group_layout,
            slot_stride,
            capacity: Self::INITIAL_CAPACITY,
            cursor: 0,
        }
    }

    fn allocate(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        slot_stride: wgpu::BufferAddress,
        capacity: u32,
    ) -> (wgpu::Buffer, wgpu::BindGroup) {
        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Lighting Uniform Buffer"),
            size: slot_stride * capacity as wgpu::BufferAddress,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                    buffer: &buffer,
                    offset: 0,
                    size: wgpu::BufferSize::new(Self::block_size()),
                }),
            }],
            label: Some("lighting_uniform_bind_group"),
        });

        (buffer, bind_group)
    }

    pub fn capacity(&self) -> u32 {
        self.capacity
    }

    pub fn slot_stride(&self) -> wgpu::BufferAddress {
        self.slot_stride
    }

    /// Rewinds to the first slot. Call once per frame before the first draw.
    pub fn reset(&mut self) {
        self.cursor = 0;
    }

    /// Uploads `uniform` into the next slot and returns its dynamic offset.
    pub fn push(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        uniform: LightingUniform,
    ) -> wgpu::DynamicOffset {
        if self.cursor == self.capacity {
            // Draws already recorded keep a reference to the old buffer, so their data survives.
            let capacity = self.capacity * 2;
            log::debug!(
                "Growing lighting uniform buffer from {} to {} slots",
                self.capacity,
                capacity
            );
            let (buffer, bind_group) =
                Self::allocate(device, &self.bind_group_layout, self.slot_stride, capacity);
            self.buffer = buffer;
            self.bind_group = bind_group;
            self.capacity = capacity;
            self.cursor = 0;
        }

        let offset = self.slot_stride * self.cursor as wgpu::BufferAddress;
        queue.write_buffer(&self.buffer, offset, bytemuck::cast_slice(&[uniform]));
        self.cursor += 1;

        offset as wgpu::DynamicOffset
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stride_rounds_up_to_alignment() {
        assert_eq!(aligned_stride(336, 256), 512);
        assert_eq!(aligned_stride(256, 256), 256);
        assert_eq!(aligned_stride(336, 64), 384);
        assert_eq!(aligned_stride(336, 0), 336);
    }
}
