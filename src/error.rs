//! # Error Types
//!
//! Errors produced while bringing up the GPU, uploading textures, or validating torus geometry.
//!
//! Drawing never fails from this crate's point of view: invalid texture handles and unknown uniform
//! names are accepted and resolved to harmless defaults, and anything the driver rejects surfaces
//! through wgpu's own validation.

use thiserror::Error;

/// Rejected torus parameters.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GeometryError {
    /// A radius was zero, negative, or not finite.
    #[error("{name} must be finite and positive, got {value}")]
    InvalidRadius {
        /// Which radius was rejected.
        name: &'static str,
        /// The rejected value.
        value: f32,
    },

    /// Fewer than three segments cannot enclose a tube.
    #[error("{axis} needs at least 3 segments, got {segments}")]
    TooFewSegments {
        /// Which circle the segment count belongs to.
        axis: &'static str,
        /// The rejected count.
        segments: u32,
    },

    /// The vertex or index count would not fit in a 32-bit index buffer.
    #[error("{major_segments}x{minor_segments} segments exceed the 32-bit index range")]
    TooManyVertices {
        major_segments: u32,
        minor_segments: u32,
    },
}

/// The main error type for rendering setup.
#[derive(Error, Debug)]
pub enum RenderError {
    /// The window could not be turned into a rendering surface.
    #[error("Failed to create rendering surface: {0}")]
    SurfaceCreateFailed(#[from] wgpu::CreateSurfaceError),

    /// No adapter is compatible with the surface.
    #[error("Failed to request WGPU adapter: no compatible adapter found")]
    AdapterRequestFailed,

    /// The surface reports no usable format, present mode, or alpha mode for the adapter.
    #[error("Surface is not supported by the selected adapter")]
    SurfaceUnsupported,

    /// The adapter refused to create a device.
    #[error("Failed to create WGPU device: {0}")]
    DeviceCreateFailed(#[from] wgpu::RequestDeviceError),

    /// Event loop error (winit).
    #[error("Event loop error: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),

    /// RGBA8 pixel data does not match the declared texture size.
    #[error("Texture '{label}' expects {expected} bytes of RGBA8 data, got {actual}")]
    TextureSizeMismatch {
        label: String,
        expected: usize,
        actual: usize,
    },

    #[error(transparent)]
    Geometry(#[from] GeometryError),
}

/// Alias for `std::result::Result<T, RenderError>`.
pub type Result<T> = std::result::Result<T, RenderError>;
