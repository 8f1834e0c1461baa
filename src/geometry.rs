//! # Torus Geometry
//!
//! Procedural vertex and index generation for a ring torus.
//!
//! A torus is swept by a small circle of radius `minor_radius` whose centre travels around a large
//! circle of radius `major_radius` in the XZ plane. The generator walks `major_segments + 1` steps
//! around the large circle and `minor_segments + 1` steps around the small one. The last step of
//! each loop duplicates the first so texture coordinates can run all the way to `1.0` without
//! wrapping back to `0.0` mid-triangle.
//!
//! ```rust
//! use torus_core::TorusGeometry;
//!
//! let mesh = TorusGeometry::default().build();
//! assert_eq!(mesh.vertex_count(), 325);
//! assert_eq!(mesh.index_count(), 1728);
//! ```

use std::f32::consts::TAU;

use crate::error::GeometryError;
use crate::vertex::Vertex;

/// Shape parameters of a torus. `Default` gives the demo's donut.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TorusGeometry {
    major_radius: f32,
    minor_radius: f32,
    major_segments: u32,
    minor_segments: u32,
}

impl Default for TorusGeometry {
    fn default() -> Self {
        Self {
            major_radius: 0.6,
            minor_radius: 0.25,
            major_segments: 24,
            minor_segments: 12,
        }
    }
}

impl TorusGeometry {
    /// Validates and creates a torus shape.
    ///
    /// Both radii must be finite and positive, each circle needs at least three segments, and the
    /// resulting vertex and index counts must fit a `u32` index buffer.
    pub fn new(
        major_radius: f32,
        minor_radius: f32,
        major_segments: u32,
        minor_segments: u32,
    ) -> Result<Self, GeometryError> {
        for (name, value) in [("major radius", major_radius), ("minor radius", minor_radius)] {
            if !value.is_finite() || value <= 0.0 {
                return Err(GeometryError::InvalidRadius { name, value });
            }
        }

        for (axis, segments) in [("major circle", major_segments), ("minor circle", minor_segments)] {
            if segments < 3 {
                return Err(GeometryError::TooFewSegments { axis, segments });
            }
        }

        let too_many = GeometryError::TooManyVertices {
            major_segments,
            minor_segments,
        };
        major_segments
            .checked_add(1)
            .zip(minor_segments.checked_add(1))
            .and_then(|(rings, sides)| rings.checked_mul(sides))
            .ok_or_else(|| too_many.clone())?;
        major_segments
            .checked_mul(minor_segments)
            .and_then(|quads| quads.checked_mul(6))
            .ok_or(too_many)?;

        Ok(Self {
            major_radius,
            minor_radius,
            major_segments,
            minor_segments,
        })
    }

    /// Distance from the centre of the torus to the centre of the tube.
    pub fn major_radius(&self) -> f32 {
        self.major_radius
    }

    /// Radius of the tube.
    pub fn minor_radius(&self) -> f32 {
        self.minor_radius
    }

    /// Steps around the large circle.
    pub fn major_segments(&self) -> u32 {
        self.major_segments
    }

    /// Steps around the tube.
    pub fn minor_segments(&self) -> u32 {
        self.minor_segments
    }

    /// `(major_segments + 1) * (minor_segments + 1)`, seam duplicates included.
    pub fn vertex_count(&self) -> u32 {
        (self.major_segments + 1) * (self.minor_segments + 1)
    }

    /// Two triangles per quad cell.
    pub fn index_count(&self) -> u32 {
        self.major_segments * self.minor_segments * 6
    }

    /// Generates the interleaved vertices and the triangle-list indices.
    pub fn build(&self) -> MeshData {
        let mut vertices = Vec::with_capacity(self.vertex_count() as usize);
        let mut indices = Vec::with_capacity(self.index_count() as usize);

        let major = self.major_segments;
        let minor = self.minor_segments;

        for i in 0..=major {
            // The seam column reuses angle 0 so its positions match the first column exactly.
            let major_angle = TAU * (i % major) as f32 / major as f32;
            let (sin_major, cos_major) = major_angle.sin_cos();

            for j in 0..=minor {
                let minor_angle = TAU * (j % minor) as f32 / minor as f32;
                let (sin_minor, cos_minor) = minor_angle.sin_cos();

                let ring = self.major_radius + self.minor_radius * cos_minor;

                vertices.push(Vertex {
                    position: [
                        ring * cos_major,
                        self.minor_radius * sin_minor,
                        ring * sin_major,
                    ],
                    normal: [cos_minor * cos_major, sin_minor, cos_minor * sin_major],
                    tex_coords: [i as f32 / major as f32, j as f32 / minor as f32],
                });
            }
        }

        for i in 0..major {
            for j in 0..minor {
                let current = i * (minor + 1) + j;
                let next = current + minor + 1;

                indices.extend_from_slice(&[current, next, current + 1]);
                indices.extend_from_slice(&[current + 1, next, next + 1]);
            }
        }

        log::debug!(
            "Generated torus mesh: {} vertices, {} indices",
            vertices.len(),
            indices.len()
        );

        MeshData { vertices, indices }
    }
}

/// CPU-side mesh ready for upload: interleaved vertices plus a `u32` triangle list.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshData {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
}

impl MeshData {
    pub fn vertex_count(&self) -> u32 {
        self.vertices.len() as u32
    }

    pub fn index_count(&self) -> u32 {
        self.indices.len() as u32
    }
}
