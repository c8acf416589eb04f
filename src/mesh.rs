//! Indexed triangle meshes for the two scene primitives.

use std::f32::consts::{PI, TAU};

use crate::foundation::core::{Vec2, Vec3};
use crate::foundation::error::{BubbleError, BubbleResult};

/// Indexed triangle mesh with per-vertex normals and texture coordinates.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Mesh {
    pub positions: Vec<Vec3>,
    pub normals: Vec<Vec3>,
    pub uvs: Vec<Vec2>,
    /// Counter-clockwise triangles when seen from outside.
    pub indices: Vec<u32>,
}

impl Mesh {
    /// Latitude/longitude sphere centered on the origin.
    ///
    /// Produces `(width_segments + 1) * (height_segments + 1)` vertices; the seam column is
    /// duplicated so `u` runs from 0 to 1. Rows touching a pole emit one triangle per quad.
    pub fn uv_sphere(radius: f32, width_segments: u32, height_segments: u32) -> BubbleResult<Self> {
        if !radius.is_finite() || radius <= 0.0 {
            return Err(BubbleError::validation("sphere radius must be finite and > 0"));
        }
        if width_segments < 3 || height_segments < 2 {
            return Err(BubbleError::validation(
                "sphere needs at least 3 width segments and 2 height segments",
            ));
        }

        // Indices are u32, so the vertex count has to fit one.
        let too_dense =
            || BubbleError::validation("sphere segment counts overflow the index range");
        let cols = width_segments.checked_add(1).ok_or_else(too_dense)?;
        let rows = height_segments.checked_add(1).ok_or_else(too_dense)?;
        let n = cols.checked_mul(rows).ok_or_else(too_dense)? as usize;
        let index_count = width_segments
            .checked_mul(height_segments)
            .and_then(|quads| quads.checked_mul(6))
            .ok_or_else(too_dense)? as usize;
        let mut positions = Vec::with_capacity(n);
        let mut normals = Vec::with_capacity(n);
        let mut uvs = Vec::with_capacity(n);

        for iy in 0..rows {
            let v = iy as f32 / height_segments as f32;
            let theta = v * PI;
            for ix in 0..cols {
                let u = ix as f32 / width_segments as f32;
                let phi = u * TAU;
                let dir = Vec3::new(
                    -phi.cos() * theta.sin(),
                    theta.cos(),
                    phi.sin() * theta.sin(),
                );
                positions.push(dir * radius);
                normals.push(dir.normalize_or_zero());
                uvs.push(Vec2::new(u, 1.0 - v));
            }
        }

        let mut indices = Vec::with_capacity(index_count);
        for iy in 0..height_segments {
            for ix in 0..width_segments {
                let a = iy * cols + ix + 1;
                let b = iy * cols + ix;
                let c = (iy + 1) * cols + ix;
                let d = (iy + 1) * cols + ix + 1;
                if iy != 0 {
                    indices.extend_from_slice(&[a, b, d]);
                }
                if iy != height_segments - 1 {
                    indices.extend_from_slice(&[b, c, d]);
                }
            }
        }

        Ok(Self {
            positions,
            normals,
            uvs,
            indices,
        })
    }

    /// Single-quad plane in the XY plane facing +Z, centered on the origin.
    ///
    /// `uv (0, 1)` is the top-left corner.
    pub fn plane(width: f32, height: f32) -> BubbleResult<Self> {
        if !(width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0) {
            return Err(BubbleError::validation(
                "plane width/height must be finite and > 0",
            ));
        }
        let (hw, hh) = (width * 0.5, height * 0.5);
        Ok(Self {
            positions: vec![
                Vec3::new(-hw, hh, 0.0),
                Vec3::new(hw, hh, 0.0),
                Vec3::new(-hw, -hh, 0.0),
                Vec3::new(hw, -hh, 0.0),
            ],
            normals: vec![Vec3::Z; 4],
            uvs: vec![
                Vec2::new(0.0, 1.0),
                Vec2::new(1.0, 1.0),
                Vec2::new(0.0, 0.0),
                Vec2::new(1.0, 0.0),
            ],
            indices: vec![0, 2, 1, 2, 3, 1],
        })
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn triangles(&self) -> impl Iterator<Item = [u32; 3]> + '_ {
        self.indices.chunks_exact(3).map(|t| [t[0], t[1], t[2]])
    }

    /// Largest distance of any vertex from the origin.
    pub fn bounding_radius(&self) -> f32 {
        self.positions
            .iter()
            .map(|p| p.length())
            .fold(0.0, f32::max)
    }
}

#[cfg(test)]
#[path = "../tests/unit/mesh.rs"]
mod tests;
