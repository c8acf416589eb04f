use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::foundation::core::{DVec3, Vec3};
use crate::foundation::error::{BubbleError, BubbleResult};
use crate::mesh::Mesh;
use crate::noise::{Noise3, NoiseKind};

/// Finite-difference step used to rebuild normals after displacement.
const NORMAL_EPS: f64 = 0.001;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DisplaceConfig {
    #[serde(default = "default_strength")]
    pub strength: f64,
    #[serde(default = "default_scale")]
    pub scale: f64,
    #[serde(default)]
    pub noise: NoiseKind,
    #[serde(default)]
    pub seed: u64,
}

fn default_strength() -> f64 {
    3.0
}

fn default_scale() -> f64 {
    0.25
}

impl Default for DisplaceConfig {
    fn default() -> Self {
        Self {
            strength: default_strength(),
            scale: default_scale(),
            noise: NoiseKind::default(),
            seed: 0,
        }
    }
}

impl DisplaceConfig {
    pub fn validate(&self) -> BubbleResult<()> {
        if !self.strength.is_finite() {
            return Err(BubbleError::validation("displace strength must be finite"));
        }
        if !(self.scale.is_finite() && self.scale > 0.0) {
            return Err(BubbleError::validation("displace scale must be finite and > 0"));
        }
        Ok(())
    }
}

/// Moves vertices along their normals by a noise field sampled at `(p + offset) * scale`.
#[derive(Clone, Debug)]
pub struct DisplaceLayer {
    strength: f64,
    scale: f64,
    offset: DVec3,
    noise: Noise3,
}

impl DisplaceLayer {
    pub fn new(cfg: &DisplaceConfig) -> BubbleResult<Self> {
        cfg.validate()?;
        Ok(Self {
            strength: cfg.strength,
            scale: cfg.scale,
            offset: DVec3::ZERO,
            noise: Noise3::new(cfg.noise, cfg.seed),
        })
    }

    pub fn strength(&self) -> f64 {
        self.strength
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn offset(&self) -> DVec3 {
        self.offset
    }

    pub fn set_offset(&mut self, offset: DVec3) {
        self.offset = offset;
    }

    /// Signed displacement distance at object-space point `p`.
    pub fn height(&self, p: DVec3) -> f64 {
        self.noise.sample((p + self.offset) * self.scale) * self.strength
    }

    fn displaced(&self, p: DVec3, n: DVec3) -> DVec3 {
        p + n * self.height(p)
    }

    /// Displaced position and rebuilt normal for one vertex.
    pub fn displace_vertex(&self, p: Vec3, n: Vec3) -> (Vec3, Vec3) {
        let p = p.as_dvec3();
        let n = n.as_dvec3().normalize_or_zero();
        if n == DVec3::ZERO {
            return (p.as_vec3(), Vec3::ZERO);
        }

        let tangent = orthogonal(n);
        let bitangent = n.cross(tangent);
        let d0 = self.displaced(p, n);
        let d1 = self.displaced(p + tangent * NORMAL_EPS, n);
        let d2 = self.displaced(p + bitangent * NORMAL_EPS, n);
        let normal = (d1 - d0).cross(d2 - d0).normalize_or(n);
        (d0.as_vec3(), normal.as_vec3())
    }

    /// Displaced copy of `mesh`; topology and UVs are unchanged.
    pub fn apply(&self, mesh: &Mesh) -> Mesh {
        let (positions, normals): (Vec<Vec3>, Vec<Vec3>) = mesh
            .positions
            .par_iter()
            .zip(mesh.normals.par_iter())
            .map(|(&p, &n)| self.displace_vertex(p, n))
            .unzip();
        Mesh {
            positions,
            normals,
            uvs: mesh.uvs.clone(),
            indices: mesh.indices.clone(),
        }
    }
}

/// Unit vector perpendicular to unit `n`.
fn orthogonal(n: DVec3) -> DVec3 {
    let helper = if n.x.abs() < 0.9 { DVec3::X } else { DVec3::Y };
    n.cross(helper).normalize()
}

#[cfg(test)]
#[path = "../../tests/unit/material/displace.rs"]
mod tests;
