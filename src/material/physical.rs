use serde::{Deserialize, Serialize};

use crate::environment::Environment;
use crate::foundation::core::Vec3;
use crate::material::MaterialConfig;

/// Lighting model of the base layer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Lighting {
    /// Energy-conserving Fresnel blend of environment reflection and transmission.
    #[default]
    Physical,
    /// Unlit flat color.
    Basic,
}

/// Shading-time parameters of the base layer. `color` is linear RGB.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PhysicalLayer {
    pub color: Vec3,
    pub lighting: Lighting,
    pub transmission: f32,
    pub roughness: f32,
    pub thickness: f32,
    pub ior: f32,
}

/// Geometry of one shaded fragment, in world space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SurfaceSample {
    pub position: Vec3,
    /// Interpolated surface normal (need not be normalized).
    pub normal: Vec3,
    /// Unit vector from the surface toward the eye.
    pub view: Vec3,
}

impl PhysicalLayer {
    pub fn from_config(cfg: &MaterialConfig) -> Self {
        Self {
            color: cfg.color.to_linear(),
            lighting: cfg.lighting,
            transmission: cfg.transmission,
            roughness: cfg.roughness,
            thickness: cfg.thickness,
            ior: cfg.ior,
        }
    }

    /// Reflectance at normal incidence.
    pub fn f0(&self) -> f32 {
        let r = (self.ior - 1.0) / (self.ior + 1.0);
        r * r
    }

    /// Schlick approximation of the Fresnel reflectance.
    pub fn fresnel(&self, cos_theta: f32) -> f32 {
        let f0 = self.f0();
        f0 + (1.0 - f0) * (1.0 - cos_theta.clamp(0.0, 1.0)).powi(5)
    }

    /// Linear radiance leaving the surface toward the eye.
    ///
    /// `background` returns the radiance seen through the material at a world-space point; it is
    /// queried once, at the point reached by walking `thickness` along the refracted ray.
    pub fn shade(
        &self,
        s: &SurfaceSample,
        env: &Environment,
        background: impl FnOnce(Vec3) -> Vec3,
    ) -> Vec3 {
        if self.lighting == Lighting::Basic {
            return self.color;
        }

        let v = s.view.normalize_or_zero();
        let mut n = s.normal.normalize_or(v);
        if n.dot(v) < 0.0 {
            n = -n;
        }
        let cos = n.dot(v).clamp(0.0, 1.0);
        let f = self.fresnel(cos);

        let specular = env.radiance(reflect(-v, n), self.roughness);

        let transmitted = if self.transmission > 0.0 {
            let dir = refract(-v, n, 1.0 / self.ior).unwrap_or_else(|| reflect(-v, n));
            background(s.position + dir * self.thickness) * self.color * self.transmission
        } else {
            Vec3::ZERO
        };
        let diffuse = self.color * env.radiance(n, 1.0) * (1.0 - self.transmission);

        (transmitted + diffuse) * (1.0 - f) + specular * f
    }
}

/// Mirror incident direction `i` about unit normal `n`.
pub fn reflect(i: Vec3, n: Vec3) -> Vec3 {
    i - 2.0 * i.dot(n) * n
}

/// Snell refraction of unit `i` through unit `n` with relative index `eta`; `None` on total
/// internal reflection.
pub fn refract(i: Vec3, n: Vec3, eta: f32) -> Option<Vec3> {
    let cos_i = -i.dot(n);
    let k = 1.0 - eta * eta * (1.0 - cos_i * cos_i);
    if k < 0.0 {
        return None;
    }
    Some((eta * i + (eta * cos_i - k.sqrt()) * n).normalize())
}

#[cfg(test)]
#[path = "../../tests/unit/material/physical.rs"]
mod tests;
