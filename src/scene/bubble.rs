use serde::{Deserialize, Serialize};

use crate::anim::{OffsetDrift, checked_delta};
use crate::foundation::core::DVec3;
use crate::foundation::error::{BubbleError, BubbleResult};
use crate::material::{DisplaceConfig, DisplaceLayer, Layer, LayerMaterial, MaterialConfig};
use crate::mesh::Mesh;
use crate::viewport::{Viewport, ViewportSubscription};

/// Upper bound for either sphere segment count.
pub const MAX_SEGMENTS: u32 = 4096;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BubbleConfig {
    /// Sphere radius is `viewport.width / radius_divisor`.
    #[serde(default = "default_radius_divisor")]
    pub radius_divisor: f32,
    #[serde(default = "default_segments")]
    pub width_segments: u32,
    #[serde(default = "default_segments")]
    pub height_segments: u32,
    #[serde(default)]
    pub material: MaterialConfig,
    #[serde(default)]
    pub displace: DisplaceConfig,
    #[serde(default)]
    pub drift: OffsetDrift,
}

fn default_radius_divisor() -> f32 {
    8.0
}

fn default_segments() -> u32 {
    128
}

impl Default for BubbleConfig {
    fn default() -> Self {
        Self {
            radius_divisor: default_radius_divisor(),
            width_segments: default_segments(),
            height_segments: default_segments(),
            material: MaterialConfig::default(),
            displace: DisplaceConfig::default(),
            drift: OffsetDrift::default(),
        }
    }
}

impl BubbleConfig {
    pub fn validate(&self) -> BubbleResult<()> {
        if !(self.radius_divisor.is_finite() && self.radius_divisor > 0.0) {
            return Err(BubbleError::validation(
                "bubble radius_divisor must be finite and > 0",
            ));
        }
        if self.width_segments < 3 || self.height_segments < 2 {
            return Err(BubbleError::validation(
                "bubble needs at least 3 width segments and 2 height segments",
            ));
        }
        if self.width_segments > MAX_SEGMENTS || self.height_segments > MAX_SEGMENTS {
            return Err(BubbleError::validation(format!(
                "bubble segments must be <= {MAX_SEGMENTS}"
            )));
        }
        self.material.validate()?;
        self.displace.validate()?;
        self.drift.validate()
    }

    pub fn radius_for(&self, viewport: &Viewport) -> f32 {
        viewport.width / self.radius_divisor
    }
}

/// The displaced glass sphere.
///
/// Owns the only per-frame animation state: the displacement layer's offset, which starts at zero
/// and only moves forward through [`Bubble::tick`].
#[derive(Debug)]
pub struct Bubble {
    cfg: BubbleConfig,
    viewport: ViewportSubscription,
    radius: f32,
    base_mesh: Mesh,
    material: LayerMaterial,
}

impl Bubble {
    pub fn new(cfg: &BubbleConfig, viewport: ViewportSubscription) -> BubbleResult<Self> {
        cfg.validate()?;
        let displace = DisplaceLayer::new(&cfg.displace)?;
        let material = LayerMaterial::new(&cfg.material, vec![Layer::Displace(displace)])?;
        let radius = cfg.radius_for(&viewport.latest());
        let base_mesh = Mesh::uv_sphere(radius, cfg.width_segments, cfg.height_segments)?;
        Ok(Self {
            cfg: *cfg,
            viewport,
            radius,
            base_mesh,
            material,
        })
    }

    /// Pick up viewport changes; rebuilds the sphere when the radius moved.
    pub fn sync_viewport(&mut self) -> BubbleResult<bool> {
        let Some(vp) = self.viewport.poll() else {
            return Ok(false);
        };
        let radius = self.cfg.radius_for(&vp);
        if radius == self.radius {
            return Ok(false);
        }
        self.base_mesh = Mesh::uv_sphere(radius, self.cfg.width_segments, self.cfg.height_segments)?;
        self.radius = radius;
        tracing::debug!(radius, "bubble geometry rebuilt");
        Ok(true)
    }

    /// Advance the displacement offset by `dt` seconds.
    pub fn tick(&mut self, dt: f64) -> BubbleResult<()> {
        let dt = checked_delta(dt)?;
        let drift = self.cfg.drift;
        if let Some(layer) = self.material.displace_mut() {
            layer.set_offset(drift.advance(layer.offset(), dt));
        }
        Ok(())
    }

    /// Return the displacement offset to its mount value.
    pub fn rewind(&mut self) {
        if let Some(layer) = self.material.displace_mut() {
            layer.set_offset(DVec3::ZERO);
        }
    }

    pub fn offset(&self) -> DVec3 {
        self.material
            .displace()
            .map(DisplaceLayer::offset)
            .unwrap_or(DVec3::ZERO)
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    pub fn base_mesh(&self) -> &Mesh {
        &self.base_mesh
    }

    pub fn material(&self) -> &LayerMaterial {
        &self.material
    }

    /// Sphere after every material layer ran at the current offset.
    pub fn deformed_mesh(&self) -> Mesh {
        self.material.deform(&self.base_mesh)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/bubble.rs"]
mod tests;
