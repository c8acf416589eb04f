//! Layered material: a physical base plus an ordered stack of vertex layers.

pub mod displace;
pub mod physical;

use serde::{Deserialize, Serialize};

use crate::foundation::color::Color;
use crate::foundation::error::{BubbleError, BubbleResult};
use crate::mesh::Mesh;

pub use displace::{DisplaceConfig, DisplaceLayer};
pub use physical::{Lighting, PhysicalLayer, SurfaceSample};

/// Base-layer settings as they appear in scene JSON.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MaterialConfig {
    #[serde(default = "default_color")]
    pub color: Color,
    #[serde(default)]
    pub lighting: Lighting,
    #[serde(default = "default_transmission")]
    pub transmission: f32,
    #[serde(default)]
    pub roughness: f32,
    #[serde(default = "default_thickness")]
    pub thickness: f32,
    #[serde(default = "default_ior")]
    pub ior: f32,
}

fn default_color() -> Color {
    Color::WHITE
}

fn default_transmission() -> f32 {
    1.0
}

fn default_thickness() -> f32 {
    2.0
}

fn default_ior() -> f32 {
    1.5
}

impl Default for MaterialConfig {
    fn default() -> Self {
        Self {
            color: default_color(),
            lighting: Lighting::default(),
            transmission: default_transmission(),
            roughness: 0.0,
            thickness: default_thickness(),
            ior: default_ior(),
        }
    }
}

impl MaterialConfig {
    pub fn validate(&self) -> BubbleResult<()> {
        let unit = |name: &str, v: f32| {
            if (0.0..=1.0).contains(&v) {
                Ok(())
            } else {
                Err(BubbleError::validation(format!("material {name} must be in [0, 1]")))
            }
        };
        unit("transmission", self.transmission)?;
        unit("roughness", self.roughness)?;
        if !(self.thickness.is_finite() && self.thickness >= 0.0) {
            return Err(BubbleError::validation("material thickness must be finite and >= 0"));
        }
        if !(self.ior.is_finite() && self.ior >= 1.0) {
            return Err(BubbleError::validation("material ior must be finite and >= 1"));
        }
        Ok(())
    }
}

/// One entry of the layer stack.
#[derive(Clone, Debug)]
pub enum Layer {
    Displace(DisplaceLayer),
}

#[derive(Clone, Debug)]
pub struct LayerMaterial {
    pub base: PhysicalLayer,
    pub layers: Vec<Layer>,
}

impl LayerMaterial {
    pub fn new(base: &MaterialConfig, layers: Vec<Layer>) -> BubbleResult<Self> {
        base.validate()?;
        Ok(Self {
            base: PhysicalLayer::from_config(base),
            layers,
        })
    }

    /// Run every vertex layer over `mesh`, in stack order.
    pub fn deform(&self, mesh: &Mesh) -> Mesh {
        let mut out: Option<Mesh> = None;
        for layer in &self.layers {
            let src = out.as_ref().unwrap_or(mesh);
            out = Some(match layer {
                Layer::Displace(d) => d.apply(src),
            });
        }
        out.unwrap_or_else(|| mesh.clone())
    }

    /// First displacement layer in the stack.
    pub fn displace(&self) -> Option<&DisplaceLayer> {
        self.layers.iter().find_map(|l| match l {
            Layer::Displace(d) => Some(d),
        })
    }

    pub fn displace_mut(&mut self) -> Option<&mut DisplaceLayer> {
        self.layers.iter_mut().find_map(|l| match l {
            Layer::Displace(d) => Some(d),
        })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/material/mod.rs"]
mod tests;
