use serde::{Deserialize, Serialize};

use crate::foundation::color::Color;
use crate::foundation::core::Vec2;
use crate::foundation::error::{BubbleError, BubbleResult};
use crate::mesh::Mesh;
use crate::viewport::{Viewport, ViewportSubscription};

pub const LINE_1: &str = "How is it made?";
pub const LINE_2: &str = "Displacement";
pub const SIZE: f32 = 14.0;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TypographyConfig {
    #[serde(default = "default_line_1")]
    pub line_1: String,
    #[serde(default = "default_line_2")]
    pub line_2: String,
    /// Base size in viewport-width percent; line 2 uses it directly, line 1 a seventh of it.
    #[serde(default = "default_size")]
    pub size: f32,
    #[serde(default = "default_light_font")]
    pub light_font: String,
    #[serde(default = "default_medium_font")]
    pub medium_font: String,
    #[serde(default = "default_color")]
    pub color: Color,
}

fn default_line_1() -> String {
    LINE_1.to_owned()
}

fn default_line_2() -> String {
    LINE_2.to_owned()
}

fn default_size() -> f32 {
    SIZE
}

fn default_light_font() -> String {
    "fonts/IBMPlexSans-Light.ttf".to_owned()
}

fn default_medium_font() -> String {
    "fonts/IBMPlexSans-Medium.ttf".to_owned()
}

fn default_color() -> Color {
    Color::WHITE
}

impl Default for TypographyConfig {
    fn default() -> Self {
        Self {
            line_1: default_line_1(),
            line_2: default_line_2(),
            size: default_size(),
            light_font: default_light_font(),
            medium_font: default_medium_font(),
            color: default_color(),
        }
    }
}

impl TypographyConfig {
    pub fn validate(&self) -> BubbleResult<()> {
        if !(self.size.is_finite() && self.size > 0.0) {
            return Err(BubbleError::validation("typography size must be finite and > 0"));
        }
        if self.line_1.trim().is_empty() || self.line_2.trim().is_empty() {
            return Err(BubbleError::validation("typography lines must be non-empty"));
        }
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FontRole {
    Light,
    Medium,
}

/// One line drawn into the off-screen text texture, centered on `position`.
#[derive(Clone, Debug, PartialEq)]
pub struct TextNode {
    pub text: String,
    pub font: FontRole,
    /// Em size in world units.
    pub font_size: f32,
    /// Center in panel-local world units, +Y up.
    pub position: Vec2,
}

/// Text nodes for `viewport`. Sizes and offsets are viewport-relative.
pub fn layout_nodes(cfg: &TypographyConfig, viewport: &Viewport) -> [TextNode; 2] {
    [
        TextNode {
            text: cfg.line_1.clone(),
            font: FontRole::Light,
            font_size: viewport.vw(cfg.size / 7.0),
            position: Vec2::new(0.0, viewport.vh(10.0)),
        },
        TextNode {
            text: cfg.line_2.clone(),
            font: FontRole::Medium,
            font_size: viewport.vw(cfg.size),
            position: Vec2::ZERO,
        },
    ]
}

/// Viewport-filling plane whose color map is the rendered text.
#[derive(Debug)]
pub struct TypographyPanel {
    cfg: TypographyConfig,
    viewport: ViewportSubscription,
    nodes: [TextNode; 2],
}

impl TypographyPanel {
    pub fn new(cfg: &TypographyConfig, viewport: ViewportSubscription) -> BubbleResult<Self> {
        cfg.validate()?;
        let nodes = layout_nodes(cfg, &viewport.latest());
        Ok(Self {
            cfg: cfg.clone(),
            viewport,
            nodes,
        })
    }

    /// Pick up viewport changes and re-derive node sizes.
    pub fn sync_viewport(&mut self) -> bool {
        let Some(vp) = self.viewport.poll() else {
            return false;
        };
        self.nodes = layout_nodes(&self.cfg, &vp);
        true
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport.latest()
    }

    /// Plane size in world units; always the full viewport.
    pub fn plane_size(&self) -> Vec2 {
        let vp = self.viewport.latest();
        Vec2::new(vp.width, vp.height)
    }

    pub fn mesh(&self) -> BubbleResult<Mesh> {
        let size = self.plane_size();
        Mesh::plane(size.x, size.y)
    }

    pub fn nodes(&self) -> &[TextNode; 2] {
        &self.nodes
    }

    pub fn color(&self) -> Color {
        self.cfg.color
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/typography.rs"]
mod tests;
