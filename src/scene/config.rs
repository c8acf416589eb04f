use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::assets::{AssetRequests, normalize_rel_path};
use crate::camera::CameraConfig;
use crate::environment::EnvironmentSource;
use crate::foundation::color::Color;
use crate::foundation::core::Canvas;
use crate::foundation::error::{BubbleError, BubbleResult};
use crate::render::RenderSettings;
use crate::scene::bubble::BubbleConfig;
use crate::scene::overlay::OverlayConfig;
use crate::scene::typography::TypographyConfig;

/// Everything needed to build a scene. Every field has a default, so `{}` is a valid config.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SceneConfig {
    #[serde(default = "default_width")]
    pub width: u32,
    #[serde(default = "default_height")]
    pub height: u32,
    /// Clear color behind everything.
    #[serde(default = "default_background")]
    pub background: Color,
    #[serde(default)]
    pub camera: CameraConfig,
    #[serde(default)]
    pub bubble: BubbleConfig,
    #[serde(default)]
    pub typography: TypographyConfig,
    #[serde(default)]
    pub environment: EnvironmentSource,
    #[serde(default)]
    pub overlay: OverlayConfig,
    #[serde(default)]
    pub render: RenderSettings,
}

fn default_width() -> u32 {
    1280
}

fn default_height() -> u32 {
    720
}

fn default_background() -> Color {
    Color::BLACK
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            width: default_width(),
            height: default_height(),
            background: default_background(),
            camera: CameraConfig::default(),
            bubble: BubbleConfig::default(),
            typography: TypographyConfig::default(),
            environment: EnvironmentSource::default(),
            overlay: OverlayConfig::default(),
            render: RenderSettings::default(),
        }
    }
}

impl SceneConfig {
    pub fn from_path(path: impl AsRef<Path>) -> BubbleResult<Self> {
        let path = path.as_ref();
        let f = std::fs::File::open(path).map_err(|e| {
            BubbleError::validation(format!("failed to open scene config '{}': {e}", path.display()))
        })?;
        Self::from_reader(std::io::BufReader::new(f))
    }

    pub fn from_reader(r: impl Read) -> BubbleResult<Self> {
        let cfg: Self =
            serde_json::from_reader(r).map_err(|e| BubbleError::serde(e.to_string()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn canvas(&self) -> BubbleResult<Canvas> {
        Canvas::new(self.width, self.height)
    }

    pub fn validate(&self) -> BubbleResult<()> {
        self.canvas()?;
        self.camera.validate()?;
        self.bubble.validate()?;
        self.typography.validate()?;
        self.render.validate()?;
        normalize_rel_path(&self.typography.light_font)?;
        normalize_rel_path(&self.typography.medium_font)?;
        if let EnvironmentSource::File(rel) = &self.environment {
            normalize_rel_path(rel)?;
        }
        Ok(())
    }

    pub fn asset_requests(&self) -> AssetRequests {
        AssetRequests {
            light_font: self.typography.light_font.clone(),
            medium_font: self.typography.medium_font.clone(),
            environment: self.environment.clone(),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/config.rs"]
mod tests;
