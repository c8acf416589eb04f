use std::sync::Arc;

use crate::assets::{FontAsset, Resource, SceneAssets};
use crate::camera::PerspectiveCamera;
use crate::environment::Environment;
use crate::foundation::color::Color;
use crate::foundation::core::Vec3;
use crate::foundation::error::{BubbleError, BubbleResult};
use crate::material::PhysicalLayer;
use crate::mesh::Mesh;
use crate::scene::bubble::Bubble;
use crate::scene::config::SceneConfig;
use crate::scene::overlay::Overlay;
use crate::scene::typography::{TextNode, TypographyPanel};
use crate::viewport::{Viewport, ViewportProvider};

/// Sphere ready to rasterize: deformed geometry plus its base shading layer.
#[derive(Clone, Debug)]
pub struct BubbleDraw {
    pub mesh: Mesh,
    pub material: PhysicalLayer,
}

/// Viewport plane plus what its off-screen text pass needs.
#[derive(Clone, Debug)]
pub struct PanelDraw {
    pub mesh: Mesh,
    pub nodes: [TextNode; 2],
    pub color: Color,
    pub light_font: FontAsset,
    pub medium_font: FontAsset,
}

/// Fully resolved frame description.
#[derive(Clone, Debug)]
pub struct SceneGraph {
    pub camera: PerspectiveCamera,
    pub viewport: Viewport,
    /// Linear clear color.
    pub background: Vec3,
    pub bubble: BubbleDraw,
    pub panel: PanelDraw,
    pub environment: Arc<Environment>,
}

/// Result of composing the suspension boundary.
#[derive(Clone, Debug)]
pub enum Composed {
    /// Something inside the boundary is still loading; only the clear color is drawn.
    Suspended,
    Ready(Box<SceneGraph>),
}

/// Mounted scene: active camera, viewport provider and the children it feeds.
#[derive(Debug)]
pub struct SceneRoot {
    config: SceneConfig,
    provider: ViewportProvider,
    bubble: Bubble,
    panel: TypographyPanel,
    overlay: Overlay,
}

impl SceneRoot {
    pub fn new(config: &SceneConfig) -> BubbleResult<Self> {
        config.validate()?;
        let canvas = config.canvas()?;
        let camera = PerspectiveCamera::new(&config.camera, canvas)?;
        let mut provider = ViewportProvider::new(camera, canvas);
        let bubble = Bubble::new(&config.bubble, provider.subscribe())?;
        let panel = TypographyPanel::new(&config.typography, provider.subscribe())?;
        let overlay = Overlay::new(&config.typography);
        Ok(Self {
            config: config.clone(),
            provider,
            bubble,
            panel,
            overlay,
        })
    }

    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    pub fn camera(&self) -> PerspectiveCamera {
        self.provider.camera()
    }

    pub fn viewport(&self) -> Viewport {
        self.provider.current()
    }

    pub fn bubble(&self) -> &Bubble {
        &self.bubble
    }

    pub fn panel(&self) -> &TypographyPanel {
        &self.panel
    }

    pub fn overlay(&self) -> &Overlay {
        &self.overlay
    }

    /// Publish a new canvas size and let every child recompute its geometry.
    pub fn resize(&mut self, width: u32, height: u32) -> BubbleResult<bool> {
        if !self.provider.resize(width, height)? {
            return Ok(false);
        }
        self.bubble.sync_viewport()?;
        self.panel.sync_viewport();
        Ok(true)
    }

    /// Per-frame animation update; `dt` is the elapsed time in seconds.
    pub fn tick(&mut self, dt: f64) -> BubbleResult<()> {
        self.bubble.tick(dt)
    }

    /// Put the animation back in its freshly mounted state.
    pub fn rewind(&mut self) {
        self.bubble.rewind();
    }

    /// Resolve the suspension boundary against the current asset states.
    ///
    /// Any failed asset is an error, even if others are still pending.
    pub fn compose(&self, assets: &SceneAssets) -> BubbleResult<Composed> {
        if let Some((name, err)) = assets.first_failure() {
            return Err(BubbleError::asset(format!("{name}: {err}")));
        }
        let (
            Resource::Ready(light_font),
            Resource::Ready(medium_font),
            Resource::Ready(environment),
        ) = (&assets.light_font, &assets.medium_font, &assets.environment)
        else {
            return Ok(Composed::Suspended);
        };

        Ok(Composed::Ready(Box::new(SceneGraph {
            camera: self.camera(),
            viewport: self.viewport(),
            background: self.config.background.to_linear(),
            bubble: BubbleDraw {
                mesh: self.bubble.deformed_mesh(),
                material: self.bubble.material().base,
            },
            panel: PanelDraw {
                mesh: self.panel.mesh()?,
                nodes: self.panel.nodes().clone(),
                color: self.panel.color(),
                light_font: light_font.clone(),
                medium_font: medium_font.clone(),
            },
            environment: environment.clone(),
        })))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/root.rs"]
mod tests;
