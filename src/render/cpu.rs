use std::path::PathBuf;

use rayon::prelude::*;

use crate::foundation::color::Color;
use crate::foundation::core::{Canvas, Vec3};
use crate::foundation::error::BubbleResult;
use crate::foundation::math::{aces_filmic, linear_to_srgb_u8};
use crate::material::SurfaceSample;
use crate::render::backend::{FrameRGBA, RenderSettings, ToneMapping};
use crate::render::overlay::OverlayRaster;
use crate::render::raster::{RasterTarget, draw_indexed, interpolate, project_vertices};
use crate::render::text::TextPass;
use crate::scene::{Composed, Overlay, SceneGraph};

/// Everything one frame needs besides the renderer's own caches.
#[derive(Clone, Copy, Debug)]
pub struct FrameRequest<'a> {
    pub composed: &'a Composed,
    pub canvas: Canvas,
    /// Clear color, used on its own while the scene is suspended.
    pub background: Color,
    /// Composited over the finished frame when present.
    pub overlay: Option<&'a Overlay>,
}

/// Software renderer for the composed scene.
///
/// Passes, in order: text texture, background (clear plus text panel), bubble refracting the
/// background, tone mapping, overlay.
#[derive(Debug)]
pub struct CpuRenderer {
    settings: RenderSettings,
    text: TextPass,
    overlay: OverlayRaster,
}

impl CpuRenderer {
    pub fn new(settings: RenderSettings, assets_root: impl Into<PathBuf>) -> BubbleResult<Self> {
        settings.validate()?;
        Ok(Self {
            settings,
            text: TextPass::new(),
            overlay: OverlayRaster::new(assets_root),
        })
    }

    pub fn settings(&self) -> RenderSettings {
        self.settings
    }

    pub fn render(&mut self, req: &FrameRequest<'_>) -> BubbleResult<FrameRGBA> {
        let mut frame = match req.composed {
            Composed::Suspended => {
                let rgb = tone_map(&self.settings, req.background.to_linear());
                FrameRGBA::solid(req.canvas.width, req.canvas.height, [rgb[0], rgb[1], rgb[2], 255])
            }
            Composed::Ready(graph) => self.render_graph(graph, req.canvas)?,
        };

        if let Some(overlay) = req.overlay {
            let fonts = match req.composed {
                Composed::Ready(g) => vec![&g.panel.light_font, &g.panel.medium_font],
                Composed::Suspended => Vec::new(),
            };
            self.overlay.composite_onto(overlay, &mut frame, &fonts)?;
        }
        Ok(frame)
    }

    fn render_graph(&mut self, graph: &SceneGraph, canvas: Canvas) -> BubbleResult<FrameRGBA> {
        let settings = self.settings;
        let band_rows = settings.band_rows;
        let text = self.text.render(&graph.panel, graph.viewport.width, canvas)?;
        let camera = graph.camera.with_aspect(canvas);
        let view_proj = camera.view_projection_matrix();

        let mut target = RasterTarget::new(canvas, graph.background);

        let panel = &graph.panel.mesh;
        let panel_verts = project_vertices(&panel.positions, &view_proj, canvas);
        draw_indexed(&mut target, &panel_verts, &panel.indices, false, band_rows, |f| {
            let uv = interpolate(&panel.uvs, &panel.indices, f);
            text.sample(uv).truncate()
        });

        // Refraction reads what was behind the bubble, never the bubble itself.
        let backdrop = target.clone();
        let bubble = &graph.bubble.mesh;
        let material = &graph.bubble.material;
        let env = graph.environment.as_ref();
        let bubble_verts = project_vertices(&bubble.positions, &view_proj, canvas);
        draw_indexed(&mut target, &bubble_verts, &bubble.indices, true, band_rows, |f| {
            let position = interpolate(&bubble.positions, &bubble.indices, f);
            let sample = SurfaceSample {
                position,
                normal: interpolate(&bubble.normals, &bubble.indices, f),
                view: (camera.position - position).normalize_or(Vec3::Z),
            };
            material.shade(&sample, env, |p| {
                match camera.project(&view_proj, p, canvas) {
                    Some(s) => backdrop.sample(s.x, s.y),
                    None => graph.background,
                }
            })
        });

        let mut data = vec![0u8; canvas.pixel_count() * 4];
        data.par_chunks_mut(4)
            .zip(target.color.par_iter())
            .for_each(|(px, &c)| {
                let [r, g, b] = tone_map(&settings, c);
                px.copy_from_slice(&[r, g, b, 255]);
            });

        Ok(FrameRGBA {
            width: canvas.width,
            height: canvas.height,
            data,
            premultiplied: true,
        })
    }
}

/// Exposure, tone curve and sRGB encoding of one linear color.
fn tone_map(settings: &RenderSettings, linear: Vec3) -> [u8; 3] {
    let c = linear * settings.exposure;
    let mapped = match settings.tone_mapping {
        ToneMapping::Aces => aces_filmic(c),
        ToneMapping::None => c,
    };
    [
        linear_to_srgb_u8(mapped.x),
        linear_to_srgb_u8(mapped.y),
        linear_to_srgb_u8(mapped.z),
    ]
}

#[cfg(test)]
#[path = "../../tests/unit/render/cpu.rs"]
mod tests;
