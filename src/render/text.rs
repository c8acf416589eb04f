//! Off-screen text pass: the typography nodes drawn into a canvas-sized texture.

use std::sync::Arc;

use crate::assets::{FontAsset, TextBrushRgba8, TextLayoutEngine};
use crate::foundation::core::{Affine, Canvas, Vec2, Vec4};
use crate::foundation::error::{BubbleError, BubbleResult};
use crate::foundation::math::srgb_u8_to_linear;
use crate::scene::typography::{FontRole, TextNode};
use crate::scene::PanelDraw;

/// Linear-light premultiplied RGBA texels, row-major from the top.
#[derive(Clone, Debug, PartialEq)]
pub struct TextTexture {
    pub width: u32,
    pub height: u32,
    pub texels: Vec<Vec4>,
}

impl TextTexture {
    /// Convert premultiplied sRGB RGBA8 pixels.
    pub fn from_premul_rgba8(width: u32, height: u32, data: &[u8]) -> BubbleResult<Self> {
        if data.len() != width as usize * height as usize * 4 {
            return Err(BubbleError::render("text pixmap byte length does not match its size"));
        }
        let texels = data
            .chunks_exact(4)
            .map(|px| {
                let a = px[3];
                if a == 0 {
                    return Vec4::ZERO;
                }
                let af = f32::from(a) / 255.0;
                let straight = |c: u8| -> u8 {
                    ((u16::from(c) * 255 + u16::from(a) / 2) / u16::from(a)).min(255) as u8
                };
                Vec4::new(
                    srgb_u8_to_linear(straight(px[0])) * af,
                    srgb_u8_to_linear(straight(px[1])) * af,
                    srgb_u8_to_linear(straight(px[2])) * af,
                    af,
                )
            })
            .collect();
        Ok(Self {
            width,
            height,
            texels,
        })
    }

    pub fn texel(&self, x: u32, y: u32) -> Vec4 {
        self.texels[y as usize * self.width as usize + x as usize]
    }

    /// Bilinear lookup with `uv (0, 1)` at the top-left corner. Clamps at the edges.
    pub fn sample(&self, uv: Vec2) -> Vec4 {
        let (w, h) = (self.width as i64, self.height as i64);
        let fx = (uv.x * self.width as f32 - 0.5).clamp(0.0, (w - 1) as f32);
        let fy = ((1.0 - uv.y) * self.height as f32 - 0.5).clamp(0.0, (h - 1) as f32);
        let (x0, y0) = (fx.floor() as i64, fy.floor() as i64);
        let (x1, y1) = ((x0 + 1).min(w - 1), (y0 + 1).min(h - 1));
        let (tx, ty) = (fx - x0 as f32, fy - y0 as f32);
        let t = |x: i64, y: i64| self.texels[(y * w + x) as usize];
        t(x0, y0).lerp(t(x1, y0), tx).lerp(t(x0, y1).lerp(t(x1, y1), tx), ty)
    }

    pub fn is_empty(&self) -> bool {
        self.texels.iter().all(|t| t.w == 0.0)
    }
}

#[derive(Clone, Debug, PartialEq)]
struct TextKey {
    canvas: Canvas,
    nodes: [TextNode; 2],
    color: [u8; 4],
    light_font: String,
    medium_font: String,
}

impl TextKey {
    fn new(panel: &PanelDraw, canvas: Canvas) -> Self {
        Self {
            canvas,
            nodes: panel.nodes.clone(),
            color: panel.color.to_rgba8(),
            light_font: panel.light_font.path.clone(),
            medium_font: panel.medium_font.path.clone(),
        }
    }
}

struct PreparedLine {
    layout: parley::Layout<TextBrushRgba8>,
    font: vello_cpu::peniko::FontData,
    origin: Vec2,
}

/// Renders text nodes to a texture and keeps the last result until its inputs change.
pub struct TextPass {
    engine: TextLayoutEngine,
    cached: Option<(TextKey, Arc<TextTexture>)>,
}

impl Default for TextPass {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for TextPass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TextPass")
            .field("cached", &self.cached.as_ref().map(|(k, _)| k.canvas))
            .finish_non_exhaustive()
    }
}

impl TextPass {
    pub fn new() -> Self {
        Self {
            engine: TextLayoutEngine::new(),
            cached: None,
        }
    }

    /// Texture for `panel` at `canvas` size; world units map to pixels at
    /// `canvas.width / viewport.width`.
    pub fn render(
        &mut self,
        panel: &PanelDraw,
        viewport_width: f32,
        canvas: Canvas,
    ) -> BubbleResult<Arc<TextTexture>> {
        let key = TextKey::new(panel, canvas);
        if let Some((k, tex)) = &self.cached
            && *k == key
        {
            return Ok(tex.clone());
        }

        let factor = canvas.width as f32 / viewport_width;
        let [r, g, b, a] = panel.color.to_rgba8();
        let brush = TextBrushRgba8 { r, g, b, a };

        let mut lines = Vec::with_capacity(panel.nodes.len());
        for node in &panel.nodes {
            if node.text.is_empty() {
                continue;
            }
            let font = match node.font {
                FontRole::Light => &panel.light_font,
                FontRole::Medium => &panel.medium_font,
            };
            lines.push(self.prepare_line(node, font, factor, brush, canvas)?);
        }

        let texture = Arc::new(rasterize(&lines, canvas)?);
        tracing::debug!(
            width = canvas.width,
            height = canvas.height,
            lines = lines.len(),
            "text texture rendered"
        );
        self.cached = Some((key, texture.clone()));
        Ok(texture)
    }

    fn prepare_line(
        &mut self,
        node: &TextNode,
        font: &FontAsset,
        factor: f32,
        brush: TextBrushRgba8,
        canvas: Canvas,
    ) -> BubbleResult<PreparedLine> {
        let size_px = node.font_size * factor;
        let layout = self.engine.layout_line(&node.text, font, size_px, brush)?;
        let center = Vec2::new(
            canvas.width as f32 * 0.5 + node.position.x * factor,
            canvas.height as f32 * 0.5 - node.position.y * factor,
        );
        let origin = center - Vec2::new(layout.width(), layout.height()) * 0.5;
        Ok(PreparedLine {
            layout,
            font: vello_cpu::peniko::FontData::new(
                vello_cpu::peniko::Blob::from(font.bytes.as_ref().clone()),
                0,
            ),
            origin,
        })
    }
}

fn rasterize(lines: &[PreparedLine], canvas: Canvas) -> BubbleResult<TextTexture> {
    let (w, h) = (to_u16(canvas.width)?, to_u16(canvas.height)?);
    let mut ctx = vello_cpu::RenderContext::new(w, h);

    for line in lines {
        let tr = Affine::translate((f64::from(line.origin.x), f64::from(line.origin.y)));
        ctx.set_transform(affine_to_cpu(tr));
        for l in line.layout.lines() {
            for item in l.items() {
                let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                    continue;
                };
                let brush = run.style().brush;
                ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(
                    brush.r, brush.g, brush.b, brush.a,
                ));
                let glyphs = run.positioned_glyphs().map(|g| vello_cpu::Glyph {
                    id: g.id,
                    x: g.x,
                    y: g.y,
                });
                ctx.glyph_run(&line.font)
                    .font_size(run.run().font_size())
                    .fill_glyphs(glyphs);
            }
        }
    }

    let mut pixmap = vello_cpu::Pixmap::new(w, h);
    ctx.flush();
    ctx.render_to_pixmap(&mut pixmap);

    TextTexture::from_premul_rgba8(canvas.width, canvas.height, pixmap.data_as_u8_slice())
}

fn affine_to_cpu(a: Affine) -> vello_cpu::kurbo::Affine {
    vello_cpu::kurbo::Affine::new(a.as_coeffs())
}

fn to_u16(v: u32) -> BubbleResult<u16> {
    u16::try_from(v).map_err(|_| BubbleError::render(format!("text texture size {v} exceeds u16")))
}

#[cfg(test)]
#[path = "../../tests/unit/render/text.rs"]
mod tests;
