//! Overlay caption rasterized through usvg/resvg and composited over finished frames.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::assets::FontAsset;
use crate::foundation::core::Canvas;
use crate::foundation::error::{BubbleError, BubbleResult};
use crate::foundation::math::mul_div255_u16;
use crate::render::backend::FrameRGBA;
use crate::scene::Overlay;

/// Rasterizes the overlay markup, caching one layer per canvas size and font set.
pub struct OverlayRaster {
    root: PathBuf,
    fontdb: Option<(Vec<String>, Arc<usvg::fontdb::Database>)>,
    cached: Option<(Canvas, Arc<Vec<u8>>)>,
}

impl std::fmt::Debug for OverlayRaster {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OverlayRaster")
            .field("root", &self.root)
            .field("fonts", &self.fontdb.as_ref().map(|(_, db)| db.len()))
            .field("cached", &self.cached.as_ref().map(|(c, _)| *c))
            .finish()
    }
}

impl OverlayRaster {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            fontdb: None,
            cached: None,
        }
    }

    /// Premultiplied RGBA8 layer for `canvas`. `fonts` are loaded alongside system fonts and
    /// font files under the assets root.
    pub fn layer(
        &mut self,
        overlay: &Overlay,
        canvas: Canvas,
        fonts: &[&FontAsset],
    ) -> BubbleResult<Arc<Vec<u8>>> {
        let paths: Vec<String> = fonts.iter().map(|f| f.path.clone()).collect();
        let fontdb = match &self.fontdb {
            Some((p, db)) if *p == paths => db.clone(),
            _ => {
                let db = build_overlay_fontdb(&self.root, fonts);
                self.fontdb = Some((paths, db.clone()));
                self.cached = None;
                db
            }
        };
        if let Some((c, layer)) = &self.cached
            && *c == canvas
        {
            return Ok(layer.clone());
        }

        let opts = usvg::Options {
            fontdb,
            font_resolver: make_font_resolver(),
            ..Default::default()
        };
        let svg = overlay.to_svg(canvas);
        let tree = usvg::Tree::from_str(&svg, &opts)
            .map_err(|e| BubbleError::render(format!("overlay svg: {e}")))?;

        let mut pixmap = resvg::tiny_skia::Pixmap::new(canvas.width, canvas.height)
            .ok_or_else(|| BubbleError::render("failed to allocate overlay pixmap"))?;
        resvg::render(&tree, resvg::tiny_skia::Transform::identity(), &mut pixmap.as_mut());

        let layer = Arc::new(pixmap.data().to_vec());
        tracing::debug!(width = canvas.width, height = canvas.height, "overlay rasterized");
        self.cached = Some((canvas, layer.clone()));
        Ok(layer)
    }

    /// Composite the overlay over `frame` in place.
    pub fn composite_onto(
        &mut self,
        overlay: &Overlay,
        frame: &mut FrameRGBA,
        fonts: &[&FontAsset],
    ) -> BubbleResult<()> {
        let canvas = Canvas::new(frame.width, frame.height)?;
        let layer = self.layer(overlay, canvas, fonts)?;
        composite_over_premul(&mut frame.data, &layer)
    }
}

/// `dst = src + dst * (1 - src.a)` over premultiplied RGBA8.
pub fn composite_over_premul(dst: &mut [u8], src: &[u8]) -> BubbleResult<()> {
    if dst.len() != src.len() {
        return Err(BubbleError::render("composite buffers differ in size"));
    }
    for (d, s) in dst.chunks_exact_mut(4).zip(src.chunks_exact(4)) {
        let sa = s[3];
        if sa == 0 {
            continue;
        }
        if sa == 255 {
            d.copy_from_slice(s);
            continue;
        }
        let inv = 255 - u16::from(sa);
        for (dc, &sc) in d.iter_mut().zip(s) {
            let v = u16::from(sc) + mul_div255_u16(u16::from(*dc), inv);
            *dc = v.min(255) as u8;
        }
    }
    Ok(())
}

fn build_overlay_fontdb(root: &Path, fonts: &[&FontAsset]) -> Arc<usvg::fontdb::Database> {
    let mut db = usvg::fontdb::Database::new();
    db.load_system_fonts();

    load_fonts_from_dir(&mut db, root);
    load_fonts_from_dir(&mut db, &root.join("fonts"));
    for font in fonts {
        db.load_font_source(usvg::fontdb::Source::Binary(font.bytes.clone()));
    }

    Arc::new(db)
}

fn load_fonts_from_dir(db: &mut usvg::fontdb::Database, dir: &Path) {
    let Ok(rd) = std::fs::read_dir(dir) else {
        return;
    };

    for entry in rd.flatten() {
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let Some(ext) = path.extension().and_then(|s| s.to_str()) else {
            continue;
        };
        let ext = ext.to_ascii_lowercase();
        if ext != "ttf" && ext != "otf" && ext != "ttc" {
            continue;
        }
        let _ = db.load_font_file(&path);
    }
}

fn make_font_resolver() -> usvg::FontResolver<'static> {
    usvg::FontResolver {
        select_font: Box::new(|font, fontdb| {
            let mut families = Vec::<usvg::fontdb::Family<'_>>::new();
            for family in font.families() {
                families.push(match family {
                    usvg::FontFamily::Serif => usvg::fontdb::Family::Serif,
                    usvg::FontFamily::SansSerif => usvg::fontdb::Family::SansSerif,
                    usvg::FontFamily::Cursive => usvg::fontdb::Family::Cursive,
                    usvg::FontFamily::Fantasy => usvg::fontdb::Family::Fantasy,
                    usvg::FontFamily::Monospace => usvg::fontdb::Family::Monospace,
                    usvg::FontFamily::Named(s) => usvg::fontdb::Family::Name(s),
                });
            }
            families.push(usvg::fontdb::Family::SansSerif);

            let query = usvg::fontdb::Query {
                families: &families,
                weight: usvg::fontdb::Weight(font.weight()),
                stretch: usvg::fontdb::Stretch::Normal,
                style: usvg::fontdb::Style::Normal,
            };

            // Without the named family or any sans-serif face, take whatever is loaded.
            fontdb.query(&query).or_else(|| fontdb.faces().next().map(|f| f.id))
        }),
        select_fallback: usvg::FontResolver::default_fallback_selector(),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/overlay.rs"]
mod tests;
