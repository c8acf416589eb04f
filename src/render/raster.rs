//! Z-buffered triangle rasterizer over linear-light float targets.
//!
//! Rows are split into bands that rasterize in parallel. Each band owns a disjoint slice of the
//! color and depth buffers and visits its triangles in submission order, so output does not depend
//! on thread scheduling.

use rayon::prelude::*;

use crate::foundation::core::{Canvas, Mat4, Vec3, Vec4};

/// Vertex after projection: pixel position, NDC depth and `1 / w` for perspective correction.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScreenVertex {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub inv_w: f32,
}

/// Project world-space positions. Vertices behind the near plane become `None`.
pub fn project_vertices(positions: &[Vec3], view_proj: &Mat4, canvas: Canvas) -> Vec<Option<ScreenVertex>> {
    let (w, h) = (canvas.width as f32, canvas.height as f32);
    positions
        .par_iter()
        .map(|p| {
            let clip = *view_proj * Vec4::new(p.x, p.y, p.z, 1.0);
            if clip.w <= f32::EPSILON || clip.z < -clip.w {
                return None;
            }
            let inv_w = 1.0 / clip.w;
            Some(ScreenVertex {
                x: (clip.x * inv_w + 1.0) * 0.5 * w,
                y: (1.0 - clip.y * inv_w) * 0.5 * h,
                z: clip.z * inv_w,
                inv_w,
            })
        })
        .collect()
}

/// One covered pixel that passed the depth test.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Fragment {
    pub x: u32,
    pub y: u32,
    /// Index of the triangle in the submitted index list (`indices[3 * tri..]`).
    pub tri: usize,
    /// Perspective-correct barycentric weights of the triangle's three vertices.
    pub bary: Vec3,
    pub depth: f32,
}

/// Linear RGB color plus depth, row-major.
#[derive(Clone, Debug)]
pub struct RasterTarget {
    pub canvas: Canvas,
    pub color: Vec<Vec3>,
    pub depth: Vec<f32>,
}

impl RasterTarget {
    pub fn new(canvas: Canvas, clear: Vec3) -> Self {
        let n = canvas.pixel_count();
        Self {
            canvas,
            color: vec![clear; n],
            depth: vec![f32::INFINITY; n],
        }
    }

    pub fn at(&self, x: u32, y: u32) -> Vec3 {
        self.color[y as usize * self.canvas.width as usize + x as usize]
    }

    /// Bilinear lookup at fractional pixel coordinates, clamped to the edges.
    pub fn sample(&self, x: f32, y: f32) -> Vec3 {
        let (w, h) = (self.canvas.width as i64, self.canvas.height as i64);
        let fx = (x - 0.5).clamp(0.0, (w - 1) as f32);
        let fy = (y - 0.5).clamp(0.0, (h - 1) as f32);
        let (x0, y0) = (fx.floor() as i64, fy.floor() as i64);
        let (x1, y1) = ((x0 + 1).min(w - 1), (y0 + 1).min(h - 1));
        let (tx, ty) = (fx - x0 as f32, fy - y0 as f32);
        let px = |x: i64, y: i64| self.color[(y * w + x) as usize];
        let top = px(x0, y0).lerp(px(x1, y0), tx);
        let bottom = px(x0, y1).lerp(px(x1, y1), tx);
        top.lerp(bottom, ty)
    }
}

#[derive(Clone, Copy, Debug)]
struct TriSetup {
    tri: usize,
    v: [ScreenVertex; 3],
    area: f32,
    min_x: u32,
    max_x: u32,
    min_y: u32,
    max_y: u32,
}

fn edge_function(a: &ScreenVertex, b: &ScreenVertex, px: f32, py: f32) -> f32 {
    (px - a.x) * (b.y - a.y) - (py - a.y) * (b.x - a.x)
}

fn setup_triangles(
    verts: &[Option<ScreenVertex>],
    indices: &[u32],
    canvas: Canvas,
    cull_back_faces: bool,
) -> Vec<TriSetup> {
    let (w, h) = (canvas.width as f32, canvas.height as f32);
    indices
        .chunks_exact(3)
        .enumerate()
        .filter_map(|(tri, idx)| {
            let a = (*verts.get(idx[0] as usize)?)?;
            let b = (*verts.get(idx[1] as usize)?)?;
            let c = (*verts.get(idx[2] as usize)?)?;
            // Counter-clockwise in world space is positive here because screen y points down.
            let area = edge_function(&a, &b, c.x, c.y);
            if area.abs() <= f32::EPSILON || (cull_back_faces && area < 0.0) {
                return None;
            }
            let min_x = a.x.min(b.x).min(c.x).floor().max(0.0);
            let max_x = a.x.max(b.x).max(c.x).ceil().min(w - 1.0);
            let min_y = a.y.min(b.y).min(c.y).floor().max(0.0);
            let max_y = a.y.max(b.y).max(c.y).ceil().min(h - 1.0);
            if min_x > max_x || min_y > max_y {
                return None;
            }
            Some(TriSetup {
                tri,
                v: [a, b, c],
                area,
                min_x: min_x as u32,
                max_x: max_x as u32,
                min_y: min_y as u32,
                max_y: max_y as u32,
            })
        })
        .collect()
}

/// Rasterize an indexed mesh into `target`, calling `shade` for every fragment that wins the
/// depth test. `shade` returns the linear color to store.
pub fn draw_indexed<F>(
    target: &mut RasterTarget,
    verts: &[Option<ScreenVertex>],
    indices: &[u32],
    cull_back_faces: bool,
    band_rows: u32,
    shade: F,
) where
    F: Fn(&Fragment) -> Vec3 + Sync,
{
    let canvas = target.canvas;
    let width = canvas.width as usize;
    let band_rows = band_rows.max(1);
    let tris = setup_triangles(verts, indices, canvas, cull_back_faces);

    let band_count = canvas.height.div_ceil(band_rows) as usize;
    let mut bins: Vec<Vec<u32>> = vec![Vec::new(); band_count];
    for (i, t) in tris.iter().enumerate() {
        for band in (t.min_y / band_rows)..=(t.max_y / band_rows) {
            bins[band as usize].push(i as u32);
        }
    }

    let chunk = width * band_rows as usize;
    target
        .color
        .par_chunks_mut(chunk)
        .zip(target.depth.par_chunks_mut(chunk))
        .zip(bins.par_iter())
        .enumerate()
        .for_each(|(band, ((colors, depths), bin))| {
            let y_start = band as u32 * band_rows;
            let y_end = (y_start + band_rows).min(canvas.height) - 1;
            for &ti in bin {
                let t = &tris[ti as usize];
                let [v0, v1, v2] = &t.v;
                for y in t.min_y.max(y_start)..=t.max_y.min(y_end) {
                    let py = y as f32 + 0.5;
                    let row = (y - y_start) as usize * width;
                    for x in t.min_x..=t.max_x {
                        let px = x as f32 + 0.5;
                        let mut w0 = edge_function(v1, v2, px, py);
                        let mut w1 = edge_function(v2, v0, px, py);
                        let mut w2 = edge_function(v0, v1, px, py);
                        if t.area < 0.0 {
                            (w0, w1, w2) = (-w0, -w1, -w2);
                        }
                        if w0 < 0.0 || w1 < 0.0 || w2 < 0.0 {
                            continue;
                        }
                        let area = t.area.abs();
                        let l = Vec3::new(w0 / area, w1 / area, w2 / area);

                        let z = l.x * v0.z + l.y * v1.z + l.z * v2.z;
                        let i = row + x as usize;
                        if !(-1.0..=1.0).contains(&z) || z >= depths[i] {
                            continue;
                        }

                        let p = Vec3::new(l.x * v0.inv_w, l.y * v1.inv_w, l.z * v2.inv_w);
                        let sum = p.x + p.y + p.z;
                        if sum <= 0.0 {
                            continue;
                        }
                        let frag = Fragment {
                            x,
                            y,
                            tri: t.tri,
                            bary: p / sum,
                            depth: z,
                        };
                        depths[i] = z;
                        colors[i] = shade(&frag);
                    }
                }
            }
        });
}

/// Interpolate a per-vertex attribute at a fragment.
pub fn interpolate<T>(attr: &[T], indices: &[u32], frag: &Fragment) -> T
where
    T: Copy + std::ops::Mul<f32, Output = T> + std::ops::Add<Output = T>,
{
    let base = frag.tri * 3;
    let a = attr[indices[base] as usize];
    let b = attr[indices[base + 1] as usize];
    let c = attr[indices[base + 2] as usize];
    a * frag.bary.x + b * frag.bary.y + c * frag.bary.z
}

#[cfg(test)]
#[path = "../../tests/unit/render/raster.rs"]
mod tests;
