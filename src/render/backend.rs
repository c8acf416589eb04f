use serde::{Deserialize, Serialize};

use crate::foundation::error::{BubbleError, BubbleResult};

/// A rendered frame as RGBA8 pixels.
///
/// Frames are premultiplied alpha; the flag makes that explicit at API boundaries.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameRGBA {
    pub width: u32,
    pub height: u32,
    /// RGBA8 bytes, tightly packed, row-major.
    pub data: Vec<u8>,
    pub premultiplied: bool,
}

impl FrameRGBA {
    /// Frame filled with one premultiplied color.
    pub fn solid(width: u32, height: u32, rgba: [u8; 4]) -> Self {
        let mut data = Vec::with_capacity(width as usize * height as usize * 4);
        for _ in 0..(width as usize * height as usize) {
            data.extend_from_slice(&rgba);
        }
        Self {
            width,
            height,
            data,
            premultiplied: true,
        }
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y as usize * self.width as usize + x as usize) * 4;
        Some([
            self.data[i],
            self.data[i + 1],
            self.data[i + 2],
            self.data[i + 3],
        ])
    }

    /// Straight-alpha RGBA8 image for file output.
    pub fn to_rgba_image(&self) -> BubbleResult<image::RgbaImage> {
        let mut data = self.data.clone();
        if self.premultiplied {
            unpremultiply_rgba8_in_place(&mut data);
        }
        image::RgbaImage::from_raw(self.width, self.height, data)
            .ok_or_else(|| BubbleError::render("frame byte length does not match its size"))
    }
}

fn unpremultiply_rgba8_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = u16::from(px[3]);
        if a == 0 || a == 255 {
            continue;
        }
        for c in &mut px[..3] {
            *c = ((u16::from(*c) * 255 + a / 2) / a).min(255) as u8;
        }
    }
}

/// Curve mapping linear HDR radiance into display range.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToneMapping {
    #[default]
    Aces,
    /// Clamp only.
    None,
}

/// Renderer knobs carried in scene JSON under `render`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RenderSettings {
    /// Worker threads for rasterization; `None` uses rayon's default.
    #[serde(default)]
    pub threads: Option<usize>,
    /// Rows per parallel raster band.
    #[serde(default = "default_band_rows")]
    pub band_rows: u32,
    #[serde(default)]
    pub tone_mapping: ToneMapping,
    #[serde(default = "default_exposure")]
    pub exposure: f32,
}

fn default_band_rows() -> u32 {
    16
}

fn default_exposure() -> f32 {
    1.0
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            threads: None,
            band_rows: default_band_rows(),
            tone_mapping: ToneMapping::default(),
            exposure: default_exposure(),
        }
    }
}

impl RenderSettings {
    pub fn validate(&self) -> BubbleResult<()> {
        if self.threads == Some(0) {
            return Err(BubbleError::validation("render threads must be >= 1 when set"));
        }
        if self.band_rows == 0 {
            return Err(BubbleError::validation("render band_rows must be >= 1"));
        }
        if !(self.exposure.is_finite() && self.exposure > 0.0) {
            return Err(BubbleError::validation("render exposure must be finite and > 0"));
        }
        Ok(())
    }
}
