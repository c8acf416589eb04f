//! CPU rendering: text texture, z-buffered rasterization, shading, tone mapping, overlay.

pub mod backend;
pub mod cpu;
pub mod overlay;
pub mod raster;
pub mod text;

pub use backend::{FrameRGBA, RenderSettings, ToneMapping};
pub use cpu::{CpuRenderer, FrameRequest};
pub use overlay::{OverlayRaster, composite_over_premul};
pub use text::{TextPass, TextTexture};
