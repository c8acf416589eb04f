//! A displaced glass bubble floating over typography, rendered on the CPU.
//!
//! The scene has one camera, a sphere whose vertices are pushed along their normals by drifting
//! Perlin noise, and a viewport-filling plane textured with two lines of text rendered off-screen.
//! The sphere refracts that plane. A static caption with attribution links sits on top.
//!
//! - Describe the scene with a [`SceneConfig`] (every field has a default)
//! - Create a [`RenderSession`]; it mounts a [`SceneRoot`] and loads fonts asynchronously
//! - Advance with [`RenderSession::tick`], render single frames, or stream a range into a
//!   [`FrameSink`]
#![forbid(unsafe_code)]

mod foundation;

pub mod anim;
pub mod assets;
pub mod camera;
pub mod encode;
pub mod environment;
pub mod material;
pub mod mesh;
pub mod noise;
pub mod render;
pub mod scene;
pub mod session;
pub mod viewport;

pub use crate::foundation::color::Color;
pub use crate::foundation::core::{
    Affine, Canvas, DVec3, Fps, FrameIndex, FrameRange, Mat4, Vec2, Vec3, Vec4,
};
pub use crate::foundation::error::{BubbleError, BubbleResult};

pub use crate::assets::{AssetLoader, AssetRequests, FontAsset, Resource, SceneAssets};
pub use crate::camera::{CameraConfig, PerspectiveCamera};
pub use crate::encode::{
    FfmpegSink, FfmpegSinkOpts, FrameSink, InMemorySink, PngSequenceSink, SinkConfig,
    ensure_parent_dir, is_ffmpeg_on_path,
};
pub use crate::environment::{Environment, EnvironmentPreset, EnvironmentSource};
pub use crate::render::{CpuRenderer, FrameRGBA, FrameRequest, RenderSettings, ToneMapping};
pub use crate::scene::{Composed, Overlay, SceneConfig, SceneGraph, SceneRoot};
pub use crate::session::{RenderSession, RenderSessionOpts, RenderStats};
pub use crate::viewport::{Viewport, ViewportProvider, ViewportSubscription};
