//! Frame sinks.
//!
//! Sinks consume rendered frames in timeline order and are driven by `RenderSession::render_range`.

/// H.264 MP4 output through the system `ffmpeg`.
pub mod ffmpeg;
/// Frame sink trait plus in-memory and PNG-sequence sinks.
pub mod sink;

pub use ffmpeg::{FfmpegSink, FfmpegSinkOpts, is_ffmpeg_on_path};
pub use sink::{FrameSink, InMemorySink, PngSequenceSink, SinkConfig, ensure_parent_dir};
