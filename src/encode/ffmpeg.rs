use std::io::Write as _;
use std::path::PathBuf;
use std::process::{Child, ChildStdin, Command, Stdio};

use crate::encode::sink::{FrameSink, SinkConfig, ensure_parent_dir};
use crate::foundation::core::FrameIndex;
use crate::foundation::error::{BubbleError, BubbleResult};
use crate::render::backend::FrameRGBA;

/// x264 settings for [`FfmpegSink`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FfmpegSinkOpts {
    pub out_path: PathBuf,
    /// Constant rate factor; lower is better quality.
    pub crf: u8,
    /// x264 speed/size preset, e.g. `"medium"` or `"slow"`.
    pub preset: String,
}

impl FfmpegSinkOpts {
    pub fn new(out_path: impl Into<PathBuf>) -> Self {
        Self {
            out_path: out_path.into(),
            crf: 18,
            preset: "medium".to_owned(),
        }
    }
}

/// Pipes frames into `ffmpeg` as raw RGB and writes an H.264 MP4.
///
/// Rendered frames are opaque (the clear color fills every pixel), so alpha is dropped on the
/// way in. A translucent pixel would arrive as its premultiplied color over black.
pub struct FfmpegSink {
    opts: FfmpegSinkOpts,
    child: Option<Child>,
    stdin: Option<ChildStdin>,
    cfg: Option<SinkConfig>,
    rgb: Vec<u8>,
}

impl FfmpegSink {
    pub fn new(opts: FfmpegSinkOpts) -> Self {
        Self {
            opts,
            child: None,
            stdin: None,
            cfg: None,
            rgb: Vec::new(),
        }
    }

    fn command(&self, cfg: SinkConfig) -> Command {
        let mut cmd = Command::new("ffmpeg");
        cmd.args(["-y", "-loglevel", "error"])
            .args(["-f", "rawvideo", "-pix_fmt", "rgb24"])
            .arg("-s")
            .arg(format!("{}x{}", cfg.width, cfg.height))
            .arg("-r")
            .arg(format!("{}/{}", cfg.fps.num, cfg.fps.den))
            .args(["-i", "pipe:0", "-an", "-c:v", "libx264", "-preset"])
            .arg(&self.opts.preset)
            .arg("-crf")
            .arg(self.opts.crf.to_string())
            .args(["-pix_fmt", "yuv420p", "-movflags", "+faststart"])
            .arg(&self.opts.out_path)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped());
        cmd
    }
}

impl std::fmt::Debug for FfmpegSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FfmpegSink")
            .field("opts", &self.opts)
            .field("cfg", &self.cfg)
            .field("running", &self.child.is_some())
            .finish()
    }
}

impl FrameSink for FfmpegSink {
    fn begin(&mut self, cfg: SinkConfig) -> BubbleResult<()> {
        // yuv420p subsamples chroma in 2x2 blocks.
        if !cfg.width.is_multiple_of(2) || !cfg.height.is_multiple_of(2) {
            return Err(BubbleError::validation(format!(
                "mp4 output needs an even canvas size, got {}x{}",
                cfg.width, cfg.height
            )));
        }
        ensure_parent_dir(&self.opts.out_path)?;

        let mut child = self
            .command(cfg)
            .spawn()
            .map_err(|e| BubbleError::encode(format!("failed to start ffmpeg: {e}")))?;
        self.stdin = child.stdin.take();
        self.child = Some(child);
        self.rgb = Vec::with_capacity(cfg.width as usize * cfg.height as usize * 3);
        self.cfg = Some(cfg);

        tracing::debug!(
            out = %self.opts.out_path.display(),
            width = cfg.width,
            height = cfg.height,
            crf = self.opts.crf,
            "ffmpeg started"
        );
        Ok(())
    }

    fn push_frame(&mut self, _idx: FrameIndex, frame: &FrameRGBA) -> BubbleResult<()> {
        let (Some(cfg), Some(stdin)) = (self.cfg, self.stdin.as_mut()) else {
            return Err(BubbleError::encode("ffmpeg sink not started"));
        };
        if (frame.width, frame.height) != (cfg.width, cfg.height) {
            return Err(BubbleError::validation(format!(
                "frame is {}x{}, mp4 is {}x{}",
                frame.width, frame.height, cfg.width, cfg.height
            )));
        }

        self.rgb.clear();
        for px in frame.data.chunks_exact(4) {
            self.rgb.extend_from_slice(&px[..3]);
        }
        stdin
            .write_all(&self.rgb)
            .map_err(|e| BubbleError::encode(format!("failed to pipe frame to ffmpeg: {e}")))
    }

    fn end(&mut self) -> BubbleResult<()> {
        drop(self.stdin.take());
        self.cfg = None;
        let child = self
            .child
            .take()
            .ok_or_else(|| BubbleError::encode("ffmpeg sink not started"))?;

        let out = child
            .wait_with_output()
            .map_err(|e| BubbleError::encode(format!("failed to wait for ffmpeg: {e}")))?;
        if !out.status.success() {
            return Err(BubbleError::encode(format!(
                "ffmpeg exited with {}: {}",
                out.status,
                String::from_utf8_lossy(&out.stderr).trim()
            )));
        }
        tracing::info!(out = %self.opts.out_path.display(), "mp4 written");
        Ok(())
    }
}

/// Return `true` when `ffmpeg` can be invoked from `PATH`.
pub fn is_ffmpeg_on_path() -> bool {
    Command::new("ffmpeg")
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .is_ok_and(|s| s.success())
}
