use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use bubble::{
    FfmpegSink, FfmpegSinkOpts, Fps, FrameIndex, FrameRange, FrameSink, PngSequenceSink,
    RenderSession, RenderSessionOpts, SceneConfig, SceneRoot,
};

#[derive(Parser, Debug)]
#[command(name = "bubble", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render a single frame as a PNG.
    Frame(FrameArgs),
    /// Render an animation as MP4 (requires `ffmpeg` on PATH) or as a PNG sequence.
    Render(RenderArgs),
    /// Write the overlay markup as standalone HTML.
    Overlay(OverlayArgs),
}

#[derive(Parser, Debug)]
struct SceneArgs {
    /// Scene config JSON. Defaults apply when omitted.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Directory that font and environment paths are resolved against. Defaults to the config's
    /// directory, or the working directory without a config.
    #[arg(long)]
    assets: Option<PathBuf>,

    /// Override the canvas width in pixels.
    #[arg(long)]
    width: Option<u32>,

    /// Override the canvas height in pixels.
    #[arg(long)]
    height: Option<u32>,

    /// Skip compositing the overlay caption.
    #[arg(long, default_value_t = false)]
    no_overlay: bool,
}

impl SceneArgs {
    fn load(&self) -> anyhow::Result<SceneConfig> {
        let mut cfg = match &self.config {
            Some(path) => SceneConfig::from_path(path)
                .with_context(|| format!("load scene config '{}'", path.display()))?,
            None => SceneConfig::default(),
        };
        if let Some(w) = self.width {
            cfg.width = w;
        }
        if let Some(h) = self.height {
            cfg.height = h;
        }
        if self.no_overlay {
            cfg.overlay.enabled = false;
        }
        cfg.validate().context("invalid scene config")?;
        Ok(cfg)
    }

    fn assets_root(&self) -> PathBuf {
        if let Some(dir) = &self.assets {
            return dir.clone();
        }
        self.config
            .as_deref()
            .and_then(Path::parent)
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."))
            .to_path_buf()
    }
}

#[derive(Parser, Debug)]
struct FrameArgs {
    #[command(flatten)]
    scene: SceneArgs,

    /// Seconds of animation to run before capturing.
    #[arg(long, default_value_t = 0.0)]
    time: f64,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Parser, Debug)]
struct RenderArgs {
    #[command(flatten)]
    scene: SceneArgs,

    /// Number of frames to render.
    #[arg(long, default_value_t = 120)]
    frames: u64,

    /// Frames per second.
    #[arg(long, default_value_t = 60)]
    fps: u32,

    /// Write a PNG sequence into this directory instead of encoding MP4.
    #[arg(long)]
    png_dir: Option<PathBuf>,

    /// Output MP4 path (ignored with `--png-dir`).
    #[arg(long, required_unless_present = "png_dir")]
    out: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct OverlayArgs {
    /// Scene config JSON. Defaults apply when omitted.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Output HTML path.
    #[arg(long)]
    out: PathBuf,
}

fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();
    match cli.cmd {
        Command::Frame(args) => cmd_frame(args),
        Command::Render(args) => cmd_render(args),
        Command::Overlay(args) => cmd_overlay(args),
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("BUBBLE_LOG")
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn open_session(scene: &SceneArgs) -> anyhow::Result<RenderSession> {
    let cfg = scene.load()?;
    let assets_root = scene.assets_root();
    let mut sess = RenderSession::new(&cfg, &assets_root, RenderSessionOpts::default())?;
    sess.wait_for_assets()
        .with_context(|| format!("load assets from '{}'", assets_root.display()))?;
    Ok(sess)
}

fn cmd_frame(args: FrameArgs) -> anyhow::Result<()> {
    let mut sess = open_session(&args.scene)?;
    sess.advance_to(args.time).context("advance animation")?;
    let frame = sess.render_frame()?;

    bubble::ensure_parent_dir(&args.out)?;
    frame
        .to_rgba_image()?
        .save(&args.out)
        .with_context(|| format!("write png '{}'", args.out.display()))?;

    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    if args.png_dir.is_none() && !bubble::is_ffmpeg_on_path() {
        anyhow::bail!("ffmpeg is required for MP4 output but was not found on PATH; try --png-dir");
    }
    let mut sess = open_session(&args.scene)?;
    let fps = Fps::new(args.fps, 1)?;
    let range = FrameRange::new(FrameIndex(0), FrameIndex(args.frames))?;

    let (mut sink, dest): (Box<dyn FrameSink>, PathBuf) = match (&args.png_dir, &args.out) {
        (Some(dir), _) => (Box::new(PngSequenceSink::new(dir)), dir.clone()),
        (None, Some(out)) => (
            Box::new(FfmpegSink::new(FfmpegSinkOpts::new(out))),
            out.clone(),
        ),
        (None, None) => anyhow::bail!("either --out or --png-dir is required"),
    };
    let stats = sess.render_range(range, fps, sink.as_mut())?;

    eprintln!("wrote {} frames to {}", stats.frames_rendered, dest.display());
    Ok(())
}

fn cmd_overlay(args: OverlayArgs) -> anyhow::Result<()> {
    let cfg = match &args.config {
        Some(path) => SceneConfig::from_path(path)
            .with_context(|| format!("load scene config '{}'", path.display()))?,
        None => SceneConfig::default(),
    };
    let root = SceneRoot::new(&cfg)?;
    bubble::ensure_parent_dir(&args.out)?;
    std::fs::write(&args.out, root.overlay().to_html())
        .with_context(|| format!("write overlay '{}'", args.out.display()))?;

    eprintln!("wrote {}", args.out.display());
    Ok(())
}
