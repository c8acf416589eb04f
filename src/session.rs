use std::path::{Path, PathBuf};
use std::sync::mpsc;

use crate::assets::{AssetLoader, SceneAssets};
use crate::encode::sink::{FrameSink, SinkConfig};
use crate::foundation::core::{Fps, FrameIndex, FrameRange};
use crate::foundation::error::{BubbleError, BubbleResult};
use crate::render::backend::FrameRGBA;
use crate::render::cpu::{CpuRenderer, FrameRequest};
use crate::scene::{SceneConfig, SceneRoot};

/// Options controlling `RenderSession` range rendering.
#[derive(Clone, Debug)]
pub struct RenderSessionOpts {
    /// Bounded channel capacity between the render loop and the encoder thread.
    pub channel_capacity: usize,
}

impl Default for RenderSessionOpts {
    fn default() -> Self {
        Self {
            channel_capacity: 4,
        }
    }
}

/// Range render statistics.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RenderStats {
    /// Frames pushed to the sink.
    pub frames_rendered: u64,
    /// Frames rendered while the scene was still suspended on assets.
    pub frames_suspended: u64,
}

/// Owns a mounted scene, its asset loader and a renderer, and runs the per-frame loop:
/// advance the animation, compose, render.
pub struct RenderSession {
    root: SceneRoot,
    loader: AssetLoader,
    renderer: CpuRenderer,
    pool: Option<rayon::ThreadPool>,
    overlay: bool,
    opts: RenderSessionOpts,
    clock: f64,
}

impl std::fmt::Debug for RenderSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderSession")
            .field("root", &self.root)
            .field("assets_root", &self.loader.root())
            .field("overlay", &self.overlay)
            .field("clock", &self.clock)
            .finish_non_exhaustive()
    }
}

impl RenderSession {
    /// Mount the scene and start loading its assets from `assets_root`.
    #[tracing::instrument(skip(config, opts), fields(width = config.width, height = config.height))]
    pub fn new(
        config: &SceneConfig,
        assets_root: &Path,
        opts: RenderSessionOpts,
    ) -> BubbleResult<Self> {
        let root = SceneRoot::new(config)?;
        let loader = AssetLoader::spawn(PathBuf::from(assets_root), &config.asset_requests());
        let renderer = CpuRenderer::new(config.render, assets_root)?;
        let pool = match config.render.threads {
            Some(n) => Some(build_thread_pool(Some(n))?),
            None => None,
        };
        Ok(Self {
            root,
            loader,
            renderer,
            pool,
            overlay: config.overlay.enabled,
            opts,
            clock: 0.0,
        })
    }

    pub fn root(&self) -> &SceneRoot {
        &self.root
    }

    pub fn assets(&self) -> &SceneAssets {
        self.loader.assets()
    }

    /// Apply finished loads without blocking. Returns `true` once nothing is pending.
    pub fn poll_assets(&mut self) -> bool {
        self.loader.poll();
        self.loader.is_settled()
    }

    /// Block until every asset has settled, then fail if any of them failed.
    pub fn wait_for_assets(&mut self) -> BubbleResult<()> {
        let assets = self.loader.wait();
        if let Some((name, err)) = assets.first_failure() {
            return Err(BubbleError::asset(format!("{name}: {err}")));
        }
        Ok(())
    }

    pub fn resize(&mut self, width: u32, height: u32) -> BubbleResult<bool> {
        self.root.resize(width, height)
    }

    /// Seconds of animation applied since the scene was mounted.
    pub fn clock(&self) -> f64 {
        self.clock
    }

    /// Advance the animation by `dt` seconds.
    pub fn tick(&mut self, dt: f64) -> BubbleResult<()> {
        self.root.tick(dt)?;
        self.clock += dt;
        Ok(())
    }

    /// Place the animation at `secs` seconds after mount, earlier or later than the current
    /// clock.
    ///
    /// The state is rebuilt from the mount state with a single step, so a given time always
    /// yields the same offset no matter which frames were rendered before it.
    pub fn advance_to(&mut self, secs: f64) -> BubbleResult<()> {
        if !secs.is_finite() || secs < 0.0 {
            return Err(BubbleError::validation(format!(
                "animation time must be finite and >= 0, got {secs}"
            )));
        }
        self.root.rewind();
        self.root.tick(secs)?;
        self.clock = secs;
        Ok(())
    }

    /// Compose and render the current state without advancing the animation.
    pub fn render_frame(&mut self) -> BubbleResult<FrameRGBA> {
        let (frame, _) = self.render_current()?;
        Ok(frame)
    }

    fn render_current(&mut self) -> BubbleResult<(FrameRGBA, bool)> {
        self.loader.poll();
        let composed = self.root.compose(self.loader.assets())?;
        let suspended = matches!(composed, crate::scene::Composed::Suspended);
        let req = FrameRequest {
            composed: &composed,
            canvas: self.root.viewport().canvas,
            background: self.root.config().background,
            overlay: self.overlay.then(|| self.root.overlay()),
        };
        let renderer = &mut self.renderer;
        let frame = match self.pool.as_ref() {
            Some(pool) => pool.install(|| renderer.render(&req))?,
            None => renderer.render(&req)?,
        };
        Ok((frame, suspended))
    }

    /// Render `range` at `fps`, placing the clock at each frame's time before rendering it, and
    /// stream the frames into `sink` from a dedicated encoder thread.
    ///
    /// Frame `f` always shows the animation at `f / fps` seconds, wherever the range starts and
    /// whatever was rendered before. The sink receives frames in strictly increasing index
    /// order.
    #[tracing::instrument(skip(self, sink), fields(start = range.start.0, end = range.end.0))]
    pub fn render_range(
        &mut self,
        range: FrameRange,
        fps: Fps,
        sink: &mut dyn FrameSink,
    ) -> BubbleResult<RenderStats> {
        if range.is_empty() {
            return Err(BubbleError::validation(
                "render_range range must be non-empty",
            ));
        }

        let canvas = self.root.viewport().canvas;
        let cfg = SinkConfig {
            width: canvas.width,
            height: canvas.height,
            fps,
        };
        let cap = self.opts.channel_capacity.max(1);

        std::thread::scope(|scope| -> BubbleResult<RenderStats> {
            let (tx, rx) = mpsc::sync_channel::<FrameMsg>(cap);
            let sink_ref: &mut dyn FrameSink = sink;

            let enc = scope.spawn(move || -> BubbleResult<()> {
                sink_ref.begin(cfg)?;
                for msg in rx {
                    sink_ref.push_frame(msg.idx, &msg.frame)?;
                }
                sink_ref.end()
            });

            let mut stats = RenderStats::default();
            let mut produce = || -> BubbleResult<()> {
                for f in range.start.0..range.end.0 {
                    self.advance_to(fps.frames_to_secs(f))?;
                    let (frame, suspended) = self.render_current()?;
                    stats.frames_rendered += 1;
                    if suspended {
                        stats.frames_suspended += 1;
                    }
                    tx.send(FrameMsg {
                        idx: FrameIndex(f),
                        frame,
                    })
                    .map_err(|_| BubbleError::encode("encoder thread is not accepting frames"))?;
                }
                Ok(())
            };
            let produce_res = produce();

            drop(tx);
            let enc_res = enc
                .join()
                .map_err(|_| BubbleError::encode("encoder thread panicked"))?;

            // A failing sink drops the receiver, which surfaces in the producer as a send error.
            enc_res?;
            produce_res?;
            tracing::info!(
                frames = stats.frames_rendered,
                suspended = stats.frames_suspended,
                "range rendered"
            );
            Ok(stats)
        })
    }
}

#[derive(Debug)]
struct FrameMsg {
    idx: FrameIndex,
    frame: FrameRGBA,
}

fn build_thread_pool(threads: Option<usize>) -> BubbleResult<rayon::ThreadPool> {
    if let Some(n) = threads
        && n == 0
    {
        return Err(BubbleError::validation(
            "render 'threads' must be >= 1 when set",
        ));
    }
    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(n) = threads {
        builder = builder.num_threads(n);
    }
    builder
        .build()
        .map_err(|e| BubbleError::render(format!("failed to build rayon thread pool: {e}")))
}

#[cfg(test)]
#[path = "../tests/unit/session.rs"]
mod tests;
