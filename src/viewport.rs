//! World-space viewport derived from the canvas size and the active camera.
//!
//! Components never read window size directly. They hold a [`ViewportSubscription`] obtained
//! from the [`ViewportProvider`] and recompute their geometry when it reports a change.

use std::sync::mpsc;

use crate::camera::PerspectiveCamera;
use crate::foundation::core::Canvas;
use crate::foundation::error::BubbleResult;

/// Size of the visible frustum slice through the camera target, in world units.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    /// Visible width in world units.
    pub width: f32,
    /// Visible height in world units.
    pub height: f32,
    /// Pixels per world unit.
    pub factor: f32,
    /// Camera-to-target distance the slice was taken at.
    pub distance: f32,
    /// Pixel size the viewport was derived from.
    pub canvas: Canvas,
}

impl Viewport {
    pub fn from_camera(camera: &PerspectiveCamera, canvas: Canvas) -> Self {
        let camera = camera.with_aspect(canvas);
        let distance = camera.position.distance(camera.target);
        let height = camera.visible_height_at(distance);
        let width = height * camera.aspect;
        Self {
            width,
            height,
            factor: canvas.width as f32 / width,
            distance,
            canvas,
        }
    }

    /// `pct` percent of the viewport width, in world units.
    pub fn vw(&self, pct: f32) -> f32 {
        self.width * pct / 100.0
    }

    /// `pct` percent of the viewport height, in world units.
    pub fn vh(&self, pct: f32) -> f32 {
        self.height * pct / 100.0
    }
}

/// Receiving end of a viewport subscription.
#[derive(Debug)]
pub struct ViewportSubscription {
    rx: mpsc::Receiver<Viewport>,
    latest: Viewport,
}

impl ViewportSubscription {
    /// Most recent viewport seen by [`ViewportSubscription::poll`] (or the one at subscribe time).
    pub fn latest(&self) -> Viewport {
        self.latest
    }

    /// Drain pending notifications; returns the newest viewport if anything changed.
    pub fn poll(&mut self) -> Option<Viewport> {
        let mut changed = None;
        while let Ok(vp) = self.rx.try_recv() {
            changed = Some(vp);
        }
        if let Some(vp) = changed {
            self.latest = vp;
        }
        changed
    }
}

/// Owner of the canvas size; publishes the derived [`Viewport`] to subscribers on resize.
#[derive(Debug)]
pub struct ViewportProvider {
    camera: PerspectiveCamera,
    current: Viewport,
    subscribers: Vec<mpsc::Sender<Viewport>>,
}

impl ViewportProvider {
    pub fn new(camera: PerspectiveCamera, canvas: Canvas) -> Self {
        let current = Viewport::from_camera(&camera, canvas);
        Self {
            camera: camera.with_aspect(canvas),
            current,
            subscribers: Vec::new(),
        }
    }

    pub fn current(&self) -> Viewport {
        self.current
    }

    pub fn camera(&self) -> PerspectiveCamera {
        self.camera
    }

    pub fn subscribe(&mut self) -> ViewportSubscription {
        let (tx, rx) = mpsc::channel();
        self.subscribers.push(tx);
        ViewportSubscription {
            rx,
            latest: self.current,
        }
    }

    /// Live subscriptions (dropped receivers are pruned on the next publish).
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    /// Apply a new canvas size. Subscribers are notified only when the viewport changes.
    pub fn resize(&mut self, width: u32, height: u32) -> BubbleResult<bool> {
        let canvas = Canvas::new(width, height)?;
        if canvas == self.current.canvas {
            return Ok(false);
        }
        self.camera = self.camera.with_aspect(canvas);
        self.current = Viewport::from_camera(&self.camera, canvas);
        tracing::debug!(
            width = self.current.width,
            height = self.current.height,
            px_w = canvas.width,
            px_h = canvas.height,
            "viewport changed"
        );

        let vp = self.current;
        self.subscribers.retain(|tx| tx.send(vp).is_ok());
        Ok(true)
    }
}

#[cfg(test)]
#[path = "../tests/unit/viewport.rs"]
mod tests;
