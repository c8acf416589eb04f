use serde::{Deserialize, Serialize};

use crate::foundation::core::{Canvas, Mat4, Vec3, Vec4};
use crate::foundation::error::{BubbleError, BubbleResult};

/// JSON-facing camera settings.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CameraConfig {
    #[serde(default = "default_position")]
    pub position: [f32; 3],
    #[serde(default)]
    pub target: [f32; 3],
    /// Vertical field of view in degrees.
    #[serde(default = "default_fov_deg")]
    pub fov_deg: f32,
    #[serde(default = "default_near")]
    pub near: f32,
    #[serde(default = "default_far")]
    pub far: f32,
}

fn default_position() -> [f32; 3] {
    [0.0, 0.0, 50.0]
}

fn default_fov_deg() -> f32 {
    50.0
}

fn default_near() -> f32 {
    0.1
}

fn default_far() -> f32 {
    2000.0
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            position: default_position(),
            target: [0.0; 3],
            fov_deg: default_fov_deg(),
            near: default_near(),
            far: default_far(),
        }
    }
}

impl CameraConfig {
    pub fn validate(&self) -> BubbleResult<()> {
        if !(self.fov_deg > 0.0 && self.fov_deg < 180.0) {
            return Err(BubbleError::validation("camera fov_deg must be in (0, 180)"));
        }
        if !(self.near > 0.0 && self.far > self.near) {
            return Err(BubbleError::validation(
                "camera near must be > 0 and far must be > near",
            ));
        }
        let pos = Vec3::from_array(self.position);
        let target = Vec3::from_array(self.target);
        if !pos.is_finite() || !target.is_finite() {
            return Err(BubbleError::validation("camera position/target must be finite"));
        }
        if pos.distance(target) <= f32::EPSILON {
            return Err(BubbleError::validation(
                "camera position must differ from its target",
            ));
        }
        Ok(())
    }
}

/// A point projected to pixel space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScreenPoint {
    /// Pixel x (0 at the left edge).
    pub x: f32,
    /// Pixel y (0 at the top edge).
    pub y: f32,
    /// Clip-space `w`, i.e. the distance along the view axis.
    pub w: f32,
}

/// Perspective camera looking from `position` at `target` with +Y up.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PerspectiveCamera {
    pub position: Vec3,
    pub target: Vec3,
    pub fov_deg: f32,
    pub near: f32,
    pub far: f32,
    pub aspect: f32,
}

impl PerspectiveCamera {
    pub fn new(cfg: &CameraConfig, canvas: Canvas) -> BubbleResult<Self> {
        cfg.validate()?;
        Ok(Self {
            position: Vec3::from_array(cfg.position),
            target: Vec3::from_array(cfg.target),
            fov_deg: cfg.fov_deg,
            near: cfg.near,
            far: cfg.far,
            aspect: canvas.aspect(),
        })
    }

    pub fn with_aspect(mut self, canvas: Canvas) -> Self {
        self.aspect = canvas.aspect();
        self
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.target, Vec3::Y)
    }

    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh_gl(self.fov_deg.to_radians(), self.aspect, self.near, self.far)
    }

    pub fn view_projection_matrix(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    /// Height in world units of the frustum slice at `distance` from the camera.
    pub fn visible_height_at(&self, distance: f32) -> f32 {
        2.0 * (self.fov_deg.to_radians() * 0.5).tan() * distance
    }

    /// Project a world-space point to pixel coordinates of `canvas`.
    ///
    /// Returns `None` for points behind the near plane.
    pub fn project(&self, view_proj: &Mat4, p: Vec3, canvas: Canvas) -> Option<ScreenPoint> {
        let clip = *view_proj * Vec4::new(p.x, p.y, p.z, 1.0);
        if clip.w < self.near {
            return None;
        }
        let ndc_x = clip.x / clip.w;
        let ndc_y = clip.y / clip.w;
        Some(ScreenPoint {
            x: (ndc_x + 1.0) * 0.5 * canvas.width as f32,
            y: (1.0 - ndc_y) * 0.5 * canvas.height as f32,
            w: clip.w,
        })
    }
}

#[cfg(test)]
#[path = "../tests/unit/camera.rs"]
mod tests;
