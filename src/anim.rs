use serde::{Deserialize, Serialize};

use crate::foundation::core::DVec3;
use crate::foundation::error::{BubbleError, BubbleResult};

/// Constant-velocity drift of a layer offset, in units per second.
///
/// The update only consumes elapsed time, so applying it with `dt1` then `dt2` equals applying
/// it once with `dt1 + dt2`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OffsetDrift {
    #[serde(default = "default_rate")]
    pub rate: f64,
    #[serde(default = "default_axis")]
    pub axis: [f64; 3],
}

fn default_rate() -> f64 {
    4.0
}

fn default_axis() -> [f64; 3] {
    [1.0, 0.0, 0.0]
}

impl Default for OffsetDrift {
    fn default() -> Self {
        Self {
            rate: default_rate(),
            axis: default_axis(),
        }
    }
}

impl OffsetDrift {
    pub fn validate(&self) -> BubbleResult<()> {
        if !self.rate.is_finite() || self.rate < 0.0 {
            return Err(BubbleError::validation("drift rate must be finite and >= 0"));
        }
        if !DVec3::from_array(self.axis).is_finite() {
            return Err(BubbleError::validation("drift axis must be finite"));
        }
        Ok(())
    }

    pub fn velocity(&self) -> DVec3 {
        DVec3::from_array(self.axis) * self.rate
    }

    /// Offset after `dt` seconds.
    pub fn advance(&self, offset: DVec3, dt: f64) -> DVec3 {
        offset + self.velocity() * dt
    }
}

/// Reject frame deltas that would move the animation backwards or poison it with NaN.
pub fn checked_delta(dt: f64) -> BubbleResult<f64> {
    if !dt.is_finite() || dt < 0.0 {
        return Err(BubbleError::validation(format!(
            "frame delta must be finite and >= 0, got {dt}"
        )));
    }
    Ok(dt)
}
