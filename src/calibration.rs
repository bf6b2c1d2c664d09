// THEORY:
// The `calibration` module maps a pixel of the canonical frame onto the pair of
// servo angles that would point the mechanism at it. Four angle pairs were measured
// by hand with the pointer aimed at the four frame corners; everything in between
// is a bilinear blend of those corners.
//
// 1.  Interpolate along the top edge and along the bottom edge using the x ratio.
// 2.  Blend the two edge values using the y ratio. Image rows grow downwards, so
//     row 0 lies on the top edge and pixel (0, 0) receives the `left_top` angles.
// 3.  Round to whole degrees, ties to even, since the servo controller only accepts
//     integers.
//
// This is open-loop bookkeeping only. Nothing here talks to the actuator.

use crate::config::CalibrationConfig;
use serde::{Deserialize, Serialize};

/// A command for the two-axis mechanism, in integer degrees.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ServoAngles {
    pub base: i32,
    pub joint: i32,
}

impl ServoAngles {
    pub const fn new(base: i32, joint: i32) -> Self {
        Self { base, joint }
    }
}

/// Bilinear pixel-to-angle mapping over four measured corners.
#[derive(Debug, Clone)]
pub struct AngleCalibration {
    config: CalibrationConfig,
}

impl AngleCalibration {
    pub fn new(config: CalibrationConfig) -> Self {
        Self { config }
    }

    /// Returns the servo angles for pixel `(x, y)`. Points outside the frame are
    /// clamped onto it first.
    pub fn pixel_to_angles(&self, x: f64, y: f64) -> ServoAngles {
        let width = self.config.frame_width as f64;
        let height = self.config.frame_height as f64;
        let x_ratio = x.clamp(0.0, width) / width;
        let y_ratio = y.clamp(0.0, height) / height;

        let c = &self.config;
        let base = blend(
            c.left_top.base,
            c.right_top.base,
            c.left_bottom.base,
            c.right_bottom.base,
            x_ratio,
            y_ratio,
        );
        let joint = blend(
            c.left_top.joint,
            c.right_top.joint,
            c.left_bottom.joint,
            c.right_bottom.joint,
            x_ratio,
            y_ratio,
        );

        ServoAngles::new(base, joint)
    }
}

fn blend(
    left_top: i32,
    right_top: i32,
    left_bottom: i32,
    right_bottom: i32,
    x_ratio: f64,
    y_ratio: f64,
) -> i32 {
    let top = left_top as f64 + x_ratio * (right_top - left_top) as f64;
    let bottom = left_bottom as f64 + x_ratio * (right_bottom - left_bottom) as f64;
    let angle = top + y_ratio * (bottom - top);
    angle.round_ties_even() as i32
}
