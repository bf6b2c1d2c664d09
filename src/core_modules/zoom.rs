// THEORY:
// The `zoom` module emulates an optical zoom without touching the lens. A window
// `1/zoom_factor` the size of the frame is cut out of the frame centre and then
// stretched back to the canonical processing size. We give up field of view and get
// more pixels on the marker region in exchange.
//
// Key principles:
// 1.  **Integer crop bounds**: Both window edges are computed from the floating
//     point half-widths and truncated independently, so `(W - W/z)/2` and
//     `(W + W/z)/2` decide the window, not `x1 + W/z`.
// 2.  **Canonical output**: Whatever the source resolution or aspect ratio, every
//     downstream stage sees exactly `output_width x output_height` pixels. Marker
//     area thresholds and the angle calibration depend on it.
// 3.  **No silent garbage**: A window that would be empty or larger than the frame
//     is reported as `InvalidFrameSize` instead of being clipped.

use crate::error::VisionError;
use image::imageops::{self, FilterType};
use image::RgbImage;

/// Pixel bounds of a crop window, `x1..x2` by `y1..y2`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropWindow {
    pub x1: u32,
    pub y1: u32,
    pub x2: u32,
    pub y2: u32,
}

impl CropWindow {
    pub fn width(&self) -> u32 {
        self.x2 - self.x1
    }

    pub fn height(&self) -> u32 {
        self.y2 - self.y1
    }

    /// Computes the centred window for a `width x height` frame.
    pub fn centered(width: u32, height: u32, zoom_factor: f64) -> Result<Self, VisionError> {
        let invalid = |reason: String| VisionError::InvalidFrameSize {
            width,
            height,
            reason,
        };

        if !zoom_factor.is_finite() || zoom_factor < 1.0 {
            return Err(invalid(format!(
                "zoom factor {zoom_factor} would need a crop window larger than the frame"
            )));
        }

        let (x1, x2) = centered_span(width, zoom_factor);
        let (y1, y2) = centered_span(height, zoom_factor);

        if x2 <= x1 || y2 <= y1 {
            return Err(invalid(format!("crop window at zoom {zoom_factor} is empty")));
        }
        if x2 > width || y2 > height {
            return Err(invalid("crop window exceeds the frame".to_string()));
        }

        Ok(Self { x1, y1, x2, y2 })
    }
}

fn centered_span(extent: u32, zoom_factor: f64) -> (u32, u32) {
    let full = extent as f64;
    let scaled = full / zoom_factor;
    let start = ((full - scaled) / 2.0) as u32;
    let end = ((full + scaled) / 2.0) as u32;
    (start, end)
}

/// Cuts the centred `1/zoom_factor` window out of `frame`.
pub fn crop_center(frame: &RgbImage, zoom_factor: f64) -> Result<RgbImage, VisionError> {
    let window = CropWindow::centered(frame.width(), frame.height(), zoom_factor)?;
    Ok(imageops::crop_imm(frame, window.x1, window.y1, window.width(), window.height()).to_image())
}

/// Crops and resizes `frame` to `output_width x output_height`.
///
/// A crop that already has the output size is passed through untouched, so a
/// canonical frame at zoom 1.0 comes back pixel for pixel.
pub fn zoom_and_resize(
    frame: &RgbImage,
    zoom_factor: f64,
    output_width: u32,
    output_height: u32,
) -> Result<RgbImage, VisionError> {
    let cropped = crop_center(frame, zoom_factor)?;
    if cropped.dimensions() == (output_width, output_height) {
        return Ok(cropped);
    }
    Ok(imageops::resize(&cropped, output_width, output_height, FilterType::Triangle))
}
