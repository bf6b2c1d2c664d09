//! Configuration for dot_vision
//!
//! Every constant the detector, the calibration and the actuator sequence rely on
//! lives here with its field-tested default. None of them are universal: the
//! marker area interval and the zoom factor were tuned for one camera at one
//! distance and must be re-measured for any other setup.

use crate::calibration::ServoAngles;
use crate::error::VisionError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Where the live frames come from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamConfig {
    /// Network video stream URL (an MJPEG phone camera by default).
    pub url: String,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            url: "http://192.168.10.3:4747/video".to_string(),
        }
    }
}

/// Tunables of the marker detection pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorConfig {
    /// Digital zoom applied by cropping the frame centre. 1.0 keeps the full frame.
    pub zoom_factor: f64,
    /// Width every frame is resized to after the crop.
    pub output_width: u32,
    /// Height every frame is resized to after the crop.
    pub output_height: u32,
    /// Side of the square smoothing kernel. Must be odd.
    pub blur_kernel_size: u32,
    /// Side of the neighbourhood the adaptive threshold averages over. Must be odd and > 1.
    pub threshold_block_size: u32,
    /// How much darker than its local mean a pixel must be to count as foreground.
    pub threshold_offset: i32,
    /// Erode/dilate repetitions of the 3x3 elliptical opening.
    pub opening_iterations: u8,
    /// Contours with an area at or below this are noise.
    pub min_marker_area: f64,
    /// Contours with an area at or above this are not markers.
    pub max_marker_area: f64,
    /// TrueType/OpenType font used for the centroid labels. Without one the
    /// bundled DejaVu Sans Mono is used.
    pub label_font: Option<PathBuf>,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            zoom_factor: 3.2,
            output_width: 640,
            output_height: 480,
            blur_kernel_size: 5,
            threshold_block_size: 11,
            threshold_offset: 2,
            opening_iterations: 2,
            min_marker_area: 100.0,
            max_marker_area: 500.0,
            label_font: None,
        }
    }
}

/// Servo angles measured by hand with the marker placed at each frame corner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalibrationConfig {
    pub left_top: ServoAngles,
    pub right_top: ServoAngles,
    pub left_bottom: ServoAngles,
    pub right_bottom: ServoAngles,
    /// Pixel width the corners were measured against.
    pub frame_width: u32,
    /// Pixel height the corners were measured against.
    pub frame_height: u32,
}

impl Default for CalibrationConfig {
    fn default() -> Self {
        Self {
            left_top: ServoAngles::new(110, 71),
            right_top: ServoAngles::new(68, 69),
            left_bottom: ServoAngles::new(107, 105),
            right_bottom: ServoAngles::new(68, 105),
            frame_width: 640,
            frame_height: 480,
        }
    }
}

/// The servo controller and the fixed movement list it is walked through.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ActuatorConfig {
    /// Base address of the servo controller; commands go to `{base_url}/set`.
    pub base_url: String,
    /// Angle pairs sent in order, once each.
    pub movements: Vec<ServoAngles>,
    /// Pause after every command, in milliseconds.
    pub step_delay_ms: u64,
    /// Per-request timeout, in milliseconds.
    pub request_timeout_ms: u64,
}

impl Default for ActuatorConfig {
    fn default() -> Self {
        Self {
            base_url: "http://192.168.10.5".to_string(),
            movements: vec![
                ServoAngles::new(90, 90),
                ServoAngles::new(84, 81),
                ServoAngles::new(93, 77),
            ],
            step_delay_ms: 10_000,
            request_timeout_ms: 5_000,
        }
    }
}

impl ActuatorConfig {
    pub fn step_delay(&self) -> Duration {
        Duration::from_millis(self.step_delay_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

/// Top-level configuration, loadable from a (possibly partial) JSON file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    pub stream: StreamConfig,
    pub detector: DetectorConfig,
    pub calibration: CalibrationConfig,
    pub actuator: ActuatorConfig,
}

impl TrackerConfig {
    /// Reads a JSON config file. Omitted fields keep their defaults.
    pub fn from_file(path: &Path) -> Result<Self, VisionError> {
        let text = std::fs::read_to_string(path)?;
        let config: TrackerConfig = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), VisionError> {
        self.detector.validate()?;

        let cal = &self.calibration;
        if cal.frame_width == 0 || cal.frame_height == 0 {
            return Err(VisionError::Config(
                "Calibration frame size must be non-zero".to_string(),
            ));
        }

        if self.actuator.request_timeout_ms == 0 {
            return Err(VisionError::Config(
                "Actuator request timeout must be non-zero".to_string(),
            ));
        }

        Ok(())
    }
}

impl DetectorConfig {
    pub fn validate(&self) -> Result<(), VisionError> {
        if !self.zoom_factor.is_finite() || self.zoom_factor < 1.0 {
            return Err(VisionError::Config(format!(
                "Zoom factor must be at least 1.0, got {}",
                self.zoom_factor
            )));
        }

        if self.output_width == 0 || self.output_height == 0 {
            return Err(VisionError::Config("Output size must be non-zero".to_string()));
        }

        if self.blur_kernel_size % 2 == 0 {
            return Err(VisionError::Config(format!(
                "Blur kernel size must be odd, got {}",
                self.blur_kernel_size
            )));
        }

        if self.threshold_block_size % 2 == 0 || self.threshold_block_size < 3 {
            return Err(VisionError::Config(format!(
                "Threshold block size must be odd and at least 3, got {}",
                self.threshold_block_size
            )));
        }

        if !(self.min_marker_area >= 0.0 && self.min_marker_area < self.max_marker_area) {
            return Err(VisionError::Config(format!(
                "Marker area interval ({}, {}) is empty",
                self.min_marker_area, self.max_marker_area
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = TrackerConfig::default();
        assert_eq!(config.stream.url, "http://192.168.10.3:4747/video");
        assert_eq!(config.detector.zoom_factor, 3.2);
        assert_eq!((config.detector.output_width, config.detector.output_height), (640, 480));
        assert_eq!(config.detector.min_marker_area, 100.0);
        assert_eq!(config.detector.max_marker_area, 500.0);
        assert_eq!(config.calibration.left_bottom, ServoAngles::new(107, 105));
        assert_eq!(config.actuator.movements.len(), 3);
        assert_eq!(config.actuator.step_delay(), Duration::from_secs(10));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let json = r#"{ "detector": { "zoom_factor": 2.0 }, "actuator": { "step_delay_ms": 5 } }"#;
        let config: TrackerConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.detector.zoom_factor, 2.0);
        assert_eq!(config.detector.threshold_block_size, 11);
        assert_eq!(config.actuator.step_delay_ms, 5);
        assert_eq!(config.actuator.base_url, "http://192.168.10.5");
    }

    #[test]
    fn test_json_round_trip() {
        let mut config = TrackerConfig::default();
        config.actuator.movements = vec![ServoAngles::new(1, 2)];
        let text = serde_json::to_string(&config).unwrap();
        let back: TrackerConfig = serde_json::from_str(&text).unwrap();
        assert_eq!(back, config);
    }

    #[test]
    fn test_validation_zoom_below_one() {
        let mut config = TrackerConfig::default();
        config.detector.zoom_factor = 0.5;
        assert!(config.validate().is_err());
        config.detector.zoom_factor = f64::NAN;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_inverted_area_interval() {
        let mut config = TrackerConfig::default();
        config.detector.min_marker_area = 500.0;
        config.detector.max_marker_area = 100.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_even_kernels() {
        let mut config = TrackerConfig::default();
        config.detector.blur_kernel_size = 4;
        assert!(config.validate().is_err());

        let mut config = TrackerConfig::default();
        config.detector.threshold_block_size = 1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tracker.json");
        std::fs::write(&path, r#"{ "stream": { "url": "http://cam/video" } }"#).unwrap();
        let config = TrackerConfig::from_file(&path).unwrap();
        assert_eq!(config.stream.url, "http://cam/video");

        std::fs::write(&path, r#"{ "detector": { "zoom_factor": 0.1 } }"#).unwrap();
        assert!(matches!(
            TrackerConfig::from_file(&path),
            Err(VisionError::Config(_))
        ));
    }
}
