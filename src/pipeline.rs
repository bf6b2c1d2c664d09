// THEORY:
// The `pipeline` module is the top-level API of the marker detector. It chains the
// stateless stages in `core_modules` into one call that turns a raw camera frame
// into the markers found on it, plus the two images a human needs to debug it.
//
// Stage order (each stage feeds the next):
// 1.  Zoom simulation: centre crop of `1/zoom_factor`, resized to the canonical size.
// 2.  Grayscale.
// 3.  5x5 Gaussian smoothing against sensor noise.
// 4.  Inverted Gaussian adaptive threshold (block 11, offset 2): dark-for-its-area
//     pixels become foreground regardless of the overall lighting.
// 5.  Opening with a 3x3 ellipse, twice: drops specks and thin bridges.
// 6.  External contours, filtered by enclosed area.
// 7.  Annotation of a copy of the resized colour frame.
//
// The detector keeps no memory between frames and performs no I/O. Everything it
// knows about the physical setup comes from `DetectorConfig`.

use crate::config::DetectorConfig;
use crate::core_modules::annotate::{default_label_font, draw_markers};
use crate::core_modules::contour_finder::contour_finder;
use crate::core_modules::filters::{adaptive_threshold, gaussian_blur, to_grayscale};
use crate::core_modules::morphology;
use crate::core_modules::zoom::zoom_and_resize;
use crate::error::VisionError;
use ab_glyph::FontArc;
use image::{GrayImage, RgbImage};
use tracing::debug;

pub use crate::core_modules::marker::{Marker, Point};

/// Everything the detector produces for one frame.
#[derive(Debug, Clone)]
pub struct Detection {
    /// Markers in the order their contours were found (top to bottom, left to right).
    pub markers: Vec<Marker>,
    /// The resized colour frame with boxes and labels drawn on it.
    pub annotated: RgbImage,
    /// The cleaned foreground mask the contours were traced on.
    pub mask: GrayImage,
}

/// Stateless per-frame dark dot detector.
pub struct MarkerDetector {
    config: DetectorConfig,
    font: FontArc,
}

impl MarkerDetector {
    /// Builds a detector. Fails when the configuration is inconsistent or the
    /// configured label font cannot be loaded.
    pub fn new(config: DetectorConfig) -> Result<Self, VisionError> {
        config.validate()?;
        let font = match &config.label_font {
            Some(path) => {
                let bytes = std::fs::read(path)?;
                FontArc::try_from_vec(bytes)
                    .map_err(|e| VisionError::Font(format!("{}: {}", path.display(), e)))?
            }
            None => default_label_font()?,
        };
        Ok(Self { config, font })
    }

    /// Runs the full pipeline on one raw frame.
    pub fn detect(&self, raw_frame: &RgbImage) -> Result<Detection, VisionError> {
        let frame = self.prepare(raw_frame)?;
        let mask = self.foreground_mask(&frame);
        let markers = contour_finder::find_markers(
            &mask,
            self.config.min_marker_area,
            self.config.max_marker_area,
        );
        debug!(markers = markers.len(), "frame processed");

        let mut annotated = frame;
        draw_markers(&mut annotated, &markers, &self.font);

        Ok(Detection {
            markers,
            annotated,
            mask,
        })
    }

    /// Crop and resize stage on its own.
    pub fn prepare(&self, raw_frame: &RgbImage) -> Result<RgbImage, VisionError> {
        zoom_and_resize(
            raw_frame,
            self.config.zoom_factor,
            self.config.output_width,
            self.config.output_height,
        )
    }

    /// Grayscale, blur, threshold and opening of an already prepared frame.
    pub fn foreground_mask(&self, frame: &RgbImage) -> GrayImage {
        let gray = to_grayscale(frame);
        let blurred = gaussian_blur(&gray, self.config.blur_kernel_size);
        let binary = adaptive_threshold(
            &blurred,
            self.config.threshold_block_size,
            self.config.threshold_offset,
        );
        morphology::open(&binary, self.config.opening_iterations)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;
    use imageproc::drawing::draw_filled_circle_mut;

    fn canonical_config() -> DetectorConfig {
        DetectorConfig {
            zoom_factor: 1.0,
            ..DetectorConfig::default()
        }
    }

    #[test]
    fn blank_frame_has_no_markers() {
        let detector = MarkerDetector::new(DetectorConfig::default()).unwrap();
        let frame = RgbImage::from_pixel(1280, 720, Rgb([230, 230, 230]));
        let detection = detector.detect(&frame).unwrap();
        assert!(detection.markers.is_empty());
        assert_eq!(detection.annotated.dimensions(), (640, 480));
        assert_eq!(detection.mask.dimensions(), (640, 480));
        assert!(detection.mask.pixels().all(|p| p.0[0] == 0));
    }

    #[test]
    fn single_dot_is_found_and_annotated() {
        let detector = MarkerDetector::new(canonical_config()).unwrap();
        let mut frame = RgbImage::from_pixel(640, 480, Rgb([220, 220, 220]));
        draw_filled_circle_mut(&mut frame, (200, 150), 10, Rgb([15, 15, 15]));

        let detection = detector.detect(&frame).unwrap();
        assert_eq!(detection.markers.len(), 1);
        let marker = &detection.markers[0];
        assert!((marker.centroid.x - 200).abs() <= 2);
        assert!((marker.centroid.y - 150).abs() <= 2);
        assert!(detection.mask.get_pixel(200, 141).0[0] > 0);
        let corner = marker.bounding_box;
        assert_eq!(
            *detection.annotated.get_pixel(corner.left() as u32, corner.top() as u32),
            crate::core_modules::annotate::ANNOTATION_COLOR
        );
    }

    #[test]
    fn invalid_frame_is_reported() {
        let detector = MarkerDetector::new(DetectorConfig::default()).unwrap();
        let frame = RgbImage::new(1, 1);
        assert!(matches!(
            detector.detect(&frame),
            Err(VisionError::InvalidFrameSize { .. })
        ));
    }

    #[test]
    fn missing_font_fails_construction() {
        let config = DetectorConfig {
            label_font: Some("/nonexistent/font.ttf".into()),
            ..DetectorConfig::default()
        };
        assert!(matches!(MarkerDetector::new(config), Err(VisionError::Io(_))));
    }

    #[test]
    fn garbage_font_fails_construction() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("not_a_font.ttf");
        std::fs::write(&path, b"definitely not a font").unwrap();
        let config = DetectorConfig {
            label_font: Some(path),
            ..DetectorConfig::default()
        };
        assert!(matches!(MarkerDetector::new(config), Err(VisionError::Font(_))));
    }

    #[test]
    fn invalid_config_fails_construction() {
        let config = DetectorConfig {
            max_marker_area: 10.0,
            ..DetectorConfig::default()
        };
        assert!(matches!(MarkerDetector::new(config), Err(VisionError::Config(_))));
    }
}
