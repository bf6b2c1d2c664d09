//! Detection properties of the full marker pipeline on synthetic frames.

use dot_vision::config::DetectorConfig;
use dot_vision::{Marker, MarkerDetector};
use image::{Rgb, RgbImage};
use imageproc::drawing::draw_filled_circle_mut;

const LIGHT: Rgb<u8> = Rgb([220, 220, 220]);
const DARK: Rgb<u8> = Rgb([15, 15, 15]);

fn canonical_detector() -> MarkerDetector {
    MarkerDetector::new(DetectorConfig {
        zoom_factor: 1.0,
        ..DetectorConfig::default()
    })
    .unwrap()
}

fn frame_with_circles(
    background: Rgb<u8>,
    dot: Rgb<u8>,
    circles: &[((i32, i32), i32)],
) -> RgbImage {
    let mut frame = RgbImage::from_pixel(640, 480, background);
    for &(center, radius) in circles {
        draw_filled_circle_mut(&mut frame, center, radius, dot);
    }
    frame
}

fn assert_near(marker: &Marker, center: (i32, i32), tolerance: i32) {
    let dx = (marker.centroid.x - center.0).abs();
    let dy = (marker.centroid.y - center.1).abs();
    assert!(
        dx <= tolerance && dy <= tolerance,
        "centroid ({}, {}) too far from ({}, {})",
        marker.centroid.x,
        marker.centroid.y,
        center.0,
        center.1
    );
}

#[test]
fn test_circle_within_area_interval_is_one_marker() {
    let detector = canonical_detector();
    // Areas 201, 314 and 380.
    for radius in [8, 10, 11] {
        let frame = frame_with_circles(LIGHT, DARK, &[((320, 240), radius)]);
        let detection = detector.detect(&frame).unwrap();
        assert_eq!(detection.markers.len(), 1, "radius {radius}");
        let area = detection.markers[0].area;
        assert!(area > 100.0 && area < 500.0, "radius {radius} measured {area}");
    }
}

#[test]
fn test_circle_outside_area_interval_is_ignored() {
    let detector = canonical_detector();
    // Areas 28, 50, 804 and 1018.
    for radius in [3, 4, 16, 18] {
        let frame = frame_with_circles(LIGHT, DARK, &[((320, 240), radius)]);
        let detection = detector.detect(&frame).unwrap();
        assert!(detection.markers.is_empty(), "radius {radius}");
    }
}

#[test]
fn test_centroid_accuracy() {
    let detector = canonical_detector();
    for center in [(100, 100), (321, 237), (500, 400), (57, 420)] {
        let frame = frame_with_circles(LIGHT, DARK, &[(center, 10)]);
        let detection = detector.detect(&frame).unwrap();
        assert_eq!(detection.markers.len(), 1);
        assert_near(&detection.markers[0], center, 2);
    }
}

#[test]
fn test_three_separate_markers() {
    let detector = canonical_detector();
    let centers = [(120, 90), (400, 250), (230, 390)];
    let circles: Vec<_> = centers.iter().map(|&c| (c, 10)).collect();
    let frame = frame_with_circles(LIGHT, DARK, &circles);

    let detection = detector.detect(&frame).unwrap();
    assert_eq!(detection.markers.len(), 3);
    for center in centers {
        let closest = detection
            .markers
            .iter()
            .min_by_key(|m| (m.centroid.x - center.0).abs() + (m.centroid.y - center.1).abs())
            .unwrap();
        assert_near(closest, center, 2);
    }
}

#[test]
fn test_qualifying_and_oversized_circles_mixed() {
    let detector = canonical_detector();
    let frame = frame_with_circles(LIGHT, DARK, &[((150, 150), 10), ((450, 300), 18)]);
    let detection = detector.detect(&frame).unwrap();
    assert_eq!(detection.markers.len(), 1);
    assert_near(&detection.markers[0], (150, 150), 2);
}

#[test]
fn test_uniform_brightness_offset_changes_nothing() {
    let detector = canonical_detector();
    let circles = [((200, 200), 10), ((420, 120), 9)];
    let dim = frame_with_circles(Rgb([150, 150, 150]), Rgb([20, 20, 20]), &circles);
    let bright = frame_with_circles(Rgb([210, 210, 210]), Rgb([80, 80, 80]), &circles);

    let a = detector.detect(&dim).unwrap();
    let b = detector.detect(&bright).unwrap();
    assert_eq!(a.mask, b.mask);
    assert_eq!(a.markers, b.markers);
    assert_eq!(a.markers.len(), 2);
}

#[test]
fn test_crop_resize_identity_at_zoom_one() {
    let detector = canonical_detector();
    let frame = RgbImage::from_fn(640, 480, |x, y| {
        Rgb([(x % 251) as u8, (y % 241) as u8, ((x * y) % 239) as u8])
    });
    let once = detector.prepare(&frame).unwrap();
    let twice = detector.prepare(&once).unwrap();
    assert_eq!(once, frame);
    assert_eq!(twice, frame);
}

#[test]
fn test_full_hd_frame_zoomed_onto_centre_marker() {
    // 1920x1080 at zoom 3.2 crops 600x337 pixels and stretches them to 640x480,
    // which multiplies apparent areas by about 1.52. The radius 10 dot (314 px)
    // shows up at roughly 480-510 px, so the area interval is recomputed for this
    // camera by the same factor.
    let defaults = DetectorConfig::default();
    let area_scale = (640.0 * 480.0) / (600.0 * 337.0);
    let detector = MarkerDetector::new(DetectorConfig {
        min_marker_area: defaults.min_marker_area * area_scale,
        max_marker_area: defaults.max_marker_area * area_scale,
        ..defaults
    })
    .unwrap();

    let mut frame = RgbImage::from_pixel(1920, 1080, Rgb([255, 255, 255]));
    draw_filled_circle_mut(&mut frame, (960, 540), 10, Rgb([0, 0, 0]));

    let detection = detector.detect(&frame).unwrap();
    assert_eq!(detection.annotated.dimensions(), (640, 480));
    assert_eq!(detection.markers.len(), 1);
    assert_near(&detection.markers[0], (320, 240), 3);
}

#[test]
fn test_full_hd_frame_without_marker() {
    let detector = MarkerDetector::new(DetectorConfig::default()).unwrap();
    let frame = RgbImage::from_pixel(1920, 1080, Rgb([255, 255, 255]));
    let detection = detector.detect(&frame).unwrap();
    assert!(detection.markers.is_empty());
}

#[test]
fn test_speck_noise_is_not_a_marker() {
    let detector = canonical_detector();
    let mut frame = frame_with_circles(LIGHT, DARK, &[((320, 240), 10)]);
    for (x, y) in [(50, 50), (600, 30), (90, 444), (333, 100)] {
        frame.put_pixel(x, y, DARK);
    }
    let detection = detector.detect(&frame).unwrap();
    assert_eq!(detection.markers.len(), 1);
    assert_near(&detection.markers[0], (320, 240), 2);
}

#[test]
fn test_annotated_frame_carries_centroid_label() {
    let detector = canonical_detector();
    let frame = frame_with_circles(LIGHT, DARK, &[((320, 240), 10)]);
    let detection = detector.detect(&frame).unwrap();
    assert_eq!(detection.markers.len(), 1);

    let rect = detection.markers[0].bounding_box;
    let (left, top) = (rect.left() as u32, rect.top() as u32);
    let label_band = (top - 26..top - 2).flat_map(|y| (left..left + 120).map(move |x| (x, y)));
    let inked = label_band
        .filter(|&(x, y)| *detection.annotated.get_pixel(x, y) != LIGHT)
        .count();
    assert!(inked > 30, "only {inked} label pixels above the box");
}
