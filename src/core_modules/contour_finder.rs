// THEORY:
// The `contour_finder` turns the cleaned foreground mask into markers. It is the
// spatial grouping step of the pipeline: connected foreground regions are traced,
// measured and kept only when their size matches a dot seen at the calibrated
// camera distance.
//
// Algorithm steps:
// 1.  **Border following**: `imageproc` traces every border in the mask and records
//     whether it is an outer border or a hole, and which border encloses it.
// 2.  **External borders only**: A border is kept when it is an outer border with no
//     enclosing border. Holes and anything nested inside a hole are ignored, so a
//     dot that thresholds into a ring still reports its full outline once.
// 3.  **Area**: The polygon area of the border points (shoelace formula). It is the
//     area enclosed by the pixel centres, slightly smaller than the pixel count.
// 4.  **Size gate**: Only `min_area < area < max_area` survives. The interval is a
//     property of the physical setup, not of the algorithm.
// 5.  **Stateless Utility**: Nothing is remembered between calls.

use crate::core_modules::marker::Marker;
use image::GrayImage;
use imageproc::contours::{find_contours, BorderType};
use imageproc::point::Point;
use imageproc::rect::Rect;

pub mod contour_finder {
    use super::*;

    /// Outer borders of every top-level connected foreground region.
    pub fn external_contours(mask: &GrayImage) -> Vec<Vec<Point<i32>>> {
        find_contours::<i32>(mask)
            .into_iter()
            .filter(|c| c.border_type == BorderType::Outer && c.parent.is_none())
            .map(|c| c.points)
            .collect()
    }

    /// Area enclosed by a closed polygon, independent of winding direction.
    pub fn contour_area(points: &[Point<i32>]) -> f64 {
        if points.len() < 3 {
            return 0.0;
        }
        let mut twice_area: i64 = 0;
        for (i, p) in points.iter().enumerate() {
            let q = points[(i + 1) % points.len()];
            twice_area += p.x as i64 * q.y as i64 - q.x as i64 * p.y as i64;
        }
        twice_area.abs() as f64 / 2.0
    }

    /// Smallest axis-aligned rectangle containing every point, edges inclusive.
    pub fn bounding_rect(points: &[Point<i32>]) -> Option<Rect> {
        let first = points.first()?;
        let (mut min_x, mut min_y, mut max_x, mut max_y) = (first.x, first.y, first.x, first.y);
        for p in &points[1..] {
            min_x = min_x.min(p.x);
            min_y = min_y.min(p.y);
            max_x = max_x.max(p.x);
            max_y = max_y.max(p.y);
        }
        let width = (max_x - min_x + 1) as u32;
        let height = (max_y - min_y + 1) as u32;
        Some(Rect::at(min_x, min_y).of_size(width, height))
    }

    /// Traces `mask` and keeps the regions whose area lies strictly inside
    /// `(min_area, max_area)`.
    pub fn find_markers(mask: &GrayImage, min_area: f64, max_area: f64) -> Vec<Marker> {
        external_contours(mask)
            .iter()
            .filter_map(|points| {
                let area = contour_area(points);
                if !(min_area < area && area < max_area) {
                    return None;
                }
                bounding_rect(points).map(|rect| Marker::from_bounding_box(rect, area))
            })
            .collect()
    }
}
