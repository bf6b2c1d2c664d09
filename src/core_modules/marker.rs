use imageproc::rect::Rect;

/// An integer pixel coordinate in the canonical frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

/// A "dumb" data container for one detected dot. Valid for the frame it came from only;
/// there is no identity carried between frames.
#[derive(Debug, Clone, PartialEq)]
pub struct Marker {
    /// Axis-aligned box around the dot's outer contour.
    pub bounding_box: Rect,
    /// Centre of the bounding box, `(x + w / 2, y + h / 2)` in integer pixels.
    pub centroid: Point,
    /// Area enclosed by the outer contour, in square pixels.
    pub area: f64,
}

impl Marker {
    pub fn from_bounding_box(bounding_box: Rect, area: f64) -> Self {
        let centroid = Point {
            x: bounding_box.left() + (bounding_box.width() / 2) as i32,
            y: bounding_box.top() + (bounding_box.height() / 2) as i32,
        };
        Self {
            bounding_box,
            centroid,
            area,
        }
    }

    /// The text drawn next to the dot on the debug frame.
    pub fn label(&self) -> String {
        format!("Dot ({}, {})", self.centroid.x, self.centroid.y)
    }
}
