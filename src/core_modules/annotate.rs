// THEORY:
// Debug overlay for the resized colour frame. Each marker gets a 2 px green box
// spanning `(x, y)` to `(x + w, y + h)` and its `"Dot (cx, cy)"` label 10 px above
// the box. The crate ships DejaVu Sans Mono for the label so that the overlay never
// depends on fonts installed on the host; a different face can be configured.

use crate::core_modules::marker::Marker;
use crate::error::VisionError;
use ab_glyph::{FontArc, PxScale};
use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_hollow_rect_mut, draw_text_mut};
use imageproc::rect::Rect;

pub const ANNOTATION_COLOR: Rgb<u8> = Rgb([0, 255, 0]);
const LABEL_SCALE: f32 = 16.0;
const LABEL_OFFSET: i32 = 10;

static DEFAULT_LABEL_FONT: &[u8] = include_bytes!("../../assets/fonts/DejaVuSansMono.ttf");

/// The bundled label font.
pub fn default_label_font() -> Result<FontArc, VisionError> {
    FontArc::try_from_slice(DEFAULT_LABEL_FONT)
        .map_err(|e| VisionError::Font(format!("bundled label font: {e}")))
}

/// Draws every marker onto `frame` in place.
pub fn draw_markers(frame: &mut RgbImage, markers: &[Marker], font: &FontArc) {
    for marker in markers {
        let rect = marker.bounding_box;
        // OpenCV-style box: the far edge sits at x + w, and the second pass thickens
        // it outwards.
        draw_hollow_rect_mut(
            frame,
            Rect::at(rect.left(), rect.top()).of_size(rect.width() + 1, rect.height() + 1),
            ANNOTATION_COLOR,
        );
        draw_hollow_rect_mut(
            frame,
            Rect::at(rect.left() - 1, rect.top() - 1)
                .of_size(rect.width() + 3, rect.height() + 3),
            ANNOTATION_COLOR,
        );

        // `draw_text_mut` places the top of the line box; the baseline lands 10 px
        // above the box.
        let y = rect.top() - LABEL_OFFSET - LABEL_SCALE as i32;
        draw_text_mut(
            frame,
            ANNOTATION_COLOR,
            rect.left(),
            y,
            PxScale::from(LABEL_SCALE),
            font,
            &marker.label(),
        );
    }
}
