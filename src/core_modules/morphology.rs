// THEORY:
// Morphological opening (erode, then dilate) strips isolated noise pixels and
// hair-thin bridges out of the threshold mask while leaving solid round blobs
// almost untouched.
//
// The structuring element is the 3x3 ellipse, which at that size is the
// 4-neighbour cross. Repeating a cross erosion `n` times removes everything within
// L1 distance `n` of the background, so `n` iterations of the cross are exactly one
// L1 erosion of radius `n`; the same holds for dilation. That lets us hand the whole
// operation to `imageproc`'s distance-transform based morphology.

use image::GrayImage;
use imageproc::distance_transform::Norm;
use imageproc::morphology;

/// Opens a binary mask with a 3x3 elliptical element, `iterations` times.
pub fn open(mask: &GrayImage, iterations: u8) -> GrayImage {
    if iterations == 0 {
        return mask.clone();
    }
    morphology::open(mask, Norm::L1, iterations)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;
    use imageproc::drawing::draw_filled_circle_mut;

    fn foreground(mask: &GrayImage) -> usize {
        mask.pixels().filter(|p| p.0[0] > 0).count()
    }

    #[test]
    fn isolated_pixels_disappear() {
        let mut mask = GrayImage::new(40, 40);
        for (x, y) in [(3, 3), (20, 7), (35, 30)] {
            mask.put_pixel(x, y, Luma([255]));
        }
        assert_eq!(foreground(&open(&mask, 2)), 0);
    }

    #[test]
    fn thin_line_disappears() {
        let mut mask = GrayImage::new(40, 40);
        for x in 5..35 {
            mask.put_pixel(x, 20, Luma([255]));
            mask.put_pixel(x, 21, Luma([255]));
        }
        assert_eq!(foreground(&open(&mask, 2)), 0);
    }

    #[test]
    fn solid_disc_survives() {
        let mut mask = GrayImage::new(60, 60);
        draw_filled_circle_mut(&mut mask, (30, 30), 10, Luma([255]));
        let opened = open(&mask, 2);
        assert_eq!(opened.get_pixel(30, 30).0[0], 255);
        let before = foreground(&mask) as f64;
        let after = foreground(&opened) as f64;
        assert!(after > before * 0.9, "{after} of {before} pixels left");
    }

    #[test]
    fn zero_iterations_is_identity() {
        let mut mask = GrayImage::new(10, 10);
        mask.put_pixel(4, 4, Luma([255]));
        assert_eq!(open(&mask, 0), mask);
    }
}
