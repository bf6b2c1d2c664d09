// THEORY:
// The `filters` module holds the per-pixel intensity stages of the marker pipeline:
// luminance conversion, Gaussian smoothing and Gaussian-weighted adaptive
// thresholding. The blur and the threshold's local mean are both computed with
// imageproc's separable filter, so the two stages share border handling (edge pixels
// are replicated) and accumulation order.
//
// Key architectural principles:
// 1.  **Size-derived sigma**: Kernels are described by their side length only. The
//     standard deviation follows from it (`0.3 * ((k - 1) * 0.5 - 1) + 0.8`), and the
//     small kernels (k <= 7) use the fixed binomial tables, so a 5x5 blur is exactly
//     `[1, 4, 6, 4, 1] / 16` in each direction.
// 2.  **Float accumulation, one rounding**: The filter runs on an f64 copy of the
//     image and the result is rounded once at the end. A uniform brightness offset
//     therefore shifts the blurred image by exactly that offset.
// 3.  **Local, not global, contrast**: A pixel is foreground when it is darker than
//     its neighbourhood's weighted mean by at least `offset`. Lighting gradients move
//     the pixel and its mean together and cancel out.

use image::{GrayImage, Luma, Rgb, RgbImage};
use imageproc::definitions::Image;
use imageproc::filter::separable_filter_equal;
use imageproc::map::map_colors;

/// Reduces a colour frame to luminance with the BT.601 weights
/// (0.299, 0.587, 0.114) in 14-bit fixed point, rounded to nearest.
pub fn to_grayscale(frame: &RgbImage) -> GrayImage {
    map_colors(frame, |Rgb([r, g, b])| {
        let y = r as u32 * 4899 + g as u32 * 9617 + b as u32 * 1868;
        Luma([((y + (1 << 13)) >> 14) as u8])
    })
}

/// 1-D Gaussian weights for an odd kernel `size`, summing to 1.
pub fn gaussian_kernel(size: u32) -> Vec<f64> {
    match size {
        1 => return vec![1.0],
        3 => return vec![0.25, 0.5, 0.25],
        5 => return vec![0.0625, 0.25, 0.375, 0.25, 0.0625],
        7 => {
            return vec![
                0.031_25, 0.109_375, 0.218_75, 0.281_25, 0.218_75, 0.109_375, 0.031_25,
            ];
        }
        _ => {}
    }

    let sigma = 0.3 * ((size as f64 - 1.0) * 0.5 - 1.0) + 0.8;
    let center = (size as f64 - 1.0) / 2.0;
    let weights: Vec<f64> = (0..size)
        .map(|i| {
            let d = i as f64 - center;
            (-(d * d) / (2.0 * sigma * sigma)).exp()
        })
        .collect();
    let total: f64 = weights.iter().sum();
    weights.into_iter().map(|w| w / total).collect()
}

/// Unrounded Gaussian-weighted local means of `image`.
fn local_means(image: &GrayImage, kernel_size: u32) -> Image<Luma<f64>> {
    let wide: Image<Luma<f64>> = map_colors(image, |Luma([v])| Luma([v as f64]));
    separable_filter_equal(&wide, &gaussian_kernel(kernel_size))
}

fn round_to_u8(value: f64) -> u8 {
    value.round().clamp(0.0, 255.0) as u8
}

/// Smooths `image` with a `kernel_size x kernel_size` Gaussian.
pub fn gaussian_blur(image: &GrayImage, kernel_size: u32) -> GrayImage {
    map_colors(&local_means(image, kernel_size), |Luma([m])| Luma([round_to_u8(m)]))
}

/// Inverted Gaussian adaptive threshold.
///
/// A pixel becomes 255 when `src <= mean - offset`, where `mean` is the
/// Gaussian-weighted average of its `block_size x block_size` neighbourhood
/// rounded to an integer intensity. All other pixels become 0.
pub fn adaptive_threshold(image: &GrayImage, block_size: u32, offset: i32) -> GrayImage {
    let means = local_means(image, block_size);
    let mut mask = GrayImage::new(image.width(), image.height());
    for ((pixel, mean), out) in image.pixels().zip(means.pixels()).zip(mask.pixels_mut()) {
        let mean = round_to_u8(mean.0[0]) as i32;
        let value = pixel.0[0] as i32;
        *out = if value <= mean - offset { Luma([255]) } else { Luma([0]) };
    }
    mask
}
