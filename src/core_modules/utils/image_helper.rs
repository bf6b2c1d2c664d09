pub mod image_helper {
    use image::codecs::png::PngEncoder;
    use image::{ExtendedColorType, GrayImage, ImageEncoder, RgbImage};
    use std::io::BufWriter;
    use std::path::Path;

    /// Writes a colour frame as PNG.
    pub fn save_frame(path: &Path, frame: &RgbImage) -> Result<(), image::error::ImageError> {
        let output = BufWriter::new(std::fs::File::create(path)?);
        let encoder = PngEncoder::new(output);
        encoder.write_image(
            frame.as_raw(),
            frame.width(),
            frame.height(),
            ExtendedColorType::Rgb8,
        )?;
        Ok(())
    }

    /// Writes a binary mask as single-channel PNG.
    pub fn save_mask(path: &Path, mask: &GrayImage) -> Result<(), image::error::ImageError> {
        let output = BufWriter::new(std::fs::File::create(path)?);
        let encoder = PngEncoder::new(output);
        encoder.write_image(mask.as_raw(), mask.width(), mask.height(), ExtendedColorType::L8)?;
        Ok(())
    }
}
