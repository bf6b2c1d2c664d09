// THEORY:
// The OpenCV edge of the viewer. `OpenCvStreamSource` pulls BGR frames from any URL
// VideoCapture understands (the phone camera serves MJPEG over HTTP) and hands them
// to the library as RGB buffers. `HighGuiSink` goes the other way and shows the
// annotated frame and the mask in two windows, polling the keyboard once per frame
// so that `q` ends the loop.

use dot_vision::VisionError;
use dot_vision::runtime::{DisplaySink, FrameSource};
use image::{GrayImage, RgbImage};
use tracing::warn;
use opencv::{
    core::{self, Mat, Scalar},
    highgui, imgproc,
    prelude::*,
    videoio::{self, VideoCapture},
};

pub const FRAME_WINDOW: &str = "Captured Image with Dots";
pub const MASK_WINDOW: &str = "Binary Output";

pub struct OpenCvStreamSource {
    capture: VideoCapture,
    frame: Mat,
}

impl OpenCvStreamSource {
    pub fn open(url: &str) -> Result<Self, VisionError> {
        let capture = VideoCapture::from_file(url, videoio::CAP_ANY)
            .map_err(|e| VisionError::CannotOpenStream(format!("{url}: {e}")))?;
        let opened = capture
            .is_opened()
            .map_err(|e| VisionError::CannotOpenStream(format!("{url}: {e}")))?;
        if !opened {
            return Err(VisionError::CannotOpenStream(url.to_string()));
        }
        Ok(Self {
            capture,
            frame: Mat::default(),
        })
    }
}

impl FrameSource for OpenCvStreamSource {
    fn read_frame(&mut self) -> Result<RgbImage, VisionError> {
        let grabbed = self
            .capture
            .read(&mut self.frame)
            .map_err(|e| VisionError::CannotOpenStream(e.to_string()))?;
        if !grabbed || self.frame.empty() {
            return Err(VisionError::EndOfStream);
        }
        bgr_to_rgb_image(&self.frame).map_err(|e| VisionError::CannotOpenStream(e.to_string()))
    }
}

pub struct HighGuiSink {
    quit_key: i32,
}

impl HighGuiSink {
    pub fn new() -> Result<Self, VisionError> {
        for name in [FRAME_WINDOW, MASK_WINDOW] {
            highgui::named_window(name, highgui::WINDOW_AUTOSIZE).map_err(display_error)?;
        }
        Ok(Self {
            quit_key: 'q' as i32,
        })
    }
}

impl DisplaySink for HighGuiSink {
    fn show(&mut self, annotated: &RgbImage, mask: &GrayImage) -> Result<(), VisionError> {
        let frame = rgb_image_to_bgr(annotated).map_err(display_error)?;
        let mask = gray_image_to_mat(mask).map_err(display_error)?;
        highgui::imshow(FRAME_WINDOW, &frame).map_err(display_error)?;
        highgui::imshow(MASK_WINDOW, &mask).map_err(display_error)?;
        Ok(())
    }

    fn quit_requested(&mut self) -> bool {
        match highgui::wait_key(1) {
            Ok(key) => key & 0xff == self.quit_key,
            Err(e) => {
                warn!("keyboard poll failed: {}", e);
                false
            }
        }
    }
}

impl Drop for HighGuiSink {
    fn drop(&mut self) {
        let _ = highgui::destroy_all_windows();
    }
}

fn display_error(e: opencv::Error) -> VisionError {
    VisionError::Display(e.to_string())
}

fn bgr_to_rgb_image(frame: &Mat) -> opencv::Result<RgbImage> {
    let mut rgb = Mat::default();
    imgproc::cvt_color(frame, &mut rgb, imgproc::COLOR_BGR2RGB, 0)?;
    let (width, height) = (rgb.cols() as u32, rgb.rows() as u32);
    let bytes = rgb.data_bytes()?.to_vec();
    RgbImage::from_raw(width, height, bytes).ok_or_else(|| {
        opencv::Error::new(
            core::StsUnmatchedSizes,
            "frame buffer does not match its size".to_string(),
        )
    })
}

fn rgb_image_to_bgr(image: &RgbImage) -> opencv::Result<Mat> {
    let mut rgb = Mat::new_rows_cols_with_default(
        image.height() as i32,
        image.width() as i32,
        core::CV_8UC3,
        Scalar::all(0.0),
    )?;
    rgb.data_bytes_mut()?.copy_from_slice(image.as_raw());
    let mut bgr = Mat::default();
    imgproc::cvt_color(&rgb, &mut bgr, imgproc::COLOR_RGB2BGR, 0)?;
    Ok(bgr)
}

fn gray_image_to_mat(image: &GrayImage) -> opencv::Result<Mat> {
    let mut mat = Mat::new_rows_cols_with_default(
        image.height() as i32,
        image.width() as i32,
        core::CV_8UC1,
        Scalar::all(0.0),
    )?;
    mat.data_bytes_mut()?.copy_from_slice(image.as_raw());
    Ok(mat)
}
