//! Frame sources that need no camera: in-memory frames and directories of stills.

use crate::error::VisionError;
use crate::runtime::FrameSource;
use image::RgbImage;
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use tracing::info;

const IMAGE_EXTENSIONS: [&str; 5] = ["png", "jpg", "jpeg", "bmp", "tif"];

enum Pending {
    Decoded(RgbImage),
    File(PathBuf),
}

/// Replays a fixed list of frames, then reports end of stream.
pub struct ImageSequenceSource {
    pending: VecDeque<Pending>,
}

impl ImageSequenceSource {
    pub fn from_frames(frames: Vec<RgbImage>) -> Self {
        Self {
            pending: frames.into_iter().map(Pending::Decoded).collect(),
        }
    }

    /// Opens every image file in `dir`, in file name order. Files are decoded
    /// lazily, one per `read_frame`.
    pub fn open_dir(dir: &Path) -> Result<Self, VisionError> {
        let entries = std::fs::read_dir(dir)
            .map_err(|e| VisionError::CannotOpenStream(format!("{}: {}", dir.display(), e)))?;

        let mut files: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| path.is_file() && has_image_extension(path))
            .collect();
        files.sort();

        if files.is_empty() {
            return Err(VisionError::CannotOpenStream(format!(
                "{}: no image files",
                dir.display()
            )));
        }

        info!(frames = files.len(), dir = %dir.display(), "opened image directory");
        Ok(Self {
            pending: files.into_iter().map(Pending::File).collect(),
        })
    }

    pub fn remaining(&self) -> usize {
        self.pending.len()
    }
}

fn has_image_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| IMAGE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

impl FrameSource for ImageSequenceSource {
    fn read_frame(&mut self) -> Result<RgbImage, VisionError> {
        match self.pending.pop_front() {
            Some(Pending::Decoded(frame)) => Ok(frame),
            Some(Pending::File(path)) => Ok(image::open(&path)?.to_rgb8()),
            None => Err(VisionError::EndOfStream),
        }
    }
}
