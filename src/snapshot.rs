//! A display that writes every frame to disk instead of a window.

use crate::core_modules::utils::image_helper::image_helper;
use crate::error::VisionError;
use crate::runtime::DisplaySink;
use image::{GrayImage, RgbImage};
use std::path::PathBuf;

/// Writes `frame_NNNNNN_annotated.png` and `frame_NNNNNN_mask.png` pairs into a
/// directory, numbering frames from 1. Never asks to quit.
pub struct SnapshotSink {
    dir: PathBuf,
    frame_index: u64,
}

impl SnapshotSink {
    /// Creates the output directory if needed.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self, VisionError> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        Ok(Self { dir, frame_index: 0 })
    }

    pub fn frames_written(&self) -> u64 {
        self.frame_index
    }
}

impl DisplaySink for SnapshotSink {
    fn show(&mut self, annotated: &RgbImage, mask: &GrayImage) -> Result<(), VisionError> {
        self.frame_index += 1;
        let stem = format!("frame_{:06}", self.frame_index);
        image_helper::save_frame(&self.dir.join(format!("{stem}_annotated.png")), annotated)?;
        image_helper::save_mask(&self.dir.join(format!("{stem}_mask.png")), mask)?;
        Ok(())
    }
}
