//! Error types for dot_vision

use thiserror::Error;

#[derive(Error, Debug)]
pub enum VisionError {
    #[error("Cannot open stream: {0}")]
    CannotOpenStream(String),

    /// The frame source has no more frames. Not a failure of the process.
    #[error("End of stream")]
    EndOfStream,

    #[error("Invalid frame size {width}x{height}: {reason}")]
    InvalidFrameSize {
        width: u32,
        height: u32,
        reason: String,
    },

    #[error("Actuator rejected command with status {status}")]
    ActuatorRejected { status: u16 },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Font error: {0}")]
    Font(String),

    #[error("Display error: {0}")]
    Display(String),
}

impl VisionError {
    /// Errors that only spoil the current frame; the stream itself may recover.
    pub fn is_frame_local(&self) -> bool {
        matches!(self, VisionError::InvalidFrameSize { .. })
    }
}

impl From<serde_json::Error> for VisionError {
    fn from(err: serde_json::Error) -> Self {
        VisionError::Config(err.to_string())
    }
}
