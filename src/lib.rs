// THEORY:
// This file is the main entry point for the `dot_vision` library crate.
//
// The primary export is `MarkerDetector` (in `pipeline`), a stateless per-frame
// pipeline that finds small dark dots in a zoomed camera frame and returns them with
// an annotated debug frame and the binary mask. Around it sit the collaborators the
// demo needs to run end to end: frame sources and display sinks (`runtime`,
// `sources`, `snapshot`), the open-loop servo sequence (`actuator`), the
// pixel-to-angle calibration (`calibration`) and the configuration that holds every
// physical constant (`config`).
//
// The image-processing stages live in `core_modules` and are public so they can be
// exercised one by one.

pub mod actuator;
pub mod calibration;
pub mod config;
pub mod core_modules;
pub mod error;
pub mod pipeline;
pub mod runtime;
pub mod snapshot;
pub mod sources;

pub use calibration::{AngleCalibration, ServoAngles};
pub use config::TrackerConfig;
pub use error::VisionError;
pub use pipeline::{Detection, Marker, MarkerDetector};
