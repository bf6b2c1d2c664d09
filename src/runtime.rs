// THEORY:
// The `runtime` module owns the two long-running units of work and nothing else:
//
// 1.  **Display loop** (blocking): pull a frame, run the detector, hand the results
//     to the display, poll for a stop. One frame at a time, no overlap between
//     acquisition and processing. It ends on end-of-stream, a stop request from its
//     token, or a quit request from the display.
// 2.  **Servo sequence** (async): the fixed movement walk from `actuator`.
//
// The two share no state and never talk to each other. They are spawned as separate
// tokio tasks and joined before the process exits. A frame that cannot be processed
// is skipped. A failing source, detector or display ends the loop.

use crate::actuator::{run_servo_sequence, AngleSender, SequenceSummary};
use crate::calibration::{AngleCalibration, ServoAngles};
use crate::error::VisionError;
use crate::pipeline::MarkerDetector;
use image::{GrayImage, RgbImage};
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

/// A producer of raw frames. Opening is the implementor's constructor and fails
/// with `CannotOpenStream`.
pub trait FrameSource {
    /// Blocks until the next frame arrives. Returns `EndOfStream` once exhausted.
    fn read_frame(&mut self) -> Result<RgbImage, VisionError>;
}

/// A consumer of annotated frames and masks, e.g. a window or a directory.
pub trait DisplaySink {
    fn show(&mut self, annotated: &RgbImage, mask: &GrayImage) -> Result<(), VisionError>;

    /// Non-blocking check whether the viewer asked to quit.
    fn quit_requested(&mut self) -> bool {
        false
    }
}

/// Sending half of a stop signal.
#[derive(Debug, Clone)]
pub struct StopHandle {
    stop_tx: watch::Sender<bool>,
}

/// Receiving half of a stop signal, polled once per loop iteration.
#[derive(Debug, Clone)]
pub struct StopToken {
    stop_rx: watch::Receiver<bool>,
}

/// Creates a connected stop handle and token.
pub fn stop_signal() -> (StopHandle, StopToken) {
    let (stop_tx, stop_rx) = watch::channel(false);
    (StopHandle { stop_tx }, StopToken { stop_rx })
}

impl StopHandle {
    pub fn stop(&self) {
        self.stop_tx.send_replace(true);
    }
}

impl StopToken {
    /// A token that is never stopped.
    pub fn never() -> Self {
        let (_, token) = stop_signal();
        token
    }

    pub fn is_stopped(&self) -> bool {
        *self.stop_rx.borrow()
    }
}

/// Why the display loop returned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoopExit {
    EndOfStream,
    QuitRequested,
    Stopped,
    SourceFailed(String),
    DetectorFailed(String),
    DisplayFailed(String),
}

/// Bookkeeping of one display loop run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoopSummary {
    pub frames_processed: u64,
    pub frames_skipped: u64,
    pub markers_seen: u64,
    pub exit: LoopExit,
}

/// Pull-process-display loop. Runs on the calling thread until the stream ends or a
/// stop is requested.
pub fn run_display_loop<S: FrameSource, D: DisplaySink>(
    source: &mut S,
    display: &mut D,
    detector: &MarkerDetector,
    calibration: Option<&AngleCalibration>,
    stop: &StopToken,
) -> LoopSummary {
    let mut frames_processed = 0u64;
    let mut frames_skipped = 0u64;
    let mut markers_seen = 0u64;

    let exit = loop {
        if stop.is_stopped() {
            break LoopExit::Stopped;
        }

        let frame = match source.read_frame() {
            Ok(frame) => frame,
            Err(VisionError::EndOfStream) => {
                info!("frame source exhausted");
                break LoopExit::EndOfStream;
            }
            Err(e) => {
                error!("failed to capture frame: {}", e);
                break LoopExit::SourceFailed(e.to_string());
            }
        };

        let detection = match detector.detect(&frame) {
            Ok(detection) => detection,
            Err(e) => match detector_failure(&e) {
                None => {
                    warn!("skipping frame: {}", e);
                    frames_skipped += 1;
                    continue;
                }
                Some(exit) => {
                    error!("detector failed: {}", e);
                    break exit;
                }
            },
        };
        frames_processed += 1;
        markers_seen += detection.markers.len() as u64;

        for marker in &detection.markers {
            let aim = calibration
                .map(|c| c.pixel_to_angles(marker.centroid.x as f64, marker.centroid.y as f64));
            debug!(
                x = marker.centroid.x,
                y = marker.centroid.y,
                area = marker.area,
                base = aim.map(|a: ServoAngles| a.base),
                joint = aim.map(|a: ServoAngles| a.joint),
                "marker"
            );
        }

        if let Err(e) = display.show(&detection.annotated, &detection.mask) {
            error!("display failed: {}", e);
            break LoopExit::DisplayFailed(e.to_string());
        }

        if display.quit_requested() {
            info!("quit requested");
            break LoopExit::QuitRequested;
        }
    };

    info!(frames_processed, frames_skipped, markers_seen, exit = ?exit, "display loop finished");

    LoopSummary {
        frames_processed,
        frames_skipped,
        markers_seen,
        exit,
    }
}

/// `None` when the error only spoils the current frame.
fn detector_failure(e: &VisionError) -> Option<LoopExit> {
    if e.is_frame_local() {
        None
    } else {
        Some(LoopExit::DetectorFailed(e.to_string()))
    }
}

/// Results of both tasks, available once both have finished.
#[derive(Debug)]
pub struct RunSummary {
    pub display: LoopSummary,
    pub servo: Option<SequenceSummary>,
}

/// Spawns the display loop and, if given a sender, the servo sequence, then waits
/// for both. The display loop runs on the blocking pool.
pub async fn run_concurrently<S, D, A>(
    mut source: S,
    mut display: D,
    detector: MarkerDetector,
    calibration: Option<AngleCalibration>,
    stop: StopToken,
    actuator: Option<(A, Vec<ServoAngles>, Duration)>,
) -> Result<RunSummary, tokio::task::JoinError>
where
    S: FrameSource + Send + 'static,
    D: DisplaySink + Send + 'static,
    A: AngleSender + Send + Sync + 'static,
{
    let display_task = tokio::task::spawn_blocking(move || {
        run_display_loop(&mut source, &mut display, &detector, calibration.as_ref(), &stop)
    });

    let servo_task = tokio::spawn(async move {
        match actuator {
            Some((sender, movements, delay)) => {
                Some(run_servo_sequence(&sender, &movements, delay).await)
            }
            None => None,
        }
    });

    let (display, servo) = futures::future::join(display_task, servo_task).await;
    Ok(RunSummary {
        display: display?,
        servo: servo?,
    })
}
