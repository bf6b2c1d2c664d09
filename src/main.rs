// Offline runner: detects markers in a directory of still frames, writes the debug
// images to disk and walks the servo sequence alongside. The live camera version
// with on-screen windows is the `marker_viewer` crate.

use clap::Parser;
use dot_vision::actuator::HttpActuator;
use dot_vision::runtime::{run_concurrently, stop_signal};
use dot_vision::snapshot::SnapshotSink;
use dot_vision::sources::ImageSequenceSource;
use dot_vision::{AngleCalibration, MarkerDetector, TrackerConfig};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "dot_vision")]
#[command(about = "Detect dark dots in still frames and walk the servo sequence")]
#[command(version)]
struct Cli {
    /// JSON configuration file. Missing fields keep their defaults.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Directory of input frames (png, jpg, bmp, tif), processed in name order.
    #[arg(long)]
    frames: PathBuf,

    /// Directory the annotated frames and masks are written to.
    #[arg(long, default_value = "snapshots")]
    snapshots: PathBuf,

    /// Override the servo controller address.
    #[arg(long)]
    actuator_url: Option<String>,

    /// Do not send any servo commands.
    #[arg(long)]
    no_actuator: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let mut config = match &cli.config {
        Some(path) => TrackerConfig::from_file(path)?,
        None => TrackerConfig::default(),
    };
    if let Some(url) = cli.actuator_url {
        config.actuator.base_url = url;
    }
    config.validate()?;

    let detector = MarkerDetector::new(config.detector.clone())?;
    let calibration = AngleCalibration::new(config.calibration.clone());
    let source = ImageSequenceSource::open_dir(&cli.frames)?;
    let sink = SnapshotSink::new(&cli.snapshots)?;

    let actuator = if cli.no_actuator {
        None
    } else {
        Some((
            HttpActuator::from_config(&config.actuator)?,
            config.actuator.movements.clone(),
            config.actuator.step_delay(),
        ))
    };

    let (stop_handle, stop_token) = stop_signal();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("interrupt received, stopping display loop");
            stop_handle.stop();
        }
    });

    let summary = run_concurrently(
        source,
        sink,
        detector,
        Some(calibration),
        stop_token,
        actuator,
    )
    .await?;
    info!(
        frames = summary.display.frames_processed,
        skipped = summary.display.frames_skipped,
        markers = summary.display.markers_seen,
        "finished all operations"
    );
    if let Some(servo) = summary.servo {
        info!(sent = servo.sent, failed = servo.failed, "servo sequence complete");
    }
    Ok(())
}
