// Live viewer: reads the phone camera stream, shows the detected dots and the mask
// in two windows and walks the servo sequence at the same time. Press `q` in either
// window to stop the display; the servo walk always runs to its end.

mod opencv_io;

use clap::Parser;
use dot_vision::actuator::HttpActuator;
use dot_vision::runtime::{run_concurrently, stop_signal};
use dot_vision::{AngleCalibration, MarkerDetector, TrackerConfig};
use opencv_io::{HighGuiSink, OpenCvStreamSource};
use std::path::PathBuf;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "marker_viewer")]
#[command(about = "Show dark dots found in a live camera stream")]
struct Cli {
    /// JSON configuration file. Missing fields keep their defaults.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override the camera stream URL.
    #[arg(long)]
    stream_url: Option<String>,

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
    if let Some(url) = cli.stream_url {
        config.stream.url = url;
    }
    if let Some(url) = cli.actuator_url {
        config.actuator.base_url = url;
    }
    config.validate()?;

    let detector = MarkerDetector::new(config.detector.clone())?;
    let calibration = AngleCalibration::new(config.calibration.clone());

    let source = match OpenCvStreamSource::open(&config.stream.url) {
        Ok(source) => source,
        Err(e) => {
            error!("cannot open camera stream: {}", e);
            return Err(e.into());
        }
    };
    info!(url = %config.stream.url, "camera stream opened");
    let sink = HighGuiSink::new()?;

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
        markers = summary.display.markers_seen,
        exit = ?summary.display.exit,
        "finished all operations"
    );
    Ok(())
}
