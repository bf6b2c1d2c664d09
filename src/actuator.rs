// THEORY:
// The actuator side of the demo is deliberately dumb. A fixed list of angle pairs
// is walked once, each pair is sent to the servo controller as an HTTP GET, and the
// walker sleeps a fixed delay after every step. It never looks at what the camera
// sees.
//
// Failure policy: a rejected or failed command is logged and the walk moves on.
// There is no retry, no backoff and no way to cancel the walk once started.

use crate::calibration::ServoAngles;
use crate::config::ActuatorConfig;
use crate::error::VisionError;
use reqwest::StatusCode;
use std::future::Future;
use std::time::Duration;
use tracing::{error, info, warn};

/// Anything that can deliver an angle command to the mechanism.
pub trait AngleSender {
    fn send_angles(
        &self,
        angles: ServoAngles,
    ) -> impl Future<Output = Result<(), VisionError>> + Send;
}

/// Servo controller reached over plain HTTP: `GET {base_url}/set?base=..&joint=..`.
#[derive(Debug, Clone)]
pub struct HttpActuator {
    client: reqwest::Client,
    base_url: String,
}

impl HttpActuator {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, VisionError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Ok(Self { client, base_url })
    }

    pub fn from_config(config: &ActuatorConfig) -> Result<Self, VisionError> {
        Self::new(config.base_url.clone(), config.request_timeout())
    }

    pub fn command_url(&self) -> String {
        format!("{}/set", self.base_url)
    }
}

impl AngleSender for HttpActuator {
    async fn send_angles(&self, angles: ServoAngles) -> Result<(), VisionError> {
        let response = self
            .client
            .get(self.command_url())
            .query(&[("base", angles.base), ("joint", angles.joint)])
            .send()
            .await?;

        match response.status() {
            StatusCode::OK => Ok(()),
            status => Err(VisionError::ActuatorRejected {
                status: status.as_u16(),
            }),
        }
    }
}

/// Outcome of one walk through the movement list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SequenceSummary {
    pub sent: usize,
    pub failed: usize,
}

/// Sends every movement in order, sleeping `step_delay` after each one.
pub async fn run_servo_sequence<S: AngleSender>(
    sender: &S,
    movements: &[ServoAngles],
    step_delay: Duration,
) -> SequenceSummary {
    let mut summary = SequenceSummary::default();

    for angles in movements {
        info!(base = angles.base, joint = angles.joint, "moving servos");
        match sender.send_angles(*angles).await {
            Ok(()) => {
                info!("servo angles updated");
                summary.sent += 1;
            }
            Err(VisionError::ActuatorRejected { status }) => {
                warn!(status, "servo controller rejected the command");
                summary.failed += 1;
            }
            Err(e) => {
                error!("error sending angles to servo controller: {}", e);
                summary.failed += 1;
            }
        }
        tokio::time::sleep(step_delay).await;
    }

    summary
}
