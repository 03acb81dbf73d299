use super::{
    camera_state::CameraAngle,
    flight_state::FlightState,
    vehicle::{Telemetry, Vehicle},
};
use crate::util::Vec2D;
use crate::error;
use std::{sync::Arc, time::Duration};
use strum_macros::Display;
use tokio_util::sync::CancellationToken;

/// Reason a polled wait stopped before its exit condition held.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq)]
pub enum WaitError {
    /// The shared cancellation token fired.
    Cancelled,
}

impl std::error::Error for WaitError {}

/// Single writer in front of the [`Vehicle`].
///
/// Every wait in the crate is a poll loop built on [`FlightComputer::tick`], so the poll period
/// bounds the latency of noticing preemption, anomalies and cancellation.
#[derive(Clone)]
pub struct FlightComputer {
    /// The vehicle all commands go to.
    vehicle: Arc<dyn Vehicle>,
    /// Poll period of every wait.
    poll: Duration,
    /// Cancels all pending waits.
    c_tok: CancellationToken,
}

impl FlightComputer {
    pub fn new(vehicle: Arc<dyn Vehicle>, poll: Duration, c_tok: CancellationToken) -> Self {
        Self { vehicle, poll, c_tok }
    }

    pub fn vehicle(&self) -> &Arc<dyn Vehicle> { &self.vehicle }
    pub fn poll(&self) -> Duration { self.poll }
    pub fn cancel_token(&self) -> &CancellationToken { &self.c_tok }

    /// Reads a fresh telemetry snapshot.
    pub async fn current(&self) -> Telemetry { self.vehicle.read_telemetry().await }

    /// Issues a command. Failures are logged and reported as `false`; callers confirm the
    /// effect through telemetry anyway.
    pub async fn command(&self, state: FlightState, vel: Vec2D<f64>, angle: CameraAngle) -> bool {
        match self.vehicle.command(state, vel, angle).await {
            Ok(()) => true,
            Err(e) => {
                error!("Command {state} {vel} {angle} failed: {e}");
                false
            }
        }
    }

    /// Sleeps one poll period unless cancelled first.
    pub async fn tick(&self) -> Result<(), WaitError> {
        tokio::select! {
            () = self.c_tok.cancelled() => Err(WaitError::Cancelled),
            () = tokio::time::sleep(self.poll) => Ok(()),
        }
    }

    /// Polls telemetry until `done` holds and returns the satisfying snapshot.
    pub async fn wait_for<F>(&self, done: F) -> Result<Telemetry, WaitError>
    where F: Fn(&Telemetry) -> bool + Send {
        loop {
            let t = self.current().await;
            if done(&t) {
                return Ok(t);
            }
            self.tick().await?;
        }
    }
}
