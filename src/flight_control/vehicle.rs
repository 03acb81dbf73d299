use super::{camera_state::CameraAngle, flight_state::FlightState};
use crate::http_handler::{CommunicationSlot, HTTPError};
use crate::objective::ZonedObjective;
use crate::util::Vec2D;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// A read-only snapshot of the vehicle state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Telemetry {
    pos: Vec2D<f64>,
    vel: Vec2D<f64>,
    state: FlightState,
    angle: CameraAngle,
    battery: f64,
    max_battery: f64,
    fuel: f64,
    timestamp: DateTime<Utc>,
}

impl Telemetry {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        pos: Vec2D<f64>,
        vel: Vec2D<f64>,
        state: FlightState,
        angle: CameraAngle,
        battery: f64,
        max_battery: f64,
        fuel: f64,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self { pos: pos.wrap_around_map(), vel, state, angle, battery, max_battery, fuel, timestamp }
    }

    pub fn pos(&self) -> Vec2D<f64> { self.pos }
    pub fn vel(&self) -> Vec2D<f64> { self.vel }
    pub fn state(&self) -> FlightState { self.state }
    pub fn angle(&self) -> CameraAngle { self.angle }
    pub fn battery(&self) -> f64 { self.battery }
    pub fn max_battery(&self) -> f64 { self.max_battery }
    pub fn fuel(&self) -> f64 { self.fuel }
    pub fn timestamp(&self) -> DateTime<Utc> { self.timestamp }
}

/// Classified answer to a beacon position submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BeaconSubmitResult {
    /// The guess was within range of the beacon.
    Found,
    /// The guess missed, another attempt is allowed.
    NotFound,
    /// The guess missed and no attempts are left.
    Exhausted,
    /// Any other answer, treated as terminal.
    Unknown(String),
}

impl BeaconSubmitResult {
    /// Classifies the free-text status returned by the backend.
    pub fn classify(status: &str) -> Self {
        let lower = status.to_lowercase();
        if lower.contains("no more rescue attempts") || lower.contains("last") {
            BeaconSubmitResult::Exhausted
        } else if lower.contains("could not be found") || lower.contains("not found") {
            BeaconSubmitResult::NotFound
        } else if lower.contains("found") {
            BeaconSubmitResult::Found
        } else {
            BeaconSubmitResult::Unknown(status.to_string())
        }
    }
}

/// Time window of a beacon objective listed by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BeaconWindow {
    pub id: usize,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

/// Currently listed objectives.
#[derive(Debug, Clone, Default)]
pub struct ObjectiveList {
    pub zoned: Vec<ZonedObjective>,
    pub beacons: Vec<BeaconWindow>,
}

/// The narrow telemetry and actuation interface of the vehicle.
///
/// Only the commander and its resource governor issue commands. Listeners are restricted
/// to [`Vehicle::read_telemetry`] and [`Vehicle::list_objectives`].
#[async_trait]
pub trait Vehicle: Send + Sync {
    /// Reads the current state. Transient failures are retried internally.
    async fn read_telemetry(&self) -> Telemetry;
    /// Requests a mode, velocity and lens. The effect must be confirmed via telemetry.
    async fn command(
        &self,
        state: FlightState,
        vel: Vec2D<f64>,
        angle: CameraAngle,
    ) -> Result<(), HTTPError>;
    /// Captures a photo with the current lens and returns the encoded image.
    async fn capture_image(&self) -> Result<Vec<u8>, HTTPError>;
    async fn list_slots(&self) -> Result<Vec<CommunicationSlot>, HTTPError>;
    async fn book_slot(&self, slot_id: usize, enabled: bool) -> Result<(), HTTPError>;
    async fn list_objectives(&self) -> Result<ObjectiveList, HTTPError>;
    async fn submit_beacon(
        &self,
        beacon_id: usize,
        guess: Vec2D<f64>,
    ) -> Result<BeaconSubmitResult, HTTPError>;
    async fn submit_objective_image(&self, objective_id: usize, png: Vec<u8>) -> Result<(), HTTPError>;
}
