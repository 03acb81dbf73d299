use std::time::Duration;
use strum_macros::Display;

/// Operating modes reported by the vehicle.
#[derive(Debug, Display, PartialEq, Eq, Clone, Copy, Hash)]
pub enum FlightState {
    Deployment,
    Transition,
    Acquisition,
    Charge,
    Comms,
    Safe,
}

impl FlightState {
    /// Nominal duration of a commanded switch between two regular modes.
    pub const NOMINAL_TRANSITION: Duration = Duration::from_secs(180);
    /// Duration of leaving safe mode.
    pub const SAFE_EXIT_TRANSITION: Duration = Duration::from_secs(1200);

    /// Whether the vehicle can be commanded into this mode.
    pub fn is_commandable(self) -> bool {
        matches!(self, FlightState::Acquisition | FlightState::Charge | FlightState::Comms)
    }

    /// Returns the expected duration of a switch from `self` into `to`.
    pub fn transition_time(self, to: FlightState) -> Duration {
        if self == FlightState::Safe {
            Self::SAFE_EXIT_TRANSITION
        } else if self == to {
            Duration::ZERO
        } else {
            Self::NOMINAL_TRANSITION
        }
    }
}

impl TryFrom<&str> for FlightState {
    type Error = String;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.to_lowercase().as_str() {
            "deployment" => Ok(FlightState::Deployment),
            "transition" => Ok(FlightState::Transition),
            "acquisition" => Ok(FlightState::Acquisition),
            "charge" => Ok(FlightState::Charge),
            "communication" | "comms" => Ok(FlightState::Comms),
            "safe" => Ok(FlightState::Safe),
            other => Err(format!("unknown flight state '{other}'")),
        }
    }
}

impl From<FlightState> for &'static str {
    fn from(value: FlightState) -> Self {
        match value {
            FlightState::Deployment => "deployment",
            FlightState::Transition => "transition",
            FlightState::Acquisition => "acquisition",
            FlightState::Charge => "charge",
            FlightState::Comms => "communication",
            FlightState::Safe => "safe",
        }
    }
}
