mod camera_state;
mod flight_computer;
mod flight_state;
mod resource_governor;
mod supervisor;
mod vehicle;

#[cfg(test)]
pub(crate) mod mock_vehicle;

pub use camera_state::CameraAngle;
pub use flight_computer::{FlightComputer, WaitError};
pub use flight_state::FlightState;
pub use resource_governor::{GovernorAction, Interrupt, ResourceGovernor, Uninterruptible};
pub use supervisor::Supervisor;
pub use vehicle::{BeaconSubmitResult, BeaconWindow, ObjectiveList, Telemetry, Vehicle};
