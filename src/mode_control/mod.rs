//! The scheduling state machine: beacon service preempts objective service preempts the
//! background coverage sweep, re-evaluated at every suspension point.

mod beacon_service;
mod commander;
mod commander_state;
mod mode_context;
mod objective_service;
mod scan_service;
mod signal;

pub use beacon_service::BeaconOutcome;
pub use commander::MissionCommander;
pub use commander_state::CommanderState;
pub use mode_context::ModeContext;
pub use objective_service::ObjectiveOutcome;
pub use signal::{HoldExit, NavOutcome, Priority};
