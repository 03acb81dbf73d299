use crate::flight_control::Telemetry;
use strum_macros::Display;

/// Priority of the work a wait is performed for. A wait yields to any strictly higher
/// priority that becomes pending.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Priority {
    Scan,
    Objective,
    Beacon,
}

/// How a polled hold ended.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq)]
pub enum HoldExit {
    Elapsed,
    Preempted,
}

/// Result of flying to a target.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NavOutcome {
    /// The predicted rendezvous time passed; carries the telemetry read on arrival.
    Arrived(Telemetry),
    Preempted,
    /// No velocity or rendezvous time could be found for the target.
    Unreachable,
}
