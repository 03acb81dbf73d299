use strum_macros::Display;

/// Coarse state of the [`super::MissionCommander`], re-derived on every loop iteration.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq)]
pub enum CommanderState {
    Bootstrapping,
    Scanning,
    ServicingObjective,
    ServicingBeacon,
    /// Set once the commander loop has ended and the map is being persisted.
    Recovering,
}
