//! Process-level fault handling.
//!
//! A fault is never repaired in place: the primary process secures the vehicle and the
//! coverage map, then hands off to the `safety-fallback` binary and exits.

mod crash_recovery;
mod fault;

pub use crash_recovery::CrashRecovery;
pub use fault::{Fault, FaultKind};

#[cfg(test)]
mod tests;
