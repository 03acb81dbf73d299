#![allow(clippy::similar_names)]
#![warn(clippy::shadow_reuse, clippy::shadow_same, clippy::builtin_type_shadow)]
//! MELVIN's onboard mission commander.
//!
//! The library hosts everything both binaries need: the vehicle interface and its
//! HTTP transport, the persistent coverage map, the navigation solvers, beacon
//! localization, the background task detectors, the scheduling commander and the
//! crash recovery path that hands off to the `safety-fallback` process.

pub mod logger;
pub mod config;
pub mod util;
pub mod http_handler;
pub mod flight_control;
pub mod imaging;
pub mod navigation;
pub mod objective;
pub mod mode_control;
pub mod recovery;
