//! Pure navigation helpers: picking a reachable velocity towards a target and predicting when
//! a constant-velocity trajectory passes a target on the torus.

mod rendezvous;
mod velocity;

pub use rendezvous::{crossing_windows, rendezvous_time};
pub use velocity::{MAX_VEL, MIN_VEL, VelocityError, VelocitySolution, find_velocity};

#[cfg(test)]
mod tests;
