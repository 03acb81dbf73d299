use crate::util::{MAP_HEIGHT, MAP_WIDTH, Vec2D};

/// Number of future wrap crossings enumerated per axis.
const HORIZON_PERIODS: i32 = 100;

/// Time windows `[start, end]` with `start >= 0` during which one axis is within `tol` of
/// `target` under wraparound, sorted ascending.
///
/// A resting axis yields `[0, ∞)` if it already lies within tolerance and nothing otherwise.
pub fn crossing_windows(pos: f64, vel: f64, target: f64, size: f64, tol: f64) -> Vec<(f64, f64)> {
    if vel == 0.0 {
        let off = Vec2D::<f64>::wrapped_delta(pos, target, size).abs();
        return if off <= tol { vec![(0.0, f64::INFINITY)] } else { Vec::new() };
    }
    let speed = vel.abs();
    // Distance still to travel in the direction of motion until the first exact crossing.
    let ahead = Vec2D::<f64>::wrap_coordinate((target - pos) * vel.signum(), size);
    let dt = tol / speed;
    (-1..=HORIZON_PERIODS)
        .map(|k| (ahead + f64::from(k) * size) / speed)
        .filter(|t| t + dt >= 0.0)
        .map(|t| ((t - dt).max(0.0), t + dt))
        .collect()
}

/// Earliest `t >= 0` at which `pos + vel·t` lies within `tol` of `target` on both axes, or
/// `f64::INFINITY` if no such time exists within the enumerated horizon.
pub fn rendezvous_time(pos: Vec2D<f64>, vel: Vec2D<f64>, target: Vec2D<f64>, tol: f64) -> f64 {
    let xs = crossing_windows(pos.x(), vel.x(), target.x(), f64::from(MAP_WIDTH), tol);
    let ys = crossing_windows(pos.y(), vel.y(), target.y(), f64::from(MAP_HEIGHT), tol);
    let (mut i, mut j) = (0, 0);
    while i < xs.len() && j < ys.len() {
        let (x_start, x_end) = xs[i];
        let (y_start, y_end) = ys[j];
        let start = x_start.max(y_start);
        if start <= x_end.min(y_end) {
            return start;
        }
        if x_end < y_end {
            i += 1;
        } else {
            j += 1;
        }
    }
    f64::INFINITY
}
