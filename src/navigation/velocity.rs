use crate::util::{MAP_HEIGHT, MAP_WIDTH, Vec2D};
use strum_macros::Display;

/// Hard velocity bounds per axis while the vehicle is active.
pub const MIN_VEL: f64 = 3.0;
pub const MAX_VEL: f64 = 71.0;

/// Upper bound on window widenings; the window spans `[3, 71]` on both axes long before this.
const MAX_WIDEN: i32 = 71;
/// Upper bound on wrapped target copies tried per axis for one window.
const MAX_WRAP_COPIES: usize = 64;

#[derive(Debug, Display, PartialEq, Eq)]
pub enum VelocityError {
    Unreachable,
}

/// Velocity reaching a target together with the straight-line distance flown.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VelocitySolution {
    vel: Vec2D<f64>,
    distance: f64,
}

impl VelocitySolution {
    pub fn vel(&self) -> Vec2D<f64> { self.vel }
    pub fn distance(&self) -> f64 { self.distance }

    /// Seconds of flight at [`VelocitySolution::vel`] until the target is reached.
    pub fn travel_time(&self) -> f64 { self.distance / self.vel.abs() }
}

/// Lower bounds of the integer search window around the current velocity.
struct SearchWindow {
    vx_min: f64,
    vy_min: f64,
    speed: f64,
}

impl SearchWindow {
    fn new(vel: Vec2D<f64>, offset: i32) -> Self {
        #[allow(clippy::cast_possible_truncation)]
        let floor = |v: f64| f64::from((v.trunc() as i32).saturating_sub(offset)).max(MIN_VEL);
        Self { vx_min: floor(vel.x()), vy_min: floor(vel.y()), speed: vel.abs().min(MAX_VEL) }
    }
}

/// Finds a velocity in `[3, 71]²` whose straight trajectory from `pos` hits `target` modulo wrap.
///
/// The speed of the current velocity is kept and only its direction changes. Wrapped copies
/// of the target further away are tried when the direction violates the window, and the window
/// around the current velocity is widened by one unit per round.
pub fn find_velocity(
    pos: Vec2D<f64>,
    vel: Vec2D<f64>,
    target: Vec2D<f64>,
) -> Result<VelocitySolution, VelocityError> {
    let vel = nudge_slow(vel);
    let pos = pos.wrap_around_map();
    let target = target.wrap_around_map();
    for offset in 1..=MAX_WIDEN {
        let window = SearchWindow::new(vel, offset);
        if let Some(sol) = solve_in_window(pos, target, &window) {
            if in_bounds(sol.vel) {
                return Ok(sol);
            }
        }
    }
    Err(VelocityError::Unreachable)
}

/// Lifts a velocity too slow for both axes to stay above the minimum.
fn nudge_slow(vel: Vec2D<f64>) -> Vec2D<f64> {
    let (vx, vy) = (vel.x().clamp(MIN_VEL, MAX_VEL), vel.y().clamp(MIN_VEL, MAX_VEL));
    if vx < MIN_VEL + 0.5 && vy < MIN_VEL + 0.5 {
        if vx >= vy { Vec2D::new(MIN_VEL + 1.0, vy) } else { Vec2D::new(vx, MIN_VEL + 1.0) }
    } else {
        Vec2D::new(vx, vy)
    }
}

fn in_bounds(v: Vec2D<f64>) -> bool {
    (MIN_VEL..=MAX_VEL).contains(&v.x()) && (MIN_VEL..=MAX_VEL).contains(&v.y())
}

/// Velocity of length `speed` pointing at the positive offset `delta`.
fn aim(delta: Vec2D<f64>, speed: f64) -> Vec2D<f64> {
    let angle = (delta.y() / delta.x()).atan();
    Vec2D::new(speed * angle.cos(), speed * angle.sin())
}

fn solve_in_window(pos: Vec2D<f64>, target: Vec2D<f64>, window: &SearchWindow) -> Option<VelocitySolution> {
    let (w, h) = (f64::from(MAP_WIDTH), f64::from(MAP_HEIGHT));
    // Nearest copy of the target strictly ahead on both axes.
    let mut dx = Vec2D::<f64>::wrap_coordinate(target.x() - pos.x(), w);
    let mut dy = Vec2D::<f64>::wrap_coordinate(target.y() - pos.y(), h);
    if dx == 0.0 {
        dx = w;
    }
    if dy == 0.0 {
        dy = h;
    }
    let mut v = aim(Vec2D::new(dx, dy), window.speed);
    let mut copies = 0;
    while v.x() < window.vx_min && copies < MAX_WRAP_COPIES {
        dx += w;
        v = aim(Vec2D::new(dx, dy), window.speed);
        copies += 1;
    }
    copies = 0;
    while v.y() < window.vy_min && copies < MAX_WRAP_COPIES {
        dy += h;
        v = aim(Vec2D::new(dx, dy), window.speed);
        copies += 1;
    }
    if v.x() < window.vx_min || v.y() < window.vy_min {
        return None;
    }
    Some(VelocitySolution { vel: v, distance: dx.hypot(dy) })
}
