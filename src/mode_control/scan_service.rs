use super::{commander::MissionCommander, signal::Priority};
use crate::flight_control::{CameraAngle, FlightState, ResourceGovernor, WaitError};
use crate::imaging::CoverageMap;
use crate::navigation::find_velocity;
use crate::util::{MAP_HEIGHT, MAP_WIDTH, Vec2D};
use crate::{info, log, warn};
use itertools::iproduct;

impl MissionCommander {
    /// Lens used for background coverage.
    pub(super) const SCAN_ANGLE: CameraAngle = CameraAngle::Wide;
    /// Grid spacing of low-coverage target candidates.
    const TARGET_GRID_STEP: usize = 500;
    /// Half side of the window whose vacancy rates a candidate.
    const VACANCY_HALF: i32 = 500;
    /// Sampling stride inside the vacancy window.
    const VACANCY_STRIDE: usize = 25;

    /// Number of one-second trajectory samples covering a full pass over the map.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn trajectory_steps(vel: Vec2D<f64>) -> usize {
        let steps = |size: u32, v: f64| (f64::from(size) / v.abs().max(1.0)).round() as usize;
        steps(MAP_WIDTH, vel.x()).max(steps(MAP_HEIGHT, vel.y())).max(1)
    }

    /// First unphotographed cell along the trajectory and the number of seconds until it is
    /// reached.
    #[allow(clippy::cast_precision_loss, clippy::cast_sign_loss)]
    pub fn first_unset_on_trajectory(
        map: &CoverageMap,
        pos: Vec2D<f64>,
        vel: Vec2D<f64>,
    ) -> Option<(usize, Vec2D<f64>)> {
        (1..=Self::trajectory_steps(vel))
            .map(|k| (k, (pos + vel * k as f64).to_cell()))
            .find(|(_, c)| !map.is_set(c.x() as u32, c.y() as u32))
            .map(|(k, c)| (k, c.to_f64()))
    }

    /// First grid cell that is unphotographed and whose surrounding window is at least as
    /// vacant as the whole map.
    #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
    pub fn low_coverage_target(map: &CoverageMap) -> Option<Vec2D<f64>> {
        let global_vacant = 1.0 - map.coverage_fraction();
        if global_vacant <= 0.0 {
            return None;
        }
        iproduct!(
            (0..MAP_WIDTH).step_by(Self::TARGET_GRID_STEP),
            (0..MAP_HEIGHT).step_by(Self::TARGET_GRID_STEP)
        )
        .filter(|(x, y)| !map.is_set(*x, *y))
        .find(|(x, y)| {
            map.vacant_fraction_around(*x as i32, *y as i32, Self::VACANCY_HALF, Self::VACANCY_STRIDE)
                >= global_vacant
        })
        .map(|(x, y)| Vec2D::new(f64::from(x), f64::from(y)))
    }

    /// One bounded round of background coverage.
    ///
    /// Photographs when the footprint under the vehicle still has unset cells, sleeps through
    /// long stretches over covered ground and retargets once the trajectory is exhausted.
    pub(super) async fn scan_step(&mut self) -> Result<(), WaitError> {
        let floor = ResourceGovernor::SCAN_FLOOR;
        self.gov.guard(floor, Self::SCAN_ANGLE, FlightState::Acquisition).await?;
        let mut t = self.fc().current().await;
        if t.state() != FlightState::Acquisition || t.angle() != Self::SCAN_ANGLE {
            t = self.gov.drive_to_state(FlightState::Acquisition, None, Self::SCAN_ANGLE).await?;
        }
        let cell = t.pos().to_cell();
        if self.map.window_has_unset(cell.x(), cell.y(), t.angle()) {
            self.take_photo().await;
            return self.fc().tick().await;
        }
        match Self::first_unset_on_trajectory(&self.map, t.pos(), t.vel()) {
            Some((steps, target)) => {
                #[allow(clippy::cast_precision_loss)]
                let eta = Self::eta(t.pos(), t.vel(), target).unwrap_or(steps as f64);
                if eta >= Self::SLEEP_THROUGH_MIN {
                    self.sleep_through(eta, Self::SCAN_ANGLE, floor, Priority::Scan).await?;
                    Ok(())
                } else {
                    self.fc().tick().await
                }
            }
            None => {
                let Some(target) = Self::low_coverage_target(&self.map) else {
                    log!("No uncovered target left, idling");
                    return self.fc().tick().await;
                };
                match find_velocity(t.pos(), t.vel(), target) {
                    Ok(sol) => {
                        info!("Trajectory exhausted, retargeting to {target} with {}", sol.vel());
                        self.set_vel_hold(sol.vel(), Self::SCAN_ANGLE, floor, Priority::Scan).await?;
                        Ok(())
                    }
                    Err(e) => {
                        warn!("Cannot retarget to {target}: {e}");
                        self.fc().tick().await
                    }
                }
            }
        }
    }
}
