use super::{
    commander_state::CommanderState,
    mode_context::{ModeContext, Preemption},
    signal::{HoldExit, NavOutcome, Priority},
};
use crate::config::CommanderConfig;
use crate::flight_control::{
    CameraAngle, FlightComputer, FlightState, ResourceGovernor, Uninterruptible, WaitError,
};
use crate::imaging::{CoverageMap, ImageSink, capture_file_name};
use crate::logger::AuditLog;
use crate::navigation::{find_velocity, rendezvous_time};
use crate::util::Vec2D;
use crate::{error, event, info, log, obj, warn};
use std::{fs, path::PathBuf, time::Duration};
use tokio::time::Instant;

/// Top-level scheduler owning the coverage map, the objective queue and the vehicle.
///
/// Every blocking wait is a [`MissionCommander::hold`] that polls for preemption, anomalies
/// and the battery floor on each tick.
pub struct MissionCommander {
    pub(super) gov: ResourceGovernor,
    pub(super) ctx: ModeContext,
    pub(super) map: CoverageMap,
    pub(super) audit: AuditLog,
    pub(super) config: CommanderConfig,
    pub(super) sink: ImageSink,
    state: CommanderState,
}

impl MissionCommander {
    /// Velocity commanded when the vehicle starts outside the valid velocity range.
    const INITIAL_VEL: Vec2D<f64> = Vec2D::new(8.0, 8.0);
    /// Rendezvous tolerances tried in order until one yields a finite time.
    const MIN_TOLERANCE: u32 = 20;
    const MAX_TOLERANCE: u32 = 100;
    const TOLERANCE_STEP: usize = 5;
    /// Targets at least this many seconds away are slept through in charge mode.
    pub(super) const SLEEP_THROUGH_MIN: f64 = 360.0;
    /// Seconds before arrival at which acquisition is restored after sleeping through.
    pub(super) const WAKE_AHEAD: f64 = 180.0;
    const MAP_SAVE_INTERVAL: Duration = Duration::from_secs(600);

    pub fn new(
        fc: FlightComputer,
        ctx: ModeContext,
        map: CoverageMap,
        audit: AuditLog,
        config: CommanderConfig,
        sink: ImageSink,
    ) -> Self {
        Self {
            gov: ResourceGovernor::new(fc),
            ctx,
            map,
            audit,
            config,
            sink,
            state: CommanderState::Bootstrapping,
        }
    }

    pub fn map(&self) -> &CoverageMap { &self.map }
    pub fn state(&self) -> CommanderState { self.state }
    pub fn context(&self) -> &ModeContext { &self.ctx }
    pub(super) fn fc(&self) -> &FlightComputer { self.gov.fc() }

    /// Runs the scheduling loop until the cancellation token fires, then persists the map.
    pub async fn run(&mut self) {
        let Err(WaitError::Cancelled) = self.run_loop().await;
        info!("Commander loop cancelled in state {}", self.state);
        self.state = CommanderState::Recovering;
        self.persist_map();
    }

    async fn run_loop(&mut self) -> Result<std::convert::Infallible, WaitError> {
        self.bootstrap().await?;
        let mut last_save = Instant::now();
        loop {
            let next = self.next_state().await;
            if next != self.state {
                log!("Commander state {} -> {next}", self.state);
                self.state = next;
            }
            match next {
                CommanderState::ServicingBeacon => {
                    if let Some(id) = self.ctx.board().active_id().await {
                        let outcome = self.serve_beacon(id).await?;
                        obj!("Beacon {id} service ended: {outcome}");
                    }
                }
                CommanderState::ServicingObjective => {
                    if let Some(progress) = self.ctx.pop_objective() {
                        let id = progress.objective().id();
                        let outcome = self.serve_objective(progress).await?;
                        obj!("Objective {id} service ended: {outcome}");
                    }
                }
                _ => self.scan_step().await?,
            }
            if last_save.elapsed() >= Self::MAP_SAVE_INTERVAL {
                self.persist_map();
                last_save = Instant::now();
            }
        }
    }

    async fn bootstrap(&mut self) -> Result<(), WaitError> {
        self.state = CommanderState::Bootstrapping;
        let t = self
            .gov
            .guard(ResourceGovernor::SCAN_FLOOR, Self::SCAN_ANGLE, FlightState::Acquisition)
            .await?
            .telemetry();
        info!(
            "Bootstrapping at {} in {} with {:.1}% coverage",
            t.pos(),
            t.state(),
            self.map.coverage_fraction() * 100.0
        );
        let vel_ok = |v: f64| (crate::navigation::MIN_VEL..=crate::navigation::MAX_VEL).contains(&v);
        if !vel_ok(t.vel().x()) || !vel_ok(t.vel().y()) {
            self.gov
                .set_vel_wait(
                    Self::INITIAL_VEL,
                    Self::SCAN_ANGLE,
                    ResourceGovernor::SCAN_FLOOR,
                    &mut Uninterruptible,
                )
                .await?;
        } else if t.state() != FlightState::Acquisition {
            self.gov.drive_to_state(FlightState::Acquisition, None, Self::SCAN_ANGLE).await?;
        }
        Ok(())
    }

    /// Strict priority: active beacon, then queued objectives, then scanning.
    pub async fn next_state(&mut self) -> CommanderState {
        self.ctx.drain_objectives();
        if self.ctx.board().is_active().await {
            CommanderState::ServicingBeacon
        } else if self.ctx.has_objectives() {
            CommanderState::ServicingObjective
        } else {
            CommanderState::Scanning
        }
    }

    /// Polls for `secs` seconds in `mode`, yielding early to higher-priority work.
    ///
    /// The battery floor and safe-mode checks run on every tick.
    pub(super) async fn hold(
        &mut self,
        secs: f64,
        mode: FlightState,
        angle: CameraAngle,
        floor: f64,
        at: Priority,
    ) -> Result<HoldExit, WaitError> {
        let until = Instant::now() + Self::secs(secs);
        loop {
            if self.ctx.preempts(at).await {
                return Ok(HoldExit::Preempted);
            }
            if Instant::now() >= until {
                return Ok(HoldExit::Elapsed);
            }
            self.gov.guard(floor, angle, mode).await?;
            self.fc().tick().await?;
        }
    }

    fn secs(secs: f64) -> Duration {
        Duration::from_secs_f64(if secs.is_finite() { secs.max(0.0) } else { 0.0 })
    }

    /// Earliest rendezvous with `target` from `pos` at `vel`, widening the tolerance until a
    /// finite time exists.
    pub(super) fn eta(pos: Vec2D<f64>, vel: Vec2D<f64>, target: Vec2D<f64>) -> Option<f64> {
        (Self::MIN_TOLERANCE..=Self::MAX_TOLERANCE)
            .step_by(Self::TOLERANCE_STEP)
            .map(|tol| rendezvous_time(pos, vel, target, f64::from(tol)))
            .find(|eta| eta.is_finite())
    }

    /// [`ResourceGovernor::set_vel_wait`] that gives up the ramp to higher-priority work.
    pub(super) async fn set_vel_hold(
        &mut self,
        vel: Vec2D<f64>,
        angle: CameraAngle,
        floor: f64,
        at: Priority,
    ) -> Result<HoldExit, WaitError> {
        let mut irq = Preemption { ctx: &mut self.ctx, at };
        match self.gov.set_vel_wait(vel, angle, floor, &mut irq).await? {
            Some(_) => Ok(HoldExit::Elapsed),
            None => {
                log!("Velocity change to {vel} preempted");
                Ok(HoldExit::Preempted)
            }
        }
    }

    /// Charges until [`Self::WAKE_AHEAD`] seconds before `eta`, then restores acquisition with
    /// the velocity held before.
    ///
    /// A preempted charge is left as is; the preempting service picks its own mode.
    pub(super) async fn sleep_through(
        &mut self,
        eta: f64,
        angle: CameraAngle,
        floor: f64,
        at: Priority,
    ) -> Result<HoldExit, WaitError> {
        let vel = self.fc().current().await.vel();
        info!("Next target {eta:.0}s away, charging until shortly before arrival");
        self.gov.drive_to_state(FlightState::Charge, None, angle).await?;
        if self.hold(eta - Self::WAKE_AHEAD, FlightState::Charge, angle, floor, at).await?
            == HoldExit::Preempted
        {
            return Ok(HoldExit::Preempted);
        }
        self.set_vel_hold(vel, angle, floor, at).await
    }

    /// Sets a velocity reaching `target` and waits until the trajectory passes it.
    ///
    /// Arrival is timed from the commanded velocity, not from the one read while the vehicle
    /// was still ramping.
    pub(super) async fn navigate_to(
        &mut self,
        target: Vec2D<f64>,
        angle: CameraAngle,
        floor: f64,
        at: Priority,
    ) -> Result<NavOutcome, WaitError> {
        let t = self.fc().current().await;
        let sol = match find_velocity(t.pos(), t.vel(), target) {
            Ok(sol) => sol,
            Err(e) => {
                warn!("No velocity from {} towards {target}: {e}", t.pos());
                return Ok(NavOutcome::Unreachable);
            }
        };
        event!("Heading for {target} at {} over {:.0}", sol.vel(), sol.distance());
        if self.set_vel_hold(sol.vel(), angle, floor, at).await? == HoldExit::Preempted {
            return Ok(NavOutcome::Preempted);
        }

        let pos = self.fc().current().await.pos();
        let Some(mut eta) = Self::eta(pos, sol.vel(), target) else {
            warn!("No rendezvous with {target} from {pos}");
            return Ok(NavOutcome::Unreachable);
        };
        if eta >= Self::SLEEP_THROUGH_MIN {
            if self.sleep_through(eta, angle, floor, at).await? == HoldExit::Preempted {
                return Ok(NavOutcome::Preempted);
            }
            let pos = self.fc().current().await.pos();
            eta = Self::eta(pos, sol.vel(), target).unwrap_or(0.0);
        }
        match self.hold(eta, FlightState::Acquisition, angle, floor, at).await? {
            HoldExit::Preempted => Ok(NavOutcome::Preempted),
            HoldExit::Elapsed => Ok(NavOutcome::Arrived(self.fc().current().await)),
        }
    }

    /// Captures a photo, stores it under the image directory, marks the covered window and
    /// hands the file to the compositor.
    pub(super) async fn take_photo(&mut self) -> Option<PathBuf> {
        let bytes = match self.fc().vehicle().capture_image().await {
            Ok(bytes) => bytes,
            Err(e) => {
                error!("Photo capture failed: {e}");
                return None;
            }
        };
        let t = self.fc().current().await;
        let cell = t.pos().to_cell();
        let dir = self.config.image_dir();
        let path = dir.join(capture_file_name(t.angle(), cell));
        if let Err(e) = fs::create_dir_all(&dir).and_then(|()| fs::write(&path, &bytes)) {
            error!("Could not store photo {}: {e}", path.display());
            return None;
        }
        self.map.update_region(cell.x(), cell.y(), t.angle(), true);
        self.sink.offer(path.clone());
        event!("Photo {} taken, coverage {:.3}%", path.display(), self.map.coverage_fraction() * 100.0);
        Some(path)
    }

    /// Writes the coverage map to its configured path.
    pub fn persist_map(&self) {
        let path = self.config.map_path();
        match self.map.save(&path, self.config.compress_map()) {
            Ok(()) => info!("Coverage map saved to {}", path.display()),
            Err(e) => error!("Could not save coverage map to {}: {e}", path.display()),
        }
    }
}
