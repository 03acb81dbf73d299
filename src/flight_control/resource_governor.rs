use super::{
    camera_state::CameraAngle,
    flight_computer::{FlightComputer, WaitError},
    flight_state::FlightState,
    vehicle::Telemetry,
};
use crate::util::Vec2D;
use crate::{event, info, log, warn};
use async_trait::async_trait;

/// What a governor check did before handing control back.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GovernorAction {
    /// Nothing had to be done.
    Untouched(Telemetry),
    /// A charge cycle or mode restoration ran; commanded velocity may have been reset.
    Recovered(Telemetry),
}

impl GovernorAction {
    pub fn telemetry(&self) -> Telemetry {
        match self {
            GovernorAction::Untouched(t) | GovernorAction::Recovered(t) => *t,
        }
    }

    pub fn recovered(&self) -> bool { matches!(self, GovernorAction::Recovered(_)) }
}

/// Guards every wait with battery-floor and safe-mode protection.
///
/// Charging is the only wait allowed to block without bound: battery exhaustion outranks
/// every deadline.
#[derive(Clone)]
pub struct ResourceGovernor {
    fc: FlightComputer,
}

impl ResourceGovernor {
    /// Battery level at or below which a safe-mode vehicle is fully recharged.
    pub const ANOMALY_FLOOR: f64 = 4.0;
    /// Floor while listening for beacon pings in communication mode.
    pub const COMMS_FLOOR: f64 = 3.0;
    /// Floor during background scanning.
    pub const SCAN_FLOOR: f64 = 5.0;
    /// Floor before and during objective sweeps.
    pub const OBJECTIVE_FLOOR: f64 = 6.0;
    /// Ticks spent outside `Transition` before a mode command is repeated.
    const RECOMMAND_TICKS: u32 = 20;
    /// Velocity difference regarded as reached.
    const VEL_EPSILON: f64 = 0.5;

    pub fn new(fc: FlightComputer) -> Self { Self { fc } }

    pub fn fc(&self) -> &FlightComputer { &self.fc }

    /// Commands `target` and polls until telemetry reports it.
    ///
    /// `vel` defaults to the current velocity. The command is repeated if the vehicle has not
    /// started the switch after a while.
    pub async fn drive_to_state(
        &self,
        target: FlightState,
        vel: Option<Vec2D<f64>>,
        angle: CameraAngle,
    ) -> Result<Telemetry, WaitError> {
        let mut idle_ticks = 0;
        let mut commanded = false;
        loop {
            let t = self.fc.current().await;
            if t.state() == target && (t.angle() == angle || target != FlightState::Acquisition) {
                return Ok(t);
            }
            if t.state() == FlightState::Transition {
                idle_ticks = 0;
            } else if !commanded || idle_ticks >= Self::RECOMMAND_TICKS {
                log!("Switching from {} to {target}", t.state());
                self.fc.command(target, vel.unwrap_or(t.vel()), angle).await;
                commanded = true;
                idle_ticks = 0;
            } else {
                idle_ticks += 1;
            }
            self.fc.tick().await?;
        }
    }

    /// Charges until the battery reaches the vehicle-reported maximum, then restores `restore`.
    pub async fn full_charge_cycle(
        &self,
        restore: FlightState,
        angle: CameraAngle,
    ) -> Result<Telemetry, WaitError> {
        self.drive_to_state(FlightState::Charge, None, angle).await?;
        info!("Charging until battery is full");
        let charged = self.fc.wait_for(|t| t.battery() >= t.max_battery()).await?;
        info!("Battery full at {:.1}", charged.battery());
        self.drive_to_state(restore, None, angle).await
    }

    /// Clears safe mode.
    ///
    /// A safe vehicle at or below [`Self::ANOMALY_FLOOR`] is charged to full first; otherwise
    /// `intended` is restored directly.
    pub async fn ensure_not_anomalous(
        &self,
        intended: FlightState,
        angle: CameraAngle,
    ) -> Result<GovernorAction, WaitError> {
        let t = self.fc.current().await;
        if t.state() != FlightState::Safe {
            return Ok(GovernorAction::Untouched(t));
        }
        warn!("Safe mode detected at battery {:.1}", t.battery());
        let restored = if t.battery() <= Self::ANOMALY_FLOOR {
            self.full_charge_cycle(intended, angle).await?
        } else {
            self.drive_to_state(intended, None, angle).await?
        };
        Ok(GovernorAction::Recovered(restored))
    }

    /// Runs a full charge cycle if the battery is below `threshold`, then restores `fallback`.
    pub async fn enforce_battery_floor(
        &self,
        threshold: f64,
        angle: CameraAngle,
        fallback: FlightState,
    ) -> Result<GovernorAction, WaitError> {
        let t = self.fc.current().await;
        if t.battery() >= threshold {
            return Ok(GovernorAction::Untouched(t));
        }
        warn!("Battery {:.1} below floor {threshold:.1}", t.battery());
        Ok(GovernorAction::Recovered(self.full_charge_cycle(fallback, angle).await?))
    }

    /// Both checks in the order every wait runs them.
    pub async fn guard(
        &self,
        threshold: f64,
        angle: CameraAngle,
        mode: FlightState,
    ) -> Result<GovernorAction, WaitError> {
        let anomaly = self.ensure_not_anomalous(mode, angle).await?;
        let floor = self.enforce_battery_floor(threshold, angle, mode).await?;
        if anomaly.recovered() && !floor.recovered() {
            Ok(GovernorAction::Recovered(floor.telemetry()))
        } else {
            Ok(floor)
        }
    }

    /// Whether `actual` is close enough to the commanded `target`.
    pub fn vel_reached(actual: Vec2D<f64>, target: Vec2D<f64>) -> bool {
        (actual - target).abs() < Self::VEL_EPSILON
    }

    /// Switches to acquisition with velocity `vel` and polls until it is reached.
    ///
    /// `irq` is polled on every tick; once it is raised the wait ends with `None` and the
    /// vehicle is left wherever the ramp got to. The battery floor is enforced on every tick and
    /// the command is repeated after a charge cycle or once [`Self::RECOMMAND_TICKS`] passed.
    pub async fn set_vel_wait(
        &self,
        vel: Vec2D<f64>,
        angle: CameraAngle,
        floor: f64,
        irq: &mut dyn Interrupt,
    ) -> Result<Option<Telemetry>, WaitError> {
        let mut commanded_in = None;
        let mut since_command = 0;
        loop {
            let t = self.fc.current().await;
            if t.state() == FlightState::Acquisition && t.angle() == angle && Self::vel_reached(t.vel(), vel) {
                return Ok(Some(t));
            }
            if irq.is_raised().await {
                return Ok(None);
            }
            let stale = commanded_in != Some(t.state()) || since_command >= Self::RECOMMAND_TICKS;
            if t.state() != FlightState::Transition && stale {
                event!("Commanding velocity {vel} from {} at {}", t.state(), t.vel());
                commanded_in = self.fc.command(FlightState::Acquisition, vel, angle).await.then_some(t.state());
                since_command = 0;
            }
            self.fc.tick().await?;
            since_command += 1;
            if self.guard(floor, angle, FlightState::Acquisition).await?.recovered() {
                commanded_in = None;
            }
        }
    }
}

/// Polled by long waits to end early in favor of more urgent work.
#[async_trait]
pub trait Interrupt: Send {
    async fn is_raised(&mut self) -> bool;
}

/// An interrupt that is never raised.
pub struct Uninterruptible;

#[async_trait]
impl Interrupt for Uninterruptible {
    async fn is_raised(&mut self) -> bool { false }
}
