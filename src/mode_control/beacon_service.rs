use super::{
    commander::MissionCommander,
    signal::{HoldExit, Priority},
};
use crate::flight_control::{BeaconSubmitResult, FlightState, ResourceGovernor, WaitError};
use crate::navigation::{MAX_VEL, find_velocity};
use crate::objective::BeaconLocalizer;
use crate::util::{MAP_HEIGHT, MAP_WIDTH, Vec2D};
use crate::{event, info, log, obj, warn};
use chrono::{DateTime, Utc};
use std::time::Duration;
use strum_macros::Display;
use tokio::time::Instant;

/// Terminal result of servicing one beacon.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq)]
pub enum BeaconOutcome {
    Located,
    /// No ping arrived within one full positional cycle (signal -2).
    Abandoned,
    /// The beacon window closed or all trials missed (signal -1).
    Expired,
    /// The backend refused further guesses or answered unexpectedly.
    Rejected,
}

/// End of the beacon window as far as the objective listing knows.
enum BeaconDeadline {
    At(DateTime<Utc>),
    Unlisted,
    Unknown,
}

impl BeaconDeadline {
    fn passed(&self) -> bool { matches!(self, BeaconDeadline::At(end) if Utc::now() >= *end) }
}

impl MissionCommander {
    /// Pings required before a guess is submitted.
    pub(super) const PING_THRESHOLD: usize = 8;
    /// Guesses allowed per beacon.
    pub(super) const MAX_TRIALS: u32 = 3;
    /// Velocity increase on `y` when no velocity towards the last guess exists.
    const NUDGE_VY: f64 = 2.0;
    /// Polls an active beacon may stay missing from the objective listing.
    pub(super) const LISTING_GRACE_POLLS: u32 = 5;
    /// Time without a new ping after which the vehicle is taken to have left the ping circle.
    pub(super) const ESCAPE_AFTER: Duration = Duration::from_secs(60);
    /// Distance behind the last ping position, against the direction of flight, where the
    /// ping circle is expected to be re-entered.
    const REENTRY_BACKOFF: f64 = 4000.0;
    /// Seconds subtracted from the travel time to the re-entry point.
    const REENTRY_LEAD: f64 = 80.0;
    /// Battery gained per second in charge mode.
    const CHARGE_PER_SEC: f64 = 0.1;

    /// One full positional cycle at `vel`: the least common multiple of both axis periods.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn give_up_bound(vel: Vec2D<f64>) -> Duration {
        let period = |size: u32, v: f64| ((f64::from(size) / v.abs().max(1.0)).round() as u64).max(1);
        Duration::from_secs(num::integer::lcm(period(MAP_WIDTH, vel.x()), period(MAP_HEIGHT, vel.y())))
    }

    /// Point on the ground track `REENTRY_BACKOFF` before `last_ping`.
    pub fn reentry_point(last_ping: Vec2D<f64>, vel: Vec2D<f64>) -> Vec2D<f64> {
        let speed = vel.abs();
        if speed == 0.0 {
            return last_ping;
        }
        (last_ping - vel * (Self::REENTRY_BACKOFF / speed)).wrap_around_map()
    }

    async fn beacon_deadline(&self, id: usize) -> BeaconDeadline {
        match self.fc().vehicle().list_objectives().await {
            Ok(list) => list
                .beacons
                .iter()
                .find(|b| b.id == id)
                .map_or(BeaconDeadline::Unlisted, |b| BeaconDeadline::At(b.end)),
            Err(e) => {
                warn!("Could not look up window of beacon {id}: {e}");
                BeaconDeadline::Unknown
            }
        }
    }

    /// Listens in communication mode until enough pings arrived, then submits the localized
    /// position, re-aiming the orbit at the guess after every miss.
    ///
    /// Once pings stop for [`Self::ESCAPE_AFTER`] the vehicle scans until it is due back at the
    /// ping circle.
    pub(super) async fn serve_beacon(&mut self, id: usize) -> Result<BeaconOutcome, WaitError> {
        let angle = Self::SCAN_ANGLE;
        let t = self
            .gov
            .guard(ResourceGovernor::COMMS_FLOOR, angle, FlightState::Comms)
            .await?
            .telemetry();
        self.gov.drive_to_state(FlightState::Comms, None, angle).await?;
        let give_up = Self::give_up_bound(t.vel());
        obj!("Servicing beacon {id}, giving up after {}s without pings", give_up.as_secs());

        let started = Instant::now();
        let mut last_ping_at = started;
        let mut deadline = self.beacon_deadline(id).await;
        let mut unlisted_polls = 0;
        let mut trials = 0;
        let mut submitted_at = 0;
        let mut seen = 0;
        let mut estimate = None;
        let outcome = loop {
            if deadline.passed() {
                break BeaconOutcome::Expired;
            }
            if matches!(deadline, BeaconDeadline::Unlisted) {
                unlisted_polls += 1;
                if unlisted_polls > Self::LISTING_GRACE_POLLS {
                    warn!("Beacon {id} still missing from the objective listing");
                    break BeaconOutcome::Expired;
                }
            }
            let Some(task) = self.ctx.board().snapshot().await else {
                break BeaconOutcome::Rejected;
            };
            let pings = task.pings();
            if pings == 0 && started.elapsed() >= give_up {
                break BeaconOutcome::Abandoned;
            }
            if pings > seen {
                seen = pings;
                last_ping_at = Instant::now();
                estimate = BeaconLocalizer::localize(&task.unique_samples());
                if let Some(guess) = estimate {
                    event!("Beacon {id} estimate after {pings} pings: {guess}");
                }
            }
            if let Some(guess) = estimate.filter(|_| pings >= submitted_at + Self::PING_THRESHOLD) {
                let reply = self.fc().vehicle().submit_beacon(id, guess).await;
                match reply {
                    Ok(BeaconSubmitResult::Found) => break BeaconOutcome::Located,
                    Ok(BeaconSubmitResult::NotFound) => {
                        trials += 1;
                        warn!("Beacon {id} not found at {guess}, trial {trials}/{}", Self::MAX_TRIALS);
                        if trials >= Self::MAX_TRIALS {
                            break BeaconOutcome::Expired;
                        }
                        submitted_at = pings;
                        self.nudge_orbit(guess).await?;
                        deadline = self.beacon_deadline(id).await;
                    }
                    Ok(BeaconSubmitResult::Exhausted) => break BeaconOutcome::Rejected,
                    Ok(BeaconSubmitResult::Unknown(status)) => {
                        warn!("Unexpected beacon answer: {status}");
                        break BeaconOutcome::Rejected;
                    }
                    Err(e) => warn!("Beacon submission failed, retrying: {e}"),
                }
            } else if seen > 0 && last_ping_at.elapsed() >= Self::ESCAPE_AFTER {
                if let Some(last) = task.samples().last() {
                    self.beacon_copilot(id, last.pos(), seen, &deadline).await?;
                }
                self.gov.drive_to_state(FlightState::Comms, None, angle).await?;
                last_ping_at = Instant::now();
            }
            self.gov.guard(ResourceGovernor::COMMS_FLOOR, angle, FlightState::Comms).await?;
            self.fc().tick().await?;
            if matches!(deadline, BeaconDeadline::Unlisted) {
                deadline = self.beacon_deadline(id).await;
            }
        };
        self.finish_beacon(id, outcome).await;
        Ok(outcome)
    }

    /// Covers ground while outside the ping circle of beacon `id`.
    ///
    /// Returns as soon as listening is due again. Close to re-entry behind `last_ping` the
    /// remaining time is spent charging.
    async fn beacon_copilot(
        &mut self,
        id: usize,
        last_ping: Vec2D<f64>,
        seen: usize,
        deadline: &BeaconDeadline,
    ) -> Result<(), WaitError> {
        obj!("Left the ping circle of beacon {id}, scanning until re-entry");
        let floor = ResourceGovernor::SCAN_FLOOR;
        loop {
            if deadline.passed() {
                return Ok(());
            }
            match self.ctx.board().snapshot().await {
                Some(task) if task.pings() == seen => (),
                _ => return Ok(()),
            }
            let mut t = self.gov.guard(floor, Self::SCAN_ANGLE, FlightState::Acquisition).await?.telemetry();
            let reentry = Self::reentry_point(last_ping, t.vel());
            let wake = Self::eta(t.pos(), t.vel(), reentry).map_or(f64::INFINITY, |eta| eta - Self::REENTRY_LEAD);
            let recharge = (t.max_battery() - t.battery()) / Self::CHARGE_PER_SEC;
            if wake < Self::SLEEP_THROUGH_MIN + recharge {
                info!("Re-entering ping circle at {reentry} in {wake:.0}s, charging until then");
                self.gov.drive_to_state(FlightState::Charge, None, Self::SCAN_ANGLE).await?;
                self.hold(wake - Self::WAKE_AHEAD, FlightState::Charge, Self::SCAN_ANGLE, floor, Priority::Beacon)
                    .await?;
                return Ok(());
            }

            if t.state() != FlightState::Acquisition || t.angle() != Self::SCAN_ANGLE {
                t = self.gov.drive_to_state(FlightState::Acquisition, None, Self::SCAN_ANGLE).await?;
            }
            let cell = t.pos().to_cell();
            if self.map.window_has_unset(cell.x(), cell.y(), t.angle()) {
                self.take_photo().await;
            } else if let Some((steps, target)) = Self::first_unset_on_trajectory(&self.map, t.pos(), t.vel()) {
                #[allow(clippy::cast_precision_loss)]
                let eta = Self::eta(t.pos(), t.vel(), target).unwrap_or(steps as f64);
                if eta >= Self::SLEEP_THROUGH_MIN {
                    let until = eta.min(wake);
                    log!("Next uncovered cell {eta:.0}s away, sleeping {until:.0}s");
                    if self.sleep_through(until, Self::SCAN_ANGLE, floor, Priority::Beacon).await?
                        == HoldExit::Preempted
                    {
                        return Ok(());
                    }
                }
            }
            self.fc().tick().await?;
        }
    }

    /// Changes the orbit towards the last guess so the next pings come from new positions.
    async fn nudge_orbit(&mut self, guess: Vec2D<f64>) -> Result<(), WaitError> {
        let t = self.fc().current().await;
        let vel = find_velocity(t.pos(), t.vel(), guess).map_or_else(
            |_| Vec2D::new(t.vel().x(), (t.vel().y() + Self::NUDGE_VY).min(MAX_VEL)),
            |sol| sol.vel(),
        );
        info!("Nudging orbit to {vel} before the next trial");
        self.set_vel_hold(vel, Self::SCAN_ANGLE, ResourceGovernor::COMMS_FLOOR, Priority::Beacon).await?;
        self.gov.drive_to_state(FlightState::Comms, None, Self::SCAN_ANGLE).await?;
        Ok(())
    }

    async fn finish_beacon(&self, id: usize, outcome: BeaconOutcome) {
        self.ctx.board().retire().await;
        self.audit.archive_pings();
        let subject = format!("Beacon {id}");
        if outcome == BeaconOutcome::Located {
            self.audit.success(&subject);
        } else {
            self.audit.failure(&subject, &outcome.to_string());
        }
    }
}
