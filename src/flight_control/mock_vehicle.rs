use super::{
    camera_state::CameraAngle,
    flight_state::FlightState,
    vehicle::{BeaconSubmitResult, ObjectiveList, Telemetry, Vehicle},
};
use crate::http_handler::{CommunicationSlot, HTTPError};
use crate::util::Vec2D;
use async_trait::async_trait;
use chrono::Utc;
use std::{collections::VecDeque, io::Cursor, sync::Mutex};

/// One recorded call to [`Vehicle::command`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Command {
    pub state: FlightState,
    pub vel: Vec2D<f64>,
    pub angle: CameraAngle,
}

#[derive(Debug)]
struct MockState {
    pos: Vec2D<f64>,
    vel: Vec2D<f64>,
    target_vel: Vec2D<f64>,
    state: FlightState,
    angle: CameraAngle,
    battery: f64,
    max_battery: f64,
}

/// In-memory vehicle with instant mode switches.
///
/// Every telemetry read in an orbiting mode advances the position by `vel * secs_per_read`
/// and, while charging, raises the battery by `charge_step`. The velocity moves towards the
/// commanded one by at most `vel_ramp` per axis and read, instantly by default.
pub struct MockVehicle {
    state: Mutex<MockState>,
    secs_per_read: f64,
    charge_step: f64,
    vel_ramp: f64,
    malformed: bool,
    commands: Mutex<Vec<Command>>,
    captures: Mutex<usize>,
    objectives: Mutex<ObjectiveList>,
    slots: Mutex<Vec<CommunicationSlot>>,
    bookings: Mutex<Vec<(usize, bool)>>,
    beacon_replies: Mutex<VecDeque<BeaconSubmitResult>>,
    beacon_guesses: Mutex<Vec<(usize, Vec2D<f64>)>>,
    submitted_images: Mutex<Vec<usize>>,
    png: Vec<u8>,
}

impl MockVehicle {
    pub fn new(pos: Vec2D<f64>, vel: Vec2D<f64>, state: FlightState, battery: f64) -> Self {
        let mut png = Vec::new();
        image::RgbImage::from_pixel(4, 4, image::Rgb([200, 120, 40]))
            .write_to(&mut Cursor::new(&mut png), image::ImageFormat::Png)
            .unwrap();
        Self {
            state: Mutex::new(MockState {
                pos,
                vel,
                target_vel: vel,
                state,
                angle: CameraAngle::Narrow,
                battery,
                max_battery: 100.0,
            }),
            secs_per_read: 0.0,
            charge_step: 10.0,
            vel_ramp: f64::INFINITY,
            malformed: false,
            commands: Mutex::new(Vec::new()),
            captures: Mutex::new(0),
            objectives: Mutex::new(ObjectiveList::default()),
            slots: Mutex::new(Vec::new()),
            bookings: Mutex::new(Vec::new()),
            beacon_replies: Mutex::new(VecDeque::new()),
            beacon_guesses: Mutex::new(Vec::new()),
            submitted_images: Mutex::new(Vec::new()),
            png,
        }
    }

    pub fn with_secs_per_read(mut self, secs: f64) -> Self {
        self.secs_per_read = secs;
        self
    }

    pub fn with_vel_ramp(mut self, per_read: f64) -> Self {
        self.vel_ramp = per_read;
        self
    }

    /// Every telemetry read fails the way an unknown state string does on the wire.
    pub fn with_malformed_telemetry(mut self) -> Self {
        self.malformed = true;
        self
    }

    pub fn commands(&self) -> Vec<Command> { self.commands.lock().unwrap().clone() }
    pub fn captures(&self) -> usize { *self.captures.lock().unwrap() }
    pub fn bookings(&self) -> Vec<(usize, bool)> { self.bookings.lock().unwrap().clone() }
    pub fn beacon_guesses(&self) -> Vec<(usize, Vec2D<f64>)> { self.beacon_guesses.lock().unwrap().clone() }
    pub fn submitted_images(&self) -> Vec<usize> { self.submitted_images.lock().unwrap().clone() }

    pub fn set_state(&self, state: FlightState) { self.state.lock().unwrap().state = state; }
    pub fn set_battery(&self, battery: f64) { self.state.lock().unwrap().battery = battery; }
    pub fn set_pos(&self, pos: Vec2D<f64>) { self.state.lock().unwrap().pos = pos; }
    pub fn set_objectives(&self, list: ObjectiveList) { *self.objectives.lock().unwrap() = list; }
    pub fn set_slots(&self, slots: Vec<CommunicationSlot>) { *self.slots.lock().unwrap() = slots; }
    pub fn push_beacon_reply(&self, reply: BeaconSubmitResult) {
        self.beacon_replies.lock().unwrap().push_back(reply);
    }
}

#[async_trait]
impl Vehicle for MockVehicle {
    async fn read_telemetry(&self) -> Telemetry {
        if self.malformed {
            crate::fatal!("Malformed telemetry: unknown state 'tumbling'");
        }
        let mut s = self.state.lock().unwrap();
        s.vel = if self.vel_ramp.is_finite() {
            let (dv, ramp) = (s.target_vel - s.vel, self.vel_ramp);
            s.vel + Vec2D::new(dv.x().clamp(-ramp, ramp), dv.y().clamp(-ramp, ramp))
        } else {
            s.target_vel
        };
        if matches!(s.state, FlightState::Acquisition | FlightState::Comms | FlightState::Charge) {
            s.pos = (s.pos + s.vel * self.secs_per_read).wrap_around_map();
        }
        if s.state == FlightState::Charge {
            s.battery = (s.battery + self.charge_step).min(s.max_battery);
        }
        Telemetry::new(s.pos, s.vel, s.state, s.angle, s.battery, s.max_battery, 100.0, Utc::now())
    }

    async fn command(
        &self,
        state: FlightState,
        vel: Vec2D<f64>,
        angle: CameraAngle,
    ) -> Result<(), HTTPError> {
        self.commands.lock().unwrap().push(Command { state, vel, angle });
        let mut s = self.state.lock().unwrap();
        s.state = state;
        if state == FlightState::Acquisition {
            s.target_vel = vel;
            s.angle = angle;
        }
        Ok(())
    }

    async fn capture_image(&self) -> Result<Vec<u8>, HTTPError> {
        *self.captures.lock().unwrap() += 1;
        Ok(self.png.clone())
    }

    async fn list_slots(&self) -> Result<Vec<CommunicationSlot>, HTTPError> {
        Ok(self.slots.lock().unwrap().clone())
    }

    async fn book_slot(&self, slot_id: usize, enabled: bool) -> Result<(), HTTPError> {
        self.bookings.lock().unwrap().push((slot_id, enabled));
        Ok(())
    }

    async fn list_objectives(&self) -> Result<ObjectiveList, HTTPError> {
        Ok(self.objectives.lock().unwrap().clone())
    }

    async fn submit_beacon(
        &self,
        beacon_id: usize,
        guess: Vec2D<f64>,
    ) -> Result<BeaconSubmitResult, HTTPError> {
        self.beacon_guesses.lock().unwrap().push((beacon_id, guess));
        Ok(self.beacon_replies.lock().unwrap().pop_front().unwrap_or(BeaconSubmitResult::Found))
    }

    async fn submit_objective_image(&self, objective_id: usize, _png: Vec<u8>) -> Result<(), HTTPError> {
        self.submitted_images.lock().unwrap().push(objective_id);
        Ok(())
    }
}
