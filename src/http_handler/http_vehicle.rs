use super::{
    common::HTTPError,
    http_client::HTTPClient,
    http_request::{
        announcements_get::AnnouncementsRequest,
        available_slots_get::AvailableSlotsRequest,
        beacon_position_put::BeaconPositionRequest,
        control_put::ControlSatelliteRequest,
        modify_slot_put::ModifySlotRequest,
        objective_image_post::ObjectiveImageRequest,
        objective_list_get::ObjectiveListRequest,
        observation_get::ObservationRequest,
        shoot_image_get::ShootImageRequest,
        request_common::{
            JSONBodyHTTPRequestType, MultipartBodyHTTPRequestType, NoBodyHTTPRequestType,
            RequestError,
        },
    },
    http_response::observation::ObservationResponse,
    CommunicationSlot,
};
use crate::flight_control::{
    BeaconSubmitResult, BeaconWindow, CameraAngle, FlightState, ObjectiveList, Telemetry, Vehicle,
};
use crate::objective::ZonedObjective;
use crate::util::Vec2D;
use crate::{event, fatal, warn};
use async_trait::async_trait;
use futures::{StreamExt, future, stream::{self, BoxStream}};
use reqwest_eventsource::{Event, EventSource};
use std::time::Duration;

/// [`Vehicle`] implementation talking to the DRS REST API.
#[derive(Debug, Clone)]
pub struct HttpVehicle {
    client: HTTPClient,
}

impl HttpVehicle {
    /// Delay between two attempts of a failed telemetry read.
    const TELEMETRY_RETRY_DELAY: Duration = Duration::from_millis(500);

    pub fn new(base_url: &str) -> Self { Self { client: HTTPClient::new(base_url) } }

    /// Opens the `/announcements` event stream and yields it line by line.
    ///
    /// Transport errors are logged and left to the event source's reconnect logic; the
    /// returned stream only ends when the server closes it for good.
    pub fn announcement_lines(&self) -> Result<BoxStream<'static, String>, HTTPError> {
        let source = EventSource::new(AnnouncementsRequest {}.stream_request(&self.client))
            .map_err(|_| RequestError::FailedToBuildBody)?;
        let lines = source
            .take_while(|ev| {
                future::ready(!matches!(ev, Err(reqwest_eventsource::Error::StreamEnded)))
            })
            .filter_map(|ev| async move {
                match ev {
                    Ok(Event::Message(msg)) => Some(msg.data),
                    Ok(Event::Open) => None,
                    Err(e) => {
                        warn!("Announcement stream error: {e}");
                        None
                    }
                }
            })
            .flat_map(|data| {
                stream::iter(data.lines().map(str::to_string).collect::<Vec<_>>())
            });
        Ok(lines.boxed())
    }

    fn telemetry_from(obs: &ObservationResponse) -> Telemetry {
        let state = FlightState::try_from(obs.state())
            .unwrap_or_else(|e| fatal!("Malformed telemetry: {e}"));
        let angle = CameraAngle::try_from(obs.angle())
            .unwrap_or_else(|e| fatal!("Malformed telemetry: {e}"));
        Telemetry::new(
            Vec2D::new(obs.pos_x(), obs.pos_y()),
            Vec2D::new(obs.vel_x(), obs.vel_y()),
            state,
            angle,
            obs.battery(),
            obs.max_battery(),
            obs.fuel(),
            obs.timestamp(),
        )
    }
}

#[async_trait]
impl Vehicle for HttpVehicle {
    async fn read_telemetry(&self) -> Telemetry {
        loop {
            match (ObservationRequest {}).send_request(&self.client).await {
                Ok(obs) => return Self::telemetry_from(&obs),
                Err(e) => {
                    warn!("Telemetry read failed, retrying: {e}");
                    tokio::time::sleep(Self::TELEMETRY_RETRY_DELAY).await;
                }
            }
        }
    }

    async fn command(
        &self,
        state: FlightState,
        vel: Vec2D<f64>,
        angle: CameraAngle,
    ) -> Result<(), HTTPError> {
        let req = ControlSatelliteRequest {
            vel_x: vel.x(),
            vel_y: vel.y(),
            camera_angle: angle.into(),
            state: state.into(),
        };
        event!("Commanding {state} with velocity {vel} and lens {angle}");
        req.send_request(&self.client).await
    }

    async fn capture_image(&self) -> Result<Vec<u8>, HTTPError> {
        ShootImageRequest {}.send_request(&self.client).await
    }

    async fn list_slots(&self) -> Result<Vec<CommunicationSlot>, HTTPError> {
        Ok(AvailableSlotsRequest {}.send_request(&self.client).await?.into_slots())
    }

    async fn book_slot(&self, slot_id: usize, enabled: bool) -> Result<(), HTTPError> {
        ModifySlotRequest { slot_id, enabled }.send_request(&self.client).await
    }

    async fn list_objectives(&self) -> Result<ObjectiveList, HTTPError> {
        let resp = ObjectiveListRequest {}.send_request(&self.client).await?;
        let zoned = resp
            .img_objectives()
            .iter()
            .map(|o| {
                let angle = CameraAngle::try_from(o.optic_required()).unwrap_or(CameraAngle::Narrow);
                ZonedObjective::new(
                    o.id(),
                    o.start(),
                    o.end(),
                    o.zone().unwrap_or([0; 4]),
                    angle,
                    o.is_secret(),
                    o.coverage_required(),
                )
            })
            .collect();
        let beacons = resp
            .beacon_objectives()
            .iter()
            .map(|b| BeaconWindow { id: b.id(), start: b.start(), end: b.end() })
            .collect();
        Ok(ObjectiveList { zoned, beacons })
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    async fn submit_beacon(
        &self,
        beacon_id: usize,
        guess: Vec2D<f64>,
    ) -> Result<BeaconSubmitResult, HTTPError> {
        let cell = guess.to_cell();
        let req = BeaconPositionRequest {
            beacon_id,
            width: cell.x() as u32,
            height: cell.y() as u32,
        };
        let resp = req.send_request(&self.client).await?;
        Ok(BeaconSubmitResult::classify(resp.status()))
    }

    async fn submit_objective_image(&self, objective_id: usize, png: Vec<u8>) -> Result<(), HTTPError> {
        ObjectiveImageRequest::new(objective_id, png).send_request(&self.client).await
    }
}
