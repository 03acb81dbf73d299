use super::request_common::{HTTPRequestMethod, HTTPRequestType, JSONBodyHTTPRequestType};
use super::response_common::StatusOnlyResponse;

/// Request type for the /control endpoint.
#[derive(serde::Serialize, Debug)]
pub struct ControlSatelliteRequest {
    /// The desired velocity in x-direction.
    pub vel_x: f64,
    /// The desired velocity in y-direction.
    pub vel_y: f64,
    /// The desired `CameraAngle` encoded as a `str`.
    pub camera_angle: &'static str,
    /// The desired `FlightState` encoded as a `str`.
    pub state: &'static str,
}

impl JSONBodyHTTPRequestType for ControlSatelliteRequest {
    type Body = ControlSatelliteRequest;
    fn body(&self) -> &Self::Body { self }
}

impl HTTPRequestType for ControlSatelliteRequest {
    type Response = StatusOnlyResponse;
    fn endpoint(&self) -> &'static str { "/control" }
    fn request_method(&self) -> HTTPRequestMethod { HTTPRequestMethod::Put }
}
