use super::beacon_position::BeaconPositionResponse;
use super::request_common::{HTTPRequestMethod, HTTPRequestType, NoBodyHTTPRequestType};

/// Request type submitting a beacon position guess.
#[derive(Debug)]
pub struct BeaconPositionRequest {
    pub beacon_id: usize,
    pub width: u32,
    pub height: u32,
}

impl NoBodyHTTPRequestType for BeaconPositionRequest {}

impl HTTPRequestType for BeaconPositionRequest {
    type Response = BeaconPositionResponse;
    fn endpoint(&self) -> &'static str { "/beacon" }
    fn request_method(&self) -> HTTPRequestMethod { HTTPRequestMethod::Put }
    fn query_params(&self) -> Vec<(&'static str, String)> {
        vec![
            ("beacon_id", self.beacon_id.to_string()),
            ("width", self.width.to_string()),
            ("height", self.height.to_string()),
        ]
    }
}
