use super::response_common::SerdeJSONBodyHTTPResponseType;

#[derive(serde::Deserialize, Debug)]
pub struct BeaconPositionResponse {
    status: String,
    #[serde(default)]
    attempts_made: u32,
}

impl SerdeJSONBodyHTTPResponseType for BeaconPositionResponse {}

impl BeaconPositionResponse {
    pub fn status(&self) -> &str { &self.status }
    pub fn attempts_made(&self) -> u32 { self.attempts_made }
}
