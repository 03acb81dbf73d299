use super::request_common::{HTTPRequestMethod, HTTPRequestType, NoBodyHTTPRequestType};
use super::response_common::StatusOnlyResponse;

/// Request type for booking or releasing a communication slot.
#[derive(Debug)]
pub struct ModifySlotRequest {
    pub slot_id: usize,
    pub enabled: bool,
}

impl NoBodyHTTPRequestType for ModifySlotRequest {}

impl HTTPRequestType for ModifySlotRequest {
    type Response = StatusOnlyResponse;
    fn endpoint(&self) -> &'static str { "/slots" }
    fn request_method(&self) -> HTTPRequestMethod { HTTPRequestMethod::Put }
    fn query_params(&self) -> Vec<(&'static str, String)> {
        vec![("slot_id", self.slot_id.to_string()), ("enabled", self.enabled.to_string())]
    }
}
