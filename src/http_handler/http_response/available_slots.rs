use super::super::common::CommunicationSlot;
use super::response_common::SerdeJSONBodyHTTPResponseType;

#[derive(serde::Deserialize, Debug)]
pub struct AvailableSlotsResponse {
    #[serde(default)]
    communication_slots_used: usize,
    slots: Vec<CommunicationSlot>,
}

impl SerdeJSONBodyHTTPResponseType for AvailableSlotsResponse {}

impl AvailableSlotsResponse {
    pub fn slots_used(&self) -> usize { self.communication_slots_used }
    pub fn into_slots(self) -> Vec<CommunicationSlot> { self.slots }
}
