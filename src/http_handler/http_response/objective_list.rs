use super::super::common::{BeaconObjective, ImageObjective};
use super::response_common::SerdeJSONBodyHTTPResponseType;

#[derive(serde::Deserialize, Debug)]
pub struct ObjectiveListResponse {
    #[serde(default)]
    zoned_objectives: Vec<ImageObjective>,
    #[serde(default)]
    beacon_objectives: Vec<BeaconObjective>,
}

impl SerdeJSONBodyHTTPResponseType for ObjectiveListResponse {}

impl ObjectiveListResponse {
    pub fn img_objectives(&self) -> &Vec<ImageObjective> { &self.zoned_objectives }
    pub fn beacon_objectives(&self) -> &Vec<BeaconObjective> { &self.beacon_objectives }
}
