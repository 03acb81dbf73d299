use super::response_common::SerdeJSONBodyHTTPResponseType;

/// Telemetry snapshot as returned by `GET /observation`.
#[derive(serde::Deserialize, Debug)]
pub struct ObservationResponse {
    state: String,
    angle: String,
    width_x: f64,
    height_y: f64,
    vx: f64,
    vy: f64,
    battery: f64,
    max_battery: f64,
    fuel: f64,
    timestamp: chrono::DateTime<chrono::Utc>,
}

impl SerdeJSONBodyHTTPResponseType for ObservationResponse {}

impl ObservationResponse {
    pub fn state(&self) -> &str { self.state.as_str() }
    pub fn angle(&self) -> &str { self.angle.as_str() }
    pub fn pos_x(&self) -> f64 { self.width_x }
    pub fn pos_y(&self) -> f64 { self.height_y }
    pub fn vel_x(&self) -> f64 { self.vx }
    pub fn vel_y(&self) -> f64 { self.vy }
    pub fn battery(&self) -> f64 { self.battery }
    pub fn max_battery(&self) -> f64 { self.max_battery }
    pub fn fuel(&self) -> f64 { self.fuel }
    pub fn timestamp(&self) -> chrono::DateTime<chrono::Utc> { self.timestamp }
}
