use super::http_request::request_common::RequestError;
use super::http_response::response_common::ResponseError;
use chrono::{DateTime, Utc};
use strum_macros::Display;

/// A zoned objective as listed by `GET /objective`.
#[derive(serde::Deserialize, Debug, Clone)]
pub struct ImageObjective {
    id: usize,
    #[serde(default)]
    name: String,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    /// Secret objectives are listed without a zone.
    zone: Option<[i32; 4]>,
    optic_required: String,
    #[serde(default)]
    coverage_required: f64,
    #[serde(default)]
    secret: bool,
}

impl ImageObjective {
    pub fn id(&self) -> usize { self.id }
    pub fn name(&self) -> &str { &self.name }
    pub fn start(&self) -> DateTime<Utc> { self.start }
    pub fn end(&self) -> DateTime<Utc> { self.end }
    pub fn zone(&self) -> Option<[i32; 4]> { self.zone }
    pub fn optic_required(&self) -> &str { &self.optic_required }
    pub fn coverage_required(&self) -> f64 { self.coverage_required }
    pub fn is_secret(&self) -> bool { self.secret || self.zone.is_none() }
}

/// A beacon objective as listed by `GET /objective`.
#[derive(serde::Deserialize, Debug, Clone)]
pub struct BeaconObjective {
    id: usize,
    #[serde(default)]
    name: String,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    #[serde(default)]
    attempts_made: u32,
}

impl BeaconObjective {
    pub fn id(&self) -> usize { self.id }
    pub fn name(&self) -> &str { &self.name }
    pub fn start(&self) -> DateTime<Utc> { self.start }
    pub fn end(&self) -> DateTime<Utc> { self.end }
    pub fn attempts_made(&self) -> u32 { self.attempts_made }
}

/// A communication slot which can be booked for operator intervention.
#[derive(serde::Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct CommunicationSlot {
    id: usize,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    enabled: bool,
}

impl CommunicationSlot {
    pub fn new(id: usize, start: DateTime<Utc>, end: DateTime<Utc>, enabled: bool) -> Self {
        Self { id, start, end, enabled }
    }
    pub fn id(&self) -> usize { self.id }
    pub fn start(&self) -> DateTime<Utc> { self.start }
    pub fn end(&self) -> DateTime<Utc> { self.end }
    pub fn is_enabled(&self) -> bool { self.enabled }
}

#[derive(Debug, Display)]
pub enum HTTPError {
    HTTPRequestError(RequestError),
    HTTPResponseError(ResponseError),
}

impl std::error::Error for HTTPError {}

impl From<RequestError> for HTTPError {
    fn from(value: RequestError) -> Self { HTTPError::HTTPRequestError(value) }
}

impl From<ResponseError> for HTTPError {
    fn from(value: ResponseError) -> Self { HTTPError::HTTPResponseError(value) }
}
