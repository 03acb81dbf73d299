//! Transport to the DRS backend: the request/response types of each endpoint and the
//! [`HttpVehicle`] that implements [`crate::flight_control::Vehicle`] on top of them.

pub mod common;
pub mod http_client;
pub mod http_request;
pub mod http_response;
mod http_vehicle;

pub use common::{CommunicationSlot, HTTPError};
pub use http_vehicle::HttpVehicle;
