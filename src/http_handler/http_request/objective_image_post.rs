use super::request_common::{
    HTTPRequestMethod, HTTPRequestType, MultipartBodyHTTPRequestType, RequestError,
};
use super::response_common::StatusOnlyResponse;

/// Request type uploading the stitched artifact of a zoned objective.
#[derive(Debug)]
pub struct ObjectiveImageRequest {
    objective_id: usize,
    png: Vec<u8>,
}

impl ObjectiveImageRequest {
    pub fn new(objective_id: usize, png: Vec<u8>) -> Self { Self { objective_id, png } }
}

impl MultipartBodyHTTPRequestType for ObjectiveImageRequest {
    fn body(&self) -> Result<reqwest::multipart::Form, RequestError> {
        let part = reqwest::multipart::Part::bytes(self.png.clone())
            .file_name(format!("OBJECTIVE_ID_{}.png", self.objective_id))
            .mime_str("image/png")?;
        Ok(reqwest::multipart::Form::new().part("image", part))
    }
}

impl HTTPRequestType for ObjectiveImageRequest {
    type Response = StatusOnlyResponse;
    fn endpoint(&self) -> &'static str { "/image" }
    fn request_method(&self) -> HTTPRequestMethod { HTTPRequestMethod::Post }
    fn query_params(&self) -> Vec<(&'static str, String)> {
        vec![("objective_id", self.objective_id.to_string())]
    }
}
