use super::request_common::{HTTPRequestMethod, HTTPRequestType, NoBodyHTTPRequestType};
use super::shoot_image::ShootImageResponse;

/// Request type for the /image endpoint, capturing a photo with the current lens.
#[derive(Debug)]
pub struct ShootImageRequest {}

impl NoBodyHTTPRequestType for ShootImageRequest {}

impl HTTPRequestType for ShootImageRequest {
    type Response = ShootImageResponse;
    fn endpoint(&self) -> &'static str { "/image" }
    fn request_method(&self) -> HTTPRequestMethod { HTTPRequestMethod::Get }
}
