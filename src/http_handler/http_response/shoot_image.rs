use super::response_common::{HTTPResponseType, ResponseError};

/// Raw PNG bytes of a freshly captured photo.
pub struct ShootImageResponse {}

impl HTTPResponseType for ShootImageResponse {
    type ParsedResponseType = Vec<u8>;

    async fn read_response(
        response: reqwest::Response,
    ) -> Result<Self::ParsedResponseType, ResponseError> {
        let response = Self::unwrap_return_code(response).await?;
        Ok(response.bytes().await?.to_vec())
    }
}
