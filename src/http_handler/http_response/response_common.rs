use strum_macros::Display;

pub(crate) trait HTTPResponseType {
    type ParsedResponseType;

    async fn read_response(
        response: reqwest::Response,
    ) -> Result<Self::ParsedResponseType, ResponseError>;

    async fn unwrap_return_code(
        response: reqwest::Response,
    ) -> Result<reqwest::Response, ResponseError> {
        let status = response.status();
        if status.is_success() {
            Ok(response)
        } else if status.is_server_error() {
            Err(ResponseError::InternalServer)
        } else if status.is_client_error() {
            Err(ResponseError::BadRequest(response.text().await.unwrap_or_default()))
        } else {
            Err(ResponseError::Unknown)
        }
    }
}

/// Marker for response types deserialized directly from a JSON body.
pub(crate) trait SerdeJSONBodyHTTPResponseType {}

impl<T> HTTPResponseType for T
where
    T: SerdeJSONBodyHTTPResponseType,
    for<'de> T: serde::Deserialize<'de>,
{
    type ParsedResponseType = T;

    async fn read_response(
        response: reqwest::Response,
    ) -> Result<Self::ParsedResponseType, ResponseError> {
        let resp = Self::unwrap_return_code(response).await?;
        Ok(resp.json::<T>().await?)
    }
}

/// Response of endpoints whose body carries nothing beyond the status code.
#[derive(Debug)]
pub struct StatusOnlyResponse {}

impl HTTPResponseType for StatusOnlyResponse {
    type ParsedResponseType = ();

    async fn read_response(
        response: reqwest::Response,
    ) -> Result<Self::ParsedResponseType, ResponseError> {
        Self::unwrap_return_code(response).await?;
        Ok(())
    }
}

#[derive(Debug, Display)]
pub enum ResponseError {
    InternalServer,
    BadRequest(String),
    NoConnection,
    MalformedBody,
    Unknown,
}

impl std::error::Error for ResponseError {}

impl From<reqwest::Error> for ResponseError {
    fn from(value: reqwest::Error) -> Self {
        if value.is_decode() {
            ResponseError::MalformedBody
        } else if value.is_timeout() || value.is_redirect() {
            ResponseError::InternalServer
        } else if value.is_connect() {
            ResponseError::NoConnection
        } else {
            ResponseError::Unknown
        }
    }
}
