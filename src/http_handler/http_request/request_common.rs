use super::super::{
    common::HTTPError,
    http_client::HTTPClient,
    http_response::response_common::HTTPResponseType,
};
use strum_macros::Display;

/// The HTTP methods used against the DRS.
#[derive(Debug, Clone, Copy)]
pub(crate) enum HTTPRequestMethod {
    Get,
    Post,
    Put,
}

/// Errors raised while building or sending a request, before a response is available.
#[derive(Debug, Display)]
pub enum RequestError {
    FailedToBuildBody,
    NoConnection,
    Timeout,
    Unknown,
}

impl std::error::Error for RequestError {}

impl From<reqwest::Error> for RequestError {
    fn from(value: reqwest::Error) -> Self {
        if value.is_timeout() {
            RequestError::Timeout
        } else if value.is_connect() {
            RequestError::NoConnection
        } else if value.is_builder() {
            RequestError::FailedToBuildBody
        } else {
            RequestError::Unknown
        }
    }
}

pub(crate) type ParsedResponse<T> =
    <<T as HTTPRequestType>::Response as HTTPResponseType>::ParsedResponseType;

pub(crate) trait HTTPRequestType {
    /// Type of the expected response.
    type Response: HTTPResponseType;
    /// `str` object representing the specific endpoint.
    fn endpoint(&self) -> &str;
    /// The corresponding HTTP Request Method.
    fn request_method(&self) -> HTTPRequestMethod;
    /// Query parameters appended to the URL.
    fn query_params(&self) -> Vec<(&'static str, String)> { Vec::new() }

    /// Builds the request without a body.
    fn get_request_base(&self, client: &HTTPClient) -> reqwest::RequestBuilder {
        let url = format!("{}{}", client.url(), self.endpoint());
        let base = match self.request_method() {
            HTTPRequestMethod::Get => client.client().get(url),
            HTTPRequestMethod::Post => client.client().post(url),
            HTTPRequestMethod::Put => client.client().put(url),
        };
        let params = self.query_params();
        if params.is_empty() { base } else { base.query(&params) }
    }
}

async fn dispatch<T: HTTPRequestType + ?Sized>(
    request: reqwest::RequestBuilder,
) -> Result<ParsedResponse<T>, HTTPError> {
    let response = request.timeout(HTTPClient::REQUEST_TIMEOUT).send().await.map_err(RequestError::from)?;
    Ok(T::Response::read_response(response).await?)
}

pub(crate) trait NoBodyHTTPRequestType: HTTPRequestType {
    async fn send_request(&self, client: &HTTPClient) -> Result<ParsedResponse<Self>, HTTPError> {
        dispatch::<Self>(self.get_request_base(client)).await
    }
}

pub(crate) trait JSONBodyHTTPRequestType: HTTPRequestType {
    /// The type of the json body.
    type Body: serde::Serialize;
    /// Returns the serializable object.
    fn body(&self) -> &Self::Body;

    async fn send_request(&self, client: &HTTPClient) -> Result<ParsedResponse<Self>, HTTPError> {
        dispatch::<Self>(self.get_request_base(client).json(self.body())).await
    }
}

pub(crate) trait MultipartBodyHTTPRequestType: HTTPRequestType {
    /// Builds the multipart form carried by the request.
    fn body(&self) -> Result<reqwest::multipart::Form, RequestError>;

    async fn send_request(&self, client: &HTTPClient) -> Result<ParsedResponse<Self>, HTTPError> {
        let form = self.body()?;
        dispatch::<Self>(self.get_request_base(client).multipart(form)).await
    }
}
