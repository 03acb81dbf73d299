use super::super::http_client::HTTPClient;

/// Request for the /announcements server-sent event stream.
///
/// The stream is long-lived, so it is built without the per-request timeout.
#[derive(Debug)]
pub struct AnnouncementsRequest {}

impl AnnouncementsRequest {
    pub(crate) fn endpoint(&self) -> &'static str { "/announcements" }

    pub(crate) fn stream_request(&self, client: &HTTPClient) -> reqwest::RequestBuilder {
        client.client().get(format!("{}{}", client.url(), self.endpoint()))
    }
}
