use std::time::Duration;

/// A simple wrapper around `reqwest::Client` used to manage HTTP requests
/// with a preconfigured base URL.
///
/// This client is used for making REST API calls to the DRS backend. Single requests carry
/// a fixed timeout; the announcement stream is opened without one.
#[derive(Debug, Clone)]
pub struct HTTPClient {
    /// The underlying `reqwest::Client` used to perform HTTP requests.
    client: reqwest::Client,
    /// Base URL for the API, prepended to all endpoint paths.
    base_url: String,
}

impl HTTPClient {
    /// Timeout applied to every non-streaming request.
    pub(crate) const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

    /// Constructs a new `HTTPClient` with the given base URL.
    pub fn new(base_url: &str) -> HTTPClient {
        HTTPClient {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Returns a reference to the internal `reqwest::Client`.
    pub(crate) fn client(&self) -> &reqwest::Client { &self.client }
    /// Returns the base URL that the client was initialized with.
    pub(crate) fn url(&self) -> &str { self.base_url.as_str() }
}
