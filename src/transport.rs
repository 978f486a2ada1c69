use crate::error::Result;
use reqwest::blocking::Client;
use reqwest::StatusCode;
use std::time::Duration;
use url::Url;

/// Status and body of one HTTP exchange.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: StatusCode,
    pub body: Vec<u8>,
}

/// Performs the GET requests for a [`crate::HistorianClient`].
pub trait Transport {
    fn get(&self, url: &Url) -> Result<HttpResponse>;
}

/// Blocking HTTP transport backed by `reqwest`.
#[derive(Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    /// A `None` timeout lets a request wait on the server indefinitely.
    pub fn new(timeout: Option<Duration>) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }
}

impl Transport for HttpTransport {
    fn get(&self, url: &Url) -> Result<HttpResponse> {
        let response = self.client.get(url.clone()).send()?;
        let status = response.status();
        let body = response.bytes()?.to_vec();
        Ok(HttpResponse { status, body })
    }
}
