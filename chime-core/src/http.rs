//! HTTP client collaborator for webhook delivery.

use std::time::Duration;

/// Response to a webhook request.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

/// Perform-GET/POST capability used by the webhook dispatcher.
///
/// Transport failures come back as an error string; the dispatcher logs them
/// and moves on, so implementations never need to retry.
pub trait HttpClient: Send {
    /// Issues a GET request to `url` (query string already appended).
    fn get(&mut self, url: &str) -> Result<HttpResponse, String>;

    /// Issues a POST request with a form-encoded body.
    fn post_form(&mut self, url: &str, body: &str) -> Result<HttpResponse, String>;
}

/// Default request timeout for webhook calls.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// `reqwest`-backed client. The dispatcher worker owns it exclusively, so the
/// blocking API fits the one-call-at-a-time contract.
pub struct ReqwestClient {
    client: reqwest::blocking::Client,
}

impl ReqwestClient {
    pub fn new() -> Self {
        let client = reqwest::blocking::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()
            .unwrap_or_else(|_| reqwest::blocking::Client::new());
        Self { client }
    }

    fn read_response(response: reqwest::blocking::Response) -> Result<HttpResponse, String> {
        let status = response.status().as_u16();
        let body = response.text().map_err(|e| e.to_string())?;
        Ok(HttpResponse { status, body })
    }
}

impl Default for ReqwestClient {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpClient for ReqwestClient {
    fn get(&mut self, url: &str) -> Result<HttpResponse, String> {
        let response = self.client.get(url).send().map_err(|e| e.to_string())?;
        Self::read_response(response)
    }

    fn post_form(&mut self, url: &str, body: &str) -> Result<HttpResponse, String> {
        let response = self
            .client
            .post(url)
            .header("Content-Type", "application/x-www-form-urlencoded")
            .body(body.to_string())
            .send()
            .map_err(|e| e.to_string())?;
        Self::read_response(response)
    }
}
