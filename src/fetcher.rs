use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header::{ACCEPT, HeaderMap, HeaderValue, USER_AGENT};
use serde_json::Value;
use tracing::debug;

use crate::error::CatalogError;

/// One bounded GET returning a parsed JSON document. Implementations make at
/// most one round trip per call and never retry.
pub trait JsonFetcher: Send + Sync {
    fn fetch_json(&self, url: &str) -> Result<Value, CatalogError>;
}

#[derive(Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(timeout: Duration) -> Result<Self, CatalogError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&format!("pokedex/{}", env!("CARGO_PKG_VERSION")))
                .map_err(|err| CatalogError::Client(err.to_string()))?,
        );
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        // The client owns the deadline; it is dropped with the request on
        // every exit path.
        let client = Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .map_err(|err| CatalogError::Client(err.to_string()))?;
        Ok(Self { client })
    }

    fn map_error(url: &str, err: reqwest::Error) -> CatalogError {
        if err.is_timeout() {
            CatalogError::Timeout {
                url: url.to_string(),
            }
        } else if err.is_decode() {
            CatalogError::Decode(err.to_string())
        } else {
            CatalogError::Transport(err.to_string())
        }
    }

    fn handle_status(
        response: reqwest::blocking::Response,
    ) -> Result<reqwest::blocking::Response, CatalogError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        Err(CatalogError::RequestFailed {
            status: status.as_u16(),
            status_text: status
                .canonical_reason()
                .unwrap_or("request failed")
                .to_string(),
        })
    }
}

impl JsonFetcher for HttpFetcher {
    fn fetch_json(&self, url: &str) -> Result<Value, CatalogError> {
        debug!(url, "GET");
        let response = self
            .client
            .get(url)
            .send()
            .map_err(|err| Self::map_error(url, err))?;
        let response = Self::handle_status(response)?;
        response
            .json::<Value>()
            .map_err(|err| Self::map_error(url, err))
    }
}
