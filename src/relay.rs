//! Pass-through relay to an upstream gateway
//!
//! Edge functions that only front another device forward the request body
//! as-is and return the upstream's raw response.

use axum::body::Bytes;
use reqwest::header::CONTENT_TYPE;
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum RelayError {
    #[error("HTTP error relaying to {url}: {message}")]
    Http { url: String, message: String },

    #[error("Upstream {url} returned {status}")]
    Status { url: String, status: u16 },
}

/// Content type sent with every relayed body
pub const RELAY_CONTENT_TYPE: &str = "multipart/form-data";

#[derive(Clone)]
pub struct Relay {
    client: reqwest::Client,
    url: String,
}

impl Relay {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: url.into(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// POST `body` verbatim to the upstream and return its response body.
    pub async fn forward(&self, body: Bytes) -> Result<Bytes, RelayError> {
        debug!("Relaying {} bytes to {}", body.len(), self.url);

        let response = self
            .client
            .post(&self.url)
            .header(CONTENT_TYPE, RELAY_CONTENT_TYPE)
            .body(body)
            .send()
            .await
            .map_err(|e| self.http_error(e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(RelayError::Status {
                url: self.url.clone(),
                status: status.as_u16(),
            });
        }

        response.bytes().await.map_err(|e| self.http_error(e))
    }

    fn http_error(&self, e: reqwest::Error) -> RelayError {
        RelayError::Http {
            url: self.url.clone(),
            message: e.to_string(),
        }
    }
}
