//! Shared HTTP plumbing for catalog and recommendation clients.
//!
//! Every remote call goes through one `reqwest::Client` configured with the
//! transport timeouts, and every response is read the same way: status and
//! body first, then decoding by the caller's adapter.

use std::time::Duration;

use reqwest::StatusCode;
use serde::de::DeserializeOwned;

use super::domain::RemoteFailure;

/// User agent string - Discogs rejects requests without one
pub const USER_AGENT: &str = concat!(
    "VinylScanner/",
    env!("CARGO_PKG_VERSION"),
    " (+https://github.com/vinyl-scanner)"
);

/// Transport settings shared by all remote calls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpSettings {
    pub connect_timeout: Duration,
    pub read_timeout: Duration,
    pub user_agent: String,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(30),
            read_timeout: Duration::from_secs(30),
            user_agent: USER_AGENT.to_string(),
        }
    }
}

/// Build the shared HTTP client.
pub fn build_client(settings: &HttpSettings) -> Result<reqwest::Client, reqwest::Error> {
    reqwest::Client::builder()
        .gzip(true)
        .user_agent(settings.user_agent.clone())
        .connect_timeout(settings.connect_timeout)
        .read_timeout(settings.read_timeout)
        .build()
}

/// Send a request and read the whole body.
pub(crate) async fn send(
    request: reqwest::RequestBuilder,
) -> Result<(StatusCode, String), RemoteFailure> {
    let response = request.send().await.map_err(network_failure)?;
    let status = response.status();
    let body = response.text().await.map_err(network_failure)?;
    Ok((status, body))
}

/// Decode a JSON body into a DTO.
pub(crate) fn decode<T: DeserializeOwned>(body: &str) -> Result<T, RemoteFailure> {
    serde_json::from_str(body).map_err(|e| RemoteFailure::Decode(e.to_string()))
}

/// Failure for a non-success status without a structured error body.
pub(crate) fn status_failure(status: StatusCode, body: &str) -> RemoteFailure {
    let message = match body.trim() {
        "" => status.canonical_reason().unwrap_or("Unknown").to_string(),
        text => text.chars().take(200).collect(),
    };
    RemoteFailure::Status {
        status: status.as_u16(),
        message,
    }
}

fn network_failure(e: reqwest::Error) -> RemoteFailure {
    if e.is_timeout() {
        RemoteFailure::Network(format!("request timed out: {}", e))
    } else {
        RemoteFailure::Network(e.to_string())
    }
}
