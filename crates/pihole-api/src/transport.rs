// Transport: the only place that talks to the network.
//
// Builds the `reqwest::Client` from a `TransportConfig` and turns an
// `ApiRequest` into a raw status/headers/body triple. No retries, no cookie
// jar: session cookies are attached explicitly by the request builder so the
// handle's `SessionState` stays the single source of truth.

use std::time::Duration;

use reqwest::StatusCode;
use reqwest::header::HeaderMap;
use tracing::{debug, trace};

use crate::error::Error;
use crate::request::ApiRequest;

/// Transport configuration for building the HTTP client.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    pub timeout: Duration,
    pub user_agent: String,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            user_agent: concat!("pihole-api/", env!("CARGO_PKG_VERSION")).into(),
        }
    }
}

impl TransportConfig {
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Build a `reqwest::Client` from this config.
    pub fn build_client(&self) -> Result<reqwest::Client, Error> {
        reqwest::Client::builder()
            .timeout(self.timeout)
            .user_agent(self.user_agent.as_str())
            .build()
            .map_err(|e| Error::Other(Box::new(e)))
    }
}

/// What came back from the appliance, before any interpretation.
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

/// Thin wrapper over `reqwest::Client` that executes [`ApiRequest`]s.
#[derive(Debug, Clone)]
pub struct Transport {
    http: reqwest::Client,
}

impl Transport {
    pub fn new(config: &TransportConfig) -> Result<Self, Error> {
        Ok(Self {
            http: config.build_client()?,
        })
    }

    /// Wrap a pre-built client (tests, shared connection pools).
    pub fn from_client(http: reqwest::Client) -> Self {
        Self { http }
    }

    /// Send the request and collect the full body.
    ///
    /// HTTP error statuses are *not* errors here: the Pi-hole signals most
    /// failures in-band, so interpretation is left to the decoder.
    pub async fn perform(&self, request: ApiRequest) -> Result<RawResponse, Error> {
        debug!(method = %request.method, path = request.url.path(), "sending request");

        let mut builder = self
            .http
            .request(request.method, request.url)
            .headers(request.headers);
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let resp = builder.send().await.map_err(Error::Transport)?;
        let status = resp.status();
        let headers = resp.headers().clone();
        let body = resp.bytes().await.map_err(Error::Transport)?.to_vec();

        trace!(%status, len = body.len(), "received response");
        Ok(RawResponse {
            status,
            headers,
            body,
        })
    }
}
