//! Shared HTTP plumbing for every upstream source

use std::time::Duration;

use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::debug;

/// User agent sent to every upstream
const USER_AGENT: &str = "TheLitmus/1.0";

/// Errors that can occur when calling an upstream source
#[derive(Debug, Error)]
pub enum UpstreamError {
    /// Upstream answered with a non-success status
    #[error("upstream {source_name} returned HTTP {status}")]
    Unavailable {
        source_name: &'static str,
        status: StatusCode,
    },

    /// Connection, TLS or timeout failure
    #[error("upstream {source_name} unreachable: {error}")]
    Transport {
        source_name: &'static str,
        #[source]
        error: reqwest::Error,
    },

    /// Body could not be parsed at all
    #[error("upstream {source_name} sent a malformed payload: {detail}")]
    Malformed {
        source_name: &'static str,
        detail: String,
    },
}

/// Thin wrapper around a `reqwest::Client` with a bounded timeout
///
/// Every call is either a successful body or an `UpstreamError`; a timeout
/// surfaces as `Transport` and is handled like any other outage.
#[derive(Debug, Clone)]
pub struct Upstream {
    client: Client,
}

impl Upstream {
    /// Builds a client whose requests give up after `timeout`
    pub fn new(timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self { client })
    }

    /// Starts a GET request
    pub fn get(&self, url: &str) -> RequestBuilder {
        self.client.get(url)
    }

    /// Starts a POST request
    pub fn post(&self, url: &str) -> RequestBuilder {
        self.client.post(url)
    }

    /// Sends `request` and returns the body text of a 2xx response
    pub async fn text(
        &self,
        source_name: &'static str,
        request: RequestBuilder,
    ) -> Result<String, UpstreamError> {
        let response = request
            .send()
            .await
            .map_err(|error| UpstreamError::Transport { source_name, error })?;

        let status = response.status();
        if !status.is_success() {
            return Err(UpstreamError::Unavailable {
                source_name,
                status,
            });
        }

        let body = response
            .text()
            .await
            .map_err(|error| UpstreamError::Transport { source_name, error })?;
        debug!(source_name, bytes = body.len(), "upstream response");
        Ok(body)
    }

    /// Sends `request` and decodes a 2xx JSON body into `T`
    pub async fn json<T: DeserializeOwned>(
        &self,
        source_name: &'static str,
        request: RequestBuilder,
    ) -> Result<T, UpstreamError> {
        let body = self.text(source_name, request).await?;
        serde_json::from_str(&body).map_err(|e| UpstreamError::Malformed {
            source_name,
            detail: e.to_string(),
        })
    }
}

/// Joins a base URL and a path without doubling slashes
pub(crate) fn join_url(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}
