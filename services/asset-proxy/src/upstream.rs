//! Client for the upstream blob-storage media endpoint.
//!
//! Requests take the form `GET <base>/<identifier>?alt=media&key=<credential>`.
//! Because the credential travels in the query string, request URLs are never
//! logged and transport errors are stripped of their URL before they leave
//! this module.

use crate::config::UpstreamConfig;
use crate::error::ProxyError;
use anyhow::{bail, Context, Result};
use axum::http::header;
use bytes::Bytes;
use futures::{Stream, TryStreamExt};
use reqwest::{Client, Response, Url};
use std::fmt;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, instrument, warn};

/// Content type used when the upstream does not send one
pub const FALLBACK_CONTENT_TYPE: &str = "application/octet-stream";

/// Server-held upstream API key
#[derive(Clone)]
pub struct Credential(Arc<str>);

impl Credential {
    /// Blank values count as unset
    pub fn new(value: &str) -> Option<Self> {
        let value = value.trim();
        if value.is_empty() {
            None
        } else {
            Some(Self(Arc::from(value)))
        }
    }

    fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(<redacted>)")
    }
}

/// Successful upstream response, body not yet consumed
pub struct UpstreamAsset {
    content_type: String,
    response: Response,
}

impl fmt::Debug for UpstreamAsset {
    // The response's own Debug prints the request URL, credential included
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UpstreamAsset")
            .field("status", &self.response.status())
            .field("content_type", &self.content_type)
            .field("content_length", &self.response.content_length())
            .finish()
    }
}

impl UpstreamAsset {
    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    pub fn content_length(&self) -> Option<u64> {
        self.response.content_length()
    }

    /// Body as a chunk stream; errors carry no URL. A failure after the
    /// headers went out cannot change the response status, so it is logged
    /// and counted here.
    pub fn into_stream(self) -> impl Stream<Item = Result<Bytes, reqwest::Error>> + Send + 'static {
        self.response
            .bytes_stream()
            .inspect_ok(|chunk| {
                metrics::counter!("asset_proxy_bytes_total").increment(chunk.len() as u64);
            })
            .map_err(reqwest::Error::without_url)
            .inspect_err(|e| {
                error!(error = %e, "Upstream body stream failed");
                metrics::counter!("asset_proxy_stream_errors_total").increment(1);
            })
    }

    /// Whole body in memory
    pub async fn into_bytes(self) -> Result<Bytes, ProxyError> {
        let body = self.response.bytes().await.map_err(|e| {
            let error = ProxyError::transport(e);
            error!(error = %error, "Upstream body read failed");
            error
        })?;
        metrics::counter!("asset_proxy_bytes_total").increment(body.len() as u64);
        Ok(body)
    }
}

/// Upstream storage client
pub struct UpstreamClient {
    client: Client,
    base_url: Url,
}

impl UpstreamClient {
    /// Create a new upstream client
    pub fn new(config: &UpstreamConfig) -> Result<Self> {
        let base_url = Url::parse(&config.base_url)
            .with_context(|| format!("Invalid upstream base URL: {}", config.base_url))?;

        if base_url.cannot_be_a_base() {
            bail!("Upstream base URL cannot carry a path: {}", config.base_url);
        }

        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout() {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().context("Failed to build upstream HTTP client")?;

        Ok(Self { client, base_url })
    }

    /// Media retrieval URL for `identifier`
    pub fn asset_url(&self, identifier: &str, credential: &Credential) -> Result<Url, ProxyError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ProxyError::InvalidUpstreamUrl("base cannot carry a path".to_string()))?
            .pop_if_empty()
            .push(identifier);
        url.query_pairs_mut()
            .append_pair("alt", "media")
            .append_pair("key", credential.expose());
        Ok(url)
    }

    /// Fetch an asset. Non-success statuses become `UpstreamRejected` and are
    /// not retried.
    #[instrument(skip(self, credential))]
    pub async fn fetch(&self, identifier: &str, credential: &Credential) -> Result<UpstreamAsset, ProxyError> {
        let identifier = identifier.trim();
        if identifier.is_empty() {
            return Err(ProxyError::MissingIdentifier);
        }

        let url = self.asset_url(identifier, credential)?;
        debug!("Fetching asset from upstream");

        let started = Instant::now();
        let result = self.client.get(url).send().await;
        metrics::histogram!("asset_proxy_upstream_seconds").record(started.elapsed().as_secs_f64());

        let response = result.map_err(|e| {
            let error = ProxyError::transport(e);
            error!(error = %error, "Upstream request failed");
            error
        })?;

        let status = response.status();
        if !status.is_success() {
            let status_text = status.canonical_reason().unwrap_or("Unknown Status").to_string();
            warn!(status = %status, "Upstream rejected asset request");
            return Err(ProxyError::UpstreamRejected {
                status,
                status_text,
            });
        }

        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or(FALLBACK_CONTENT_TYPE)
            .to_string();

        debug!(content_type = %content_type, content_length = ?response.content_length(), "Upstream asset ready");

        Ok(UpstreamAsset {
            content_type,
            response,
        })
    }
}
