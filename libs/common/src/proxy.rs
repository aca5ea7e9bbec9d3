//! Streaming passthrough of remote media
//!
//! The body is never buffered: bytes are pulled from the upstream connection
//! only as fast as the consumer of [`ProxiedMedia::into_stream`] polls, and
//! dropping the stream drops the upstream connection.

use bytes::Bytes;
use futures::{Stream, TryStreamExt};
use reqwest::{Client, StatusCode, header::CONTENT_TYPE};
use tracing::info;
use url::Url;

use crate::error::ProxyError;

/// Proxied media is addressed by URL and treated as immutable
pub const CACHE_CONTROL_POLICY: &str = "public, max-age=31536000, immutable";

/// Used when the origin does not say what it is sending
pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// Media proxy sharing the process-wide HTTP client
#[derive(Clone)]
pub struct MediaProxy {
    client: Client,
}

impl MediaProxy {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Accept only absolute http(s) URLs
    pub fn validate_url(url: Option<&str>) -> Result<Url, ProxyError> {
        let raw = url
            .map(str::trim)
            .filter(|raw| !raw.is_empty())
            .ok_or(ProxyError::MissingUrl)?;

        let parsed = Url::parse(raw).map_err(|e| ProxyError::InvalidUrl(format!("{}: {}", raw, e)))?;
        match parsed.scheme() {
            "http" | "https" => Ok(parsed),
            scheme => Err(ProxyError::InvalidUrl(format!(
                "{}: unsupported scheme {}",
                raw, scheme
            ))),
        }
    }

    /// Open the upstream response; the body is read later, on demand
    pub async fn fetch(&self, url: Option<&str>) -> Result<ProxiedMedia, ProxyError> {
        let url = Self::validate_url(url)?;

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(ProxyError::Request)?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND || status == StatusCode::GONE {
            return Err(ProxyError::NotFound {
                status: status.as_u16(),
            });
        }
        if !status.is_success() {
            return Err(ProxyError::UpstreamStatus {
                status: status.as_u16(),
            });
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .filter(|value| !value.is_empty())
            .unwrap_or(DEFAULT_CONTENT_TYPE)
            .to_string();

        info!("Proxying {} ({})", url, content_type);
        Ok(ProxiedMedia {
            content_type,
            response,
        })
    }
}

/// An upstream response whose body has not been read yet
pub struct ProxiedMedia {
    content_type: String,
    response: reqwest::Response,
}

impl ProxiedMedia {
    /// Content type mirrored from the origin
    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    pub fn cache_control(&self) -> &'static str {
        CACHE_CONTROL_POLICY
    }

    /// The body as a pull-driven chunk stream
    pub fn into_stream(self) -> impl Stream<Item = Result<Bytes, ProxyError>> + Send + 'static {
        self.response.bytes_stream().map_err(ProxyError::Stream)
    }
}
