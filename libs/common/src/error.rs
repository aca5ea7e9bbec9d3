//! Custom error types for the common library
//!
//! Each concern of the feed pipeline gets its own error type so callers can
//! decide which failures are recoverable and which surface to the client.

use thiserror::Error;

/// Error talking to one of the NASA upstreams
#[derive(Error, Debug)]
pub enum UpstreamError {
    /// Transport failure or an undecodable body
    #[error("Upstream request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Upstream answered with a non-success status
    #[error("Upstream {url} answered with status {status}")]
    Status { status: u16, url: String },
}

/// Error raised by a translation backend
#[derive(Error, Debug)]
pub enum TranslationError {
    /// Transport failure or an undecodable body
    #[error("Translation request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Backend answered with a non-success status (quota, bad key, bad input)
    #[error("Translation backend answered with status {0}")]
    Status(u16),

    /// Backend answered without any translation
    #[error("Translation backend returned no text")]
    EmptyResponse,
}

/// Error raised while proxying remote media
#[derive(Error, Debug)]
pub enum ProxyError {
    /// The caller did not say what to fetch
    #[error("Media URL is required")]
    MissingUrl,

    /// The caller supplied something that is not an absolute http(s) URL
    #[error("Invalid media URL: {0}")]
    InvalidUrl(String),

    /// Upstream reports the resource does not exist
    #[error("Media not found at origin (status {status})")]
    NotFound { status: u16 },

    /// Upstream answered with any other non-success status
    #[error("Media origin answered with status {status}")]
    UpstreamStatus { status: u16 },

    /// Could not reach the upstream
    #[error("Media request failed: {0}")]
    Request(#[source] reqwest::Error),

    /// Upstream connection broke while streaming the body
    #[error("Media stream interrupted: {0}")]
    Stream(#[source] reqwest::Error),
}

impl ProxyError {
    /// Whether the failure was caused by the caller's input
    pub fn is_client_error(&self) -> bool {
        matches!(self, ProxyError::MissingUrl | ProxyError::InvalidUrl(_))
    }
}

/// Configuration error
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Environment could not be read into settings
    #[error("Configuration load error: {0}")]
    Load(#[from] config::ConfigError),

    /// A setting has an unusable value
    #[error("Invalid configuration value for {key}: {message}")]
    Invalid { key: &'static str, message: String },
}

/// Type alias for Result with UpstreamError
pub type UpstreamResult<T> = Result<T, UpstreamError>;
