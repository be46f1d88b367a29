//! Error types for the request builder and executor.
//!
//! # Design
//! Transport failures carry the `ureq::Error` untouched so callers can match
//! on the underlying cause (connection refused, timeout, bad URI). The
//! builder never retries or rewrites them. `Encoding` only fires for values
//! whose `Display` impl itself reports an error.

use thiserror::Error;

/// Errors returned by `RequestBuilder::build` and `RequestBuilder::execute`.
#[derive(Debug, Error)]
pub enum HttpError {
    /// Network, connection, timeout or URL failure raised by the transport.
    #[error(transparent)]
    Transport(#[from] ureq::Error),

    /// A parameter value could not be converted to a string.
    #[error("failed to encode value for parameter `{key}`")]
    Encoding { key: String },

    /// An option was used in a way the builder does not support.
    #[error("invalid usage: {0}")]
    InvalidUsage(String),
}

impl HttpError {
    /// True when the transport gave up because the request timed out.
    pub fn is_timeout(&self) -> bool {
        matches!(self, HttpError::Transport(ureq::Error::Timeout(_)))
    }
}
