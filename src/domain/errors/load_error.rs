//! Load error types.

use thiserror::Error;

/// Terminal failure of a single load request.
///
/// Recorded as the ticket's result and surfaced to its consumer at drain
/// time. Nothing is retried.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[allow(missing_docs)]
pub enum LoadError {
    #[error("invalid image URL: {url:?}")]
    InvalidUrl { url: String },

    #[error("download error: {message}")]
    Network { message: String },

    #[error("returned non 2XX code {status}")]
    HttpStatus { status: u16 },

    #[error("empty server response")]
    EmptyBody,

    #[error("error detecting image format")]
    UnknownFormat,

    #[error("error decoding image: {message}")]
    Decode { message: String },
}

impl LoadError {
    /// Creates invalid URL error.
    #[must_use]
    pub fn invalid_url(url: impl Into<String>) -> Self {
        Self::InvalidUrl { url: url.into() }
    }

    /// Creates network error.
    #[must_use]
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network {
            message: message.into(),
        }
    }

    /// Creates decode error.
    #[must_use]
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }
}
