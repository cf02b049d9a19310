//! Typed errors for upstream HTTP calls.

use reqwest::StatusCode;

/// Specialized [`Result`] type for upstream calls.
pub type ClientResult<T, E = ClientError> = Result<T, E>;

/// Error returned by the upstream HTTP clients.
///
/// Transport failures, non-success statuses and malformed bodies are
/// all distinct so callers can log them apart and decide how to degrade.
/// None of these variants is ever silently mapped to an empty result.
#[derive(Debug, thiserror::Error)]
#[must_use = "client errors should be handled appropriately"]
pub enum ClientError {
    /// The request never produced a response.
    #[error("request to {url} failed: {source}")]
    Transport {
        /// Requested URL.
        url: String,
        /// Underlying reqwest error.
        #[source]
        source: reqwest::Error,
    },

    /// The upstream answered with a non-success status.
    #[error("unexpected status {status} from {url}")]
    Status {
        /// Requested URL.
        url: String,
        /// Response status code.
        status: StatusCode,
    },

    /// The response body could not be decoded.
    #[error("failed to decode response from {url}: {source}")]
    Decode {
        /// Requested URL.
        url: String,
        /// Underlying reqwest error.
        #[source]
        source: reqwest::Error,
    },

    /// The configured base URL is not usable.
    #[error("invalid base url: {0}")]
    BaseUrl(String),
}

impl ClientError {
    /// Returns whether the request timed out.
    pub fn is_timeout(&self) -> bool {
        matches!(self, ClientError::Transport { source, .. } if source.is_timeout())
    }

    /// Returns the response status, when one was received.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ClientError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}
