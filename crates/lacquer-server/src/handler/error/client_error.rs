//! Upstream client error to HTTP error conversion.

use lacquer_client::ClientError;

use crate::handler::{Error, ErrorKind};

/// Tracing target for upstream client error conversions.
const TRACING_TARGET: &str = "lacquer_server::upstream_errors";

impl From<ClientError> for Error<'static> {
    fn from(error: ClientError) -> Self {
        match &error {
            ClientError::Transport { url, source } => {
                tracing::warn!(
                    target: TRACING_TARGET,
                    url = %url,
                    error = %source,
                    timeout = error.is_timeout(),
                    "upstream transport error"
                );
                ErrorKind::ServiceUnavailable
                    .with_message("The catalog service could not be reached")
            }
            ClientError::Status { url, status } => {
                tracing::warn!(
                    target: TRACING_TARGET,
                    url = %url,
                    status = status.as_u16(),
                    "upstream returned an error status"
                );
                ErrorKind::ServiceUnavailable
                    .with_message("The catalog service rejected the request")
            }
            ClientError::Decode { url, source } => {
                tracing::error!(
                    target: TRACING_TARGET,
                    url = %url,
                    error = %source,
                    "upstream response could not be decoded"
                );
                ErrorKind::InternalServerError.into_error()
            }
            ClientError::BaseUrl(url) => {
                tracing::error!(
                    target: TRACING_TARGET,
                    url = %url,
                    "invalid upstream base URL"
                );
                ErrorKind::InternalServerError.into_error()
            }
        }
    }
}
