//! Shared response types for HTTP handlers.

mod error_response;

pub use error_response::ErrorResponse;
