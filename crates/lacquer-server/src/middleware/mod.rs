//! Middleware for `axum::Router` and HTTP request processing.

mod authentication;

pub use authentication::require_authentication;
