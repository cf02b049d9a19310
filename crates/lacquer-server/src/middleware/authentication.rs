//! Authentication middleware for validating request credentials.

use axum::extract::Request;
use axum::middleware::Next;
use axum::response::Response;

use crate::extract::AuthState;

/// Requires a valid authentication token to proceed with the request.
///
/// Extraction of [`AuthState`] performs both JWT validation and database
/// verification, so reaching the inner service implies an active account.
pub async fn require_authentication(
    AuthState(_): AuthState,
    request: Request,
    next: Next,
) -> Response {
    next.run(request).await
}
