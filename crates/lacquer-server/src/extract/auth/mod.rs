//! Authentication extractors.

mod auth_claims;
mod auth_header;
mod auth_state;

pub use auth_claims::AuthClaims;
pub use auth_header::AuthHeader;
pub use auth_state::AuthState;
