//! Shared-secret key material for verifying session tokens.
//!
//! The monolith signs tokens with HS256; this service only verifies
//! them, so it carries the decoding half of the shared secret.

use std::fmt;
use std::sync::Arc;

use anyhow::{Result as AnyhowResult, ensure};
use jsonwebtoken::DecodingKey;

/// Minimum accepted secret length in bytes.
pub const MIN_SECRET_LEN: usize = 32;

/// HS256 verification key for session tokens.
///
/// Cheap to clone; all clones share the same key material.
#[derive(Clone)]
pub struct AuthKeys {
    decoding_key: Arc<DecodingKey>,
}

impl AuthKeys {
    /// Derives the verification key from the shared secret.
    ///
    /// # Errors
    ///
    /// Returns an error when the secret is shorter than 32 bytes.
    pub fn from_secret(secret: &str) -> AnyhowResult<Self> {
        ensure!(
            secret.len() >= MIN_SECRET_LEN,
            "auth secret must be at least {} bytes",
            MIN_SECRET_LEN
        );

        Ok(Self {
            decoding_key: Arc::new(DecodingKey::from_secret(secret.as_bytes())),
        })
    }

    /// Returns the key used to verify tokens.
    #[inline]
    pub fn decoding_key(&self) -> &DecodingKey {
        &self.decoding_key
    }
}

impl fmt::Debug for AuthKeys {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthKeys").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_short_secrets() {
        assert!(AuthKeys::from_secret("too-short").is_err());
    }
}
