//! Shared-secret key material for JWT session handling.
//!
//! The monolith signs tokens with HS256 so sibling services (the catalog
//! microservice) can verify them with the same configured secret.

use std::fmt;
use std::sync::Arc;

use anyhow::{Result as AnyhowResult, ensure};
use jsonwebtoken::{DecodingKey, EncodingKey};

/// Tracing target for key management.
const TRACING_TARGET: &str = "lacquer_server::service::auth_keys";

/// Minimum accepted secret length in bytes.
pub const MIN_SECRET_LEN: usize = 32;

/// HS256 keys used to sign and verify session tokens.
///
/// Cheap to clone; all clones share the same key material.
#[derive(Clone)]
pub struct AuthKeys {
    inner: Arc<AuthKeysInner>,
}

struct AuthKeysInner {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl AuthKeys {
    /// Derives signing and verification keys from a shared secret.
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

        tracing::debug!(
            target: TRACING_TARGET,
            secret_len = secret.len(),
            "authentication keys derived from shared secret",
        );

        let inner = Arc::new(AuthKeysInner {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
        });

        Ok(Self { inner })
    }

    /// Returns the key used to sign tokens.
    #[inline]
    pub fn encoding_key(&self) -> &EncodingKey {
        &self.inner.encoding_key
    }

    /// Returns the key used to verify tokens.
    #[inline]
    pub fn decoding_key(&self) -> &DecodingKey {
        &self.inner.decoding_key
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

    #[test]
    fn accepts_long_secrets() {
        let secret = "0123456789abcdef0123456789abcdef";
        assert!(AuthKeys::from_secret(secret).is_ok());
    }
}
